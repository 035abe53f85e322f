use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared handle for one live detection session.
///
/// The stop flag is the "recognized once, stop looking" signal: the
/// pipeline raises it after a positive classification and the frame
/// feed observes it. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct SessionHandle {
    stopped: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Injected notification capability of the pipeline.
///
/// The core never talks to a UI or a delivery channel directly; callers
/// hand in whatever sink fits their surface. Both calls are
/// fire-and-forget, no acknowledgment expected.
pub trait RecognitionSink: Send {
    /// Short human-readable status text (diagnostics, soft failures,
    /// advisory results).
    fn notify(&mut self, message: &str);

    /// A gallery identity was recognized. Invoked at most once per
    /// session; `session` lets the receiver confirm or trigger the stop.
    fn dispatch_alert(&mut self, label: &str, session: &SessionHandle);
}

/// Sink that discards everything; used in tests and headless setups.
pub struct NullRecognitionSink;

impl RecognitionSink for NullRecognitionSink {
    fn notify(&mut self, _message: &str) {}
    fn dispatch_alert(&mut self, _label: &str, _session: &SessionHandle) {}
}

/// Sink that forwards to the `log` facade; used by the CLI.
pub struct LogRecognitionSink;

impl RecognitionSink for LogRecognitionSink {
    fn notify(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn dispatch_alert(&mut self, label: &str, _session: &SessionHandle) {
        log::info!("recognized identity: {label}");
    }
}
