use std::thread::JoinHandle;

use crate::pipeline::frame_pipeline::{FrameOutcome, RecognitionPipeline};
use crate::pipeline::recognition_sink::SessionHandle;
use crate::shared::frame::CameraFrame;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Runs a [`RecognitionPipeline`] on its own processing thread, fed
/// through a bounded channel.
///
/// Frames are processed strictly serially; at most one frame is in
/// flight inside the pipeline. The loop ends when the session stops
/// (a recognition happened) or the feed side is dropped.
pub struct ThreadedFrameLoop {
    frame_tx: crossbeam_channel::Sender<CameraFrame>,
    handle: JoinHandle<RecognitionPipeline>,
    session: SessionHandle,
}

impl ThreadedFrameLoop {
    pub fn spawn(pipeline: RecognitionPipeline) -> Self {
        Self::spawn_with_capacity(pipeline, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn spawn_with_capacity(pipeline: RecognitionPipeline, capacity: usize) -> Self {
        let session = pipeline.session();
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<CameraFrame>(capacity);
        let handle = spawn_worker(pipeline, frame_rx);
        Self {
            frame_tx,
            handle,
            session,
        }
    }

    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Queues one frame for processing, blocking while the channel is
    /// full. Returns `false` once the loop no longer accepts frames.
    pub fn submit(&self, frame: CameraFrame) -> bool {
        self.frame_tx.send(frame).is_ok()
    }

    /// Closes the feed, waits for the worker to drain, and hands the
    /// pipeline back to the caller.
    pub fn join(self) -> RecognitionPipeline {
        drop(self.frame_tx);
        match self.handle.join() {
            Ok(pipeline) => pipeline,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn spawn_worker(
    mut pipeline: RecognitionPipeline,
    frame_rx: crossbeam_channel::Receiver<CameraFrame>,
) -> JoinHandle<RecognitionPipeline> {
    std::thread::spawn(move || {
        for frame in frame_rx {
            let outcome = pipeline.process_frame(&frame);
            log::debug!("frame outcome: {outcome:?}");
            if matches!(
                outcome,
                FrameOutcome::Recognized(_) | FrameOutcome::SessionStopped
            ) {
                break;
            }
        }
        pipeline
    })
}
