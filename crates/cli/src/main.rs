use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facesentry_core::detection::domain::face_detector::FaceDetector;
use facesentry_core::detection::infrastructure::seeta_detector::SeetaFaceDetector;
use facesentry_core::pipeline::frame_pipeline::RecognitionPipeline;
use facesentry_core::pipeline::infrastructure::threaded_frame_loop::ThreadedFrameLoop;
use facesentry_core::pipeline::recognition_sink::LogRecognitionSink;
use facesentry_core::pipeline::snapshot_writer::SnapshotWriter;
use facesentry_core::recognition::infrastructure::eigen_classifier::EigenFaceClassifier;
use facesentry_core::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, REJECTION_THRESHOLD, SNAPSHOT_FILENAME,
};
use facesentry_core::shared::frame::CameraFrame;
use facesentry_core::shared::model_resolver;

/// Face recognition over a replayed camera frame feed.
#[derive(Parser)]
#[command(name = "facesentry")]
struct Cli {
    /// Directory of labeled training images (label-N.ext).
    gallery: PathBuf,

    /// Image files replayed as camera frames, in order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Where to save the most recent normalized face.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Skip saving the diagnostic face snapshot.
    #[arg(long)]
    no_snapshot: bool,

    /// Directory with a bundled detector model, checked before download.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Ratio by which frames are shrunk before detection.
    #[arg(long, default_value = "4")]
    subsampling: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detector = build_detector(&cli)?;
    let classifier = Box::new(EigenFaceClassifier::new(REJECTION_THRESHOLD));
    let snapshot = if cli.no_snapshot {
        None
    } else {
        let path = cli
            .snapshot
            .clone()
            .unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILENAME));
        Some(SnapshotWriter::new(path))
    };

    let pipeline = RecognitionPipeline::with_gallery(
        detector,
        classifier,
        Box::new(LogRecognitionSink),
        snapshot,
        &cli.gallery,
    )
    .with_subsampling_factor(cli.subsampling);

    let frame_loop = ThreadedFrameLoop::spawn(pipeline);
    let session = frame_loop.session();

    for path in &cli.frames {
        if session.is_stopped() {
            break;
        }
        let frame = load_frame(path)?;
        if !frame_loop.submit(frame) {
            break;
        }
    }

    let pipeline = frame_loop.join();

    if pipeline.session().is_stopped() {
        log::info!("recognition complete, detection stopped");
    } else {
        log::info!("feed exhausted without a recognized identity");
    }
    Ok(())
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving detector model: {DETECTOR_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        DETECTOR_MODEL_NAME,
        DETECTOR_MODEL_URL,
        cli.model_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    Ok(Box::new(SeetaFaceDetector::from_model_file(&model_path)?))
}

fn load_frame(path: &Path) -> Result<CameraFrame, Box<dyn std::error::Error>> {
    let luma = image::open(path)
        .map_err(|e| format!("cannot read frame {}: {e}", path.display()))?
        .to_luma8();
    let (width, height) = luma.dimensions();
    Ok(CameraFrame::new(
        luma.into_raw(),
        width as usize,
        height as usize,
    ))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.gallery.is_dir() {
        return Err(format!("Gallery directory not found: {}", cli.gallery.display()).into());
    }
    for frame in &cli.frames {
        if !frame.exists() {
            return Err(format!("Frame file not found: {}", frame.display()).into());
        }
    }
    if cli.no_snapshot && cli.snapshot.is_some() {
        return Err("--snapshot and --no-snapshot are mutually exclusive".into());
    }
    if cli.subsampling == 0 {
        return Err("Subsampling ratio must be at least 1".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
