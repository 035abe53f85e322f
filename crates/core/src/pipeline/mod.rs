pub mod frame_pipeline;
pub mod infrastructure;
pub mod recognition_sink;
pub mod snapshot_writer;
