pub mod opencv_reader;
pub mod opencv_writer;

use anyhow::Result;
use opencv::core::Mat;

/// Geometry and timing of a video stream, as advertised by its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProperties {
    pub width: i32,
    pub height: i32,
    pub fps: f64,
    pub frame_count: usize,
}

pub trait VideoReader: Send {
    fn properties(&self) -> VideoProperties;
    /// Returns `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

pub trait VideoSink: Send {
    fn write_frame(&mut self, frame: &Mat) -> Result<()>;
}
