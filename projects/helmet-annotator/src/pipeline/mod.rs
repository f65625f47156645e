// Video annotation pipeline: detector, rendering and the bounded frame loop

pub mod annotate;
pub mod detection;
pub mod model;
pub mod render;
pub mod types;

use anyhow::Result;
use opencv::core::Mat;
use std::sync::{Arc, Mutex};

/// Something that turns a raw frame into one with detections burned in.
pub trait FrameAnnotator: Send {
    fn annotate(&mut self, frame: &Mat) -> Result<Mat>;
}

/// Annotator shared by every request; locked once per frame.
pub type SharedAnnotator = Arc<Mutex<dyn FrameAnnotator>>;
