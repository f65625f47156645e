use crate::cli::Args;
use crate::pipeline::detection::ObjectDetector;
use crate::pipeline::{FrameAnnotator, SharedAnnotator};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// The detection model as loaded at startup. A failed load is never retried;
/// every upload in the lifetime of the process is refused instead.
#[derive(Clone)]
pub enum ModelSlot {
    Ready(SharedAnnotator),
    Unavailable(Arc<str>),
}

impl ModelSlot {
    pub fn load(args: &Args) -> Self {
        match ObjectDetector::new(&args.model_path, &args.class_names, args.confidence) {
            Ok(detector) => {
                info!("Loaded detection model from {}", args.model_path);
                Self::ready(detector)
            }
            Err(e) => {
                error!("Error loading model {}: {:#}", args.model_path, e);
                Self::Unavailable(format!("{:#}", e).into())
            }
        }
    }

    pub fn ready<A: FrameAnnotator + 'static>(annotator: A) -> Self {
        Self::Ready(Arc::new(Mutex::new(annotator)))
    }
}
