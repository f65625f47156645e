/// Bounding box in pixel coordinates of the source frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// A single object found by the detector
#[derive(Debug, Clone)]
pub struct Detection {
    pub bbox: BBox,
    pub confidence: f32,
    pub class_id: usize,
    pub class_name: Option<String>,
}

impl Detection {
    /// Text drawn above the box, e.g. `helmet 0.87`.
    pub fn label(&self) -> String {
        match &self.class_name {
            Some(name) => format!("{} {:.2}", name, self.confidence),
            None => format!("class {} {:.2}", self.class_id, self.confidence),
        }
    }
}

/// Outcome of annotating one uploaded video
#[derive(Debug, Clone)]
pub struct AnnotatedVideo {
    /// Location of the output relative to the static root
    pub relative_path: String,
    pub frames_written: usize,
    pub reached_frame_cap: bool,
}
