use super::{VideoProperties, VideoSink};
use anyhow::{anyhow, Context, Result};
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::VideoWriter,
};
use std::path::Path;

/// Writes frames into a new container with the portable MPEG-4 Part 2 codec.
/// The writer is released (and the container finalized) when dropped.
pub struct OpencvWriter {
    writer: VideoWriter,
    frame_size: Size,
}

impl OpencvWriter {
    pub fn create(path: &Path, properties: &VideoProperties) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Output path is not valid UTF-8: {}", path.display()))?;

        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let frame_size = Size::new(properties.width, properties.height);
        let writer = VideoWriter::new(path_str, fourcc, properties.fps, frame_size, true)
            .with_context(|| format!("Failed to create video writer: {}", path_str))?;
        if !writer.is_opened()? {
            return Err(anyhow!("VideoWriter failed to open (mp4v): {}", path_str));
        }

        Ok(Self { writer, frame_size })
    }
}

impl VideoSink for OpencvWriter {
    fn write_frame(&mut self, frame: &Mat) -> Result<()> {
        check_frame_size(frame, self.frame_size)?;
        self.writer.write(frame)?;
        Ok(())
    }
}

/// OpenCV silently drops frames that do not match the configured size.
fn check_frame_size(frame: &Mat, expected: Size) -> Result<()> {
    let size = frame.size()?;
    if size != expected {
        return Err(anyhow!(
            "Frame size {}x{} does not match output size {}x{}",
            size.width,
            size.height,
            expected.width,
            expected.height
        ));
    }
    Ok(())
}

impl Drop for OpencvWriter {
    fn drop(&mut self) {
        if let Err(e) = self.writer.release() {
            tracing::warn!("OpencvWriter: failed to release writer: {}", e);
        }
    }
}
