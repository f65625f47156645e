// Bounded annotation loop
//
// Reads frames in order, annotates each one and appends it to the output.
// Stops at end of stream or once `max_frames` frames have been written.

use crate::pipeline::types::AnnotatedVideo;
use crate::pipeline::SharedAnnotator;
use crate::storage::{result_reference, StorageLayout, StoredUpload};
use crate::video::opencv_reader::OpencvReader;
use crate::video::opencv_writer::OpencvWriter;
use crate::video::{VideoReader, VideoSink};
use anyhow::{Context, Result};
use std::sync::PoisonError;
use std::time::Instant;

/// Consumes `reader` and `writer`; both are dropped (and so released) on every
/// return path. Returns the number of frames written.
pub fn annotate_video<R, W>(
    mut reader: R,
    mut writer: W,
    annotator: &SharedAnnotator,
    max_frames: usize,
) -> Result<usize>
where
    R: VideoReader,
    W: VideoSink,
{
    let mut frames_written = 0;

    while frames_written < max_frames {
        let frame = match reader
            .next_frame()
            .with_context(|| format!("Failed to read frame {}", frames_written))?
        {
            Some(frame) => frame,
            None => break,
        };

        let rendered = {
            // A panic in an earlier annotate call leaves the model itself usable
            let mut annotator = annotator.lock().unwrap_or_else(PoisonError::into_inner);
            annotator
                .annotate(&frame)
                .with_context(|| format!("Failed to annotate frame {}", frames_written))?
        };

        writer
            .write_frame(&rendered)
            .with_context(|| format!("Failed to write frame {}", frames_written))?;
        frames_written += 1;
    }

    Ok(frames_written)
}

/// Whether the container advertises frames beyond those written. Only
/// meaningful once the cap is reached; the loop never decodes past it.
fn was_truncated(frames_written: usize, advertised_frames: usize) -> bool {
    advertised_frames > frames_written
}

/// Annotates a stored upload into `results/processed_{name}` under the static root.
pub fn process_video(
    upload: &StoredUpload,
    layout: &StorageLayout,
    annotator: &SharedAnnotator,
    max_frames: usize,
) -> Result<AnnotatedVideo> {
    let start = Instant::now();

    let reader = OpencvReader::open(&upload.path)?;
    let properties = reader.properties();

    let output_path = layout.output_path(&upload.name);
    let writer = OpencvWriter::create(&output_path, &properties)?;

    let frames_written = annotate_video(reader, writer, annotator, max_frames)?;
    let reached_frame_cap = frames_written >= max_frames;

    if reached_frame_cap && was_truncated(frames_written, properties.frame_count) {
        tracing::info!(
            "{}: truncated at the {} frame cap (container reports {} frames)",
            upload.name,
            max_frames,
            properties.frame_count
        );
    }
    tracing::info!(
        "{}: wrote {} frames to {} in {:.2}s",
        upload.name,
        frames_written,
        output_path.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(AnnotatedVideo {
        relative_path: result_reference(&upload.name),
        frames_written,
        reached_frame_cap,
    })
}
