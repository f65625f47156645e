use crate::pipeline::annotate::process_video;
use crate::pipeline::model::ModelSlot;
use crate::storage::{client_basename, persist_upload};
use crate::web::assets::render_results;
use crate::web::error::UploadError;
use crate::web::server::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
};
use tracing::{info, warn};

const FILE_FIELD: &str = "file";

/// POST /upload
///
/// Stores the `file` part, annotates it frame by frame and answers with the
/// results page. The request stays open until the whole video is processed.
/// The model is checked before the body is looked at, so a missing model
/// answers 500 whatever the request carries.
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, UploadError> {
    let annotator = match &state.model {
        ModelSlot::Ready(annotator) => annotator.clone(),
        ModelSlot::Unavailable(reason) => {
            warn!("Refusing upload, detection model unavailable: {}", reason);
            return Err(UploadError::ModelUnavailable);
        }
    };

    let multipart = multipart.map_err(|rejection| {
        warn!("Upload is not a multipart form: {}", rejection.body_text());
        UploadError::MissingFile
    })?;
    let (filename, data) = read_file_part(multipart).await?;

    let timestamp = chrono::Utc::now().timestamp();
    let upload = persist_upload(&state.layout, timestamp, &filename, &data).await?;
    info!("Stored upload {} ({} bytes)", upload.name, data.len());
    drop(data);

    let layout = state.layout.clone();
    let max_frames = state.max_frames;
    let annotated = tokio::task::spawn_blocking(move || {
        process_video(&upload, &layout, &annotator, max_frames)
    })
    .await
    .map_err(|e| UploadError::Processing(e.into()))?
    .map_err(UploadError::Processing)?;

    info!(
        frames = annotated.frames_written,
        capped = annotated.reached_frame_cap,
        "Published {}",
        annotated.relative_path
    );

    let page = render_results(&annotated.relative_path)
        .map_err(|_| UploadError::MissingPage("results.html"))?;
    Ok(Html(page))
}

/// Pulls the first `file` part that carries a filename out of the form.
async fn read_file_part(mut multipart: Multipart) -> Result<(String, Bytes), UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue; // ignore unrelated fields
        }
        let filename = match field.file_name() {
            Some(name) => client_basename(name).to_string(),
            None => continue,
        };
        if filename.is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        let data = field.bytes().await?;
        return Ok((filename, data));
    }

    Err(UploadError::MissingFile)
}
