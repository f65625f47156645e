use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Everything that can go wrong while handling an upload.
///
/// Bodies are plain text; no machine-readable codes.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Malformed upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Model failed to load. Check console for details.")]
    ModelUnavailable,

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Error processing video: {0:#}")]
    Processing(anyhow::Error),

    #[error("Page template missing: {0}")]
    MissingPage(&'static str),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingFile | UploadError::EmptyFilename | UploadError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            UploadError::ModelUnavailable
            | UploadError::Storage(_)
            | UploadError::Processing(_)
            | UploadError::MissingPage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = %message, "Upload failed");
        } else {
            tracing::warn!(error = %message, "Upload rejected");
        }
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_status_mapping() {
        assert_eq!(UploadError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::EmptyFilename.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            UploadError::Processing(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_processing_message_carries_error_chain() {
        let err = UploadError::Processing(
            anyhow!("Failed to open video file: uploads/1000_clip.mp4")
                .context("Failed to read frame 0"),
        );
        assert_eq!(
            err.to_string(),
            "Error processing video: Failed to read frame 0: Failed to open video file: uploads/1000_clip.mp4"
        );
    }
}
