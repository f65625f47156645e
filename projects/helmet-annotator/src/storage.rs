// Inbound and output storage on the local filesystem
//
// Uploads are written once under `uploads_dir`; annotated videos are written
// under `static_root/results` so they can be served back statically.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Folder below the static root that holds annotated videos.
pub const RESULTS_SUBDIR: &str = "results";

const OUTPUT_PREFIX: &str = "processed_";

#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub uploads_dir: PathBuf,
    pub static_root: PathBuf,
}

/// An upload persisted to inbound storage.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub name: String,
    pub path: PathBuf,
}

impl StorageLayout {
    pub fn new(uploads_dir: impl Into<PathBuf>, static_root: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            static_root: static_root.into(),
        }
    }

    pub fn results_dir(&self) -> PathBuf {
        self.static_root.join(RESULTS_SUBDIR)
    }

    /// Creates the inbound and output directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.uploads_dir).with_context(|| {
            format!(
                "Failed to create uploads directory {}",
                self.uploads_dir.display()
            )
        })?;
        let results_dir = self.results_dir();
        fs::create_dir_all(&results_dir).with_context(|| {
            format!("Failed to create results directory {}", results_dir.display())
        })?;
        Ok(())
    }

    pub fn output_path(&self, stored_name: &str) -> PathBuf {
        self.results_dir().join(output_name(stored_name))
    }
}

/// `{timestamp}_{original}`. Two uploads of the same file within one second collide.
pub fn stored_name(timestamp: i64, original_filename: &str) -> String {
    format!("{}_{}", timestamp, original_filename)
}

pub fn output_name(stored_name: &str) -> String {
    format!("{}{}", OUTPUT_PREFIX, stored_name)
}

/// Path of the annotated video relative to the static root.
pub fn result_reference(stored_name: &str) -> String {
    format!("{}/{}", RESULTS_SUBDIR, output_name(stored_name))
}

/// Keeps only the last path component of a client supplied filename.
pub fn client_basename(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or("")
}

/// Writes the uploaded bytes to inbound storage under a timestamped name.
pub async fn persist_upload(
    layout: &StorageLayout,
    timestamp: i64,
    original_filename: &str,
    data: &[u8],
) -> std::io::Result<StoredUpload> {
    let name = stored_name(timestamp, original_filename);
    let path = layout.uploads_dir.join(&name);
    tokio::fs::write(&path, data).await?;
    Ok(StoredUpload { name, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_scheme() {
        let name = stored_name(1000, "clip.mp4");
        assert_eq!(name, "1000_clip.mp4");
        assert_eq!(output_name(&name), "processed_1000_clip.mp4");
        assert_eq!(result_reference(&name), "results/processed_1000_clip.mp4");

        // Same inputs, same names
        assert_eq!(stored_name(1000, "clip.mp4"), name);
    }

    #[test]
    fn test_client_basename() {
        assert_eq!(client_basename("clip.mp4"), "clip.mp4");
        assert_eq!(client_basename("../../etc/clip.mp4"), "clip.mp4");
        assert_eq!(client_basename("C:\\videos\\clip.mp4"), "clip.mp4");
        assert_eq!(client_basename("videos/"), "");
        // Whitespace is part of the name
        assert_eq!(client_basename(" clip.mp4 "), " clip.mp4 ");
        assert_eq!(client_basename("dir/ "), " ");
        assert_eq!(stored_name(1000, client_basename(" clip.mp4")), "1000_ clip.mp4");
        assert_eq!(client_basename(""), "");
    }

    #[test]
    fn test_layout_paths() {
        let layout = StorageLayout::new("uploads", "static");
        assert_eq!(layout.results_dir(), PathBuf::from("static/results"));
        assert_eq!(
            layout.output_path("1000_clip.mp4"),
            PathBuf::from("static/results/processed_1000_clip.mp4")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_missing_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path().join("uploads"), tmp.path().join("static"));

        layout.ensure_dirs().unwrap();
        assert!(layout.uploads_dir.is_dir());
        assert!(layout.results_dir().is_dir());

        // Idempotent
        layout.ensure_dirs().unwrap();
    }

    #[tokio::test]
    async fn test_persist_upload_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path().join("uploads"), tmp.path().join("static"));
        layout.ensure_dirs().unwrap();

        let stored = persist_upload(&layout, 1000, "clip.mp4", b"not really a video")
            .await
            .unwrap();

        assert_eq!(stored.name, "1000_clip.mp4");
        assert_eq!(stored.path, layout.uploads_dir.join("1000_clip.mp4"));
        assert!(stored.path.starts_with(&layout.uploads_dir));
        assert_eq!(fs::read(&stored.path).unwrap(), b"not really a video");
    }
}
