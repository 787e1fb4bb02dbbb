//! Cover image storage on the local filesystem

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::{config::UploadsConfig, error::AppResult};

/// File received in a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &UploadsConfig) -> Self {
        Self::new(&config.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `file` under the upload directory and return its stored path
    pub async fn store(&self, file: &UploadedFile) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(file.file_name.as_deref().unwrap_or_default())
        );
        let path = self.dir.join(name);
        tokio::fs::write(&path, &file.bytes).await?;

        tracing::debug!("Stored upload at {} ({} bytes)", path.display(), file.bytes.len());
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Keep the final path component and replace anything outside `[A-Za-z0-9._-]`
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
