use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use mediagrab_logging::mediagrab_info;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::fetch::{map_reqwest_error, BackendClient};
use crate::{FailureKind, FetchError};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("unusable filename: {0:?}")]
    InvalidFilename(String),
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Writability check: create and drop a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Last path component of a server-provided name, so it cannot escape the target directory.
pub fn safe_filename(name: &str) -> Option<String> {
    let base = name.rsplit(&['/', '\\'][..]).next()?.trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base.to_string()),
    }
}

/// Streams an artifact into `{dir}/{filename}` through a temp file, then renames it.
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub async fn write_stream<S>(&self, filename: &str, chunks: S) -> Result<PathBuf, PersistError>
    where
        S: Stream<Item = Result<Bytes, FetchError>>,
    {
        let name = safe_filename(filename)
            .ok_or_else(|| PersistError::InvalidFilename(filename.to_string()))?;
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(name);
        let tmp = NamedTempFile::new_in(&self.dir)?;
        let mut file = tokio::fs::File::from_std(tmp.reopen()?);
        let mut chunks = std::pin::pin!(chunks);
        while let Some(chunk) = chunks.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        // Rename over any earlier copy; the target is never missing in between.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

impl BackendClient {
    /// Downloads a completed job's artifact into `dir`.
    ///
    /// The announced filename wins; otherwise the locator's last segment is used.
    pub async fn retrieve(
        &self,
        locator: &str,
        filename: Option<&str>,
        dir: &Path,
    ) -> Result<PathBuf, PersistError> {
        let url = self.artifact_url(locator)?;
        let name = filename
            .or_else(|| locator.rsplit('/').next())
            .unwrap_or_default()
            .to_string();

        let response = self
            .build_client()?
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )
            .into());
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error));
        let path = ArtifactWriter::new(dir.to_path_buf())
            .write_stream(&name, chunks)
            .await?;
        mediagrab_info!("Saved {} to {:?}", url, path);
        Ok(path)
    }
}
