//! Local asset publishing for logos and résumés.
//!
//! Multipart file fields are spooled to a [`NamedTempFile`] and then copied
//! into `upload_dir/<folder>/<sha256>.<ext>`. Content addressing makes a
//! re-upload of the same file a no-op. The temporary file is removed when
//! the [`SpooledFile`] drops, whether or not publishing succeeded.
//!
//! A published file belongs to the request that wrote it until the domain
//! call it accompanies succeeds; [`LocalAssetStore::settle`] removes it
//! otherwise.

use std::{
  io::Write as _,
  path::{Path, PathBuf},
};

use axum::extract::multipart::Field;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum UploadError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// A multipart file field written to a temporary file.
pub struct SpooledFile {
  file:      NamedTempFile,
  file_name: Option<String>,
}

impl SpooledFile {
  /// Drain `field` into a fresh temporary file.
  pub async fn from_field(mut field: Field<'_>) -> Result<Self, ApiError> {
    let file_name = field.file_name().map(str::to_owned);
    let mut file = NamedTempFile::new().map_err(UploadError::from)?;
    while let Some(chunk) = field.chunk().await? {
      file.write_all(&chunk).map_err(UploadError::from)?;
    }
    file.flush().map_err(UploadError::from)?;
    Ok(Self { file, file_name })
  }

  pub fn path(&self) -> &Path { self.file.path() }

  pub fn file_name(&self) -> Option<&str> { self.file_name.as_deref() }

  pub fn is_empty(&self) -> bool {
    self.file.as_file().metadata().map(|m| m.len() == 0).unwrap_or(true)
  }
}

/// A file copied into the asset directory.
#[derive(Debug)]
pub struct PublishedAsset {
  pub url: String,
  path:    PathBuf,
  /// False when an identical file was already published.
  created: bool,
}

/// Publishes files under a directory served at `<public_base_url>/uploads`.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
  root:     PathBuf,
  base_url: String,
}

impl LocalAssetStore {
  pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
    Self {
      root:     root.into(),
      base_url: format!("{}/uploads", public_base_url.trim_end_matches('/')),
    }
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Copy the file at `temp_path` into `folder`. The caller keeps ownership
  /// of `temp_path`.
  pub async fn publish(
    &self,
    folder: &str,
    temp_path: &Path,
    original_name: Option<&str>,
  ) -> Result<PublishedAsset, UploadError> {
    let bytes = tokio::fs::read(temp_path).await?;
    let digest = hex::encode(Sha256::digest(&bytes));
    let file_name = match original_name.and_then(extension) {
      Some(ext) => format!("{digest}.{ext}"),
      None => digest,
    };

    let dir = self.root.join(folder);
    tokio::fs::create_dir_all(&dir).await?;
    let target = dir.join(&file_name);
    let created = !tokio::fs::try_exists(&target).await?;
    if created {
      tokio::fs::write(&target, &bytes).await?;
      tracing::debug!(path = %target.display(), size = bytes.len(), "published asset");
    }

    Ok(PublishedAsset {
      url: format!("{}/{folder}/{file_name}", self.base_url),
      path: target,
      created,
    })
  }

  /// Convenience for handlers: publish a spooled field.
  pub async fn publish_spooled(&self, folder: &str, file: &SpooledFile) -> Result<PublishedAsset, UploadError> {
    self.publish(folder, file.path(), file.file_name()).await
  }

  /// Remove `asset` if this publish created it. Files that were already
  /// present may be referenced by earlier records and are left alone.
  pub async fn discard(&self, asset: PublishedAsset) {
    if !asset.created {
      return;
    }
    match tokio::fs::remove_file(&asset.path).await {
      Ok(()) => tracing::debug!(path = %asset.path.display(), "discarded unused asset"),
      Err(e) => tracing::warn!(path = %asset.path.display(), error = %e, "failed to discard unused asset"),
    }
  }

  /// Hand `result` back, discarding `asset` first when `result` failed.
  pub async fn settle<T, E>(&self, asset: Option<PublishedAsset>, result: Result<T, E>) -> Result<T, E> {
    if result.is_err()
      && let Some(asset) = asset
    {
      self.discard(asset).await;
    }
    result
  }
}

/// A short lowercase alphanumeric extension, or nothing.
fn extension(name: &str) -> Option<String> {
  let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
  (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}
