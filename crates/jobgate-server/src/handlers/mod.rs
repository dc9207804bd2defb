//! Route handlers, one module per resource.

pub mod applications;
pub mod individuals;
pub mod openings;
pub mod organizations;
pub mod webhooks;

use axum::extract::Multipart;

use crate::{error::ApiResult, upload::SpooledFile};

/// A multipart form split into text fields and spooled files.
#[derive(Default)]
pub(crate) struct Form {
  texts: Vec<(String, String)>,
  files: Vec<(String, SpooledFile)>,
}

impl Form {
  /// Read every field. Parts with a filename are spooled to disk; the rest
  /// are read as text.
  pub(crate) async fn read(mut multipart: Multipart) -> ApiResult<Self> {
    let mut form = Self::default();
    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else { continue };
      if field.file_name().is_some() {
        let file = SpooledFile::from_field(field).await?;
        if !file.is_empty() {
          form.files.push((name, file));
        }
      } else {
        form.texts.push((name, field.text().await?));
      }
    }
    Ok(form)
  }

  pub(crate) fn text(&self, name: &str) -> Option<&str> {
    self
      .texts
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.trim())
      .filter(|v| !v.is_empty())
  }

  pub(crate) fn text_or_empty(&self, name: &str) -> String {
    self.text(name).unwrap_or_default().to_owned()
  }

  pub(crate) fn file(&self, name: &str) -> Option<&SpooledFile> {
    self.files.iter().find(|(n, _)| n == name).map(|(_, f)| f)
  }
}
