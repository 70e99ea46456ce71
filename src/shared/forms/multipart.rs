use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::shared::validation::file_extension;

/// A file part of a multipart submission, fully buffered
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client. Never used as a storage name.
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn extension(&self) -> Option<String> {
        file_extension(&self.file_name)
    }
}

/// Text fields and files of a `multipart/form-data` submission.
///
/// Child collections use indexed names, e.g. `options-0-label` or
/// `images-2-image`, and are split out with [`FormData::take_rows`].
#[derive(Debug, Default)]
pub struct FormData {
    fields: BTreeMap<String, String>,
    files: Vec<(String, UploadedFile)>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                debug!("Ignoring unnamed multipart field");
                continue;
            }

            match field.file_name().map(|s| s.to_string()) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let data = field.bytes().await.map_err(multipart_error)?;

                    // Browsers send an empty part for a file input left untouched
                    if file_name.is_empty() && data.is_empty() {
                        debug!("Skipping empty file input: {}", name);
                        continue;
                    }

                    form.files
                        .push((name, UploadedFile::new(file_name, content_type, data)));
                }
                None => {
                    let text = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn with_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.push((name.to_string(), file));
        self
    }

    /// Trimmed value of a text field, empty when absent
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    pub fn optional_text(&self, name: &str) -> Option<String> {
        non_empty(self.text(name))
    }

    pub fn checkbox(&self, name: &str) -> bool {
        is_checked(self.text(name))
    }

    /// Removes and returns every file sent under `name`, in submission order
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = kept;
        taken.into_iter().map(|(_, file)| file).collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.take_files(name).into_iter().next()
    }

    /// Splits out the rows of a child collection, ordered by row index.
    ///
    /// Text values stay in the form so they can be echoed back on failure;
    /// files are moved into their rows.
    pub fn take_rows(&mut self, prefix: &str) -> Vec<RowData> {
        let mut rows: BTreeMap<usize, RowData> = BTreeMap::new();

        for (key, value) in &self.fields {
            if let Some((index, name)) = parse_row_key(prefix, key) {
                rows.entry(index)
                    .or_insert_with(|| RowData::new(index))
                    .fields
                    .insert(name.to_string(), value.clone());
            }
        }

        let files = std::mem::take(&mut self.files);
        for (key, file) in files {
            match parse_row_key(prefix, &key) {
                Some((index, name)) => {
                    rows.entry(index)
                        .or_insert_with(|| RowData::new(index))
                        .files
                        .insert(name.to_string(), file);
                }
                None => self.files.push((key, file)),
            }
        }

        rows.into_values().collect()
    }

    /// Submitted text values, for re-presenting a rejected form
    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields.clone()
    }
}

/// One row of a child collection (`<prefix>-<index>-<field>`)
#[derive(Debug, Default)]
pub struct RowData {
    pub index: usize,
    fields: BTreeMap<String, String>,
    files: BTreeMap<String, UploadedFile>,
}

impl RowData {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }

    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    pub fn optional_text(&self, name: &str) -> Option<String> {
        non_empty(self.text(name))
    }

    pub fn checkbox(&self, name: &str) -> bool {
        is_checked(self.text(name))
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    /// True when nothing was entered: every field is empty or still holds
    /// its default from `defaults` (`(field, value)` pairs)
    pub fn is_blank(&self, defaults: &[(&str, &str)]) -> bool {
        self.files.is_empty()
            && self.fields.iter().all(|(name, value)| {
                let value = value.trim();
                value.is_empty()
                    || defaults
                        .iter()
                        .any(|(field, default)| *field == name.as_str() && *default == value)
            })
    }
}

fn parse_row_key<'a>(prefix: &str, key: &'a str) -> Option<(usize, &'a str)> {
    let rest = key.strip_prefix(prefix)?.strip_prefix('-')?;
    let (index, name) = rest.split_once('-')?;
    if name.is_empty() {
        return None;
    }
    Some((index.parse().ok()?, name))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_key() {
        assert_eq!(parse_row_key("options", "options-0-label"), Some((0, "label")));
        assert_eq!(
            parse_row_key("images", "images-12-image_url"),
            Some((12, "image_url"))
        );
        assert_eq!(parse_row_key("options", "images-0-label"), None);
        assert_eq!(parse_row_key("options", "options-x-label"), None);
        assert_eq!(parse_row_key("options", "options-0-"), None);
        assert_eq!(parse_row_key("options", "optionsfoo"), None);
    }

    #[test]
    fn test_take_rows_groups_fields_and_files_by_index() {
        let mut form = FormData::default()
            .with_text("title", "Roma")
            .with_text("images-1-caption", "Rear")
            .with_text("images-0-caption", "Front")
            .with_file(
                "images-1-image",
                UploadedFile::new("rear.jpg", "image/jpeg", vec![1, 2, 3]),
            )
            .with_file(
                "main_image",
                UploadedFile::new("main.jpg", "image/jpeg", vec![9]),
            );

        let mut rows = form.take_rows("images");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].text("caption"), "Front");
        assert!(rows[0].take_file("image").is_none());
        assert_eq!(rows[1].text("caption"), "Rear");
        assert_eq!(rows[1].take_file("image").map(|f| f.size()), Some(3));

        // Non-row files and text values remain on the form
        assert!(form.take_file("main_image").is_some());
        assert_eq!(form.values().get("images-0-caption").map(String::as_str), Some("Front"));
    }

    #[test]
    fn test_take_files_preserves_order() {
        let mut form = FormData::default()
            .with_file("attachments", UploadedFile::new("a.pdf", "application/pdf", vec![1]))
            .with_file("other", UploadedFile::new("x.pdf", "application/pdf", vec![1]))
            .with_file("attachments", UploadedFile::new("b.pdf", "application/pdf", vec![2]));

        let names: Vec<String> = form
            .take_files("attachments")
            .into_iter()
            .map(|f| f.file_name)
            .collect();

        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert!(form.take_files("attachments").is_empty());
        assert!(form.take_file("other").is_some());
    }

    #[test]
    fn test_row_is_blank_ignores_defaulted_fields() {
        let row = RowData::new(0)
            .with_text("label", "  ")
            .with_text("sort_order", "0");
        assert!(row.is_blank(&[("sort_order", "0")]));
        assert!(!row.is_blank(&[]));

        let row = RowData::new(0).with_text("sort_order", "3");
        assert!(!row.is_blank(&[("sort_order", "0")]));

        let row = RowData::new(0).with_text("label", "Carbon brakes");
        assert!(!row.is_blank(&[("sort_order", "0")]));
    }

    #[test]
    fn test_checkbox_values() {
        let form = FormData::default()
            .with_text("featured", "on")
            .with_text("other", "off");
        assert!(form.checkbox("featured"));
        assert!(!form.checkbox("other"));
        assert!(!form.checkbox("missing"));
    }
}
