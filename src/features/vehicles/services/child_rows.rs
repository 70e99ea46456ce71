//! Validation of the option and gallery sub-forms.
//!
//! Rows are checked in one pass and every failure is kept as a
//! `(row index, error)` pair, so a submission reports all bad rows at once.

use std::collections::{BTreeMap, HashMap, HashSet};

use thiserror::Error;
use validator::Validate;

use crate::features::vehicles::dtos::{
    ImageRowInput, OptionRowInput, MAX_IMAGE_ROWS, MAX_OPTION_ROWS,
};
use crate::features::vehicles::models::VehicleImage;
use crate::shared::forms::{FormErrors, RowData, UploadedFile, REQUIRED};
use crate::shared::validation::{file_extension, has_image_extension};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Provide an image file or an image URL.")]
    MissingImageSource,

    #[error("Upload a valid image. \"{0}\" files are not accepted.")]
    InvalidImage(String),

    #[error("Row {0} does not belong to this vehicle.")]
    UnknownRow(String),

    #[error("Submit at most {max} rows.")]
    TooManyRows { max: usize },

    #[error("{field}: {message}")]
    Field { field: String, message: String },
}

/// What to do with one submitted row
#[derive(Debug)]
pub enum RowAction<T> {
    Create(T),
    Update { id: i64, input: T },
    Delete(i64),
}

/// Outcome of validating one child collection
#[derive(Debug)]
pub struct ParsedRows<T> {
    pub actions: Vec<RowAction<T>>,
    pub errors: Vec<(usize, RowError)>,
    /// Collection-level failure, reported instead of row errors
    pub collection_error: Option<RowError>,
}

impl<T> ParsedRows<T> {
    fn too_many(max: usize) -> Self {
        Self {
            actions: Vec::new(),
            errors: Vec::new(),
            collection_error: Some(RowError::TooManyRows { max }),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.collection_error.is_none()
    }

    /// Copies the failures into `form_errors` under `collection`
    pub fn report(&self, collection: &str, form_errors: &mut FormErrors) {
        if let Some(error) = &self.collection_error {
            form_errors.add(collection, error.to_string());
        }

        let mut by_row: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (index, error) in &self.errors {
            by_row.entry(*index).or_default().push(error.to_string());
        }
        for (index, messages) in by_row {
            form_errors.add_row(collection, index, messages);
        }
    }
}

/// Gallery row ready to be written; the file is stored by the caller
#[derive(Debug)]
pub struct ImageRow {
    pub file: Option<UploadedFile>,
    pub input: ImageRowInput,
}

// Values an untouched extra row is sent with
const ROW_DEFAULTS: &[(&str, &str)] = &[("sort_order", "0")];

/// Resolves the row's `id` against the rows the vehicle already has
fn row_id(row: &RowData, is_known: impl Fn(i64) -> bool) -> Result<Option<i64>, RowError> {
    let raw = row.text("id");
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(id) if is_known(id) => Ok(Some(id)),
        _ => Err(RowError::UnknownRow(raw.to_string())),
    }
}

fn field_errors(errors: FormErrors) -> impl Iterator<Item = RowError> {
    errors.field_errors.into_iter().flat_map(|(field, messages)| {
        messages.into_iter().map(move |message| RowError::Field {
            field: field.clone(),
            message,
        })
    })
}

fn sort_order(row: &RowData, errors: &mut FormErrors) -> i32 {
    errors
        .optional_number("sort_order", row.text("sort_order"))
        .flatten()
        .unwrap_or(0)
}

/// Pre-step shared by both collections: unknown ids, deletions, blank extras.
///
/// Returns `None` when the row needs no further validation.
fn triage<T>(
    row: &RowData,
    is_known: impl Fn(i64) -> bool,
    parsed: &mut ParsedRows<T>,
) -> Option<Option<i64>> {
    let id = match row_id(row, is_known) {
        Ok(id) => id,
        Err(e) => {
            parsed.errors.push((row.index, e));
            return None;
        }
    };

    if row.checkbox("DELETE") {
        // Removal is unconditional; an unsaved row flagged for deletion is dropped
        if let Some(id) = id {
            parsed.actions.push(RowAction::Delete(id));
        }
        return None;
    }

    if id.is_none() && row.is_blank(ROW_DEFAULTS) {
        return None;
    }

    Some(id)
}

pub fn parse_option_rows(
    rows: Vec<RowData>,
    existing: &HashSet<i64>,
) -> ParsedRows<OptionRowInput> {
    if rows.len() > MAX_OPTION_ROWS {
        return ParsedRows::too_many(MAX_OPTION_ROWS);
    }

    let mut parsed = ParsedRows {
        actions: Vec::new(),
        errors: Vec::new(),
        collection_error: None,
    };

    for row in rows {
        let Some(id) = triage(&row, |id| existing.contains(&id), &mut parsed) else {
            continue;
        };

        let mut errors = FormErrors::new();
        let label = row.text("label").to_string();
        if label.is_empty() {
            errors.add("label", REQUIRED);
        }
        let input = OptionRowInput {
            label,
            sort_order: sort_order(&row, &mut errors),
        };
        if let Err(e) = input.validate() {
            errors.extend_validation(&e);
        }

        if errors.is_empty() {
            parsed.actions.push(match id {
                Some(id) => RowAction::Update { id, input },
                None => RowAction::Create(input),
            });
        } else {
            parsed
                .errors
                .extend(field_errors(errors).map(|e| (row.index, e)));
        }
    }

    parsed
}

pub fn parse_image_rows(
    rows: Vec<RowData>,
    existing: &HashMap<i64, VehicleImage>,
) -> ParsedRows<ImageRow> {
    if rows.len() > MAX_IMAGE_ROWS {
        return ParsedRows::too_many(MAX_IMAGE_ROWS);
    }

    let mut parsed = ParsedRows {
        actions: Vec::new(),
        errors: Vec::new(),
        collection_error: None,
    };

    for mut row in rows {
        let Some(id) = triage(&row, |id| existing.contains_key(&id), &mut parsed) else {
            continue;
        };

        let mut row_errors = Vec::new();
        let file = row.take_file("image");
        if let Some(file) = &file {
            if !has_image_extension(&file.file_name) {
                let ext = file_extension(&file.file_name).unwrap_or_else(|| "(unknown)".to_string());
                row_errors.push(RowError::InvalidImage(ext));
            }
        }

        let mut errors = FormErrors::new();
        let input = ImageRowInput {
            image_url: row.optional_text("image_url"),
            caption: row.text("caption").to_string(),
            sort_order: sort_order(&row, &mut errors),
        };
        if let Err(e) = input.validate() {
            errors.extend_validation(&e);
        }
        row_errors.extend(field_errors(errors));

        let has_new_source = file.is_some() || input.image_url.is_some();
        let has_saved_source = id
            .and_then(|id| existing.get(&id))
            .is_some_and(|image| image.has_display_source());
        if !has_new_source && !has_saved_source {
            row_errors.push(RowError::MissingImageSource);
        }

        if row_errors.is_empty() {
            let row = ImageRow { file, input };
            parsed.actions.push(match id {
                Some(id) => RowAction::Update { id, input: row },
                None => RowAction::Create(row),
            });
        } else {
            parsed
                .errors
                .extend(row_errors.into_iter().map(|e| (row.index, e)));
        }
    }

    parsed
}
