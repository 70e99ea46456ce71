use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

pub const REQUIRED: &str = "This field is required.";

/// Errors of one row of a child collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RowErrors {
    /// Collection prefix, e.g. `options` or `images`
    pub collection: String,
    /// Row index as submitted
    pub index: usize,
    pub errors: Vec<String>,
}

/// Everything needed to re-present a rejected form.
///
/// Uploaded file contents are never echoed back; only text values are.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct FormErrors {
    /// Errors keyed by field name
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Errors of child collection rows, in row order
    pub row_errors: Vec<RowErrors>,
    /// Submitted text values
    pub values: BTreeMap<String, String>,
    /// Id of a record that was saved before the failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    pub fn add_row(&mut self, collection: &str, index: usize, errors: Vec<String>) {
        if errors.is_empty() {
            return;
        }
        self.row_errors.push(RowErrors {
            collection: collection.to_string(),
            index,
            errors,
        });
    }

    /// Merges `validator` errors, skipping fields that already have an error
    /// (a parse failure says more than a range check on a default value).
    pub fn extend_validation(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            if self.has_field(&field) {
                continue;
            }
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                self.add(&field, message);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.row_errors.is_empty()
    }

    pub fn with_values(mut self, values: BTreeMap<String, String>) -> Self {
        self.values = values;
        self
    }

    pub fn with_record_id(mut self, id: i64) -> Self {
        self.record_id = Some(id);
        self
    }

    /// Flat, human-readable list of every error
    pub fn messages(&self) -> Vec<String> {
        let fields = self.field_errors.iter().flat_map(|(field, errors)| {
            errors.iter().map(move |e| format!("{}: {}", field, e))
        });
        let rows = self.row_errors.iter().flat_map(|row| {
            row.errors
                .iter()
                .map(move |e| format!("{}[{}]: {}", row.collection, row.index, e))
        });
        fields.chain(rows).collect()
    }

    /// Parses a required number, recording an error on failure
    pub fn number<T: FromStr>(&mut self, field: &str, raw: &str) -> Option<T> {
        if raw.is_empty() {
            self.add(field, REQUIRED);
            return None;
        }
        self.optional_number(field, raw).flatten()
    }

    /// Parses an optional number. `Some(None)` means "left blank".
    pub fn optional_number<T: FromStr>(&mut self, field: &str, raw: &str) -> Option<Option<T>> {
        if raw.is_empty() {
            return Some(None);
        }
        match raw.parse::<T>() {
            Ok(value) => Some(Some(value)),
            Err(_) => {
                self.add(field, "Enter a whole number.");
                None
            }
        }
    }

    /// Parses a value of a closed set of choices
    pub fn choice<T: FromStr>(&mut self, field: &str, raw: &str) -> Option<T> {
        if raw.is_empty() {
            self.add(field, REQUIRED);
            return None;
        }
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.add(
                    field,
                    format!("Select a valid choice. {} is not one of the available choices.", raw),
                );
                None
            }
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1900, max = 2030, message = "Year out of range"))]
        year: i32,
        #[validate(email(message = "Enter a valid email address."))]
        email: String,
    }

    #[test]
    fn test_number_parsing() {
        let mut errors = FormErrors::new();
        assert_eq!(errors.number::<i32>("year", "2021"), Some(2021));
        assert_eq!(errors.number::<i32>("mileage", ""), None);
        assert_eq!(errors.number::<i32>("price", "12k"), None);
        assert_eq!(errors.optional_number::<i32>("horsepower", ""), Some(None));

        assert_eq!(errors.field_errors["mileage"], vec![REQUIRED.to_string()]);
        assert_eq!(
            errors.field_errors["price"],
            vec!["Enter a whole number.".to_string()]
        );
        assert!(!errors.has_field("horsepower"));
    }

    #[test]
    fn test_extend_validation_keeps_earlier_field_errors() {
        let sample = Sample {
            year: 0,
            email: "not-an-email".to_string(),
        };
        let validation = sample.validate().unwrap_err();

        let mut errors = FormErrors::new();
        errors.add("year", REQUIRED);
        errors.extend_validation(&validation);

        assert_eq!(errors.field_errors["year"], vec![REQUIRED.to_string()]);
        assert_eq!(
            errors.field_errors["email"],
            vec!["Enter a valid email address.".to_string()]
        );
    }

    #[test]
    fn test_messages_include_rows() {
        let mut errors = FormErrors::new();
        errors.add("title", REQUIRED);
        errors.add_row("images", 2, vec!["Provide an image file or an image URL.".into()]);
        errors.add_row("options", 0, vec![]);

        assert_eq!(errors.row_errors.len(), 1);
        assert_eq!(
            errors.messages(),
            vec![
                "title: This field is required.".to_string(),
                "images[2]: Provide an image file or an image URL.".to_string(),
            ]
        );
    }
}
