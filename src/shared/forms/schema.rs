//! Form layout as plain data.
//!
//! Handlers never render HTML; they publish these descriptions so whichever
//! front end renders the forms can pick widgets, placeholders and client-side
//! constraints. Server-side validation does not depend on them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Text,
    Email,
    Tel,
    Number,
    Url,
    Textarea,
    Select,
    Checkbox,
    File,
    Hidden,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    /// `accept` attribute of file inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u8>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            widget,
            required: false,
            min: None,
            max: None,
            max_length: None,
            placeholder: None,
            accept: None,
            rows: None,
            multiple: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn min(self, min: i64) -> Self {
        Self {
            min: Some(min),
            ..self
        }
    }

    pub const fn max(self, max: i64) -> Self {
        Self {
            max: Some(max),
            ..self
        }
    }

    pub const fn max_length(self, max_length: u32) -> Self {
        Self {
            max_length: Some(max_length),
            ..self
        }
    }

    pub const fn placeholder(self, placeholder: &'static str) -> Self {
        Self {
            placeholder: Some(placeholder),
            ..self
        }
    }

    pub const fn accept(self, accept: &'static str) -> Self {
        Self {
            accept: Some(accept),
            ..self
        }
    }

    pub const fn rows(self, rows: u8) -> Self {
        Self {
            rows: Some(rows),
            ..self
        }
    }

    pub const fn multiple(self) -> Self {
        Self {
            multiple: true,
            ..self
        }
    }
}

/// A value/label pair of a select widget
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Layout of a child collection sub-form
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CollectionSpec {
    /// Field name prefix, rows are sent as `<prefix>-<index>-<field>`
    pub prefix: &'static str,
    /// Blank rows offered in addition to existing ones
    pub extra: usize,
    pub max_rows: usize,
    pub can_delete: bool,
    pub fields: &'static [FieldSpec],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_spec_serializes_only_set_constraints() {
        const YEAR: FieldSpec = FieldSpec::new("year", "Year", Widget::Number)
            .required()
            .min(1900)
            .max(2030);

        let value = serde_json::to_value(YEAR).unwrap();
        assert_eq!(value["widget"], "number");
        assert_eq!(value["required"], true);
        assert_eq!(value["min"], 1900);
        assert_eq!(value["max"], 2030);
        assert!(value.get("placeholder").is_none());
        assert!(value.get("multiple").is_none());
    }
}
