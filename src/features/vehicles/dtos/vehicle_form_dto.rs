use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::features::vehicles::models::Brand;
use crate::shared::forms::{Choice, CollectionSpec, FieldSpec, FormData, FormErrors, Widget, REQUIRED};

pub const OPTIONS_PREFIX: &str = "options";
pub const IMAGES_PREFIX: &str = "images";
pub const MAX_OPTION_ROWS: usize = 1000;
pub const MAX_IMAGE_ROWS: usize = 50;

const MAX_SMALL_INT: i64 = 32767;

pub const VEHICLE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", Widget::Text)
        .required()
        .max_length(200)
        .placeholder("e.g. Ferrari Roma"),
    FieldSpec::new("brand", "Brand", Widget::Select).required(),
    FieldSpec::new("model", "Model", Widget::Text)
        .required()
        .max_length(120)
        .placeholder("e.g. Roma"),
    FieldSpec::new("year", "Year", Widget::Number)
        .required()
        .min(1900)
        .max(2030),
    FieldSpec::new("mileage", "Mileage (km)", Widget::Number)
        .required()
        .min(0),
    FieldSpec::new("price", "Price", Widget::Number).required().min(0),
    FieldSpec::new("horsepower", "Power (hp)", Widget::Number).min(0),
    FieldSpec::new("engine", "Engine", Widget::Text)
        .max_length(80)
        .placeholder("e.g. 3.9 L twin-turbo V8"),
    FieldSpec::new("description", "Description", Widget::Textarea).rows(4),
    FieldSpec::new("main_image", "Main image", Widget::File).accept("image/*"),
    FieldSpec::new("image_url", "Image URL (external)", Widget::Url)
        .max_length(500)
        .placeholder("https://..."),
    FieldSpec::new("featured", "Featured", Widget::Checkbox),
    FieldSpec::new("display_order", "Display order", Widget::Number)
        .min(0)
        .max(MAX_SMALL_INT),
];

pub const OPTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("label", "Option", Widget::Text)
        .required()
        .max_length(200)
        .placeholder("Option name"),
    FieldSpec::new("sort_order", "Order", Widget::Number)
        .min(0)
        .max(MAX_SMALL_INT),
];

pub const IMAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("image", "Image file", Widget::File).accept("image/*"),
    FieldSpec::new("image_url", "Image URL (external)", Widget::Url)
        .max_length(500)
        .placeholder("https://..."),
    FieldSpec::new("caption", "Caption", Widget::Text)
        .max_length(120)
        .placeholder("Caption (optional)"),
    FieldSpec::new("sort_order", "Order", Widget::Number)
        .min(0)
        .max(MAX_SMALL_INT),
];

/// Every row also accepts a hidden `id` and a `DELETE` checkbox
pub const OPTION_COLLECTION: CollectionSpec = CollectionSpec {
    prefix: OPTIONS_PREFIX,
    extra: 1,
    max_rows: MAX_OPTION_ROWS,
    can_delete: true,
    fields: OPTION_FIELDS,
};

pub const IMAGE_COLLECTION: CollectionSpec = CollectionSpec {
    prefix: IMAGES_PREFIX,
    extra: 1,
    max_rows: MAX_IMAGE_ROWS,
    can_delete: true,
    fields: IMAGE_FIELDS,
};

/// Layout of the CMS vehicle form
#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleFormSchemaDto {
    #[schema(value_type = Vec<Object>)]
    pub fields: &'static [FieldSpec],
    #[schema(value_type = Vec<Object>)]
    pub brands: Vec<Choice>,
    #[schema(value_type = Object)]
    pub options: CollectionSpec,
    #[schema(value_type = Object)]
    pub images: CollectionSpec,
}

impl VehicleFormSchemaDto {
    pub fn new() -> Self {
        Self {
            fields: VEHICLE_FIELDS,
            brands: Brand::choices(),
            options: OPTION_COLLECTION,
            images: IMAGE_COLLECTION,
        }
    }
}

/// Multipart body of vehicle create/update, for OpenAPI documentation only.
///
/// Child rows are sent as `options-<i>-{id,label,sort_order,DELETE}` and
/// `images-<i>-{id,image,image_url,caption,sort_order,DELETE}`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct VehicleFormDto {
    #[schema(example = "Ferrari Roma")]
    pub title: String,
    pub brand: Brand,
    #[schema(example = "Roma")]
    pub model: String,
    #[schema(example = 2021)]
    pub year: i32,
    pub mileage: i64,
    pub price: i64,
    pub horsepower: Option<i32>,
    pub engine: Option<String>,
    pub description: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub main_image: Option<String>,
    pub image_url: Option<String>,
    /// Checkbox: `on`, `true`, `1` or `yes`
    pub featured: Option<String>,
    pub display_order: Option<i32>,
}

/// Validated vehicle fields
#[derive(Debug, Clone, Validate)]
pub struct VehicleInput {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub title: String,
    pub brand: Brand,
    #[validate(length(max = 120, message = "Ensure this value has at most 120 characters."))]
    pub model: String,
    #[validate(range(min = 1900, max = 2030, message = "Enter a year between 1900 and 2030."))]
    pub year: i32,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub mileage: i64,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub price: i64,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub horsepower: Option<i32>,
    #[validate(length(max = 80, message = "Ensure this value has at most 80 characters."))]
    pub engine: String,
    pub description: String,
    #[validate(
        url(message = "Enter a valid URL."),
        length(max = 500, message = "Ensure this value has at most 500 characters.")
    )]
    pub image_url: Option<String>,
    pub featured: bool,
    #[validate(range(min = 0, max = 32767, message = "Ensure this value is between 0 and 32767."))]
    pub display_order: i32,
}

impl VehicleInput {
    /// Reads the vehicle fields, recording every problem in `errors`.
    ///
    /// Always returns an input; it is only meaningful when no error was
    /// recorded for the vehicle fields.
    pub fn from_form(form: &FormData, errors: &mut FormErrors) -> Self {
        let input = Self {
            title: required_text(form, "title", errors),
            brand: errors
                .choice::<Brand>("brand", form.text("brand"))
                .unwrap_or(Brand::Other),
            model: required_text(form, "model", errors),
            year: errors.number("year", form.text("year")).unwrap_or_default(),
            mileage: errors
                .number("mileage", form.text("mileage"))
                .unwrap_or_default(),
            price: errors.number("price", form.text("price")).unwrap_or_default(),
            horsepower: errors
                .optional_number("horsepower", form.text("horsepower"))
                .flatten(),
            engine: form.text("engine").to_string(),
            description: form.text("description").to_string(),
            image_url: form.optional_text("image_url"),
            featured: form.checkbox("featured"),
            display_order: errors
                .optional_number("display_order", form.text("display_order"))
                .flatten()
                .unwrap_or(0),
        };

        if let Err(e) = input.validate() {
            errors.extend_validation(&e);
        }
        input
    }
}

fn required_text(form: &FormData, field: &str, errors: &mut FormErrors) -> String {
    let value = form.text(field);
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

/// Validated fields of an option row
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct OptionRowInput {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub label: String,
    #[validate(range(min = 0, max = 32767, message = "Ensure this value is between 0 and 32767."))]
    pub sort_order: i32,
}

/// Validated text fields of a gallery row; the file travels separately
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ImageRowInput {
    #[validate(
        url(message = "Enter a valid URL."),
        length(max = 500, message = "Ensure this value has at most 500 characters.")
    )]
    pub image_url: Option<String>,
    #[validate(length(max = 120, message = "Ensure this value has at most 120 characters."))]
    pub caption: String,
    #[validate(range(min = 0, max = 32767, message = "Ensure this value is between 0 and 32767."))]
    pub sort_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> FormData {
        FormData::default()
            .with_text("title", "Ferrari Roma")
            .with_text("brand", "ferrari")
            .with_text("model", "Roma")
            .with_text("year", "2021")
            .with_text("mileage", "12000")
            .with_text("price", "189000")
    }

    #[test]
    fn test_valid_vehicle_input() {
        let mut errors = FormErrors::new();
        let input = VehicleInput::from_form(&valid_form().with_text("featured", "on"), &mut errors);

        assert!(errors.is_empty(), "{}", errors);
        assert_eq!(input.brand, Brand::Ferrari);
        assert_eq!(input.year, 2021);
        assert_eq!(input.horsepower, None);
        assert_eq!(input.display_order, 0);
        assert!(input.featured);
    }

    #[test]
    fn test_vehicle_input_errors() {
        let form = valid_form()
            .with_text("title", "  ")
            .with_text("brand", "bugatti")
            .with_text("year", "1850")
            .with_text("price", "lots")
            .with_text("image_url", "not a url")
            .with_text("display_order", "40000");
        let mut errors = FormErrors::new();
        VehicleInput::from_form(&form, &mut errors);

        assert_eq!(errors.field_errors["title"], vec![REQUIRED.to_string()]);
        assert!(errors.has_field("brand"));
        assert_eq!(
            errors.field_errors["year"],
            vec!["Enter a year between 1900 and 2030.".to_string()]
        );
        assert_eq!(
            errors.field_errors["price"],
            vec!["Enter a whole number.".to_string()]
        );
        assert!(errors.has_field("image_url"));
        assert!(errors.has_field("display_order"));
        assert!(!errors.has_field("model"));
        assert!(!errors.has_field("mileage"));
    }

    #[test]
    fn test_negative_numbers_rejected() {
        let form = valid_form()
            .with_text("mileage", "-1")
            .with_text("horsepower", "-620");
        let mut errors = FormErrors::new();
        VehicleInput::from_form(&form, &mut errors);

        assert!(errors.has_field("mileage"));
        assert!(errors.has_field("horsepower"));
    }

    #[test]
    fn test_form_schema_lists_every_brand() {
        let schema = serde_json::to_value(VehicleFormSchemaDto::new()).unwrap();
        assert_eq!(schema["brands"].as_array().unwrap().len(), 8);
        assert_eq!(schema["options"]["max_rows"], 1000);
        assert_eq!(schema["images"]["max_rows"], 50);
        assert_eq!(schema["fields"][0]["name"], "title");
    }
}
