use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::modules::storage::StorageBackend;
use crate::shared::forms::Choice;

/// Vehicle make, stored as its snake_case code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    Ferrari,
    Lamborghini,
    Porsche,
    #[sqlx(rename = "mclaren")]
    #[serde(rename = "mclaren")]
    McLaren,
    Bentley,
    AstonMartin,
    RollsRoyce,
    Other,
}

impl Brand {
    pub const ALL: [Brand; 8] = [
        Brand::Ferrari,
        Brand::Lamborghini,
        Brand::Porsche,
        Brand::McLaren,
        Brand::Bentley,
        Brand::AstonMartin,
        Brand::RollsRoyce,
        Brand::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Ferrari => "ferrari",
            Brand::Lamborghini => "lamborghini",
            Brand::Porsche => "porsche",
            Brand::McLaren => "mclaren",
            Brand::Bentley => "bentley",
            Brand::AstonMartin => "aston_martin",
            Brand::RollsRoyce => "rolls_royce",
            Brand::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Brand::Ferrari => "Ferrari",
            Brand::Lamborghini => "Lamborghini",
            Brand::Porsche => "Porsche",
            Brand::McLaren => "McLaren",
            Brand::Bentley => "Bentley",
            Brand::AstonMartin => "Aston Martin",
            Brand::RollsRoyce => "Rolls-Royce",
            Brand::Other => "Other",
        }
    }

    pub fn choices() -> Vec<Choice> {
        Self::ALL
            .iter()
            .map(|b| Choice {
                value: b.as_str(),
                label: b.label(),
            })
            .collect()
    }
}

impl FromStr for Brand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("Unknown brand: {}", s))
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for vehicle
#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub title: String,
    pub brand: Brand,
    pub model: String,
    pub year: i32,
    /// Kilometres
    pub mileage: i64,
    /// Whole currency units
    pub price: i64,
    pub horsepower: Option<i32>,
    pub engine: String,
    pub description: String,
    /// Storage key of the uploaded primary image
    pub main_image: Option<String>,
    /// External image, used when no file was uploaded
    pub image_url: String,
    pub featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Uploaded file first, then external URL
    pub fn display_image(&self, storage: &dyn StorageBackend) -> Option<String> {
        display_source(self.main_image.as_deref(), &self.image_url, storage)
    }
}

pub(crate) fn display_source(
    stored_key: Option<&str>,
    external_url: &str,
    storage: &dyn StorageBackend,
) -> Option<String> {
    match stored_key.filter(|k| !k.is_empty()) {
        Some(key) => Some(storage.url(key)),
        None if !external_url.is_empty() => Some(external_url.to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::LocalStorage;
    use std::path::PathBuf;

    #[test]
    fn test_brand_codes_round_trip() {
        for brand in Brand::ALL {
            assert_eq!(brand.as_str().parse::<Brand>(), Ok(brand));
        }
        assert_eq!(
            serde_json::to_value(Brand::McLaren).unwrap(),
            serde_json::json!("mclaren")
        );
        assert_eq!(
            serde_json::to_value(Brand::AstonMartin).unwrap(),
            serde_json::json!("aston_martin")
        );
        assert!("bugatti".parse::<Brand>().is_err());
    }

    #[test]
    fn test_display_source_precedence() {
        let storage = LocalStorage::new(PathBuf::from("/tmp/unused"), "/media");

        assert_eq!(
            display_source(Some("vehicles/a.jpg"), "https://cdn.example.com/a.jpg", &storage),
            Some("/media/vehicles/a.jpg".to_string())
        );
        assert_eq!(
            display_source(None, "https://cdn.example.com/a.jpg", &storage),
            Some("https://cdn.example.com/a.jpg".to_string())
        );
        assert_eq!(display_source(Some(""), "", &storage), None);
        assert_eq!(display_source(None, "", &storage), None);
    }
}
