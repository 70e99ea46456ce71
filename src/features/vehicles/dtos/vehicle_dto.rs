use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::vehicles::models::{Brand, Vehicle, VehicleImage, VehicleOption};
use crate::modules::storage::StorageBackend;

/// Response DTO for vehicle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleDto {
    pub id: i64,
    pub title: String,
    pub brand: Brand,
    pub brand_label: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub price: i64,
    pub horsepower: Option<i32>,
    pub engine: String,
    pub description: String,
    /// Storage key of the uploaded primary image
    pub main_image: Option<String>,
    pub image_url: String,
    /// Image to show: uploaded file URL, else external URL
    pub display_image: Option<String>,
    pub featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleDto {
    pub fn from_model(v: Vehicle, storage: &dyn StorageBackend) -> Self {
        Self {
            display_image: v.display_image(storage),
            id: v.id,
            title: v.title,
            brand: v.brand,
            brand_label: v.brand.label().to_string(),
            model: v.model,
            year: v.year,
            mileage: v.mileage,
            price: v.price,
            horsepower: v.horsepower,
            engine: v.engine,
            description: v.description,
            main_image: v.main_image,
            image_url: v.image_url,
            featured: v.featured,
            display_order: v.display_order,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleOptionDto {
    pub id: i64,
    pub label: String,
    pub sort_order: i32,
}

impl From<VehicleOption> for VehicleOptionDto {
    fn from(o: VehicleOption) -> Self {
        Self {
            id: o.id,
            label: o.label,
            sort_order: o.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleImageDto {
    pub id: i64,
    /// Storage key of the uploaded file
    pub image: Option<String>,
    pub image_url: String,
    pub display_image: Option<String>,
    pub caption: String,
    pub sort_order: i32,
}

impl VehicleImageDto {
    pub fn from_model(i: VehicleImage, storage: &dyn StorageBackend) -> Self {
        Self {
            display_image: i.display_image(storage),
            id: i.id,
            image: i.image,
            image_url: i.image_url,
            caption: i.caption,
            sort_order: i.sort_order,
        }
    }
}

/// Vehicle card for the home page and the public list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleWithOptionsDto {
    #[serde(flatten)]
    pub vehicle: VehicleDto,
    pub options: Vec<VehicleOptionDto>,
}

/// Vehicle with both child collections (public detail and CMS edit view)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleDetailDto {
    #[serde(flatten)]
    pub vehicle: VehicleDto,
    pub options: Vec<VehicleOptionDto>,
    pub images: Vec<VehicleImageDto>,
}

/// What a deletion will remove
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteVehiclePreviewDto {
    pub vehicle: VehicleDto,
    pub option_count: i64,
    pub image_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedVehicleDto {
    pub id: i64,
    pub title: String,
    pub options_removed: i64,
    pub images_removed: i64,
}
