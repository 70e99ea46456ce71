use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::vehicles::dtos::{VehicleDetailDto, VehicleWithOptionsDto};
use crate::features::vehicles::services::VehicleService;
use crate::shared::types::{ApiResponse, Meta};

/// Home page: featured vehicles
#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Up to six featured vehicles", body = ApiResponse<Vec<VehicleWithOptionsDto>>),
    ),
    tag = "vehicles"
)]
pub async fn get_home(
    State(service): State<Arc<VehicleService>>,
) -> Result<Json<ApiResponse<Vec<VehicleWithOptionsDto>>>> {
    let vehicles = service.list_featured().await?;
    let meta = Meta {
        total: vehicles.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(vehicles), None, Some(meta))))
}

/// List all vehicles
#[utoipa::path(
    get,
    path = "/api/vehicles",
    responses(
        (status = 200, description = "All vehicles with their options", body = ApiResponse<Vec<VehicleWithOptionsDto>>),
    ),
    tag = "vehicles"
)]
pub async fn list_vehicles(
    State(service): State<Arc<VehicleService>>,
) -> Result<Json<ApiResponse<Vec<VehicleWithOptionsDto>>>> {
    let vehicles = service.list_all().await?;
    let meta = Meta {
        total: vehicles.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(vehicles), None, Some(meta))))
}

/// Get vehicle detail
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    params(
        ("id" = i64, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Vehicle with options and gallery", body = ApiResponse<VehicleDetailDto>),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "vehicles"
)]
pub async fn get_vehicle(
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<VehicleDetailDto>>> {
    let vehicle = service.get_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(vehicle), None, None)))
}
