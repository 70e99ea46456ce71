use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::features::auth::guards::RequireStaff;
use crate::features::vehicles::dtos::{
    DeleteVehiclePreviewDto, DeletedVehicleDto, VehicleDetailDto, VehicleDto, VehicleFormDto,
    VehicleFormSchemaDto,
};
use crate::features::vehicles::services::VehicleService;
use crate::shared::forms::FormErrors;
use crate::shared::forms::FormData;
use crate::shared::types::{ApiResponse, Meta};

/// CMS: list vehicles
#[utoipa::path(
    get,
    path = "/api/cms/vehicles",
    responses(
        (status = 200, description = "Vehicles in display order", body = ApiResponse<Vec<VehicleDto>>),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cms_list_vehicles(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<VehicleService>>,
) -> Result<Json<ApiResponse<Vec<VehicleDto>>>> {
    let vehicles = service.cms_list().await?;
    let meta = Meta {
        total: vehicles.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(vehicles), None, Some(meta))))
}

/// CMS: layout of the vehicle form
#[utoipa::path(
    get,
    path = "/api/cms/vehicles/form",
    responses(
        (status = 200, description = "Vehicle, option and image form layout", body = ApiResponse<VehicleFormSchemaDto>),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_vehicle_form(
    RequireStaff(_user): RequireStaff,
) -> Result<Json<ApiResponse<VehicleFormSchemaDto>>> {
    Ok(Json(ApiResponse::success(
        Some(VehicleFormSchemaDto::new()),
        None,
        None,
    )))
}

/// CMS: create a vehicle with its options and gallery
///
/// When the vehicle is valid but some option or image rows are not, the
/// vehicle is still created and the 400 response carries its `record_id`.
#[utoipa::path(
    post,
    path = "/api/cms/vehicles",
    request_body(
        content = VehicleFormDto,
        content_type = "multipart/form-data",
        description = "Vehicle fields plus indexed option and image rows",
    ),
    responses(
        (status = 201, description = "Vehicle created", body = ApiResponse<VehicleDetailDto>),
        (status = 400, description = "Form errors", body = ApiResponse<FormErrors>),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required"),
        (status = 413, description = "Request body too large")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_vehicle(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<VehicleService>>,
    form: FormData,
) -> Result<(StatusCode, Json<ApiResponse<VehicleDetailDto>>)> {
    tracing::debug!("Vehicle create submitted by {}", user.sub);
    let vehicle = service.create(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(vehicle),
            Some("Vehicle created.".to_string()),
            None,
        )),
    ))
}

/// CMS: vehicle with its rows, for editing
#[utoipa::path(
    get,
    path = "/api/cms/vehicles/{id}",
    params(
        ("id" = i64, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Vehicle with options and images", body = ApiResponse<VehicleDetailDto>),
        (status = 404, description = "Vehicle not found"),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_vehicle_for_edit(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<VehicleDetailDto>>> {
    let vehicle = service.get_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(vehicle), None, None)))
}

/// CMS: update a vehicle with its options and gallery
///
/// Nothing is written unless the vehicle and every row are valid.
#[utoipa::path(
    post,
    path = "/api/cms/vehicles/{id}",
    params(
        ("id" = i64, Path, description = "Vehicle ID")
    ),
    request_body(
        content = VehicleFormDto,
        content_type = "multipart/form-data",
        description = "Vehicle fields plus indexed option and image rows",
    ),
    responses(
        (status = 200, description = "Vehicle saved", body = ApiResponse<VehicleDetailDto>),
        (status = 400, description = "Form errors", body = ApiResponse<FormErrors>),
        (status = 404, description = "Vehicle not found"),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required"),
        (status = 413, description = "Request body too large")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_vehicle(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<Json<ApiResponse<VehicleDetailDto>>> {
    tracing::debug!("Vehicle {} update submitted by {}", id, user.sub);
    let vehicle = service.update(id, form).await?;
    Ok(Json(ApiResponse::success(
        Some(vehicle),
        Some("Vehicle saved.".to_string()),
        None,
    )))
}

/// CMS: what deleting a vehicle will remove
#[utoipa::path(
    get,
    path = "/api/cms/vehicles/{id}/delete",
    params(
        ("id" = i64, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Deletion preview", body = ApiResponse<DeleteVehiclePreviewDto>),
        (status = 404, description = "Vehicle not found"),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn confirm_delete_vehicle(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteVehiclePreviewDto>>> {
    let preview = service.delete_preview(id).await?;
    Ok(Json(ApiResponse::success(Some(preview), None, None)))
}

/// CMS: delete a vehicle with its options and gallery
#[utoipa::path(
    post,
    path = "/api/cms/vehicles/{id}/delete",
    params(
        ("id" = i64, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Vehicle deleted", body = ApiResponse<DeletedVehicleDto>),
        (status = 404, description = "Vehicle not found"),
        (status = 303, description = "Login required"),
        (status = 403, description = "Staff access required")
    ),
    tag = "cms",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_vehicle(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedVehicleDto>>> {
    let deleted = service.delete(id).await?;
    tracing::info!("Vehicle {} deleted by {}", id, user.sub);
    Ok(Json(ApiResponse::success(
        Some(deleted),
        Some("Vehicle deleted.".to_string()),
        None,
    )))
}
