use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::appointments::{
    dtos as appointments_dtos, handlers as appointments_handlers, models as appointments_models,
};
use crate::features::auth;
use crate::features::vehicles::{
    dtos as vehicles_dtos, handlers as vehicles_handlers, models as vehicles_models,
};
use crate::shared::forms::{FormErrors, RowErrors};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::get_me,
        // Vehicles (public)
        vehicles_handlers::get_home,
        vehicles_handlers::list_vehicles,
        vehicles_handlers::get_vehicle,
        // Vehicles (CMS)
        vehicles_handlers::cms_list_vehicles,
        vehicles_handlers::get_vehicle_form,
        vehicles_handlers::create_vehicle,
        vehicles_handlers::get_vehicle_for_edit,
        vehicles_handlers::update_vehicle,
        vehicles_handlers::confirm_delete_vehicle,
        vehicles_handlers::delete_vehicle,
        // Contact
        appointments_handlers::get_contact_form,
        appointments_handlers::submit_contact,
    ),
    components(
        schemas(
            // Shared
            Meta,
            FormErrors,
            RowErrors,
            ApiResponse<FormErrors>,
            // Auth
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Vehicles
            vehicles_models::Brand,
            vehicles_dtos::VehicleDto,
            vehicles_dtos::VehicleOptionDto,
            vehicles_dtos::VehicleImageDto,
            vehicles_dtos::VehicleWithOptionsDto,
            vehicles_dtos::VehicleDetailDto,
            vehicles_dtos::VehicleFormSchemaDto,
            vehicles_dtos::VehicleFormDto,
            vehicles_dtos::DeleteVehiclePreviewDto,
            vehicles_dtos::DeletedVehicleDto,
            ApiResponse<Vec<vehicles_dtos::VehicleWithOptionsDto>>,
            ApiResponse<Vec<vehicles_dtos::VehicleDto>>,
            ApiResponse<vehicles_dtos::VehicleDetailDto>,
            ApiResponse<vehicles_dtos::VehicleFormSchemaDto>,
            ApiResponse<vehicles_dtos::DeleteVehiclePreviewDto>,
            ApiResponse<vehicles_dtos::DeletedVehicleDto>,
            // Contact
            appointments_models::Reason,
            appointments_dtos::AppointmentDto,
            appointments_dtos::AttachmentDto,
            appointments_dtos::ContactFormSchemaDto,
            appointments_dtos::ContactFormDto,
            ApiResponse<appointments_dtos::AppointmentDto>,
            ApiResponse<appointments_dtos::ContactFormSchemaDto>,
        )
    ),
    tags(
        (name = "auth", description = "Identity of the bearer token"),
        (name = "vehicles", description = "Public vehicle showcase"),
        (name = "cms", description = "Vehicle management (staff only)"),
        (name = "contact", description = "Contact and appointment requests (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Showroom API",
        version = "0.1.0",
        description = "API documentation for the dealership showroom",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
