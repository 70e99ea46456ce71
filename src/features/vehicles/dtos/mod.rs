mod vehicle_dto;
mod vehicle_form_dto;

pub use vehicle_dto::{
    DeleteVehiclePreviewDto, DeletedVehicleDto, VehicleDetailDto, VehicleDto, VehicleImageDto,
    VehicleOptionDto, VehicleWithOptionsDto,
};
pub use vehicle_form_dto::{
    ImageRowInput, OptionRowInput, VehicleFormDto, VehicleFormSchemaDto, VehicleInput,
    IMAGES_PREFIX, MAX_IMAGE_ROWS, MAX_OPTION_ROWS, OPTIONS_PREFIX,
};
