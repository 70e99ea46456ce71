mod child_rows;
mod vehicle_service;

pub use child_rows::RowError;
pub use vehicle_service::VehicleService;
