mod vehicle;
mod vehicle_image;
mod vehicle_option;

pub use vehicle::{Brand, Vehicle};
pub use vehicle_image::VehicleImage;
pub use vehicle_option::VehicleOption;
