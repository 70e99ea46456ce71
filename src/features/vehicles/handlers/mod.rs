mod cms_vehicle_handler;
mod vehicle_handler;

pub use cms_vehicle_handler::{
    __path_cms_list_vehicles, __path_confirm_delete_vehicle, __path_create_vehicle,
    __path_delete_vehicle, __path_get_vehicle_for_edit, __path_get_vehicle_form,
    __path_update_vehicle, cms_list_vehicles, confirm_delete_vehicle, create_vehicle,
    delete_vehicle, get_vehicle_for_edit, get_vehicle_form, update_vehicle,
};
pub use vehicle_handler::{
    __path_get_home, __path_get_vehicle, __path_list_vehicles, get_home, get_vehicle,
    list_vehicles,
};
