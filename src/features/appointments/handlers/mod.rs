mod contact_handler;

pub use contact_handler::{
    __path_get_contact_form, __path_submit_contact, get_contact_form, submit_contact,
};
