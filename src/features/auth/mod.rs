//! Staff identity and access checks.
//!
//! Tokens are issued elsewhere; this feature only verifies them.

mod validator;

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;

pub use validator::JwtValidator;
