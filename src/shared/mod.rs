pub mod constants;
pub mod forms;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
