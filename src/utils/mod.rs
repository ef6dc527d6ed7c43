pub mod response_handler;
pub mod validation;
