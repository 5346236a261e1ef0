pub mod clock;
pub mod error_messages;
pub mod input_validation;
pub mod jwt;
pub mod password_utils;
