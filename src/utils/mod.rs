pub mod checksum;
pub mod error;
pub mod logger;
pub mod validation;
