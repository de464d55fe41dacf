/// Utility modules for common functionality
pub mod csv_import;
pub mod datetime;
pub mod messages;
pub mod permissions;
pub mod string_utils;
pub mod tally;
pub mod validation;
