//! Shared helpers: constants, error types and timestamp handling.

pub mod constants;
pub mod error;
pub mod time;
