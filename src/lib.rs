//! winevent-normalize library crate.
//!
//! Decodes rendered Windows Event Log XML and normalizes it into
//! schema-flexible log bodies. The binary entry point is in `main.rs`.

pub mod core;
pub mod util;

pub use crate::core::entry::{normalize, LogEntry};
pub use crate::core::message::InterpreterRegistry;
pub use crate::core::xml_parser::decode;
pub use crate::util::error::DecodeError;
