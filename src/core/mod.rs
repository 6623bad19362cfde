//! Core domain modules.
//!
//! Contains the generic XML model, the structured event decoder, field
//! resolution, message interpretation and body assembly.

pub mod any_xml;
pub mod body;
pub mod entry;
pub mod event_record;
pub mod message;
pub mod resolve;
pub mod xml_parser;
