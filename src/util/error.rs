//! Unified error types for the normalizer.
//!
//! Decoding has exactly one failure kind, [`DecodeError`]: the input is not
//! well-formed XML or the token stream breaks the expected grammar. Every
//! other problem (bad timestamp, missing optional data, missing rendering
//! info) is handled by fallback and never surfaces as an error.

use crate::util::constants::DIAGNOSTIC_PREVIEW_CHARS;

/// Failure to turn a raw event document into an
/// [`EventRecord`](crate::core::event_record::EventRecord).
///
/// Never retried by the library. Callers are expected to log the error and
/// skip the event so the rest of a batch still goes through.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The XML reader rejected the markup (bad syntax, mismatched end tag,
    /// malformed attribute, bad escape).
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A tag or attribute name was not valid UTF-8.
    #[error("invalid UTF-8 in element or attribute name: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A token kind that has no place inside an event element.
    #[error("unexpected {kind} token")]
    UnexpectedToken {
        /// Human-readable token kind, e.g. `"DOCTYPE"`.
        kind: &'static str,
    },

    /// Input ended before the element was closed (or before any root
    /// element was found, in which case `tag` is empty).
    #[error("unexpected end of document inside <{tag}>")]
    UnexpectedEof {
        /// Local name of the innermost unclosed element.
        tag: String,
    },

    /// A numeric field held something that is not an unsigned integer.
    #[error("invalid number {value:?} in {field}")]
    InvalidNumber {
        /// Element or attribute the value came from, e.g. `"EventRecordID"`.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// Wraps any of the above with the document that triggered it.
    #[error("failed to decode event XML: {source} ({document})")]
    Document {
        /// The underlying failure.
        #[source]
        source: Box<DecodeError>,
        /// The original input, lossily decoded as UTF-8.
        document: String,
    },
}

impl DecodeError {
    /// Attach the original document bytes for diagnostics.
    pub fn with_document(self, xml: &[u8]) -> Self {
        DecodeError::Document {
            source: Box::new(self),
            document: String::from_utf8_lossy(xml).into_owned(),
        }
    }

    /// Returns the innermost error, skipping any [`DecodeError::Document`]
    /// wrapper.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::Document { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns a shortened copy of the attached document, if any, suitable
    /// for a single log line.
    pub fn document_preview(&self) -> Option<String> {
        match self {
            DecodeError::Document { document, .. } => {
                let mut preview: String =
                    document.chars().take(DIAGNOSTIC_PREVIEW_CHARS).collect();
                if document.chars().count() > DIAGNOSTIC_PREVIEW_CHARS {
                    preview.push_str("...");
                }
                Some(preview)
            }
            _ => None,
        }
    }
}

/// Application-level error used by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum EventNormError {
    /// An event document could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A normalized entry could not be serialised.
    #[error("JSON output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;
