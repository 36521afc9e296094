//! Errors raised while resolving response fragments.

use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Fragment decoding errors.
///
/// The first error raised while resolving a record aborts the whole
/// resolution; no partial aggregate is ever produced.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DecodeError {
    /// mandatory fragment '{0}' produced no value
    MissingMandatoryFragment(String),
    /// record has no '__typename' discriminator
    MissingConditionalType,
    /// invalid record: expected an object, found {0}
    InvalidRecord(String),
    /// fragment deserialization failed: {0}
    Deserialization(String),
    /// fragment decoder failed: {0}
    Decoder(String),
}

impl DecodeError {
    /// A failure reported by a custom fragment decoder.
    pub fn decoder(message: impl Into<String>) -> Self {
        Self::Decoder(message.into())
    }
}

/// Misuse of a typed slot handle against an aggregate.
///
/// These only occur when a handle is read against an aggregate resolved for
/// a different fragment set, or with the wrong output type; reads through
/// the handles returned by the resolver builder that produced the aggregate
/// cannot fail.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AggregateError {
    /// aggregate has no slot '{0}'
    UnknownSlot(String),
    /// slot '{0}' was bound against a different fragment set
    ForeignSlot(String),
    /// slot '{slot}' holds a value of type {actual}, not {expected}
    TypeMismatch {
        /// The slot that was read.
        slot: String,
        /// The type requested by the handle.
        expected: &'static str,
        /// The type the decoder actually produced.
        actual: &'static str,
    },
}
