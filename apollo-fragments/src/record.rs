//! Replayable access to a single response object.

use serde_json_bytes::Value;

use crate::error::DecodeError;
use crate::json_ext::Object;
use crate::json_ext::ValueExt;

/// The field under which GraphQL servers report the concrete type of an
/// object, as selected by a `__typename` introspection field.
pub const TYPENAME: &str = "__typename";

/// A replayable view over one decoded response object.
///
/// Every fragment decoder invoked for a record receives the same view, so
/// each decoder rereads the full object from the start regardless of what
/// the decoders before it consumed. The view is `Copy` and never mutates
/// the underlying object.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    object: &'a Object,
}

impl<'a> Record<'a> {
    /// View a response object as a record.
    pub fn new(object: &'a Object) -> Self {
        Self { object }
    }

    /// View a JSON value as a record.
    ///
    /// Fails unless the value is an object: scalars, arrays and nulls have
    /// no fields to decode fragments out of.
    pub fn from_value(value: &'a Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(object) => Ok(Self::new(object)),
            other => Err(DecodeError::InvalidRecord(other.json_kind().to_string())),
        }
    }

    /// The concrete type the server reported for this object, if any.
    pub fn conditional_type(&self) -> Option<&'a str> {
        self.object.get(TYPENAME).and_then(Value::as_str)
    }

    /// Read a single field of the record.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.object.get(name)
    }

    /// The underlying response object.
    pub fn object(&self) -> &'a Object {
        self.object
    }
}
