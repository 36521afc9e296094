//! Per-fragment decoders.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json_bytes::Value;

use crate::error::DecodeError;
use crate::record::Record;

/// Decodes one fragment's worth of data out of a response record.
///
/// A decoder must be deterministic and free of side effects on the record:
/// the resolver shares one instance per target type across every
/// resolution, possibly from many threads at once.
pub trait FragmentDecoder: Send + Sync {
    /// The typed value this decoder produces.
    type Output;

    /// Decode the fragment from `record`.
    ///
    /// `Ok(None)` means the record carried no data for this fragment. The
    /// resolver accepts that outcome for conditional fragments and rejects
    /// it for mandatory ones.
    fn decode(&self, record: Record<'_>) -> Result<Option<Self::Output>, DecodeError>;
}

/// A decoder that deserializes the whole record into `T` through serde.
///
/// This is the decoder the resolver builder binds by default; it never
/// returns `Ok(None)`, so a missing field surfaces as a deserialization
/// error rather than an absent fragment.
pub struct SerdeDecoder<T> {
    _output: PhantomData<fn() -> T>,
}

impl<T> SerdeDecoder<T> {
    pub fn new() -> Self {
        Self {
            _output: PhantomData,
        }
    }
}

impl<T> Default for SerdeDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FragmentDecoder for SerdeDecoder<T>
where
    T: DeserializeOwned,
{
    type Output = T;

    fn decode(&self, record: Record<'_>) -> Result<Option<T>, DecodeError> {
        serde_json_bytes::from_value(Value::Object(record.object().clone()))
            .map(Some)
            .map_err(|err| DecodeError::Deserialization(err.to_string()))
    }
}

/// A decoder backed by a closure, for fragments that need custom logic.
pub struct FnDecoder<F, T> {
    decode: F,
    _output: PhantomData<fn() -> T>,
}

/// Adapt a closure into a [`FragmentDecoder`].
pub fn decoder_fn<F, T>(decode: F) -> FnDecoder<F, T>
where
    F: Fn(Record<'_>) -> Result<Option<T>, DecodeError> + Send + Sync,
{
    FnDecoder {
        decode,
        _output: PhantomData,
    }
}

impl<F, T> FragmentDecoder for FnDecoder<F, T>
where
    F: Fn(Record<'_>) -> Result<Option<T>, DecodeError> + Send + Sync,
{
    type Output = T;

    fn decode(&self, record: Record<'_>) -> Result<Option<T>, DecodeError> {
        (self.decode)(record)
    }
}
