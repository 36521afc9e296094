#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod fragment;
mod fragment_set;
mod hierarchy;

use displaydoc::Display;
pub use fragment::FragmentSlot;
pub use fragment_set::FragmentSet;
pub use fragment_set::FragmentSetBuilder;
pub use fragment_set::FragmentSpread;
pub use fragment_set::SlotId;
pub use hierarchy::TypeHierarchy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Fragment declaration errors.
///
/// These are raised while describing a fragment set or binding decoders to
/// it, never while resolving records against a built resolver.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SpecError {
    /// duplicate fragment slot '{0}'
    DuplicateSlot(String),
    /// no fragment slot named '{0}'
    UnknownSlot(String),
    /// fragment slot '{0}' is conditional, expected a mandatory slot
    ExpectedMandatory(String),
    /// fragment slot '{0}' is mandatory, expected a conditional slot
    ExpectedConditional(String),
    /// target type '{0}' already has a decoder
    DuplicateDecoder(String),
    /// target type '{0}' already has a decoder with a different output type
    DecoderConflict(String),
    /// no decoder bound for target types: {0}
    MissingDecoders(String),
}
