//! Resolution of polymorphic GraphQL response fragments into typed values.
//!
//! A query may spread several named fragments on one field. At runtime the
//! server reports a single concrete type for each returned object, through
//! the `__typename` field, and only the fragments whose possible types
//! include that type actually carry data. This crate decides, per response
//! record, which fragment decoders to invoke, runs them against a
//! replayable view of the record, and assembles the results into an
//! [`Aggregate`] whose null guarantees hold by construction: mandatory
//! fragments always have a value, conditional fragments are absent exactly
//! when the record's type ruled them out, and a failed decoder fails the
//! whole record.
//!
//! ```
//! use std::sync::Arc;
//!
//! use apollo_fragments::FragmentResolver;
//! use apollo_fragments::FragmentSet;
//! use serde::Deserialize;
//! use serde_json_bytes::json;
//!
//! #[derive(Debug, PartialEq, Deserialize)]
//! struct BaseInfo {
//!     name: String,
//! }
//!
//! #[derive(Debug, PartialEq, Deserialize)]
//! struct HumanDetails {
//!     #[serde(rename = "homePlanet")]
//!     home_planet: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let set = Arc::new(
//!     FragmentSet::builder()
//!         .mandatory("base", "BaseInfo")
//!         .conditional("human", "HumanDetails", ["Human"])
//!         .build()?,
//! );
//!
//! let mut builder = FragmentResolver::builder(set);
//! let base = builder.mandatory::<BaseInfo>("base")?;
//! let human = builder.conditional::<HumanDetails>("human")?;
//! let resolver = builder.build()?;
//!
//! let response = json!({
//!     "__typename": "Human",
//!     "name": "Luke Skywalker",
//!     "homePlanet": "Tatooine"
//! });
//! let aggregate = resolver.resolve_value(&response, "Human")?;
//!
//! assert_eq!(aggregate.mandatory(&base)?.name, "Luke Skywalker");
//! assert_eq!(
//!     aggregate
//!         .conditional(&human)?
//!         .map(|details| details.home_planet.as_str()),
//!     Some("Tatooine"),
//! );
//! # Ok(())
//! # }
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

mod aggregate;
mod decode;
pub mod error;
pub mod json_ext;
mod record;
mod resolver;
pub mod spec;

pub use crate::aggregate::Aggregate;
pub use crate::aggregate::ConditionalSlot;
pub use crate::aggregate::MandatorySlot;
pub use crate::decode::FnDecoder;
pub use crate::decode::FragmentDecoder;
pub use crate::decode::SerdeDecoder;
pub use crate::decode::decoder_fn;
pub use crate::error::AggregateError;
pub use crate::error::DecodeError;
pub use crate::record::Record;
pub use crate::record::TYPENAME;
pub use crate::resolver::FragmentResolver;
pub use crate::resolver::FragmentResolverBuilder;
pub use crate::spec::FragmentSet;
pub use crate::spec::FragmentSetBuilder;
pub use crate::spec::FragmentSlot;
pub use crate::spec::FragmentSpread;
pub use crate::spec::SlotId;
pub use crate::spec::SpecError;
pub use crate::spec::TypeHierarchy;
