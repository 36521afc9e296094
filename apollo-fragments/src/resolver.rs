//! Deciding which fragments apply to a record and decoding them.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json_bytes::Value;

use crate::aggregate::Aggregate;
use crate::aggregate::ConditionalSlot;
use crate::aggregate::MandatorySlot;
use crate::aggregate::Part;
use crate::decode::FragmentDecoder;
use crate::decode::SerdeDecoder;
use crate::error::DecodeError;
use crate::record::Record;
use crate::spec::FragmentSet;
use crate::spec::SlotId;
use crate::spec::SpecError;

/// Object-safe face of a [`FragmentDecoder`], its output erased into a
/// [`Part`].
trait ErasedDecoder: Send + Sync {
    fn decode_part(&self, record: Record<'_>) -> Result<Option<Part>, DecodeError>;
    fn output_type_id(&self) -> TypeId;
}

struct TypedDecoder<D>(D);

impl<D> ErasedDecoder for TypedDecoder<D>
where
    D: FragmentDecoder,
    D::Output: fmt::Debug + PartialEq + Send + Sync + 'static,
{
    fn decode_part(&self, record: Record<'_>) -> Result<Option<Part>, DecodeError> {
        Ok(self.0.decode(record)?.map(Part::new))
    }

    fn output_type_id(&self) -> TypeId {
        TypeId::of::<D::Output>()
    }
}

/// Resolves the fragments of one polymorphic selection against response
/// records.
///
/// A resolver is built once per selection and immutable afterwards.
/// Resolving borrows it shared, so any number of records can be resolved
/// concurrently against the same resolver.
pub struct FragmentResolver {
    set: Arc<FragmentSet>,
    /// One decoder per slot, in slot order. Slots with the same target
    /// type share a single decoder instance.
    decoders: Vec<Arc<dyn ErasedDecoder>>,
}

impl FragmentResolver {
    /// Start binding decoders for the slots of `set`.
    pub fn builder(set: Arc<FragmentSet>) -> FragmentResolverBuilder {
        FragmentResolverBuilder {
            set,
            by_target: IndexMap::new(),
        }
    }

    /// The fragment set this resolver was built for.
    pub fn fragment_set(&self) -> &FragmentSet {
        &self.set
    }

    /// Resolve one record, deciding per slot whether its fragment applies.
    ///
    /// Mandatory fragments are always decoded. Conditional fragments are
    /// decoded when `conditional_type` is in their possible type set and
    /// left absent otherwise, so their decoders are never even invoked for
    /// records of other types. Decoders run in slot declaration order and
    /// each rereads the record from the start; the first decoder error
    /// aborts the resolution. Once every applicable slot is decoded, a
    /// mandatory slot without a value fails the resolution with
    /// [`DecodeError::MissingMandatoryFragment`].
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn resolve(
        &self,
        record: Record<'_>,
        conditional_type: &str,
    ) -> Result<Aggregate, DecodeError> {
        let mut parts: Vec<Option<Part>> = Vec::with_capacity(self.set.len());
        for (slot, decoder) in self.set.slots().zip(&self.decoders) {
            if !slot.is_mandatory() && !slot.is_possible_type(conditional_type) {
                tracing::trace!(
                    slot = slot.name(),
                    conditional_type,
                    "fragment does not apply"
                );
                parts.push(None);
                continue;
            }
            tracing::trace!(slot = slot.name(), conditional_type, "decoding fragment");
            match decoder.decode_part(record) {
                Ok(part) => parts.push(part),
                Err(err) => {
                    tracing::debug!(slot = slot.name(), error = %err, "fragment decoder failed");
                    return Err(err);
                }
            }
        }
        for (slot, part) in self.set.slots().zip(&parts) {
            if slot.is_mandatory() && part.is_none() {
                tracing::debug!(slot = slot.name(), "mandatory fragment produced no value");
                return Err(DecodeError::MissingMandatoryFragment(slot.name().to_string()));
            }
        }
        Ok(Aggregate::new(Arc::clone(&self.set), parts))
    }

    /// Resolve one record using the conditional type it reports itself,
    /// through its `__typename` field.
    pub fn resolve_record(&self, record: Record<'_>) -> Result<Aggregate, DecodeError> {
        let conditional_type = record
            .conditional_type()
            .ok_or(DecodeError::MissingConditionalType)?;
        self.resolve(record, conditional_type)
    }

    /// Resolve a JSON value, which must be an object.
    pub fn resolve_value(
        &self,
        value: &Value,
        conditional_type: &str,
    ) -> Result<Aggregate, DecodeError> {
        self.resolve(Record::from_value(value)?, conditional_type)
    }
}

impl fmt::Debug for FragmentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentResolver")
            .field("set", &self.set)
            .finish_non_exhaustive()
    }
}

/// Binds one decoder per distinct target type of a fragment set and mints
/// the typed handles used to read slots back out of aggregates.
///
/// Slots that share a target type share a decoder: binding the first such
/// slot establishes it, and the serde-path methods reuse whichever decoder
/// the target type already has, provided the output types agree.
pub struct FragmentResolverBuilder {
    set: Arc<FragmentSet>,
    by_target: IndexMap<String, Arc<dyn ErasedDecoder>>,
}

impl FragmentResolverBuilder {
    /// Bind the serde decoder for a mandatory slot and mint its handle.
    pub fn mandatory<T>(&mut self, name: &str) -> Result<MandatorySlot<T>, SpecError>
    where
        T: DeserializeOwned + fmt::Debug + PartialEq + Send + Sync + 'static,
    {
        let id = self.bind(name, true, SerdeDecoder::<T>::new(), false)?;
        Ok(MandatorySlot {
            id,
            name: name.to_string(),
            _output: PhantomData,
        })
    }

    /// Bind a custom decoder for a mandatory slot and mint its handle.
    pub fn mandatory_with<D>(
        &mut self,
        name: &str,
        decoder: D,
    ) -> Result<MandatorySlot<D::Output>, SpecError>
    where
        D: FragmentDecoder + 'static,
        D::Output: fmt::Debug + PartialEq + Send + Sync + 'static,
    {
        let id = self.bind(name, true, decoder, true)?;
        Ok(MandatorySlot {
            id,
            name: name.to_string(),
            _output: PhantomData,
        })
    }

    /// Bind the serde decoder for a conditional slot and mint its handle.
    pub fn conditional<T>(&mut self, name: &str) -> Result<ConditionalSlot<T>, SpecError>
    where
        T: DeserializeOwned + fmt::Debug + PartialEq + Send + Sync + 'static,
    {
        let id = self.bind(name, false, SerdeDecoder::<T>::new(), false)?;
        Ok(ConditionalSlot {
            id,
            name: name.to_string(),
            _output: PhantomData,
        })
    }

    /// Bind a custom decoder for a conditional slot and mint its handle.
    pub fn conditional_with<D>(
        &mut self,
        name: &str,
        decoder: D,
    ) -> Result<ConditionalSlot<D::Output>, SpecError>
    where
        D: FragmentDecoder + 'static,
        D::Output: fmt::Debug + PartialEq + Send + Sync + 'static,
    {
        let id = self.bind(name, false, decoder, true)?;
        Ok(ConditionalSlot {
            id,
            name: name.to_string(),
            _output: PhantomData,
        })
    }

    /// Finish the resolver. Fails unless every slot's target type has a
    /// decoder bound.
    pub fn build(self) -> Result<FragmentResolver, SpecError> {
        let mut decoders = Vec::with_capacity(self.set.len());
        let mut missing = Vec::new();
        for slot in self.set.slots() {
            match self.by_target.get(slot.target_type()) {
                Some(decoder) => decoders.push(Arc::clone(decoder)),
                None => missing.push(slot.target_type()),
            }
        }
        if !missing.is_empty() {
            return Err(SpecError::MissingDecoders(
                missing.into_iter().unique().join(", "),
            ));
        }
        Ok(FragmentResolver {
            set: self.set,
            decoders,
        })
    }

    fn bind<D>(
        &mut self,
        name: &str,
        mandatory: bool,
        decoder: D,
        explicit: bool,
    ) -> Result<SlotId, SpecError>
    where
        D: FragmentDecoder + 'static,
        D::Output: fmt::Debug + PartialEq + Send + Sync + 'static,
    {
        let id = self
            .set
            .slot_id(name)
            .ok_or_else(|| SpecError::UnknownSlot(name.to_string()))?;
        let slot = self.set.slot(id);
        if slot.is_mandatory() != mandatory {
            return Err(if mandatory {
                SpecError::ExpectedMandatory(name.to_string())
            } else {
                SpecError::ExpectedConditional(name.to_string())
            });
        }
        match self.by_target.entry(slot.target_type().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(TypedDecoder(decoder)));
            }
            Entry::Occupied(entry) => {
                if entry.get().output_type_id() != TypeId::of::<D::Output>() {
                    return Err(SpecError::DecoderConflict(slot.target_type().to_string()));
                }
                if explicit {
                    return Err(SpecError::DuplicateDecoder(slot.target_type().to_string()));
                }
            }
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json_bytes::json;
    use test_log::test;

    use super::*;
    use crate::decode::decoder_fn;

    #[derive(Debug, Deserialize, PartialEq)]
    struct BaseInfo {
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct HumanDetails {
        #[serde(rename = "homePlanet")]
        home_planet: String,
    }

    fn hero_set() -> Arc<FragmentSet> {
        Arc::new(
            FragmentSet::builder()
                .mandatory("base", "BaseInfo")
                .conditional("human", "HumanDetails", ["Human"])
                .build()
                .expect("names are unique"),
        )
    }

    #[test]
    fn mandatory_and_matching_conditional_fragments_are_decoded() {
        let mut builder = FragmentResolver::builder(hero_set());
        let base = builder.mandatory::<BaseInfo>("base").expect("slot is declared");
        let human = builder
            .conditional::<HumanDetails>("human")
            .expect("slot is declared");
        let resolver = builder.build().expect("every target type has a decoder");

        let response = json!({
            "__typename": "Human",
            "name": "Luke Skywalker",
            "homePlanet": "Tatooine",
        });
        let aggregate = resolver.resolve_value(&response, "Human").expect("record resolves");
        assert_eq!(
            aggregate.mandatory(&base).expect("populated").name,
            "Luke Skywalker",
        );
        assert_eq!(
            aggregate.conditional(&human).expect("populated"),
            Some(&HumanDetails {
                home_planet: "Tatooine".to_string(),
            }),
        );
    }

    #[test]
    fn non_matching_conditional_fragments_stay_absent() {
        let mut builder = FragmentResolver::builder(hero_set());
        let base = builder.mandatory::<BaseInfo>("base").expect("slot is declared");
        let human = builder
            .conditional::<HumanDetails>("human")
            .expect("slot is declared");
        let resolver = builder.build().expect("every target type has a decoder");

        let response = json!({ "__typename": "Droid", "name": "R2-D2" });
        let aggregate = resolver.resolve_value(&response, "Droid").expect("record resolves");
        assert_eq!(aggregate.mandatory(&base).expect("populated").name, "R2-D2");
        assert_eq!(aggregate.conditional(&human).expect("absent is fine"), None);
    }

    #[test]
    fn unknown_slots_and_kind_mismatches_fail_binding() {
        let mut builder = FragmentResolver::builder(hero_set());
        assert_eq!(
            builder.mandatory::<BaseInfo>("starship").unwrap_err(),
            SpecError::UnknownSlot("starship".to_string()),
        );
        assert_eq!(
            builder.mandatory::<HumanDetails>("human").unwrap_err(),
            SpecError::ExpectedMandatory("human".to_string()),
        );
        assert_eq!(
            builder.conditional::<BaseInfo>("base").unwrap_err(),
            SpecError::ExpectedConditional("base".to_string()),
        );
    }

    #[test]
    fn every_target_type_needs_a_decoder_to_build() {
        let mut builder = FragmentResolver::builder(hero_set());
        builder.mandatory::<BaseInfo>("base").expect("slot is declared");
        let err = builder.build().expect_err("'human' has no decoder");
        assert_eq!(err, SpecError::MissingDecoders("HumanDetails".to_string()));
        assert_eq!(
            err.to_string(),
            "no decoder bound for target types: HumanDetails",
        );
    }

    #[test]
    fn slots_sharing_a_target_type_share_one_decoder() {
        let set = Arc::new(
            FragmentSet::builder()
                .conditional("human", "CharacterInfo", ["Human"])
                .conditional("droid", "CharacterInfo", ["Droid"])
                .build()
                .expect("names are unique"),
        );
        let mut builder = FragmentResolver::builder(set);
        builder.conditional::<BaseInfo>("human").expect("slot is declared");
        builder
            .conditional::<BaseInfo>("droid")
            .expect("the existing decoder is shared");
        builder.build().expect("every target type has a decoder");
    }

    #[test]
    fn decoders_with_conflicting_output_types_are_rejected() {
        let set = Arc::new(
            FragmentSet::builder()
                .conditional("human", "CharacterInfo", ["Human"])
                .conditional("droid", "CharacterInfo", ["Droid"])
                .build()
                .expect("names are unique"),
        );
        let mut builder = FragmentResolver::builder(set);
        builder.conditional::<BaseInfo>("human").expect("slot is declared");
        assert_eq!(
            builder.conditional::<HumanDetails>("droid").unwrap_err(),
            SpecError::DecoderConflict("CharacterInfo".to_string()),
        );
    }

    #[test]
    fn explicitly_binding_a_target_type_twice_is_rejected() {
        let set = Arc::new(
            FragmentSet::builder()
                .conditional("human", "CharacterInfo", ["Human"])
                .conditional("droid", "CharacterInfo", ["Droid"])
                .build()
                .expect("names are unique"),
        );
        let first = decoder_fn(|_: Record<'_>| -> Result<Option<u64>, DecodeError> { Ok(Some(1)) });
        let second =
            decoder_fn(|_: Record<'_>| -> Result<Option<u64>, DecodeError> { Ok(Some(2)) });

        let mut builder = FragmentResolver::builder(set);
        builder.conditional_with("human", first).expect("slot is declared");
        assert_eq!(
            builder.conditional_with("droid", second).unwrap_err(),
            SpecError::DuplicateDecoder("CharacterInfo".to_string()),
        );
    }

    #[test]
    fn records_without_a_typename_cannot_self_resolve() {
        let mut builder = FragmentResolver::builder(hero_set());
        builder.mandatory::<BaseInfo>("base").expect("slot is declared");
        builder
            .conditional::<HumanDetails>("human")
            .expect("slot is declared");
        let resolver = builder.build().expect("every target type has a decoder");

        let response = json!({ "name": "anonymous" });
        let record = Record::from_value(&response).expect("object is a valid record");
        assert_eq!(
            resolver.resolve_record(record).expect_err("no __typename"),
            DecodeError::MissingConditionalType,
        );

        let not_an_object = json!(["not", "a", "record"]);
        assert_eq!(
            resolver
                .resolve_value(&not_an_object, "Human")
                .expect_err("arrays are not records"),
            DecodeError::InvalidRecord("an array".to_string()),
        );
    }
}
