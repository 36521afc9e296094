//! Typed aggregates assembled from resolved records.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::AggregateError;
use crate::spec::FragmentSet;
use crate::spec::SlotId;

/// A decoded fragment value whose `Debug` and `PartialEq` behavior stays
/// reachable through the type erasure, so that aggregates remain printable
/// and comparable.
trait PartValue: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn eq_part(&self, other: &dyn PartValue) -> bool;
}

impl<T> PartValue for T
where
    T: fmt::Debug + PartialEq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn eq_part(&self, other: &dyn PartValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// One decoded fragment value, type erased.
pub(crate) struct Part(Box<dyn PartValue>);

impl Part {
    pub(crate) fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + PartialEq + Send + Sync + 'static,
    {
        Self(Box::new(value))
    }

    fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_debug(f)
    }
}

impl PartialEq for Part {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_part(other.0.as_ref())
    }
}

/// Typed handle to a mandatory slot, minted when its decoder is bound.
///
/// Reading through the handle with [`Aggregate::mandatory`] always yields
/// a value: a record for which the slot's decoder produced nothing was
/// already rejected during resolution.
pub struct MandatorySlot<T> {
    pub(crate) id: SlotId,
    pub(crate) name: String,
    pub(crate) _output: PhantomData<fn() -> T>,
}

impl<T> Clone for MandatorySlot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for MandatorySlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MandatorySlot")
            .field("name", &self.name)
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

/// Typed handle to a conditional slot, minted when its decoder is bound.
pub struct ConditionalSlot<T> {
    pub(crate) id: SlotId,
    pub(crate) name: String,
    pub(crate) _output: PhantomData<fn() -> T>,
}

impl<T> Clone for ConditionalSlot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ConditionalSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalSlot")
            .field("name", &self.name)
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

/// The typed values decoded from one response record, one per populated
/// fragment slot.
///
/// An aggregate only ever exists fully constructed: every mandatory slot
/// holds a value, and every conditional slot is populated exactly when the
/// record's conditional type was one of its possible types. Aggregates are
/// immutable.
#[derive(PartialEq)]
pub struct Aggregate {
    set: Arc<FragmentSet>,
    parts: Vec<Option<Part>>,
}

impl Aggregate {
    pub(crate) fn new(set: Arc<FragmentSet>, parts: Vec<Option<Part>>) -> Self {
        Self { set, parts }
    }

    /// The fragment set this aggregate was resolved for.
    pub fn fragment_set(&self) -> &FragmentSet {
        &self.set
    }

    /// Whether the named slot holds a value.
    pub fn is_populated(&self, name: &str) -> bool {
        self.set
            .slot_id(name)
            .is_some_and(|id| self.parts[id.index()].is_some())
    }

    /// Slot names with their population state, in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, bool)> {
        self.set
            .slots()
            .zip(&self.parts)
            .map(|(slot, part)| (slot.name(), part.is_some()))
    }

    /// The value of a mandatory slot.
    pub fn mandatory<T: 'static>(&self, slot: &MandatorySlot<T>) -> Result<&T, AggregateError> {
        let part = self
            .part(&slot.name, slot.id, true)?
            .ok_or_else(|| AggregateError::ForeignSlot(slot.name.clone()))?;
        downcast_part(part, &slot.name)
    }

    /// The value of a conditional slot, or `None` when the record's
    /// conditional type was not one of the slot's possible types.
    pub fn conditional<T: 'static>(
        &self,
        slot: &ConditionalSlot<T>,
    ) -> Result<Option<&T>, AggregateError> {
        match self.part(&slot.name, slot.id, false)? {
            None => Ok(None),
            Some(part) => downcast_part(part, &slot.name).map(Some),
        }
    }

    /// Look up a slot's part, rejecting handles that were not minted for
    /// this aggregate's fragment set.
    fn part(
        &self,
        name: &str,
        id: SlotId,
        mandatory: bool,
    ) -> Result<Option<&Part>, AggregateError> {
        let slot_id = self
            .set
            .slot_id(name)
            .ok_or_else(|| AggregateError::UnknownSlot(name.to_string()))?;
        if slot_id != id || self.set.slot(slot_id).is_mandatory() != mandatory {
            return Err(AggregateError::ForeignSlot(name.to_string()));
        }
        Ok(self.parts[slot_id.index()].as_ref())
    }
}

impl fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (slot, part) in self.set.slots().zip(&self.parts) {
            map.entry(&slot.name(), part);
        }
        map.finish()
    }
}

fn downcast_part<'a, T: 'static>(part: &'a Part, name: &str) -> Result<&'a T, AggregateError> {
    part.downcast_ref::<T>()
        .ok_or_else(|| AggregateError::TypeMismatch {
            slot: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: part.type_name(),
        })
}
