use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::FragmentSlot;
use super::SpecError;
use super::TypeHierarchy;

/// Index of a slot in its fragment set, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// The ordered fragment declarations of one polymorphic selection.
///
/// Slots are addressed by unique name and evaluated in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentSet {
    slots: Vec<FragmentSlot>,
    by_name: HashMap<String, SlotId>,
}

impl FragmentSet {
    pub fn builder() -> FragmentSetBuilder {
        FragmentSetBuilder::default()
    }

    /// Derive a fragment set from the spreads of a query selection.
    ///
    /// Spreads without a type condition become mandatory slots. Spreads
    /// with one become conditional slots whose possible types are the
    /// concrete types satisfying the condition in `hierarchy`.
    pub fn from_spreads(
        spreads: impl IntoIterator<Item = FragmentSpread>,
        hierarchy: &TypeHierarchy,
    ) -> Result<Self, SpecError> {
        let mut builder = Self::builder();
        for spread in spreads {
            builder = match spread.type_condition {
                None => builder.mandatory(spread.name, spread.target_type),
                Some(condition) => {
                    let possible_types = hierarchy.possible_types(&condition);
                    builder.conditional(spread.name, spread.target_type, possible_types)
                }
            };
        }
        builder.build()
    }

    /// Number of declared slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot with the given name.
    pub fn get(&self, name: &str) -> Option<&FragmentSlot> {
        self.slot_id(name).map(|id| &self.slots[id.index()])
    }

    pub(crate) fn slot_id(&self, name: &str) -> Option<SlotId> {
        self.by_name.get(name).copied()
    }

    /// The slot a [`SlotId`] minted by this set points at.
    pub(crate) fn slot(&self, id: SlotId) -> &FragmentSlot {
        &self.slots[id.index()]
    }

    /// All slots in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = &FragmentSlot> {
        self.slots.iter()
    }
}

/// Builds a [`FragmentSet`], validating slot names on [`build`].
///
/// [`build`]: FragmentSetBuilder::build
#[derive(Debug, Clone, Default)]
pub struct FragmentSetBuilder {
    slots: Vec<FragmentSlot>,
}

impl FragmentSetBuilder {
    /// Declare a mandatory fragment slot.
    pub fn mandatory(self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.slot(FragmentSlot::mandatory(name, target_type))
    }

    /// Declare a conditional fragment slot.
    pub fn conditional(
        self,
        name: impl Into<String>,
        target_type: impl Into<String>,
        possible_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.slot(FragmentSlot::conditional(name, target_type, possible_types))
    }

    /// Declare a pre-built slot.
    pub fn slot(mut self, slot: FragmentSlot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Finish the set. Fails if two slots share a name.
    pub fn build(self) -> Result<FragmentSet, SpecError> {
        let mut by_name = HashMap::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            if by_name.insert(slot.name.clone(), SlotId(index)).is_some() {
                return Err(SpecError::DuplicateSlot(slot.name.clone()));
            }
        }
        Ok(FragmentSet {
            slots: self.slots,
            by_name,
        })
    }
}

/// A named fragment spread as it appears in a query selection.
///
/// This is the raw declaration [`FragmentSet::from_spreads`] consumes; it
/// carries the condition as written in the query, before expansion against
/// a [`TypeHierarchy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSpread {
    /// The name under which the fragment's value is exposed.
    pub name: String,
    /// The type the fragment's decoder produces data for.
    pub target_type: String,
    /// The interface, union or object type the spread is conditioned on,
    /// if any.
    #[serde(default)]
    pub type_condition: Option<String>,
}

impl FragmentSpread {
    /// A spread with no type condition, decoded for every record.
    pub fn unconditional(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            type_condition: None,
        }
    }

    /// A spread conditioned on a type, as in `... on Droid`.
    pub fn on(
        name: impl Into<String>,
        target_type: impl Into<String>,
        type_condition: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            type_condition: Some(type_condition.into()),
        }
    }
}
