use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

/// One fragment declared on a polymorphic selection.
///
/// A slot is either mandatory, in which case it must produce a value for
/// every record of the selection, or conditional, in which case it only
/// applies to records whose conditional type is in its possible type set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSlot {
    pub(crate) name: String,
    pub(crate) target_type: String,
    #[serde(default)]
    pub(crate) possible_types: HashSet<String>,
    #[serde(default)]
    pub(crate) mandatory: bool,
}

impl FragmentSlot {
    /// A fragment that applies to every record of the selection.
    pub fn mandatory(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            possible_types: HashSet::new(),
            mandatory: true,
        }
    }

    /// A fragment that only applies to records whose conditional type is
    /// one of `possible_types`.
    pub fn conditional(
        name: impl Into<String>,
        target_type: impl Into<String>,
        possible_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            possible_types: possible_types.into_iter().map(Into::into).collect(),
            mandatory: false,
        }
    }

    /// The name under which this fragment's value is exposed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type this fragment's decoder produces data for.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Whether this fragment must produce a value for every record.
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// The concrete types this fragment applies to, in no particular
    /// order. Empty for mandatory fragments, which apply unconditionally.
    pub fn possible_types(&self) -> impl Iterator<Item = &str> {
        self.possible_types.iter().map(String::as_str)
    }

    /// Whether a record reporting `conditional_type` carries data for this
    /// fragment. Comparison is exact: type names are case sensitive and an
    /// empty possible type set matches nothing.
    ///
    /// Mandatory fragments do not consult this; they apply regardless of
    /// the conditional type.
    pub fn is_possible_type(&self, conditional_type: &str) -> bool {
        self.possible_types.contains(conditional_type)
    }
}

impl fmt::Display for FragmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mandatory {
            write!(f, "{}: {}", self.name, self.target_type)
        } else {
            write!(
                f,
                "{}: {} on {}",
                self.name,
                self.target_type,
                self.possible_types.iter().sorted().join(" | "),
            )
        }
    }
}
