use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

/// The part of a schema's type system needed to expand type conditions:
/// which concrete object types can stand behind each interface or union.
///
/// The hierarchy is built once per schema and consulted when deriving a
/// fragment set; conditional matching at resolution time only uses the
/// per-slot possible type sets computed here.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    /// Direct subtype edges: interface to its implementers and extending
    /// interfaces, union to its members.
    narrower: HashMap<String, HashSet<String>>,
    /// Declared concrete object types.
    objects: HashSet<String>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a concrete object type and the interfaces it implements.
    pub fn object(mut self, name: &str, implements: &[&str]) -> Self {
        self.objects.insert(name.to_string());
        for interface in implements {
            self.narrower
                .entry((*interface).to_string())
                .or_default()
                .insert(name.to_string());
        }
        self
    }

    /// Declare an interface that extends other interfaces, so that
    /// implementers of `name` also satisfy conditions on `extends`.
    ///
    /// Interfaces that extend nothing don't need declaring; they exist as
    /// soon as an object implements them.
    pub fn interface(mut self, name: &str, extends: &[&str]) -> Self {
        for parent in extends {
            self.narrower
                .entry((*parent).to_string())
                .or_default()
                .insert(name.to_string());
        }
        self
    }

    /// Declare a union and its member object types.
    pub fn union(mut self, name: &str, members: &[&str]) -> Self {
        let entry = self.narrower.entry(name.to_string()).or_default();
        for member in members {
            entry.insert((*member).to_string());
        }
        self
    }

    /// Whether `name` is a declared concrete object type.
    pub fn is_object(&self, name: &str) -> bool {
        self.objects.contains(name)
    }

    /// The concrete object types a condition on `condition` can match.
    ///
    /// For an object type this is the type itself; for an interface or
    /// union it is every object reachable through subtype edges, however
    /// deep. A type the hierarchy doesn't know has no possible types.
    pub fn possible_types(&self, condition: &str) -> HashSet<String> {
        let mut possible = HashSet::new();
        let mut seen: HashSet<&str> = HashSet::from([condition]);
        let mut queue: VecDeque<&str> = VecDeque::from([condition]);
        while let Some(ty) = queue.pop_front() {
            if self.objects.contains(ty) {
                possible.insert(ty.to_string());
            }
            if let Some(narrower) = self.narrower.get(ty) {
                for subtype in narrower {
                    if seen.insert(subtype) {
                        queue.push_back(subtype);
                    }
                }
            }
        }
        possible
    }

    /// Whether a record of concrete type `concrete` satisfies a condition
    /// on `condition`.
    pub fn satisfies(&self, concrete: &str, condition: &str) -> bool {
        self.possible_types(condition).contains(concrete)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn star_wars() -> TypeHierarchy {
        TypeHierarchy::new()
            .object("Human", &["Character"])
            .object("Droid", &["Character"])
            .object("Starship", &[])
            .union("SearchResult", &["Human", "Droid", "Starship"])
    }

    #[test]
    fn an_object_type_is_its_own_only_possible_type() {
        let hierarchy = star_wars();
        assert_eq!(
            hierarchy.possible_types("Droid"),
            HashSet::from(["Droid".to_string()]),
        );
        assert!(hierarchy.is_object("Droid"));
        assert!(!hierarchy.is_object("Character"));
    }

    #[test]
    fn interfaces_expand_to_their_implementers() {
        let hierarchy = star_wars();
        assert_eq!(
            hierarchy.possible_types("Character"),
            HashSet::from(["Human".to_string(), "Droid".to_string()]),
        );
    }

    #[test]
    fn unions_expand_to_their_members() {
        let hierarchy = star_wars();
        assert_eq!(
            hierarchy.possible_types("SearchResult"),
            HashSet::from([
                "Human".to_string(),
                "Droid".to_string(),
                "Starship".to_string(),
            ]),
        );
    }

    #[test]
    fn extended_interfaces_reach_transitive_implementers() {
        let hierarchy = TypeHierarchy::new()
            .interface("Character", &["Node"])
            .object("Human", &["Character"])
            .object("Planet", &["Node"]);

        assert_eq!(
            hierarchy.possible_types("Node"),
            HashSet::from(["Human".to_string(), "Planet".to_string()]),
        );
        assert!(hierarchy.satisfies("Human", "Node"));
        assert!(!hierarchy.satisfies("Node", "Node"));
    }

    #[test]
    fn diamond_shaped_hierarchies_terminate() {
        // Human reaches Node both through Character and through Owner.
        let hierarchy = TypeHierarchy::new()
            .interface("Character", &["Node"])
            .interface("Owner", &["Node"])
            .object("Human", &["Character", "Owner"]);

        assert_eq!(
            hierarchy.possible_types("Node"),
            HashSet::from(["Human".to_string()]),
        );
    }

    #[test]
    fn unknown_types_have_no_possible_types() {
        let hierarchy = star_wars();
        assert!(hierarchy.possible_types("Wookiee").is_empty());
        assert!(!hierarchy.satisfies("Human", "Wookiee"));
    }

    #[rstest]
    #[case::object_itself("Human", "Human", true)]
    #[case::implementer("Human", "Character", true)]
    #[case::union_member("Starship", "SearchResult", true)]
    #[case::unrelated_object("Starship", "Character", false)]
    #[case::interface_is_not_concrete("Character", "Character", false)]
    #[case::case_sensitive("human", "Human", false)]
    fn conditions_match_exactly_the_possible_concrete_types(
        #[case] concrete: &str,
        #[case] condition: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(star_wars().satisfies(concrete, condition), expected);
    }
}
