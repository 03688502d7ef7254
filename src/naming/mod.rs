//! Naming pipeline: word splitting, word styling, and per-namespace `Namer`s that
//! assign collision-free, style-correct, keyword-avoiding identifiers.

pub mod words;

use std::collections::HashSet;

use crate::error::{RenderError, Result};

pub use words::{legalize_characters, split_into_words};

/// One of the five word-casing policies a target may assign to a word position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStyle {
    /// Leave the word exactly as split; used only at the first word position of an
    /// identifier (e.g. camelCase's lowercase-first-word).
    FirstWord,
    /// Leave the word exactly as split; used at any position (e.g. snake_case).
    Word,
    /// Capitalize the first character, lowercase the rest.
    FirstUpperWord,
    /// Uppercase every character.
    AllUpperWord,
    /// Lowercase every character.
    AllLowerWord,
}

impl WordStyle {
    fn apply(self, word: &str) -> String {
        match self {
            WordStyle::FirstWord | WordStyle::Word => word.to_string(),
            WordStyle::FirstUpperWord => {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect()
                    }
                }
            }
            WordStyle::AllUpperWord => word.to_uppercase(),
            WordStyle::AllLowerWord => word.to_lowercase(),
        }
    }
}

/// How a `Namer` recases the words of a proposed raw name.
#[derive(Debug, Clone)]
pub struct Style {
    pub first_word: WordStyle,
    pub rest_word: WordStyle,
    pub separator: &'static str,
    /// Words whose upper-cased form appears here are rendered fully upper-case
    /// regardless of position, the acronym-aware override from section 4.1.
    pub acronyms: HashSet<String>,
}

impl Style {
    /// PascalCase: every word capitalized, no separator. Used for type names.
    pub fn pascal_case(acronyms: HashSet<String>) -> Self {
        Self {
            first_word: WordStyle::FirstUpperWord,
            rest_word: WordStyle::FirstUpperWord,
            separator: "",
            acronyms,
        }
    }

    /// camelCase: first word lowercase, following words capitalized.
    pub fn camel_case(acronyms: HashSet<String>) -> Self {
        Self {
            first_word: WordStyle::AllLowerWord,
            rest_word: WordStyle::FirstUpperWord,
            separator: "",
            acronyms,
        }
    }

    /// snake_case: every word lowercase, joined with `_`.
    pub fn snake_case(acronyms: HashSet<String>) -> Self {
        Self {
            first_word: WordStyle::AllLowerWord,
            rest_word: WordStyle::AllLowerWord,
            separator: "_",
            acronyms,
        }
    }

    fn style_words(&self, words: &[String]) -> String {
        let mut out = String::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                out.push_str(self.separator);
            }
            let upper = word.to_uppercase();
            if self.acronyms.contains(&upper) {
                out.push_str(&upper);
                continue;
            }
            let style = if i == 0 { self.first_word } else { self.rest_word };
            out.push_str(&style.apply(word));
        }
        out
    }
}

/// Opaque handle into a [`Namer`]'s assignment table. Created while the namer is
/// `Open`, resolved to a string only once the namer is `Sealed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamerState {
    Open,
    Sealed,
}

/// A per-namespace allocator of collision-free identifiers.
///
/// Namespaces are independent: the *types* namespace, each class's *properties*
/// namespace, and each enum's *cases* namespace are each their own `Namer`.
pub struct Namer {
    namespace: String,
    state: NamerState,
    style: Style,
    is_start: fn(char) -> bool,
    is_part: fn(char) -> bool,
    fallback: &'static str,
    forbidden: HashSet<String>,
    proposals: Vec<String>,
    assigned: Vec<Option<String>>,
}

impl Namer {
    pub fn new(
        namespace: impl Into<String>,
        style: Style,
        is_start: fn(char) -> bool,
        is_part: fn(char) -> bool,
        forbidden: HashSet<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            state: NamerState::Open,
            style,
            is_start,
            is_part,
            fallback: "empty",
            forbidden,
            proposals: Vec::new(),
            assigned: Vec::new(),
        }
    }

    /// Create a `Name` for a raw proposed label. Only valid while `Open`.
    ///
    /// # Panics
    /// Panics if called after [`Self::seal`] — this is the namer's own "must not
    /// accept allocations once sealed" invariant, enforced at the API boundary
    /// rather than surfaced as a `RenderError` since it can only be a caller bug.
    pub fn create_name(&mut self, raw_proposal: &str) -> NameId {
        assert!(self.state == NamerState::Open, "namer '{}' is sealed", self.namespace);
        let id = NameId(self.proposals.len() as u32);
        self.proposals.push(raw_proposal.to_string());
        id
    }

    /// Run styling and deterministic disambiguation over every name created so
    /// far, in creation order, and seal the namer against further allocation.
    pub fn seal(&mut self) {
        if self.state == NamerState::Sealed {
            return;
        }
        let mut taken: HashSet<String> = self.forbidden.clone();
        let mut assigned = Vec::with_capacity(self.proposals.len());

        for raw in &self.proposals {
            let words = split_into_words(raw);
            let styled = self.style.style_words(&words);

            let mut disambiguated = styled.clone();
            let mut suffix = 2;
            while taken.contains(&legalize_characters(&disambiguated, self.is_start, self.is_part, self.fallback)) {
                disambiguated = format!("{styled}_{suffix}");
                suffix += 1;
            }
            let candidate = legalize_characters(&disambiguated, self.is_start, self.is_part, self.fallback);
            taken.insert(candidate.clone());
            assigned.push(Some(candidate));
        }

        self.assigned = assigned;
        self.state = NamerState::Sealed;
    }

    /// Resolve a previously-created name to its final string.
    pub fn resolve(&self, id: NameId) -> Result<&str> {
        if self.state != NamerState::Sealed {
            return Err(RenderError::UnassignedName {
                node: crate::ir::TypeId::new(id.0),
                namespace: self.namespace.clone(),
            });
        }
        self.assigned
            .get(id.0 as usize)
            .and_then(|s| s.as_deref())
            .ok_or_else(|| RenderError::UnassignedName {
                node: crate::ir::TypeId::new(id.0),
                namespace: self.namespace.clone(),
            })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_sealed(&self) -> bool {
        self.state == NamerState::Sealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruby_const_start(c: char) -> bool {
        c.is_ascii_uppercase()
    }
    fn ruby_const_part(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    #[test]
    fn disambiguates_colliding_names_in_creation_order() {
        let style = Style::pascal_case(HashSet::new());
        let mut namer = Namer::new("types", style, ruby_const_start, ruby_const_part, HashSet::new());
        let a = namer.create_name("evolution");
        let b = namer.create_name("Evolution");
        namer.seal();
        assert_eq!(namer.resolve(a).unwrap(), "Evolution");
        assert_eq!(namer.resolve(b).unwrap(), "Evolution_2");
    }

    #[test]
    fn avoids_forbidden_words() {
        let style = Style::snake_case(HashSet::new());
        let forbidden: HashSet<String> = ["class"].iter().map(|s| s.to_string()).collect();
        let mut namer = Namer::new(
            "properties:Pokemon",
            style,
            |c| c.is_ascii_lowercase() || c == '_',
            |c| c.is_alphanumeric() || c == '_',
            forbidden,
        );
        let id = namer.create_name("class");
        namer.seal();
        assert_eq!(namer.resolve(id).unwrap(), "class_2");
    }

    #[test]
    fn resolve_before_seal_is_unassigned_name() {
        let style = Style::pascal_case(HashSet::new());
        let mut namer = Namer::new("types", style, ruby_const_start, ruby_const_part, HashSet::new());
        let id = namer.create_name("Foo");
        assert!(matches!(namer.resolve(id), Err(RenderError::UnassignedName { .. })));
    }

    #[test]
    fn enum_case_naming_scenario_with_km_acronym() {
        let acronyms: HashSet<String> = ["KM"].iter().map(|s| s.to_string()).collect();
        let style = Style::pascal_case(acronyms);
        let mut namer = Namer::new("enum_cases:Egg", style, ruby_const_start, ruby_const_part, HashSet::new());
        let ten_km = namer.create_name("10 km");
        let not_in_eggs = namer.create_name("Not in Eggs");
        let two_km = namer.create_name("2 km");
        namer.seal();

        assert_eq!(namer.resolve(ten_km).unwrap(), "The10KM");
        assert_eq!(namer.resolve(not_in_eggs).unwrap(), "NotInEggs");
        assert_eq!(namer.resolve(two_km).unwrap(), "The2KM");
    }
}
