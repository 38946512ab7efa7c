//! IOB entity labels.
//!
//! CoNLL-style token classifiers emit labels such as `B-ORG` (beginning of
//! an organization) or `I-MISC` (inside a miscellaneous entity).  The
//! extraction pipeline only cares about the entity class, not the
//! position prefix.

use strum_macros::{AsRefStr, Display, EnumString};

/// Entity class encoded in an IOB label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum EntityClass {
    /// Miscellaneous entities (events, nationalities, crime words).
    Misc,
    /// Organizations.
    Org,
    /// People.
    Per,
    /// Locations.
    Loc,
}

impl EntityClass {
    /// Parses the class from a `B-` or `I-` label like `"B-MISC"` or
    /// `"I-ORG"`. Returns `None` for the outside label `"O"`, for other
    /// prefixes and for classes this model family does not produce.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let class = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))?;
        class.parse().ok()
    }

    /// Builds the label for the first token of an entity of this class.
    #[must_use]
    pub fn begin_label(self) -> String {
        format!("B-{self}")
    }

    /// Builds the label for a continuation token of this class.
    #[must_use]
    pub fn inside_label(self) -> String {
        format!("I-{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_labels() {
        assert_eq!(EntityClass::from_label("B-MISC"), Some(EntityClass::Misc));
        assert_eq!(EntityClass::from_label("I-MISC"), Some(EntityClass::Misc));
        assert_eq!(EntityClass::from_label("B-ORG"), Some(EntityClass::Org));
        assert_eq!(EntityClass::from_label("I-PER"), Some(EntityClass::Per));
        assert_eq!(EntityClass::from_label("B-LOC"), Some(EntityClass::Loc));
    }

    #[test]
    fn ignores_bare_and_other_scheme_labels() {
        assert_eq!(EntityClass::from_label("ORG"), None);
        assert_eq!(EntityClass::from_label("E-ORG"), None);
        assert_eq!(EntityClass::from_label("S-MISC"), None);
    }

    #[test]
    fn rejects_outside_and_unknown() {
        assert_eq!(EntityClass::from_label("O"), None);
        assert_eq!(EntityClass::from_label("B-DATE"), None);
        assert_eq!(EntityClass::from_label("X-ORG"), None);
        assert_eq!(EntityClass::from_label(""), None);
    }

    #[test]
    fn builds_labels() {
        assert_eq!(EntityClass::Misc.begin_label(), "B-MISC");
        assert_eq!(EntityClass::Org.inside_label(), "I-ORG");
    }
}
