//! Read-only state views.
//!
//! Rule attribute paths are resolved through an explicit accessor table
//! rather than runtime reflection. A state type lists the dotted paths it
//! exposes and a typed getter for each; anything not in the table is
//! unresolvable and the rule referencing it is skipped.

use std::collections::BTreeMap;

/// Boolean fields of one element in a record sequence.
pub type FlagRecord = BTreeMap<&'static str, bool>;

/// The value a path resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// A numeric scalar.
    Number(f64),
    /// A sized collection (sequence, mapping, or set) of the given length.
    Collection(usize),
    /// A sequence of records exposing boolean fields. Also counts as a
    /// sized collection of its length.
    Records(Vec<FlagRecord>),
}

impl Attribute {
    /// Length when the attribute is a sized collection.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Number(_) => None,
            Self::Collection(len) => Some(*len),
            Self::Records(records) => Some(records.len()),
        }
    }

    /// Number of records whose `flag` field is true. `None` unless the
    /// attribute is a record sequence.
    pub fn count_flagged(&self, flag: &str) -> Option<usize> {
        match self {
            Self::Records(records) => Some(
                records
                    .iter()
                    .filter(|record| record.get(flag).copied().unwrap_or(false))
                    .count(),
            ),
            Self::Number(_) | Self::Collection(_) => None,
        }
    }
}

/// Read-only view of some state that rules can be scored against.
pub trait StateView {
    /// Resolve a dotted attribute path. `None` means unresolvable.
    fn resolve(&self, path: &str) -> Option<Attribute>;
}

/// A typed getter for one attribute path.
pub type Accessor<T> = fn(&T) -> Attribute;

/// Resolve `path` against `target` using a static accessor table.
///
/// Paths with empty segments (`"a..b"`, `".a"`, `""`) never resolve.
pub fn resolve_in<T>(table: &[(&str, Accessor<T>)], target: &T, path: &str) -> Option<Attribute> {
    if path.split('.').any(str::is_empty) {
        return None;
    }
    table
        .iter()
        .find(|(key, _)| *key == path)
        .map(|(_, getter)| getter(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        level: f64,
        tags: usize,
    }

    fn level(probe: &Probe) -> Attribute {
        Attribute::Number(probe.level)
    }

    fn tags(probe: &Probe) -> Attribute {
        Attribute::Collection(probe.tags)
    }

    const TABLE: &[(&str, Accessor<Probe>)] = &[("level", level), ("inner.tags", tags)];

    #[test]
    fn resolves_known_paths() {
        let probe = Probe { level: 0.5, tags: 3 };
        assert_eq!(resolve_in(TABLE, &probe, "level"), Some(Attribute::Number(0.5)));
        assert_eq!(resolve_in(TABLE, &probe, "inner.tags"), Some(Attribute::Collection(3)));
    }

    #[test]
    fn unknown_and_malformed_paths_do_not_resolve() {
        let probe = Probe { level: 0.5, tags: 3 };
        assert_eq!(resolve_in(TABLE, &probe, "inner"), None);
        assert_eq!(resolve_in(TABLE, &probe, "inner..tags"), None);
        assert_eq!(resolve_in(TABLE, &probe, ""), None);
    }

    #[test]
    fn flagged_count_only_for_records() {
        let records = Attribute::Records(vec![
            FlagRecord::from([("honored", true)]),
            FlagRecord::from([("honored", false)]),
            FlagRecord::new(),
        ]);
        assert_eq!(records.len(), Some(3));
        assert_eq!(records.count_flagged("honored"), Some(1));
        assert_eq!(Attribute::Collection(4).count_flagged("honored"), None);
        assert_eq!(Attribute::Number(1.0).len(), None);
    }
}
