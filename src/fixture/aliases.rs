//! Key-alias table for the fields a fixture may spell in more than one way.

use crate::value::Value;
use im::HashMap;

/// The canonical fields of a fixture case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Output,
    Input,
    Name,
    Metadata,
    Init,
}

/// Accepted spellings in lookup order. The first alias present in a mapping
/// wins, so `o` shadows `outputs` when both are given.
const ALIASES: &[(&str, Field)] = &[
    ("o", Field::Output),
    ("out", Field::Output),
    ("output", Field::Output),
    ("outputs", Field::Output),
    ("i", Field::Input),
    ("in", Field::Input),
    ("input", Field::Input),
    ("inputs", Field::Input),
    ("name", Field::Name),
    ("metadata", Field::Metadata),
    ("init", Field::Init),
];

impl Field {
    /// All keys that name this field, in precedence order.
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        ALIASES
            .iter()
            .filter(move |(_, field)| *field == self)
            .map(|(alias, _)| *alias)
    }

    /// Looks up the canonical field for a key. Matching is exact.
    pub fn from_key(key: &str) -> Option<Field> {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, field)| *field)
    }

    /// Finds this field in `map`, returning the alias used and its value.
    pub fn lookup(self, map: &HashMap<String, Value>) -> Option<(&'static str, &Value)> {
        self.aliases()
            .find_map(|alias| map.get(alias).map(|value| (alias, value)))
    }
}
