//! Process-wide generation options.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::Deserialize;

/// Read-only options threaded through every resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Properties that `$ref` an object schema are nullable unless they
    /// explicitly say `nullable: false`.
    pub referenced_objects_nullable_by_default: bool,
    /// Keep only operations carrying at least one of these tags (empty keeps all).
    pub include_tags: BTreeSet<String>,
    /// Drop operations carrying any of these tags. Wins over `include_tags`.
    pub exclude_tags: BTreeSet<String>,
}

impl GenerationOptions {
    /// Whether an operation with the given tags survives tag filtering.
    pub fn accepts(&self, tags: &IndexSet<String>) -> bool {
        let included =
            self.include_tags.is_empty() || tags.iter().any(|t| self.include_tags.contains(t));
        let excluded = tags.iter().any(|t| self.exclude_tags.contains(t));
        included && !excluded
    }
}
