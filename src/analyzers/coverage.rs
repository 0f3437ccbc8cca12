use std::collections::HashSet;

use crate::analyzers::types::Coverage;

/// Set differences between geometry segment ids and lamp segment ids.
pub fn coverage(street_ids: &HashSet<String>, lamp_ids: &HashSet<String>) -> Coverage {
    Coverage {
        geometry_only: street_ids.difference(lamp_ids).cloned().collect(),
        lamp_only: lamp_ids.difference(street_ids).cloned().collect(),
    }
}
