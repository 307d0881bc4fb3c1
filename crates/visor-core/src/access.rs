//! Visibility resolution: the effective visible-intent set for a scope,
//! computed from defaults, links, and exclusions.

use std::collections::HashSet;

use crate::id::IntentId;
use crate::intent::Intent;

/// A default intent is visible unless the scope excluded it; a non-default
/// intent is visible only when the scope is linked. `status` never gates
/// visibility: INACTIVE intents still resolve, which is deliberate — status
/// is workflow state, not an access predicate.
pub fn has_access(intent: &Intent, is_linked: bool, is_excluded: bool) -> bool {
    if intent.is_default() {
        !is_excluded
    } else {
        is_linked
    }
}

/// Filters a population through [`has_access`] using pre-fetched id sets,
/// preserving input order. O(n) in the number of intents.
pub fn filter_by_access(
    intents: Vec<Intent>,
    linked_ids: &HashSet<IntentId>,
    excluded_ids: &HashSet<IntentId>,
) -> Vec<Intent> {
    intents
        .into_iter()
        .filter(|intent| {
            has_access(
                intent,
                linked_ids.contains(&intent.id()),
                excluded_ids.contains(&intent.id()),
            )
        })
        .collect()
}
