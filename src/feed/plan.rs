//! Transition planning.
//!
//! Diffs the "before" and "after" geometry snapshots of a filter change and
//! classifies every item in the union of the old and new visible sets into
//! exactly one transition. The result is pure data; running it is the
//! director's job.

use std::collections::HashSet;

use crate::catalog::ItemId;
use crate::feed::geometry::{Delta, GeometrySnapshot};

/// How a single item takes part in a filter change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Visible before and after; glides from its old on-screen rect into the
    /// new layout position.
    Persisted { delta: Delta },
    /// Absent before, visible after; fades and scales in.
    Entering,
    /// Visible before, absent after; fades and scales out. The item stays
    /// mounted until its exit animation finishes.
    Exiting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub id: ItemId,
    pub transition: Transition,
}

/// Per-item transitions for one filter change.
///
/// Persisted and entering items come first in new-visible-set order (this is
/// the stagger order), followed by exiting items in old-set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionPlan {
    entries: Vec<PlanEntry>,
}

impl TransitionPlan {
    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn transition_of(&self, id: &ItemId) -> Option<Transition> {
        self.entries
            .iter()
            .find(|entry| entry.id == *id)
            .map(|entry| entry.transition)
    }
}

/// Classifies every id in `old_ids ∪ new_ids` into a transition.
///
/// A missing rect degrades the classification instead of failing: an id in
/// both sets with no "before" rect was never actually on screen and enters; an
/// id with no "after" rect has nowhere to land and exits.
pub fn plan(
    before: &GeometrySnapshot,
    after: &GeometrySnapshot,
    old_ids: &[ItemId],
    new_ids: &[ItemId],
) -> TransitionPlan {
    let old_set: HashSet<&ItemId> = old_ids.iter().collect();
    let new_set: HashSet<&ItemId> = new_ids.iter().collect();

    let mut entries = Vec::with_capacity(old_ids.len() + new_ids.len());
    // Ids from the new set that degraded to Exiting; they are appended with
    // the other exits to keep the partition exact.
    let mut degraded: HashSet<&ItemId> = HashSet::new();

    for id in new_ids {
        let transition = if !old_set.contains(id) {
            Transition::Entering
        } else {
            match (before.get(id), after.get(id)) {
                (Some(b), Some(a)) => Transition::Persisted {
                    delta: Delta::between(b, a),
                },
                (None, _) => Transition::Entering,
                (Some(_), None) => {
                    degraded.insert(id);
                    continue;
                }
            }
        };
        entries.push(PlanEntry {
            id: id.clone(),
            transition,
        });
    }

    for id in old_ids {
        if !new_set.contains(id) || degraded.contains(id) {
            entries.push(PlanEntry {
                id: id.clone(),
                transition: Transition::Exiting,
            });
        }
    }

    TransitionPlan { entries }
}
