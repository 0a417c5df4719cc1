//! Position allocation for sibling ordering keys.
//!
//! Positions are sparse integers spaced [`POSITION_GAP`] apart so most inserts
//! land in an existing gap. When two neighbours are adjacent integers the
//! whole sibling sequence is renumbered to `1000, 2000, 3000, …` in its
//! current order and the insert is retried.

/// Distance between freshly allocated neighbours.
pub const POSITION_GAP: i64 = 1000;

/// Position for appending after the current maximum.
pub fn next_position(current_max: i64) -> i64 {
    current_max + POSITION_GAP
}

/// Position strictly between two neighbours, `None` when there is no integer room.
///
/// A missing `lo` means insertion at the head, a missing `hi` insertion at the tail.
pub fn between(lo: Option<i64>, hi: Option<i64>) -> Option<i64> {
    match (lo, hi) {
        (None, None) => Some(POSITION_GAP),
        (Some(lo), None) => Some(next_position(lo)),
        (None, Some(hi)) => (hi >= 2).then_some(hi / 2),
        (Some(lo), Some(hi)) => (hi - lo > 1).then(|| lo + (hi - lo) / 2),
    }
}

/// Evenly spaced positions for a sequence of `count` siblings.
pub fn renumber(count: usize) -> Vec<i64> {
    (1..=count as i64).map(|i| i * POSITION_GAP).collect()
}

/// Result of placing an entity into an ordered sibling sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Position for the inserted entity.
    pub position: i64,
    /// New positions for the existing siblings, index-aligned with the input,
    /// when a renumber pass was needed.
    pub renumbered: Option<Vec<i64>>,
}

/// Places a new entity at `index` (0..=len) of an ascending sibling sequence.
///
/// The sequence must not contain the entity being placed.
pub fn place_at(sequence: &[i64], index: usize) -> Placement {
    let index = index.min(sequence.len());
    let neighbours = |seq: &[i64]| {
        let lo = index.checked_sub(1).map(|i| seq[i]);
        let hi = seq.get(index).copied();
        (lo, hi)
    };

    let (lo, hi) = neighbours(sequence);
    if let Some(position) = between(lo, hi) {
        return Placement {
            position,
            renumbered: None,
        };
    }

    let fresh = renumber(sequence.len());
    let (lo, hi) = neighbours(&fresh);
    tracing::debug!(siblings = sequence.len(), "no gap left, renumbering siblings");
    Placement {
        // Renumbered neighbours are POSITION_GAP apart, so a slot always exists.
        position: between(lo, hi).unwrap_or_else(|| lo.unwrap_or(0) + 1),
        renumbered: Some(fresh),
    }
}
