//! This module contains a crossword-specific implementation of the AC-3 algorithm. For our
//! purposes, a pair of crossing slots (X, Y) is arc-consistent when every option left for X puts a
//! letter in the shared cell that at least one option left for Y also puts there. We keep revising
//! arcs until no more eliminations are possible or some slot runs out of options.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::{Puzzle, SlotId};
use crate::word_list::WordId;

/// An ordered pair of slots (X, Y): revising it removes options from X that have no support in Y.
pub type SlotPair = (SlotId, SlotId);

/// Result from a successful call to `establish_arc_consistency`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    pub revisions: usize,
    pub eliminations: usize,
}

/// Result from a failed call to `establish_arc_consistency`, naming the slot whose domain was wiped
/// out. The domains are left in whatever state they were in at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub emptied_slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Every ordered pair of distinct slots that share a cell.
pub fn all_arcs(puzzle: &Puzzle) -> Vec<SlotPair> {
    (0..puzzle.slot_count())
        .flat_map(|slot_id| {
            puzzle
                .neighbors(slot_id)
                .iter()
                .map(move |&other_slot_id| (slot_id, other_slot_id))
        })
        .collect()
}

/// Remove from `x`'s domain every option with no compatible option in `y`'s domain, returning
/// the number of options removed.
fn revise_counting(puzzle: &Puzzle, domains: &mut Domains, x: SlotId, y: SlotId) -> usize {
    let Some((x_cell, y_cell)) = puzzle.overlap(x, y) else {
        return 0;
    };

    let supported_glyphs: HashSet<char> = domains
        .options(y)
        .iter()
        .filter_map(|word_id| puzzle.word(word_id).char_at(y_cell))
        .collect();

    let to_remove: Vec<WordId> = domains
        .options(x)
        .iter()
        .filter(|&word_id| {
            puzzle
                .word(word_id)
                .char_at(x_cell)
                .map_or(true, |glyph| !supported_glyphs.contains(&glyph))
        })
        .collect();

    for &word_id in &to_remove {
        domains.remove(x, word_id);
    }

    to_remove.len()
}

/// Make slot `x` arc-consistent with slot `y`. Returns true if anything was removed from `x`.
pub fn revise(puzzle: &Puzzle, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    revise_counting(puzzle, domains, x, y) > 0
}

/// Run AC-3 to a fixed point. If `arcs` is `None`, every arc in the puzzle is checked; otherwise
/// we start from the given arcs only, which is enough when the domains were consistent before some
/// slots shrank.
pub fn establish_arc_consistency(
    puzzle: &Puzzle,
    domains: &mut Domains,
    arcs: Option<&[SlotPair]>,
) -> ArcConsistencyResult {
    let mut queue: VecDeque<SlotPair> = match arcs {
        Some(arcs) => arcs.iter().copied().collect(),
        None => all_arcs(puzzle).into(),
    };

    // An arc already waiting in the queue will see any later shrinkage when it's processed, so
    // there's no point in queueing it twice.
    let mut queued: HashSet<SlotPair> = queue.iter().copied().collect();

    let mut result = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        queued.remove(&(x, y));
        result.revisions += 1;

        let removed = revise_counting(puzzle, domains, x, y);
        if removed == 0 {
            continue;
        }
        result.eliminations += removed;
        trace!("Revised {:?} against {:?}, removing {} options", x, y, removed);

        if domains.is_empty(x) {
            debug!(
                "Arc consistency wiped out slot {:?} after {} revisions",
                puzzle.slot(x),
                result.revisions
            );
            return Err(ArcConsistencyFailure { emptied_slot_id: x });
        }

        for &z in puzzle.neighbors(x) {
            if z != y && queued.insert((z, x)) {
                queue.push_back((z, x));
            }
        }
    }

    // Slots with no crossings never get revised, so node consistency may have left one empty.
    if let Some(emptied_slot_id) = domains.first_empty_slot() {
        return Err(ArcConsistencyFailure { emptied_slot_id });
    }

    debug!(
        "Established arc consistency with {} revisions and {} eliminations",
        result.revisions, result.eliminations
    );
    Ok(result)
}

/// Check, without modifying anything, whether every arc in the puzzle is consistent.
pub fn is_arc_consistent(puzzle: &Puzzle, domains: &Domains) -> bool {
    all_arcs(puzzle).into_iter().all(|(x, y)| {
        let (x_cell, y_cell) = match puzzle.overlap(x, y) {
            Some(offsets) => offsets,
            None => return true,
        };

        domains.options(x).iter().all(|x_word_id| {
            let glyph = puzzle.word(x_word_id).char_at(x_cell);
            glyph.is_some()
                && domains
                    .options(y)
                    .iter()
                    .any(|y_word_id| puzzle.word(y_word_id).char_at(y_cell) == glyph)
        })
    })
}
