pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod render;
pub mod template;
pub mod word_list;

pub use backtracking_search::{find_fill, Assignment, FillFailure, FillOptions, FillSuccess};
pub use grid_config::{Direction, Puzzle, PuzzleError, Slot, SlotId};
pub use word_list::{Vocabulary, WordId};

/// The expected maximum length for a single slot. Longer slots work, they just spill to the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Runs of fillable cells shorter than this aren't treated as slots when deriving them from a grid.
pub const MIN_SLOT_LENGTH: usize = 2;

/// Fill the puzzle, returning the first complete assignment found or `None` if there is no fill.
pub fn solve(puzzle: &Puzzle) -> Option<Assignment> {
    match find_fill(puzzle, &FillOptions::default()) {
        Ok(success) => Some(success.assignment),
        Err(FillFailure::Unsatisfiable) => None,
        Err(FillFailure::ExhaustedStateLimit) => unreachable!("no state limit was set"),
    }
}
