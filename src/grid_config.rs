use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::word_list::{Vocabulary, Word, WordId};
use crate::{MAX_SLOT_LENGTH, MIN_SLOT_LENGTH};

/// An identifier for a given slot, based on its index in the Puzzle's `slots` field.
pub type SlotId = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A run of cells that needs to be filled with a single word. Slots are plain values: two slots
/// are the same slot iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot { row, col, direction, length }
    }

    /// The coords of the cell at `cell_idx` along this slot. Doesn't check the index against the
    /// slot's length.
    pub fn cell(&self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        }
    }

    /// Like `cell`, but `None` if the coords would overflow.
    pub fn checked_cell(&self, cell_idx: usize) -> Option<GridCoord> {
        match self.direction {
            Direction::Across => self.col.checked_add(cell_idx).map(|col| (self.row, col)),
            Direction::Down => self.row.checked_add(cell_idx).map(|row| (row, self.col)),
        }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let slot = *self;
        (0..slot.length).map(move |cell_idx| slot.cell(cell_idx))
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// Reasons a puzzle definition can be rejected. These are all problems with the input geometry and
/// are reported before any filling happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    MaskSizeMismatch { expected: usize, actual: usize },
    ZeroLengthSlot(Slot),
    SlotOutOfBounds(Slot),
    BlockedCell { slot: Slot, cell: GridCoord },
    DuplicateSlot(Slot),
    ParallelOverlap { first: Slot, second: Slot, cell: GridCoord },
    EmptyTemplate,
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::MaskSizeMismatch { expected, actual } => {
                write!(f, "fillable mask has {} cells, expected {}", actual, expected)
            }
            PuzzleError::ZeroLengthSlot(slot) => write!(f, "slot {:?} has zero length", slot),
            PuzzleError::SlotOutOfBounds(slot) => {
                write!(f, "slot {:?} extends outside the grid", slot)
            }
            PuzzleError::BlockedCell { slot, cell } => {
                write!(f, "slot {:?} covers blocked cell {:?}", slot, cell)
            }
            PuzzleError::DuplicateSlot(slot) => write!(f, "slot {:?} is listed twice", slot),
            PuzzleError::ParallelOverlap { first, second, cell } => write!(
                f,
                "slots {:?} and {:?} run in the same direction and share cell {:?}",
                first, second, cell
            ),
            PuzzleError::EmptyTemplate => write!(f, "grid template has no rows"),
        }
    }
}

impl Error for PuzzleError {}

/// The static description of a puzzle: grid geometry, the slots derived from it, the vocabulary,
/// and the overlap table linking crossing slots. Nothing in here changes during filling.
pub struct Puzzle {
    height: usize,
    width: usize,
    fillable: Vec<bool>,
    slots: Vec<Slot>,
    slot_ids_by_slot: HashMap<Slot, SlotId>,
    vocabulary: Vocabulary,

    /// For each slot, one entry per cell: the slot crossing at that cell, if any.
    crossings: Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>>,

    /// For each slot, the ids of the slots crossing it, in cell order.
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,

    /// For each ordered pair of crossing slots, the offset into each slot of their shared cell.
    overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,

    /// Which slots cover each cell, and at which offset.
    entries_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>>,
}

impl Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("slots", &self.slots)
            .field("vocabulary", &self.vocabulary)
            .finish()
    }
}

/// Find every maximal run of fillable cells at least `min_length` long, across slots first (in
/// row-major order) and then down slots (in column-major order).
pub fn derive_slots(
    height: usize,
    width: usize,
    fillable: &[bool],
    min_length: usize,
) -> Vec<Slot> {
    let mut result = vec![];
    let is_fillable = |row: usize, col: usize| fillable[row * width + col];

    for row in 0..height {
        let mut col = 0;
        while col < width {
            if !is_fillable(row, col) {
                col += 1;
                continue;
            }
            let start_col = col;
            while col < width && is_fillable(row, col) {
                col += 1;
            }
            if col - start_col >= min_length {
                result.push(Slot::new(row, start_col, Direction::Across, col - start_col));
            }
        }
    }

    for col in 0..width {
        let mut row = 0;
        while row < height {
            if !is_fillable(row, col) {
                row += 1;
                continue;
            }
            let start_row = row;
            while row < height && is_fillable(row, col) {
                row += 1;
            }
            if row - start_row >= min_length {
                result.push(Slot::new(start_row, col, Direction::Down, row - start_row));
            }
        }
    }

    result
}

impl Puzzle {
    /// Build a puzzle from a row-major fillable mask, deriving its slots from the runs of fillable
    /// cells.
    pub fn new(
        height: usize,
        width: usize,
        fillable: Vec<bool>,
        vocabulary: Vocabulary,
    ) -> Result<Puzzle, PuzzleError> {
        if fillable.len() != height * width {
            return Err(PuzzleError::MaskSizeMismatch {
                expected: height * width,
                actual: fillable.len(),
            });
        }
        let slots = derive_slots(height, width, &fillable, MIN_SLOT_LENGTH);
        Puzzle::with_slots(height, width, fillable, slots, vocabulary)
    }

    /// Build a puzzle from a fillable-cell predicate.
    pub fn from_fn<F>(
        height: usize,
        width: usize,
        is_fillable: F,
        vocabulary: Vocabulary,
    ) -> Result<Puzzle, PuzzleError>
    where
        F: Fn(usize, usize) -> bool,
    {
        let fillable = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .map(|(row, col)| is_fillable(row, col))
            .collect();
        Puzzle::new(height, width, fillable, vocabulary)
    }

    /// Build a puzzle from an explicit list of slots, validating their geometry against the grid.
    pub fn with_slots(
        height: usize,
        width: usize,
        fillable: Vec<bool>,
        slots: Vec<Slot>,
        vocabulary: Vocabulary,
    ) -> Result<Puzzle, PuzzleError> {
        if fillable.len() != height * width {
            return Err(PuzzleError::MaskSizeMismatch {
                expected: height * width,
                actual: fillable.len(),
            });
        }

        let mut slot_ids_by_slot: HashMap<Slot, SlotId> = HashMap::with_capacity(slots.len());

        for (slot_id, slot) in slots.iter().enumerate() {
            if slot.length == 0 {
                return Err(PuzzleError::ZeroLengthSlot(*slot));
            }
            match slot.checked_cell(slot.length - 1) {
                Some((last_row, last_col)) if last_row < height && last_col < width => {}
                _ => return Err(PuzzleError::SlotOutOfBounds(*slot)),
            }
            if let Some(cell) = slot.cells().find(|&(row, col)| !fillable[row * width + col]) {
                return Err(PuzzleError::BlockedCell { slot: *slot, cell });
            }
            if slot_ids_by_slot.insert(*slot, slot_id).is_some() {
                return Err(PuzzleError::DuplicateSlot(*slot));
            }
        }

        // Build a map from cell location to slots involved, which we can then use to calculate
        // crossings.
        let mut entries_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> =
            HashMap::new();

        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, cell) in slot.cells().enumerate() {
                let entries = entries_by_cell.entry(cell).or_insert_with(|| smallvec![]);

                if let Some(&(other_slot_id, _)) = entries
                    .iter()
                    .find(|&&(other_slot_id, _)| slots[other_slot_id].direction == slot.direction)
                {
                    return Err(PuzzleError::ParallelOverlap {
                        first: slots[other_slot_id],
                        second: *slot,
                        cell,
                    });
                }
                entries.push((slot_id, cell_idx));
            }
        }

        // With parallel overlaps ruled out, each cell holds at most one across and one down entry,
        // and each pair of slots shares at most one cell.
        let mut crossings: Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>> = vec![];
        let mut neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>> = vec![];
        let mut overlaps: HashMap<(SlotId, SlotId), (usize, usize)> = HashMap::new();

        for (slot_id, slot) in slots.iter().enumerate() {
            let slot_crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = slot
                .cells()
                .map(|cell| {
                    entries_by_cell[&cell]
                        .iter()
                        .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect();

            for (cell_idx, crossing) in slot_crossings.iter().enumerate() {
                if let Some(crossing) = crossing {
                    overlaps.insert(
                        (slot_id, crossing.other_slot_id),
                        (cell_idx, crossing.other_slot_cell),
                    );
                }
            }

            neighbors.push(
                slot_crossings
                    .iter()
                    .flatten()
                    .map(|crossing| crossing.other_slot_id)
                    .collect(),
            );
            crossings.push(slot_crossings);
        }

        Ok(Puzzle {
            height,
            width,
            fillable,
            slots,
            slot_ids_by_slot,
            vocabulary,
            crossings,
            neighbors,
            overlaps,
            entries_by_cell,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Is the given cell part of the fillable area? Cells outside the grid are not.
    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.fillable[row * self.width + col]
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_ids_by_slot.get(slot).copied()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.vocabulary[word_id]
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Option<Crossing>] {
        &self.crossings[slot_id]
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors[slot_id].len()
    }

    /// The offsets (into `a`, into `b`) of the cell shared by two slots, or `None` if they don't
    /// cross.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.overlaps.get(&(a, b)).copied()
    }

    /// The slots covering a cell, each with the cell's offset into that slot.
    pub fn slots_at(&self, cell: GridCoord) -> &[(SlotId, usize)] {
        self.entries_by_cell
            .get(&cell)
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_slots, Direction, Puzzle, PuzzleError, Slot};
    use crate::word_list::Vocabulary;

    /// ###_#
    /// _____
    /// ###_#
    fn plus_mask() -> Vec<bool> {
        "###_#_____###_#".chars().map(|c| c == '_').collect()
    }

    #[test]
    fn test_derive_slots_skips_single_cells() {
        let slots = derive_slots(3, 5, &plus_mask(), 2);

        assert_eq!(
            slots,
            vec![
                Slot::new(1, 0, Direction::Across, 5),
                Slot::new(0, 3, Direction::Down, 3),
            ]
        );
    }

    #[test]
    fn test_overlap_table_is_symmetric() {
        let puzzle = Puzzle::new(3, 5, plus_mask(), Vocabulary::default()).unwrap();

        assert_eq!(puzzle.overlap(0, 1), Some((3, 1)));
        assert_eq!(puzzle.overlap(1, 0), Some((1, 3)));
        assert_eq!(puzzle.neighbors(0), &[1]);
        assert_eq!(puzzle.neighbors(1), &[0]);
        assert_eq!(puzzle.slots_at((1, 3)), &[(0, 3), (1, 1)]);
        assert!(puzzle.slots_at((0, 0)).is_empty());
    }

    #[test]
    fn test_no_overlap_between_parallel_slots() {
        let puzzle = Puzzle::from_fn(3, 3, |row, _| row != 1, Vocabulary::default()).unwrap();

        assert_eq!(puzzle.slot_count(), 2);
        assert_eq!(puzzle.overlap(0, 1), None);
        assert_eq!(puzzle.degree(0), 0);
    }

    #[test]
    fn test_full_square_crossings() {
        let puzzle = Puzzle::from_fn(3, 3, |_, _| true, Vocabulary::default()).unwrap();

        assert_eq!(puzzle.slot_count(), 6);
        for slot_id in 0..6 {
            assert_eq!(puzzle.degree(slot_id), 3);
        }
        let middle_down = puzzle.slot_id(&Slot::new(0, 1, Direction::Down, 3)).unwrap();
        let bottom_across = puzzle.slot_id(&Slot::new(2, 0, Direction::Across, 3)).unwrap();
        assert_eq!(puzzle.overlap(middle_down, bottom_across), Some((2, 1)));
    }

    #[test]
    fn test_rejects_malformed_slots() {
        let mask = || vec![true; 9];
        let build =
            |slots: Vec<Slot>| Puzzle::with_slots(3, 3, mask(), slots, Vocabulary::default());

        assert_eq!(
            build(vec![Slot::new(0, 0, Direction::Across, 0)]).unwrap_err(),
            PuzzleError::ZeroLengthSlot(Slot::new(0, 0, Direction::Across, 0))
        );
        assert_eq!(
            build(vec![Slot::new(0, 1, Direction::Across, 3)]).unwrap_err(),
            PuzzleError::SlotOutOfBounds(Slot::new(0, 1, Direction::Across, 3))
        );
        assert_eq!(
            build(vec![Slot::new(0, 2, Direction::Across, usize::MAX)]).unwrap_err(),
            PuzzleError::SlotOutOfBounds(Slot::new(0, 2, Direction::Across, usize::MAX))
        );
        assert_eq!(
            build(vec![Slot::new(usize::MAX, 0, Direction::Down, 2)]).unwrap_err(),
            PuzzleError::SlotOutOfBounds(Slot::new(usize::MAX, 0, Direction::Down, 2))
        );
        assert_eq!(
            build(vec![Slot::new(0, 0, Direction::Down, 2), Slot::new(0, 0, Direction::Down, 2)])
                .unwrap_err(),
            PuzzleError::DuplicateSlot(Slot::new(0, 0, Direction::Down, 2))
        );
        assert!(matches!(
            build(vec![
                Slot::new(0, 0, Direction::Across, 2),
                Slot::new(0, 1, Direction::Across, 2),
            ]),
            Err(PuzzleError::ParallelOverlap { cell: (0, 1), .. })
        ));
    }

    #[test]
    fn test_rejects_blocked_cells_and_bad_masks() {
        let result = Puzzle::with_slots(
            1,
            3,
            vec![true, false, true],
            vec![Slot::new(0, 0, Direction::Across, 3)],
            Vocabulary::default(),
        );
        assert!(matches!(result, Err(PuzzleError::BlockedCell { cell: (0, 1), .. })));

        let result = Puzzle::new(2, 2, vec![true; 3], Vocabulary::default());
        assert_eq!(
            result.unwrap_err(),
            PuzzleError::MaskSizeMismatch { expected: 4, actual: 3 }
        );
    }

    #[test]
    fn test_single_cell_slot_crossing() {
        let puzzle = Puzzle::with_slots(
            1,
            3,
            vec![true; 3],
            vec![Slot::new(0, 0, Direction::Across, 3), Slot::new(0, 2, Direction::Down, 1)],
            Vocabulary::default(),
        )
        .unwrap();

        assert_eq!(puzzle.overlap(0, 1), Some((2, 0)));
        assert_eq!(puzzle.crossings(1).len(), 1);
    }
}
