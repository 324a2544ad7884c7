use bit_set::BitSet;
use log::debug;

use crate::grid_config::{Puzzle, Slot, SlotId};
use crate::word_list::WordId;

/// The live candidate set for each slot, stored as a set of word ids per slot id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options_by_slot: Vec<BitSet>,
}

impl Domains {
    /// Start every slot off with the whole vocabulary.
    pub fn new(puzzle: &Puzzle) -> Domains {
        let word_count = puzzle.vocabulary().len();
        let mut all_words = BitSet::with_capacity(word_count);
        for word_id in 0..word_count {
            all_words.insert(word_id);
        }

        Domains {
            options_by_slot: puzzle.slots().iter().map(|_| all_words.clone()).collect(),
        }
    }

    /// Shorthand for `new` followed by `enforce_node_consistency`.
    pub fn node_consistent(puzzle: &Puzzle) -> Domains {
        let mut domains = Domains::new(puzzle);
        domains.enforce_node_consistency(puzzle);
        domains
    }

    /// Remove every candidate whose length doesn't match its slot's length. An empty domain is a
    /// valid result here; it just means the puzzle has no fill.
    pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle) {
        for (slot_id, options) in self.options_by_slot.iter_mut().enumerate() {
            let length = puzzle.slot(slot_id).length;
            let to_remove: Vec<WordId> = options
                .iter()
                .filter(|&word_id| puzzle.word(word_id).len() != length)
                .collect();

            for word_id in to_remove {
                options.remove(word_id);
            }

            if options.is_empty() {
                debug!("No words of length {} for slot {:?}", length, puzzle.slot(slot_id));
            }
        }
    }

    pub fn slot_count(&self) -> usize {
        self.options_by_slot.len()
    }

    pub fn options(&self, slot_id: SlotId) -> &BitSet {
        &self.options_by_slot[slot_id]
    }

    /// Look up a domain by slot descriptor rather than id.
    pub fn options_for(&self, puzzle: &Puzzle, slot: &Slot) -> Option<&BitSet> {
        puzzle.slot_id(slot).map(|slot_id| self.options(slot_id))
    }

    pub fn option_count(&self, slot_id: SlotId) -> usize {
        self.options_by_slot[slot_id].len()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options_by_slot[slot_id].contains(word_id)
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.options_by_slot[slot_id].is_empty()
    }

    /// The first slot whose domain has been wiped out, if any.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.options_by_slot.iter().position(|options| options.is_empty())
    }

    pub(crate) fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options_by_slot[slot_id].remove(word_id)
    }

    /// The remaining candidates for a slot, as strings, in word id order.
    pub fn words<'a>(
        &'a self,
        puzzle: &'a Puzzle,
        slot_id: SlotId,
    ) -> impl Iterator<Item = &'a str> {
        self.options_by_slot[slot_id]
            .iter()
            .map(move |word_id| puzzle.word(word_id).string.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Domains;
    use crate::grid_config::{Direction, Puzzle, Slot};
    use crate::word_list::Vocabulary;

    #[test]
    fn test_node_consistency_filters_by_length() {
        let puzzle = Puzzle::from_fn(
            2,
            4,
            |row, col| row == 0 || col == 0,
            Vocabulary::new(["CAT", "ARTS", "GO", "DOGS", "A"]),
        )
        .unwrap();

        let mut domains = Domains::new(&puzzle);
        assert_eq!(domains.option_count(0), 5);

        domains.enforce_node_consistency(&puzzle);

        let across = puzzle.slot_id(&Slot::new(0, 0, Direction::Across, 4)).unwrap();
        let down = puzzle.slot_id(&Slot::new(0, 0, Direction::Down, 2)).unwrap();
        assert_eq!(domains.words(&puzzle, across).collect::<Vec<_>>(), vec!["ARTS", "DOGS"]);
        assert_eq!(domains.words(&puzzle, down).collect::<Vec<_>>(), vec!["GO"]);
        assert_eq!(domains.first_empty_slot(), None);
    }

    #[test]
    fn test_node_consistency_can_empty_domains() {
        let puzzle =
            Puzzle::from_fn(3, 3, |_, _| true, Vocabulary::new(["A", "BE"])).unwrap();

        let domains = Domains::node_consistent(&puzzle);

        for slot_id in 0..puzzle.slot_count() {
            assert!(domains.is_empty(slot_id));
        }
        assert_eq!(domains.first_empty_slot(), Some(0));
    }

    #[test]
    fn test_options_for_slot_descriptor() {
        let puzzle = Puzzle::from_fn(1, 3, |_, _| true, Vocabulary::new(["CAT", "DOG"])).unwrap();
        let domains = Domains::node_consistent(&puzzle);

        let options = domains
            .options_for(&puzzle, &Slot::new(0, 0, Direction::Across, 3))
            .unwrap();
        assert_eq!(options.len(), 2);
        assert!(domains
            .options_for(&puzzle, &Slot::new(0, 0, Direction::Down, 3))
            .is_none());
    }
}
