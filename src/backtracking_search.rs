//! Grid filling by backtracking search over the arc-consistent domains. Slots are chosen by
//! minimum remaining values with ties going to the slot with the most crossings, and each slot's
//! candidates are tried in least-constraining-value order. The search runs on an explicit stack so
//! that it can stop after a fixed number of states.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::arc_consistency::establish_arc_consistency;
use crate::domains::Domains;
use crate::grid_config::{GridCoord, Puzzle, Slot, SlotId};
use crate::word_list::WordId;

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words, with no word used twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words_by_slot: Vec<Option<WordId>>,
    used_words: BitSet,
    choices: Vec<Choice>,
}

impl Assignment {
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            words_by_slot: vec![None; slot_count],
            used_words: BitSet::new(),
            choices: Vec::with_capacity(slot_count),
        }
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.choices.len() == self.words_by_slot.len()
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words_by_slot[slot_id]
    }

    pub fn is_used(&self, word_id: WordId) -> bool {
        self.used_words.contains(word_id)
    }

    /// The choices made so far, in the order they were made.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn word<'a>(&self, puzzle: &'a Puzzle, slot_id: SlotId) -> Option<&'a str> {
        self.get(slot_id)
            .map(|word_id| puzzle.word(word_id).string.as_str())
    }

    /// Record a choice. The caller is responsible for checking consistency first; assigning a slot
    /// twice, reusing a word, or choosing a word of the wrong length means the search is broken.
    pub fn assign(&mut self, puzzle: &Puzzle, choice: Choice) {
        assert!(
            self.words_by_slot[choice.slot_id].is_none(),
            "Slot {:?} is already assigned",
            puzzle.slot(choice.slot_id)
        );
        assert_eq!(
            puzzle.word(choice.word_id).len(),
            puzzle.slot(choice.slot_id).length,
            "Word {:?} doesn't fit slot {:?}",
            puzzle.word(choice.word_id),
            puzzle.slot(choice.slot_id)
        );
        assert!(
            self.used_words.insert(choice.word_id),
            "Word {:?} is already used",
            puzzle.word(choice.word_id)
        );

        self.words_by_slot[choice.slot_id] = Some(choice.word_id);
        self.choices.push(choice);
    }

    /// Remove a slot's choice, returning the word it had.
    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let word_id = self.words_by_slot[slot_id].take()?;
        self.used_words.remove(word_id);
        let choice_idx = self.choices.iter().rposition(|choice| choice.slot_id == slot_id);
        if let Some(choice_idx) = choice_idx {
            self.choices.remove(choice_idx);
        }
        Some(word_id)
    }

    /// Would adding this choice keep the assignment consistent? Only the slot's assigned crossings
    /// are checked, on the assumption that the rest of the assignment is already consistent.
    pub fn is_consistent_with(&self, puzzle: &Puzzle, choice: &Choice) -> bool {
        let word = puzzle.word(choice.word_id);

        if word.len() != puzzle.slot(choice.slot_id).length || self.is_used(choice.word_id) {
            return false;
        }

        puzzle
            .crossings(choice.slot_id)
            .iter()
            .enumerate()
            .all(|(cell_idx, crossing)| match crossing {
                Some(crossing) => match self.get(crossing.other_slot_id) {
                    Some(other_word_id) => {
                        puzzle.word(other_word_id).char_at(crossing.other_slot_cell)
                            == word.char_at(cell_idx)
                    }
                    None => true,
                },
                None => true,
            })
    }

    /// Check the whole assignment: every word fits its slot, no word appears twice, and every pair
    /// of assigned crossing slots agrees on the shared letter.
    pub fn is_consistent(&self, puzzle: &Puzzle) -> bool {
        let mut seen = BitSet::with_capacity(puzzle.vocabulary().len());

        for (slot_id, word_id) in self.words_by_slot.iter().enumerate() {
            let Some(word_id) = *word_id else {
                continue;
            };
            let word = puzzle.word(word_id);
            if word.len() != puzzle.slot(slot_id).length || !seen.insert(word_id) {
                return false;
            }

            for (cell_idx, crossing) in puzzle.crossings(slot_id).iter().enumerate() {
                if let Some(crossing) = crossing {
                    if let Some(other_word_id) = self.get(crossing.other_slot_id) {
                        if puzzle.word(other_word_id).char_at(crossing.other_slot_cell)
                            != word.char_at(cell_idx)
                        {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    /// Which letter, if any, the assignment puts in the given cell.
    pub fn letter_at(&self, puzzle: &Puzzle, cell: GridCoord) -> Option<char> {
        puzzle
            .slots_at(cell)
            .iter()
            .find_map(|&(slot_id, cell_idx)| {
                self.get(slot_id)
                    .and_then(|word_id| puzzle.word(word_id).char_at(cell_idx))
            })
    }

    /// The assignment keyed by slot descriptor.
    pub fn to_map(&self, puzzle: &Puzzle) -> HashMap<Slot, String> {
        self.choices
            .iter()
            .map(|choice| {
                (
                    *puzzle.slot(choice.slot_id),
                    puzzle.word(choice.word_id).string.clone(),
                )
            })
            .collect()
    }
}

/// How to order the candidates for the slot being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrdering {
    /// Fewest eliminations first, counting the options of each unfilled crossing slot that would
    /// disagree on the shared letter (or are the same word).
    #[default]
    LeastConstraining,

    /// Fewest crossing slots whose domain contains the candidate word first. Cheaper, but only a
    /// rough proxy for how constraining a word is.
    DomainMembership,
}

/// Settings for a fill attempt.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    pub value_ordering: ValueOrdering,

    /// Give up after this many choices have been made.
    pub max_states: Option<u64>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub arc_consistency_revisions: usize,
    pub arc_consistency_eliminations: usize,
    pub initial_arc_consistency_time: Duration,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why no fill was returned. Neither case is an error in the puzzle; `Unsatisfiable` means the
/// whole search space was ruled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    Unsatisfiable,
    ExhaustedStateLimit,
}

/// How many options for a slot are still compatible with the assignment so far?
fn count_remaining_values(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> usize {
    domains
        .options(slot_id)
        .iter()
        .fold(0, |count, word_id| {
            count + assignment.is_consistent_with(puzzle, &Choice { slot_id, word_id }) as usize
        })
}

/// Pick the unassigned slot with the fewest remaining values, breaking ties by highest degree and
/// then lowest slot id.
pub fn select_unassigned_slot(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| assignment.get(slot_id).is_none())
        .min_by_key(|&slot_id| {
            (
                count_remaining_values(puzzle, domains, assignment, slot_id),
                Reverse(puzzle.degree(slot_id)),
                slot_id,
            )
        })
}

/// How many options would choosing `word_id` for `slot_id` rule out in the crossing slots?
fn count_constrained_values(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
    word_id: WordId,
    value_ordering: ValueOrdering,
) -> usize {
    match value_ordering {
        ValueOrdering::LeastConstraining => {
            let word = puzzle.word(word_id);

            puzzle
                .crossings(slot_id)
                .iter()
                .enumerate()
                .filter_map(|(cell_idx, crossing)| crossing.map(|crossing| (cell_idx, crossing)))
                .filter(|(_, crossing)| assignment.get(crossing.other_slot_id).is_none())
                .map(|(cell_idx, crossing)| {
                    let glyph = word.char_at(cell_idx);

                    // Counted with a fold: `BitSet::iter` doesn't report a reliable upper bound.
                    domains.options(crossing.other_slot_id).iter().fold(0, |count, other_word_id| {
                        let ruled_out = !assignment.is_used(other_word_id)
                            && (other_word_id == word_id
                                || puzzle.word(other_word_id).char_at(crossing.other_slot_cell)
                                    != glyph);
                        count + ruled_out as usize
                    })
                })
                .sum()
        }
        ValueOrdering::DomainMembership => puzzle
            .neighbors(slot_id)
            .iter()
            .filter(|&&other_slot_id| domains.contains(other_slot_id, word_id))
            .count(),
    }
}

/// Order a slot's options for trying, skipping words that are already used. The sort key includes
/// the word id so that ties always resolve the same way.
pub fn order_domain_values(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
    value_ordering: ValueOrdering,
) -> Vec<WordId> {
    let mut keyed: Vec<(usize, WordId)> = domains
        .options(slot_id)
        .iter()
        .filter(|&word_id| !assignment.is_used(word_id))
        .map(|word_id| {
            let constrained = count_constrained_values(
                puzzle,
                domains,
                assignment,
                slot_id,
                word_id,
                value_ordering,
            );
            (constrained, word_id)
        })
        .collect();

    keyed.sort_by_key(|&(constrained, word_id)| (constrained, word_id));
    keyed.into_iter().map(|(_, word_id)| word_id).collect()
}

/// A slot being filled, with the candidates we haven't tried yet.
#[derive(Debug)]
struct SearchFrame {
    slot_id: SlotId,
    candidates: Vec<WordId>,
    next_candidate_idx: usize,
}

/// Backtracking search over fixed domains. The domains are only read; all tentative state lives in
/// the assignment and the frame stack, and every frame undoes its own choice before it's popped.
pub fn backtracking_search(
    puzzle: &Puzzle,
    domains: &Domains,
    options: &FillOptions,
    statistics: &mut Statistics,
) -> Result<Assignment, FillFailure> {
    let mut assignment = Assignment::new(puzzle.slot_count());
    let mut stack: Vec<SearchFrame> = Vec::with_capacity(puzzle.slot_count());

    'slot_selection: loop {
        let Some(slot_id) = select_unassigned_slot(puzzle, domains, &assignment) else {
            debug_assert!(assignment.is_complete());
            return Ok(assignment);
        };

        stack.push(SearchFrame {
            slot_id,
            candidates: order_domain_values(
                puzzle,
                domains,
                &assignment,
                slot_id,
                options.value_ordering,
            ),
            next_candidate_idx: 0,
        });

        loop {
            let Some(frame) = stack.last_mut() else {
                return Err(FillFailure::Unsatisfiable);
            };

            while frame.next_candidate_idx < frame.candidates.len() {
                let choice = Choice {
                    slot_id: frame.slot_id,
                    word_id: frame.candidates[frame.next_candidate_idx],
                };
                frame.next_candidate_idx += 1;

                if !assignment.is_consistent_with(puzzle, &choice) {
                    continue;
                }

                if options.max_states.map_or(false, |limit| statistics.states >= limit) {
                    debug!("Giving up after {} states", statistics.states);
                    return Err(FillFailure::ExhaustedStateLimit);
                }

                statistics.states += 1;
                trace!(
                    "Trying {:?} in {:?}",
                    puzzle.word(choice.word_id),
                    puzzle.slot(choice.slot_id)
                );
                assignment.assign(puzzle, choice);
                continue 'slot_selection;
            }

            // Out of candidates: drop this frame and undo the parent's choice so the parent can
            // move on to its next candidate.
            stack.pop();
            statistics.backtracks += 1;
            if let Some(parent) = stack.last() {
                assignment.unassign(parent.slot_id);
            }
        }
    }
}

/// Enforce node consistency, then arc consistency, then search for a fill.
pub fn find_fill(puzzle: &Puzzle, options: &FillOptions) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = Domains::node_consistent(puzzle);
    if let Some(slot_id) = domains.first_empty_slot() {
        debug!("Slot {:?} has no words of the right length", puzzle.slot(slot_id));
        statistics.duration = start.elapsed();
        return Err(FillFailure::Unsatisfiable);
    }

    let arc_consistency_start = Instant::now();
    let arc_consistency_result = establish_arc_consistency(puzzle, &mut domains, None);
    statistics.initial_arc_consistency_time = arc_consistency_start.elapsed();

    match arc_consistency_result {
        Ok(success) => {
            statistics.arc_consistency_revisions = success.revisions;
            statistics.arc_consistency_eliminations = success.eliminations;
        }
        Err(failure) => {
            debug!(
                "No fill possible: slot {:?} has no consistent options",
                puzzle.slot(failure.emptied_slot_id)
            );
            return Err(FillFailure::Unsatisfiable);
        }
    }

    let result = backtracking_search(puzzle, &domains, options, &mut statistics);
    statistics.duration = start.elapsed();
    debug!("{:?}", statistics);

    result.map(|assignment| FillSuccess {
        statistics,
        assignment,
    })
}
