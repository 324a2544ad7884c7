use crossfill::arc_consistency::{establish_arc_consistency, is_arc_consistent};
use crossfill::backtracking_search::ValueOrdering;
use crossfill::domains::Domains;
use crossfill::{find_fill, FillOptions, Puzzle, Vocabulary, WordId};
use proptest::prelude::*;

const SIZE: usize = 3;

/// A random 3x3 mask and a small vocabulary over a two-letter alphabet, which keeps crossings
/// tight enough that both fills and failures show up.
fn arb_puzzle() -> impl Strategy<Value = Puzzle> {
    (
        proptest::collection::vec(any::<bool>(), SIZE * SIZE),
        proptest::collection::vec("[AB]{1,3}", 1..7),
    )
        .prop_map(|(fillable, words)| {
            Puzzle::new(SIZE, SIZE, fillable, Vocabulary::new(words)).unwrap()
        })
}

/// Exhaustively look for a fill, with no propagation or ordering heuristics.
fn brute_force_fill_exists(puzzle: &Puzzle) -> bool {
    fn extend(puzzle: &Puzzle, words_by_slot: &mut Vec<WordId>) -> bool {
        let slot_id = words_by_slot.len();
        if slot_id == puzzle.slot_count() {
            return true;
        }

        for (word_id, word) in puzzle.vocabulary().iter() {
            if word.len() != puzzle.slot(slot_id).length || words_by_slot.contains(&word_id) {
                continue;
            }

            let agrees = (0..slot_id).all(|other_slot_id| {
                match puzzle.overlap(slot_id, other_slot_id) {
                    Some((cell, other_cell)) => {
                        let other_word = puzzle.word(words_by_slot[other_slot_id]);
                        word.char_at(cell) == other_word.char_at(other_cell)
                    }
                    None => true,
                }
            });

            if agrees {
                words_by_slot.push(word_id);
                if extend(puzzle, words_by_slot) {
                    return true;
                }
                words_by_slot.pop();
            }
        }

        false
    }

    extend(puzzle, &mut vec![])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn node_consistency_matches_lengths(puzzle in arb_puzzle()) {
        let domains = Domains::node_consistent(&puzzle);

        for slot_id in 0..puzzle.slot_count() {
            for word_id in domains.options(slot_id).iter() {
                prop_assert_eq!(puzzle.word(word_id).len(), puzzle.slot(slot_id).length);
            }
        }
    }

    #[test]
    fn arc_consistency_is_a_fixed_point(puzzle in arb_puzzle()) {
        let mut domains = Domains::node_consistent(&puzzle);

        if establish_arc_consistency(&puzzle, &mut domains, None).is_ok() {
            prop_assert!(is_arc_consistent(&puzzle, &domains));

            let before = domains.clone();
            let rerun = establish_arc_consistency(&puzzle, &mut domains, None).unwrap();
            prop_assert_eq!(rerun.eliminations, 0);
            prop_assert_eq!(domains, before);
        }
    }

    #[test]
    fn overlaps_are_symmetric(puzzle in arb_puzzle()) {
        for a in 0..puzzle.slot_count() {
            for b in 0..puzzle.slot_count() {
                let forward = puzzle.overlap(a, b);
                let backward = puzzle.overlap(b, a).map(|(b_cell, a_cell)| (a_cell, b_cell));
                prop_assert_eq!(forward, backward);
                if let Some((a_cell, b_cell)) = forward {
                    prop_assert_eq!(puzzle.slot(a).cell(a_cell), puzzle.slot(b).cell(b_cell));
                }
            }
        }
    }

    #[test]
    fn fills_are_sound_and_complete(puzzle in arb_puzzle()) {
        let expected = brute_force_fill_exists(&puzzle);

        for value_ordering in [ValueOrdering::LeastConstraining, ValueOrdering::DomainMembership] {
            let options = FillOptions { value_ordering, max_states: None };

            match find_fill(&puzzle, &options) {
                Ok(result) => {
                    prop_assert!(expected, "found a fill the brute-force search missed");
                    prop_assert!(result.assignment.is_complete());
                    prop_assert!(result.assignment.is_consistent(&puzzle));
                }
                Err(_) => {
                    prop_assert!(!expected, "missed a fill");
                }
            }
        }
    }
}
