use crate::backtracking_search::Assignment;
use crate::grid_config::Puzzle;

/// Glyph used for blocked cells in rendered output.
pub const BLOCK_GLYPH: char = '#';

/// Glyph used for fillable cells the assignment doesn't cover.
pub const EMPTY_GLYPH: char = '.';

/// Return a 2D array of the letter in each cell, `None` for blocks and unfilled cells.
pub fn letter_grid(puzzle: &Puzzle, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    (0..puzzle.height())
        .map(|row| {
            (0..puzzle.width())
                .map(|col| assignment.letter_at(puzzle, (row, col)))
                .collect()
        })
        .collect()
}

/// Turn the given puzzle and assignment into a rendered string, one line per row.
pub fn render_grid(puzzle: &Puzzle, assignment: &Assignment) -> String {
    letter_grid(puzzle, assignment)
        .into_iter()
        .enumerate()
        .map(|(row, letters)| {
            letters
                .into_iter()
                .enumerate()
                .map(|(col, letter)| {
                    if puzzle.is_fillable(row, col) {
                        letter.unwrap_or(EMPTY_GLYPH)
                    } else {
                        BLOCK_GLYPH
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
