use crate::grid_config::{Puzzle, PuzzleError};
use crate::word_list::Vocabulary;

/// Characters that mark a fillable cell in a structure template. Anything else is a block.
pub const FILLABLE_GLYPHS: [char; 2] = ['_', '.'];

/// Grid geometry read from a structure template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub height: usize,
    pub width: usize,
    pub fillable: Vec<bool>,
}

/// Parse a structure template, one row per non-blank line. Rows shorter than the longest row are
/// padded with blocks.
pub fn parse_structure(template: &str) -> Result<Structure, PuzzleError> {
    let rows: Vec<Vec<char>> = template
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.chars().collect())
            }
        })
        .collect();

    let width = rows.iter().map(|row| row.len()).max().ok_or(PuzzleError::EmptyTemplate)?;
    let height = rows.len();

    let fillable = rows
        .iter()
        .flat_map(|row| {
            (0..width).map(move |col| row.get(col).map_or(false, |c| FILLABLE_GLYPHS.contains(c)))
        })
        .collect();

    Ok(Structure { height, width, fillable })
}

/// Parse a word list with one word per line. Words are trimmed and uppercased; blank lines are
/// skipped.
pub fn parse_word_list(contents: &str) -> Vocabulary {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Generate a puzzle from a structure template and the contents of a word list.
pub fn generate_puzzle_from_template_string(
    template: &str,
    word_list: &str,
) -> Result<Puzzle, PuzzleError> {
    let Structure { height, width, fillable } = parse_structure(template)?;
    Puzzle::new(height, width, fillable, parse_word_list(word_list))
}
