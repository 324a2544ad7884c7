use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the Vocabulary's `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn new(string: String) -> Word {
        let chars = string.chars().collect();
        Word { string, chars }
    }

    /// Length in chars, which is the unit slot lengths and overlap offsets are measured in.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, cell_idx: usize) -> Option<char> {
        self.chars.get(cell_idx).copied()
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.string)
    }
}

/// The global set of words available to every slot. Duplicates are dropped on construction,
/// keeping the first occurrence, so word ids follow input order.
#[derive(Clone, Default)]
pub struct Vocabulary {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl Vocabulary {
    pub fn new<I, S>(words: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Vocabulary::default();
        for word in words {
            vocabulary.insert(word.into());
        }
        vocabulary
    }

    /// Add a word if it isn't already present, returning its id either way.
    pub fn insert(&mut self, string: String) -> WordId {
        if let Some(&word_id) = self.ids_by_string.get(&string) {
            return word_id;
        }

        let word_id = self.words.len();
        self.ids_by_string.insert(string.clone(), word_id);
        self.words.push(Word::new(string));
        word_id
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word_id: WordId) -> Option<&Word> {
        self.words.get(word_id)
    }

    pub fn id_of(&self, string: &str) -> Option<WordId> {
        self.ids_by_string.get(string).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> {
        self.words.iter().enumerate()
    }
}

impl std::ops::Index<WordId> for Vocabulary {
    type Output = Word;

    fn index(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Vocabulary {
        Vocabulary::new(iter)
    }
}

impl Debug for Vocabulary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}
