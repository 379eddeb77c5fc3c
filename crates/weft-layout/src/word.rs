//! The word store.
//!
//! Content arrives as a stream of atomic units in paragraph order: text
//! words, inline widgets, explicit breaks and float placeholders. Each unit
//! is a [`Word`] carrying its measured size, the properties of the space
//! following it, and bookkeeping for the line breaker: running totals from
//! the start of the candidate line and the cached fit quality of a break
//! right after it.

use std::ops::{Deref, Range};
use std::rc::Rc;

use ecow::EcoString;
use weft_library::{Abs, Extent, FloatRef, Style, WidgetRef};

use crate::badness::BadnessAndPenalty;

bitflags::bitflags! {
    /// Per-word boolean properties.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
    pub struct WordFlags: u8 {
        /// The word may be offered to the hyphenator.
        const CAN_BE_HYPHENATED = 1 << 0;
        /// The first fragment of a (possibly hyphenated) word.
        const WORD_START = 1 << 1;
        /// The last fragment of a (possibly hyphenated) word.
        const WORD_END = 1 << 2;
        /// For intrinsic minimum width, this word continues into the next
        /// one without a break opportunity.
        const UNBREAKABLE_FOR_MIN_WIDTH = 1 << 3;
        /// Fragments drawn as one run even though they are stored split.
        const DRAW_AS_ONE_UNIT = 1 << 4;
    }
}

/// The content of one atomic unit of the paragraph.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Content {
    /// A run of text without break opportunities inside.
    Text(EcoString),
    /// An inline child widget, sized by the host.
    Widget(WidgetRef),
    /// An explicit forced line break with extra vertical space.
    Break {
        /// Extra vertical space inserted below the line this break ends.
        space: Abs,
        /// Whether the next line must clear all floats.
        clear: bool,
    },
    /// A zero-size placeholder tying a float to a position in the text.
    Float {
        /// The out-of-flow widget.
        float: FloatRef,
        /// Whether the float manager has been told a position for it.
        placed: bool,
    },
}

impl Content {
    /// The text of this unit, if it is a text run.
    pub fn text(&self) -> Option<&EcoString> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One atomic content unit with its layout bookkeeping.
#[derive(Debug, Clone)]
pub struct Word {
    /// What this unit is.
    pub content: Content,
    /// The measured size, cached from the metrics provider.
    pub size: Extent,
    /// The width of the space following this word, as measured.
    pub orig_space: Abs,
    /// The width of the space after justification. Differs from
    /// `orig_space` only on justified lines.
    pub effective_space: Abs,
    /// How much the following space may grow.
    pub stretchability: Abs,
    /// How much the following space may shrink.
    pub shrinkability: Abs,
    /// Extra width when this word ends a line as a non-final fragment of a
    /// hyphenated word.
    pub hyphen_width: Abs,
    /// Boolean properties.
    pub flags: WordFlags,
    /// The shared resolved style.
    pub style: Rc<Style>,
    /// Accumulated width from the start of the candidate line, including
    /// this word and its hyphen width.
    pub total_width: Abs,
    /// Accumulated stretchability of the spaces before this word on the
    /// candidate line.
    pub total_stretchability: Abs,
    /// Accumulated shrinkability of the spaces before this word on the
    /// candidate line.
    pub total_shrinkability: Abs,
    /// The fit quality of a break right after this word. Valid only after
    /// accumulation for the current candidate line.
    pub bad_penalty: BadnessAndPenalty,
}

impl Word {
    /// Create a word with no space after it and breaking forbidden.
    pub fn new(content: Content, size: Extent, style: Rc<Style>) -> Self {
        Self {
            content,
            size,
            orig_space: Abs::zero(),
            effective_space: Abs::zero(),
            stretchability: Abs::zero(),
            shrinkability: Abs::zero(),
            hyphen_width: Abs::zero(),
            flags: WordFlags::WORD_START | WordFlags::WORD_END,
            style,
            total_width: Abs::zero(),
            total_stretchability: Abs::zero(),
            total_shrinkability: Abs::zero(),
            bad_penalty: BadnessAndPenalty::new(),
        }
    }

    /// Whether this word is an explicit forced break.
    pub fn is_break(&self) -> bool {
        matches!(self.content, Content::Break { .. })
    }

    /// Whether this word is a float placeholder.
    pub fn is_float(&self) -> bool {
        matches!(self.content, Content::Float { .. })
    }
}

/// The append-mostly sequence of words.
///
/// Indices are stable except across [`splice`](Self::splice), which inserts
/// hyphenation fragments in place of a single word and thereby shifts all
/// subsequent indices. Every index-keyed reference held outside the store
/// must be adjusted through the owner's single shift choke point afterwards.
#[derive(Debug, Default)]
pub struct WordStore {
    words: Vec<Word>,
}

impl WordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a word, returning its index.
    pub fn push(&mut self, word: Word) -> usize {
        self.words.push(word);
        self.words.len() - 1
    }

    /// Mutable access to a word.
    pub fn get_mut(&mut self, index: usize) -> &mut Word {
        &mut self.words[index]
    }

    /// Replace the word at `at` with the given fragments.
    ///
    /// Returns the number of additional words, i.e. how far every external
    /// index reference at or after `at + 1` must shift.
    pub fn splice(&mut self, at: usize, fragments: Vec<Word>) -> usize {
        assert!(at < self.words.len(), "splice index out of range");
        assert!(!fragments.is_empty(), "cannot splice in zero fragments");
        let added = fragments.len() - 1;
        self.words.splice(at..=at, fragments);
        added
    }

    /// The words in the given range.
    pub fn range(&self, range: Range<usize>) -> &[Word] {
        &self.words[range]
    }

    /// Mutable access to the words in the given range.
    pub fn range_mut(&mut self, range: Range<usize>) -> &mut [Word] {
        &mut self.words[range]
    }
}

impl Deref for WordStore {
    type Target = [Word];

    fn deref(&self) -> &Self::Target {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Word {
        Word::new(
            Content::Text(text.into()),
            Extent::new(Abs::px(10.0 * text.len() as f64), Abs::px(8.0), Abs::px(2.0)),
            Rc::new(Style::default()),
        )
    }

    #[test]
    fn test_splice_preserves_text() {
        let mut store = WordStore::new();
        store.push(word("alpha"));
        store.push(word("extraordinarily"));
        store.push(word("omega"));

        let added = store.splice(1, vec![word("extra"), word("ordin"), word("arily")]);
        assert_eq!(added, 2);
        assert_eq!(store.len(), 5);

        let rejoined: String = store
            .range(1..4)
            .iter()
            .filter_map(|w| w.content.text().map(|t| t.as_str()))
            .collect();
        assert_eq!(rejoined, "extraordinarily");
        assert_eq!(store[4].content.text().unwrap(), "omega");
    }

    #[test]
    #[should_panic(expected = "splice index out of range")]
    fn test_splice_out_of_range() {
        let mut store = WordStore::new();
        store.push(word("only"));
        store.splice(1, vec![word("x")]);
    }
}
