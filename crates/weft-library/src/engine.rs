//! Capability interfaces of the layout core.
//!
//! The core is synchronous and single-threaded: every layout pass runs to
//! completion on the calling thread and reaches its collaborators only
//! through the narrow interfaces bundled in an [`Engine`]. None of the
//! collaborators may hold references into the core's stores across a call
//! boundary; in particular, word indices obtained before a call into the
//! hyphenator must be re-fetched afterwards because hyphenation can splice
//! the word sequence.

use smallvec::SmallVec;

use crate::geom::{Abs, Extent};
use crate::styles::{Lang, Style};

/// A handle to an inline child widget, owned by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WidgetRef(pub usize);

/// A handle to an out-of-flow (floating) widget, owned by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FloatRef(pub usize);

/// Definition of the interface for text measurement.
///
/// Measurement must be pure: repeated calls with the same style and text must
/// return the same extent, otherwise layout output is unspecified (but must
/// not crash).
pub trait TextMeasurer {
    /// Measure a run of text in the given style.
    fn measure(&self, style: &Style, text: &str) -> Extent;

    /// The advance width of a single character in the given style.
    fn char_width(&self, style: &Style, c: char) -> Abs {
        self.measure(style, c.encode_utf8(&mut [0; 4])).width
    }
}

/// Definition of the interface to the out-of-flow manager.
///
/// Floats carve non-rectangular regions out of the content box. The line
/// breaker asks for the left and right border offsets at the vertical
/// position of each candidate line and reports tentative float positions
/// back as lines are committed.
pub trait FloatManager {
    /// The left border offset for a line at `y` with the given height.
    fn left_border(&self, y: Abs, height: Abs) -> Abs;

    /// The right border offset for a line at `y` with the given height.
    fn right_border(&self, y: Abs, height: Abs) -> Abs;

    /// Whether a left float intersects the vertical band at `y`.
    fn has_float_left(&self, y: Abs, height: Abs) -> bool;

    /// Whether a right float intersects the vertical band at `y`.
    fn has_float_right(&self, y: Abs, height: Abs) -> bool;

    /// Report the tentative vertical position of a float.
    fn tell_position(&mut self, float: FloatRef, y: Abs);

    /// The lowest vertical position that clears all known floats.
    fn clear_position(&self) -> Abs;
}

/// A float manager for content without any floats.
///
/// All borders are zero and all positions clear.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoFloats;

impl FloatManager for NoFloats {
    fn left_border(&self, _: Abs, _: Abs) -> Abs {
        Abs::zero()
    }

    fn right_border(&self, _: Abs, _: Abs) -> Abs {
        Abs::zero()
    }

    fn has_float_left(&self, _: Abs, _: Abs) -> bool {
        false
    }

    fn has_float_right(&self, _: Abs, _: Abs) -> bool {
        false
    }

    fn tell_position(&mut self, _: FloatRef, _: Abs) {}

    fn clear_position(&self) -> Abs {
        Abs::zero()
    }
}

/// Definition of the interface for hyphenation lookup.
pub trait Hyphenator {
    /// The legal break points within a word, as ascending byte offsets
    /// strictly inside the word. May be empty.
    fn hyphenate(&self, word: &str, lang: Lang) -> SmallVec<[usize; 4]>;
}

/// The default hyphenator, backed by embedded TeX hyphenation patterns.
#[derive(Debug, Default, Copy, Clone)]
pub struct Hyphenation;

impl Hyphenator for Hyphenation {
    fn hyphenate(&self, word: &str, lang: Lang) -> SmallVec<[usize; 4]> {
        let mut offsets = SmallVec::new();
        let Some(lang) = hypher_lang(lang) else { return offsets };

        let mut offset = 0;
        for syllable in hypher::hyphenate(word, lang) {
            offset += syllable.len();
            if offset < word.len() {
                offsets.push(offset);
            }
        }
        offsets
    }
}

/// Resolve a language tag to its hyphenation patterns, if any exist.
fn hypher_lang(lang: Lang) -> Option<hypher::Lang> {
    let bytes = lang.as_str().as_bytes().try_into().ok()?;
    hypher::Lang::from_iso(bytes)
}

/// Bundles the capabilities a layout pass needs.
///
/// An engine is constructed fresh for each entry into the core and borrows
/// its collaborators from the host for exactly that long.
pub struct Engine<'a> {
    /// Measures text in a resolved style.
    pub measurer: &'a dyn TextMeasurer,
    /// Supplies border offsets for floating content.
    pub floats: &'a mut dyn FloatManager,
    /// Looks up hyphenation break points.
    pub hyphenator: &'a dyn Hyphenator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenation_offsets_rejoin() {
        let word = "extraordinarily";
        let offsets = Hyphenation.hyphenate(word, Lang::ENGLISH);
        assert!(!offsets.is_empty());
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert!(offsets.iter().all(|&o| o > 0 && o < word.len()));
    }

    #[test]
    fn test_hyphenation_unknown_language() {
        use std::str::FromStr;
        let lang = Lang::from_str("xx").unwrap();
        assert!(Hyphenation.hyphenate("word", lang).is_empty());
    }
}
