//! Intrinsic width extremes.
//!
//! The minimum possible content width (everything wrapped as tightly as
//! breaks allow) and the maximum possible content width (nothing wrapped at
//! all) do not depend on the available width, so they are tracked by an
//! accumulator that runs independently of actual line breaking. It may lag
//! behind the word store and catches up lazily; a hyphenation splice inside
//! an already processed paragraph triggers a paragraph-local rescan.

use std::ops::Range;

use weft_library::Abs;

use crate::word::{Word, WordFlags};

/// The intrinsic width extremes of the content.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Extremes {
    /// The minimum width at which no unbreakable unit overflows.
    pub min_width: Abs,
    /// The width the content would take if never wrapped.
    pub max_width: Abs,
}

impl Extremes {
    fn fold(&mut self, other: Self) {
        self.min_width.set_max(other.min_width);
        self.max_width.set_max(other.max_width);
    }
}

/// An accounting span delimited by forced breaks.
///
/// Distinct from a line: paragraph boundaries depend only on the content,
/// never on the available width.
#[derive(Debug, Clone)]
struct Paragraph {
    /// The words of this paragraph.
    words: Range<usize>,
    /// Width accumulated since the last possible break point.
    par_min: Abs,
    /// Width accumulated since the start of the paragraph.
    par_max: Abs,
    /// The largest `par_min` seen in this paragraph.
    max_par_min: Abs,
    /// The largest `par_max` seen in this paragraph.
    max_par_max: Abs,
    /// The space of the previous word, not yet counted towards `par_min`.
    /// A space only widens an unbreakable run once another word follows it.
    pending_min_space: Abs,
    /// The space of the previous word, not yet counted towards `par_max`.
    pending_max_space: Abs,
}

impl Paragraph {
    fn open(at: usize) -> Self {
        Self {
            words: at..at,
            par_min: Abs::zero(),
            par_max: Abs::zero(),
            max_par_min: Abs::zero(),
            max_par_max: Abs::zero(),
            pending_min_space: Abs::zero(),
            pending_max_space: Abs::zero(),
        }
    }

    /// Fold one word into the accumulators. Returns whether the word closes
    /// the paragraph.
    fn process(&mut self, index: usize, word: &Word) -> bool {
        self.words.end = index + 1;

        let closes = word.bad_penalty.line_must_be_broken(0);
        let breakable = word.bad_penalty.line_can_be_broken(0)
            && !word.flags.contains(WordFlags::UNBREAKABLE_FOR_MIN_WIDTH);

        // A hyphen can appear at a wrap before this word's space, so it
        // counts towards the minimum; an unwrapped line never shows one, so
        // it does not count towards the maximum.
        self.par_min += self.pending_min_space + word.size.width + word.hyphen_width;
        self.par_max += self.pending_max_space + word.size.width;

        if closes || breakable {
            self.max_par_min.set_max(self.par_min);
            self.par_min = Abs::zero();
            self.pending_min_space = Abs::zero();
        } else {
            self.pending_min_space = word.orig_space;
        }

        if closes {
            self.max_par_max.set_max(self.par_max);
            self.par_max = Abs::zero();
            self.pending_max_space = Abs::zero();
        } else {
            self.pending_max_space = word.orig_space;
        }

        closes
    }

    /// The extremes of this paragraph, pending accumulation included.
    fn extremes(&self) -> Extremes {
        Extremes {
            min_width: self.max_par_min.max(self.par_min),
            max_width: self.max_par_max.max(self.par_max),
        }
    }
}

/// Tracks intrinsic extremes across all paragraphs.
#[derive(Debug, Default)]
pub struct ExtremesAccumulator {
    paragraphs: Vec<Paragraph>,
    /// The first word not yet folded in.
    next: usize,
    /// Whether the current paragraph was closed by a forced break.
    closed: bool,
}

impl ExtremesAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in all words the accumulator has not seen yet.
    pub fn catch_up(&mut self, words: &[Word]) {
        while self.next < words.len() {
            let index = self.next;
            if self.closed || self.paragraphs.is_empty() {
                self.paragraphs.push(Paragraph::open(index));
                self.closed = false;
            }
            let par = self.paragraphs.last_mut().expect("paragraph was just opened");
            self.closed = par.process(index, &words[index]);
            self.next += 1;
        }
    }

    /// Adjust for a splice that replaced the word at `at` with `added + 1`
    /// fragments (`added == 0` for an in-place change).
    ///
    /// Boundaries behind the splice shift; a paragraph that already covered
    /// the changed word is rescanned, since the replacement may have
    /// different widths or break opportunities.
    pub fn splice(&mut self, words: &[Word], at: usize, added: usize) {
        if self.next <= at {
            return;
        }
        self.next += added;

        let mut rescan = None;
        for (i, par) in self.paragraphs.iter_mut().enumerate() {
            if par.words.start > at {
                par.words.start += added;
            }
            if par.words.end > at {
                par.words.end += added;
            }
            if par.words.contains(&at) {
                rescan = Some(i);
            }
        }

        if let Some(i) = rescan {
            let range = self.paragraphs[i].words.clone();
            let par = &mut self.paragraphs[i];
            *par = Paragraph::open(range.start);
            for index in range {
                par.process(index, &words[index]);
            }
        }
    }

    /// The extremes over all content folded in so far.
    pub fn extremes(&self) -> Extremes {
        let mut result = Extremes::default();
        for par in &self.paragraphs {
            result.fold(par.extremes());
        }
        result
    }

    /// The extremes of the first `end` words only.
    ///
    /// Unlike [`extremes`](Self::extremes), the result is independent of how
    /// far the accumulator has already read ahead, which keeps line records
    /// reproducible when a rewrap replays the word stream.
    pub fn extremes_up_to(&mut self, words: &[Word], end: usize) -> Extremes {
        self.catch_up(&words[..end]);

        let mut result = Extremes::default();
        for par in &self.paragraphs {
            if par.words.end <= end {
                result.fold(par.extremes());
            } else if par.words.start < end {
                let mut prefix = Paragraph::open(par.words.start);
                for index in par.words.start..end {
                    prefix.process(index, &words[index]);
                }
                result.fold(prefix.extremes());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use weft_library::{Extent, Style};

    use super::*;
    use crate::badness::PENALTY_FORCE_BREAK;
    use crate::word::Content;

    fn word(width: f64, breakable_after: bool) -> Word {
        let mut word = Word::new(
            Content::Text("x".into()),
            Extent::new(Abs::px(width), Abs::px(8.0), Abs::px(2.0)),
            Rc::new(Style::default()),
        );
        if breakable_after {
            word.orig_space = Abs::px(4.0);
            word.effective_space = word.orig_space;
            word.bad_penalty.set_penalties(0, 0);
        }
        word
    }

    fn forced_break() -> Word {
        let mut word = Word::new(
            Content::Break { space: Abs::zero(), clear: false },
            Extent::zero(),
            Rc::new(Style::default()),
        );
        word.bad_penalty.set_penalties(PENALTY_FORCE_BREAK, PENALTY_FORCE_BREAK);
        word
    }

    #[test]
    fn test_min_is_widest_unbreakable_unit() {
        let words = vec![word(30.0, true), word(50.0, true), word(20.0, true)];
        let mut acc = ExtremesAccumulator::new();
        acc.catch_up(&words);

        let ext = acc.extremes();
        assert_eq!(ext.min_width, Abs::px(50.0));
        // Max counts everything plus the interior spaces.
        assert_eq!(ext.max_width, Abs::px(30.0 + 4.0 + 50.0 + 4.0 + 20.0));
        assert!(ext.min_width <= ext.max_width);
    }

    #[test]
    fn test_unbreakable_run_accumulates() {
        let mut first = word(30.0, false);
        first.flags.insert(WordFlags::UNBREAKABLE_FOR_MIN_WIDTH);
        let words = vec![first, word(25.0, true)];
        let mut acc = ExtremesAccumulator::new();
        acc.catch_up(&words);
        assert_eq!(acc.extremes().min_width, Abs::px(55.0));
    }

    #[test]
    fn test_forced_break_splits_paragraphs() {
        let words =
            vec![word(30.0, false), forced_break(), word(10.0, true), word(15.0, true)];
        let mut acc = ExtremesAccumulator::new();
        acc.catch_up(&words);

        let ext = acc.extremes();
        assert_eq!(ext.min_width, Abs::px(30.0));
        // The first paragraph is wider unwrapped than the second (10 + 4 + 15).
        assert_eq!(ext.max_width, Abs::px(30.0));
        assert!(Abs::px(10.0 + 4.0 + 15.0) < ext.max_width);
    }

    #[test]
    fn test_lagging_catch_up_matches_eager() {
        let words = vec![word(30.0, true), word(50.0, true), word(20.0, true)];

        let mut eager = ExtremesAccumulator::new();
        for i in 0..words.len() {
            eager.catch_up(&words[..i + 1]);
        }

        let mut lazy = ExtremesAccumulator::new();
        lazy.catch_up(&words);

        assert_eq!(eager.extremes(), lazy.extremes());
    }
}
