//! Committed lines and their vertical geometry.

use std::ops::{Deref, Range};

use weft_library::Abs;

/// A finalized (or temporary) span of the word sequence.
///
/// Lines tile the word sequence without gaps: each line's range ends exactly
/// where the next one begins. A line's vertical extent is derived from the
/// maximum ascent and descent of its words; the content metrics ignore
/// widget margins and are what baseline-relative drawing uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// The words of this line, as a half-open index range. May be empty when
    /// a break is committed with no content available, e.g. between two
    /// forced breaks.
    pub words: Range<usize>,
    /// The distance from the top of the paragraph to the top of this line.
    pub top: Abs,
    /// The maximum ascent over all words, widget boxes included.
    pub box_ascent: Abs,
    /// The maximum descent over all words, widget boxes included.
    pub box_descent: Abs,
    /// The maximum ascent over the text content only.
    pub content_ascent: Abs,
    /// The maximum descent over the text content only.
    pub content_descent: Abs,
    /// The descent including widget bottom margins, for margin collapsing.
    pub margin_descent: Abs,
    /// The vertical gap between this line and the next.
    pub break_space: Abs,
    /// The horizontal offset of the line's content, as computed by
    /// alignment and float borders.
    pub left_offset: Abs,
    /// The natural width of the line's content.
    pub width: Abs,
    /// The widest line seen up to and including this one.
    pub max_line_width: Abs,
    /// The largest intrinsic paragraph minimum seen up to this line.
    pub max_par_min: Abs,
    /// The largest intrinsic paragraph maximum seen up to this line.
    pub max_par_max: Abs,
    /// The last float placeholder that had been assigned a position before
    /// this line was committed, if any.
    pub last_placed_float: Option<usize>,
}

impl Line {
    /// The height of this line.
    pub fn height(&self) -> Abs {
        self.box_ascent + self.box_descent
    }

    /// The distance from the paragraph top to the bottom of this line.
    pub fn bottom(&self) -> Abs {
        self.top + self.height()
    }
}

/// The sequence of committed lines.
///
/// Temporary lines created during intrinsic-size probing are appended after
/// the stable ones and discarded as a block; they never count as stable
/// history.
#[derive(Debug, Default)]
pub struct LineList {
    lines: Vec<Line>,
    stable: usize,
}

impl LineList {
    /// Create an empty line list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, enforcing contiguity with its predecessor.
    pub fn push(&mut self, line: Line, temporary: bool) {
        if let Some(prev) = self.lines.last() {
            assert_eq!(
                prev.words.end, line.words.start,
                "line ranges must tile the word sequence"
            );
        } else {
            assert_eq!(line.words.start, 0, "first line must start at word 0");
        }

        self.lines.push(line);
        if !temporary {
            assert_eq!(
                self.stable,
                self.lines.len() - 1,
                "cannot commit a stable line after temporary ones"
            );
            self.stable = self.lines.len();
        }
    }

    /// Discard all lines from the given index on.
    pub fn truncate(&mut self, len: usize) {
        self.lines.truncate(len);
        self.stable = self.stable.min(len);
    }

    /// Discard the temporary lines created since the last stable commit.
    pub fn remove_temporary_lines(&mut self) {
        self.lines.truncate(self.stable);
    }

    /// The number of stable lines.
    pub fn stable_len(&self) -> usize {
        self.stable
    }

    /// The first word index not covered by any committed line.
    pub fn first_open_word(&self) -> usize {
        self.lines.last().map_or(0, |line| line.words.end)
    }

    /// The index of the line containing the given word, if committed.
    pub fn line_of_word(&self, word: usize) -> Option<usize> {
        if word >= self.first_open_word() {
            return None;
        }
        // Ranges tile the word sequence, so binary search on the end bound.
        Some(self.lines.partition_point(|line| line.words.end <= word))
    }

    /// The index of the topmost line whose vertical extent reaches `y`.
    pub fn line_at_y(&self, y: Abs) -> Option<usize> {
        let index = self.lines.partition_point(|line| line.bottom() <= y);
        (index < self.lines.len()).then_some(index)
    }
}

impl Deref for LineList {
    type Target = [Line];

    fn deref(&self) -> &Self::Target {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(words: Range<usize>, top: f64, height: f64) -> Line {
        Line {
            words,
            top: Abs::px(top),
            box_ascent: Abs::px(height * 0.8),
            box_descent: Abs::px(height * 0.2),
            content_ascent: Abs::px(height * 0.8),
            content_descent: Abs::px(height * 0.2),
            margin_descent: Abs::px(height * 0.2),
            break_space: Abs::zero(),
            left_offset: Abs::zero(),
            width: Abs::zero(),
            max_line_width: Abs::zero(),
            max_par_min: Abs::zero(),
            max_par_max: Abs::zero(),
            last_placed_float: None,
        }
    }

    #[test]
    fn test_contiguity_and_lookup() {
        let mut list = LineList::new();
        list.push(line(0..3, 0.0, 10.0), false);
        list.push(line(3..3, 10.0, 10.0), false);
        list.push(line(3..7, 20.0, 10.0), false);

        assert_eq!(list.first_open_word(), 7);
        assert_eq!(list.line_of_word(0), Some(0));
        assert_eq!(list.line_of_word(2), Some(0));
        assert_eq!(list.line_of_word(3), Some(2));
        assert_eq!(list.line_of_word(6), Some(2));
        assert_eq!(list.line_of_word(7), None);

        assert_eq!(list.line_at_y(Abs::px(5.0)), Some(0));
        assert_eq!(list.line_at_y(Abs::px(25.0)), Some(2));
        assert_eq!(list.line_at_y(Abs::px(35.0)), None);
    }

    #[test]
    #[should_panic(expected = "tile the word sequence")]
    fn test_discontiguous_rejected() {
        let mut list = LineList::new();
        list.push(line(0..3, 0.0, 10.0), false);
        list.push(line(4..6, 10.0, 10.0), false);
    }

    #[test]
    fn test_temporary_lines_discarded() {
        let mut list = LineList::new();
        list.push(line(0..3, 0.0, 10.0), false);
        list.push(line(3..5, 10.0, 10.0), true);
        list.push(line(5..9, 20.0, 10.0), true);
        assert_eq!(list.len(), 3);
        assert_eq!(list.stable_len(), 1);

        list.remove_temporary_lines();
        assert_eq!(list.len(), 1);
        assert_eq!(list.first_open_word(), 3);
    }
}
