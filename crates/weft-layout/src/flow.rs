//! The text flow.
//!
//! A [`TextFlow`] owns the word store, the committed lines and the intrinsic
//! extremes bookkeeping for one block of inline content. Content is appended
//! through the `push_*` operations and wrapped eagerly as it arrives; resizes
//! and child size changes invalidate a suffix of the lines, which
//! [`rewrap`](TextFlow::rewrap) recomputes by replaying the word stream from
//! the lowest dirty line.

use std::rc::Rc;

use ecow::EcoString;
use unicode_segmentation::UnicodeSegmentation;
use weft_library::{
    Abs, Engine, Extent, FloatRef, Point, Rect, Size, Style, WidgetRef,
};

use crate::badness::{PENALTY_FORCE_BREAK, Penalty};
use crate::extremes::{Extremes, ExtremesAccumulator};
use crate::line::{Line, LineList};
use crate::word::{Content, Word, WordFlags, WordStore};

/// A soft hyphen, marking a discretionary break inside a word.
const SHY: char = '\u{ad}';

/// Configuration of a text flow.
#[derive(Debug, Clone)]
pub struct Config {
    /// The width lines may occupy, before float borders are subtracted.
    pub line_break_width: Abs,
    /// The penalty for ending a line in a hyphen.
    pub hyphen_penalty: Penalty,
    /// The penalty for ending a line in a hyphen when the previous line
    /// already did.
    pub consecutive_hyphen_penalty: Penalty,
}

impl Config {
    /// A configuration with the given available width and default penalties.
    pub fn new(line_break_width: Abs) -> Self {
        Self {
            line_break_width,
            hyphen_penalty: 100,
            consecutive_hyphen_penalty: 800,
        }
    }
}

/// A named position in the word sequence.
///
/// Anchors are index-based back-references and survive hyphenation splices:
/// every splice renumbers them through the flow's single shift choke point.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// The host-assigned name.
    pub name: EcoString,
    /// The word index the anchor points at.
    pub word: usize,
}

/// The text-layout core for one block of inline content.
pub struct TextFlow {
    pub(crate) config: Config,
    pub(crate) words: WordStore,
    pub(crate) lines: LineList,
    pub(crate) extremes: ExtremesAccumulator,
    anchors: Vec<Anchor>,
    pub(crate) float_words: Vec<usize>,
    /// The lowest line index whose layout is stale, if any.
    dirty_from: Option<usize>,
    /// Set whenever committed geometry changes; the owning widget polls this
    /// to request a resize from its parent.
    resize_requested: bool,
    /// Whether trailing content has been committed by [`flush`](Self::flush).
    pub(crate) finalized: bool,
    /// While set, committed lines are temporary probes.
    pub(crate) temporary: bool,
    /// Running ascent estimate of the open line.
    pub(crate) open_ascent: Abs,
    /// Running descent estimate of the open line.
    pub(crate) open_descent: Abs,
}

impl TextFlow {
    /// Create an empty flow.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            words: WordStore::new(),
            lines: LineList::new(),
            extremes: ExtremesAccumulator::new(),
            anchors: Vec::new(),
            float_words: Vec::new(),
            dirty_from: None,
            resize_requested: false,
            finalized: false,
            temporary: false,
            open_ascent: Abs::zero(),
            open_descent: Abs::zero(),
        }
    }

    /// The words appended so far.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The committed lines.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Append a word of text.
    pub fn push_word(&mut self, engine: &mut Engine, text: EcoString, style: Rc<Style>) {
        let size = engine.measurer.measure(&style, &text);
        let mut word = Word::new(Content::Text(text), size, style);
        if word.style.hyphenate && word.style.wrap && word.style.lang.is_some() {
            word.flags.insert(WordFlags::CAN_BE_HYPHENATED);
        }
        let index = self.append(word);
        self.word_wrap(engine, index, false);
    }

    /// Attach a breakable space to the most recent word.
    ///
    /// Does nothing at the very start of the flow; leading whitespace never
    /// produces content.
    pub fn push_space(&mut self, engine: &mut Engine, style: &Style) {
        let Some(last) = self.words.len().checked_sub(1) else { return };
        let space = engine.measurer.char_width(style, ' ');
        let word = self.words.get_mut(last);
        word.orig_space = space;
        word.effective_space = space;
        word.stretchability = style.stretchability(space);
        word.shrinkability = style.shrinkability(space);
        word.flags.remove(WordFlags::UNBREAKABLE_FOR_MIN_WIDTH);
        if style.wrap {
            word.bad_penalty.set_penalties(0, 0);
        }
        // If the extremes bookkeeping has read past this word, its break
        // opportunity changed under it.
        self.extremes.splice(&self.words, last, 0);
    }

    /// Append an explicit forced break with extra vertical space below the
    /// line it ends.
    pub fn push_break(&mut self, engine: &mut Engine, space: Abs, style: Rc<Style>) {
        self.push_break_impl(engine, space, false, style);
    }

    /// Append a forced break below which the flow clears all floats.
    pub fn push_clear_break(&mut self, engine: &mut Engine, style: Rc<Style>) {
        self.push_break_impl(engine, Abs::zero(), true, style);
    }

    fn push_break_impl(
        &mut self,
        engine: &mut Engine,
        space: Abs,
        clear: bool,
        style: Rc<Style>,
    ) {
        let mut word =
            Word::new(Content::Break { space, clear }, Extent::zero(), style);
        word.bad_penalty.set_penalties(PENALTY_FORCE_BREAK, PENALTY_FORCE_BREAK);
        let index = self.append(word);
        self.word_wrap(engine, index, false);
    }

    /// Append an inline child widget with the given size.
    pub fn push_widget(
        &mut self,
        engine: &mut Engine,
        widget: WidgetRef,
        size: Extent,
        style: Rc<Style>,
    ) {
        let word = Word::new(Content::Widget(widget), size, style);
        let index = self.append(word);
        self.word_wrap(engine, index, false);
    }

    /// Append a zero-size placeholder for an out-of-flow widget.
    ///
    /// The float manager learns the float's vertical position when the line
    /// containing the placeholder is found.
    pub fn push_float(&mut self, engine: &mut Engine, float: FloatRef, style: Rc<Style>) {
        let word =
            Word::new(Content::Float { float, placed: false }, Extent::zero(), style);
        let index = self.append(word);
        self.float_words.push(index);
        self.word_wrap(engine, index, false);
    }

    /// Mark a discretionary break point after the most recent word.
    pub fn push_soft_hyphen(&mut self, engine: &mut Engine) {
        let Some(last) = self.words.len().checked_sub(1) else { return };
        let (hyphen_penalty, consecutive) =
            (self.config.hyphen_penalty, self.config.consecutive_hyphen_penalty);
        let hyphen_width = {
            let word = &self.words[last];
            engine.measurer.char_width(&word.style, '-')
        };
        let word = self.words.get_mut(last);
        word.hyphen_width = hyphen_width;
        word.flags.remove(WordFlags::WORD_END);
        word.flags.insert(WordFlags::DRAW_AS_ONE_UNIT);
        word.bad_penalty.set_penalties(hyphen_penalty, consecutive);

        self.extremes.splice(&self.words, last, 0);

        // The hyphen width enters the word's running totals.
        if last >= self.lines.first_open_word() {
            self.accumulate_word_data(engine, last);
        } else {
            self.mark_change(last);
        }
    }

    /// Append a styled run of text, splitting it into words and spaces.
    ///
    /// Whitespace collapses; soft hyphens become discretionary breaks.
    pub fn push_text(&mut self, engine: &mut Engine, text: &str, style: &Rc<Style>) {
        for segment in text.split_word_bounds() {
            if segment.chars().all(char::is_whitespace) {
                self.push_space(engine, style);
                continue;
            }
            for (i, piece) in segment.split(SHY).enumerate() {
                if i > 0 {
                    self.push_soft_hyphen(engine);
                }
                if !piece.is_empty() {
                    self.push_word(engine, piece.into(), Rc::clone(style));
                }
            }
        }
    }

    /// Register a named anchor at the current end of the word sequence.
    pub fn add_anchor(&mut self, name: EcoString) {
        self.anchors.push(Anchor { name, word: self.words.len() });
    }

    /// The word index a named anchor currently points at.
    pub fn anchor_word(&self, name: &str) -> Option<usize> {
        self.anchors.iter().find(|anchor| anchor.name == name).map(|anchor| anchor.word)
    }

    /// The vertical position of a named anchor, once its line is committed.
    pub fn anchor_position(&self, name: &str) -> Option<Abs> {
        let word = self.anchor_word(name)?;
        let line = self.lines.line_of_word(word)?;
        Some(self.lines[line].top)
    }

    /// Commit all trailing content into a final line.
    pub fn flush(&mut self, engine: &mut Engine) {
        self.finalized = true;
        let len = self.words.len();
        if self.lines.first_open_word() < len {
            self.word_wrap(engine, len - 1, true);
        }
    }

    /// Change the available width, invalidating the entire layout.
    pub fn set_line_break_width(&mut self, width: Abs) {
        if self.config.line_break_width != width {
            self.config.line_break_width = width;
            self.mark_dirty_line(0);
        }
    }

    /// Record that the word at the given index changed and which lines that
    /// invalidates.
    pub fn mark_change(&mut self, word: usize) {
        let line = self.lines.line_of_word(word).unwrap_or(self.lines.stable_len());
        self.mark_dirty_line(line);
    }

    /// Update the size of an inline child widget.
    pub fn update_widget_size(&mut self, widget: WidgetRef, size: Extent) {
        let Some(index) = self
            .words
            .iter()
            .position(|word| word.content == Content::Widget(widget))
        else {
            return;
        };
        self.words.get_mut(index).size = size;
        self.extremes.splice(&self.words, index, 0);
        self.mark_change(index);
    }

    /// Re-run line breaking for the invalidated suffix of the layout.
    ///
    /// Lines before the lowest dirty line keep their geometry untouched;
    /// everything after is truncated and rebuilt by replaying `word_wrap`
    /// over the remaining words.
    pub fn rewrap(&mut self, engine: &mut Engine) {
        let Some(from) = self.dirty_from.take() else { return };
        let from = from.min(self.lines.stable_len());

        self.lines.remove_temporary_lines();
        self.lines.truncate(from);
        let start = self.lines.first_open_word();
        log::debug!("rewrapping from line {from} (word {start})");

        // Floats beyond the stable prefix get fresh positions on replay.
        for i in start..self.words.len() {
            if let Content::Float { placed, .. } = &mut self.words.get_mut(i).content {
                *placed = false;
            }
        }

        let mut index = start;
        while index < self.words.len() {
            index = self.word_wrap(engine, index, false) + 1;
        }

        if self.finalized {
            let len = self.words.len();
            if self.lines.first_open_word() < len {
                self.word_wrap(engine, len - 1, true);
            }
        }
    }

    /// Whether a rewrap is pending.
    pub fn needs_rewrap(&self) -> bool {
        self.dirty_from.is_some()
    }

    /// Whether committed geometry changed since the last call; the owner
    /// forwards this as a resize request to its parent.
    pub fn take_resize_request(&mut self) -> bool {
        std::mem::take(&mut self.resize_requested)
    }

    /// The intrinsic width extremes of the content appended so far.
    pub fn extremes(&mut self) -> Extremes {
        self.extremes.catch_up(&self.words);
        self.extremes.extremes()
    }

    /// The size of the committed layout.
    pub fn extent(&self) -> Size {
        let Some(last) = self.lines.last() else { return Size::zero() };
        let height = last.top + last.box_ascent + last.margin_descent;
        Size::new(last.max_line_width, height)
    }

    /// Measure how tall the content would be if all trailing words were
    /// committed, without making those lines part of the stable layout.
    pub fn probe_extent(&mut self, engine: &mut Engine) -> Size {
        let len = self.words.len();
        let open = self.lines.first_open_word();
        if open >= len {
            return self.extent();
        }

        self.temporary = true;
        self.word_wrap(engine, len - 1, true);
        let size = self.extent();
        self.lines.remove_temporary_lines();
        self.temporary = false;

        // The probe reset per-line accumulation; rebuild it for the words
        // that are open again.
        for index in self.lines.first_open_word()..self.words.len() {
            self.accumulate_word_data(engine, index);
        }

        size
    }

    /// The inline widget at the given point, if any.
    pub fn widget_at(&self, point: Point) -> Option<WidgetRef> {
        let line = &self.lines[self.lines.line_at_y(point.y)?];
        let mut x = line.left_offset;
        for word in self.words.range(line.words.clone()) {
            let next = x + word.size.width;
            if point.x >= x && point.x < next {
                if let Content::Widget(widget) = word.content {
                    return Some(widget);
                }
                return None;
            }
            x = next + word.effective_space;
        }
        None
    }

    /// Call `f` once per line intersecting the clip rectangle, with the
    /// line's words and its clipped bounding rectangle.
    pub fn draw(&self, clip: Rect, mut f: impl FnMut(usize, &Line, &[Word], Rect)) {
        let start = self.lines.partition_point(|line| line.bottom() <= clip.top());
        for (offset, line) in self.lines[start..].iter().enumerate() {
            if line.top >= clip.bottom() {
                break;
            }
            let bounds = Rect::new(
                Point::new(line.left_offset, line.top),
                Size::new(line.width, line.height()),
            );
            let words = self.words.range(line.words.clone());
            f(start + offset, line, words, bounds.intersect(clip));
        }
    }

    /// Append a word to the store, maintaining the cross-word flags.
    fn append(&mut self, mut word: Word) -> usize {
        self.finalized = false;
        if let Some(prev_index) = self.words.len().checked_sub(1) {
            let prev = self.words.get_mut(prev_index);

            // No break opportunity after the previous word means it cannot
            // end a minimum-width line either.
            if !prev.bad_penalty.line_can_be_broken(0) && !prev.is_break() {
                prev.flags.insert(WordFlags::UNBREAKABLE_FOR_MIN_WIDTH);
            }

            // Continuation after a soft hyphen: the two halves belong to one
            // word.
            if !prev.flags.contains(WordFlags::WORD_END)
                && matches!(prev.content, Content::Text(_))
                && matches!(word.content, Content::Text(_))
            {
                word.flags.remove(WordFlags::WORD_START);
                word.flags.insert(WordFlags::DRAW_AS_ONE_UNIT);
            }
        }
        self.words.push(word)
    }

    /// The single choke point adjusting every word-index-keyed reference
    /// after a splice at `at` that added `added` words.
    pub(crate) fn shift_references(&mut self, at: usize, added: usize) {
        for index in &mut self.float_words {
            if *index >= at {
                *index += added;
            }
        }
        for anchor in &mut self.anchors {
            if anchor.word >= at {
                anchor.word += added;
            }
        }
        self.extremes.splice(&self.words, at, added);
    }

    /// Note that a line's worth of geometry changed.
    pub(crate) fn request_resize(&mut self) {
        if !self.temporary {
            self.resize_requested = true;
        }
    }

    fn mark_dirty_line(&mut self, line: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(line, |dirty| dirty.min(line)));
    }
}
