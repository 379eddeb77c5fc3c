//! The line breaker.
//!
//! Breaking is greedy and local: each appended word either extends the open
//! line or triggers a search for the minimum-badness break point within it,
//! with lookahead only for hyphenation. The same `word_wrap` entry point
//! serves both streaming appends and the replay performed by a rewrap.

use std::ops::Range;
use std::rc::Rc;

use weft_library::{Abs, Engine, FloatRef, TextAlign};
use weft_utils::Numeric;

use crate::flow::TextFlow;
use crate::justify::{justify_line, text_offset, unjustify_line};
use crate::line::Line;
use crate::word::{Content, Word, WordFlags};

impl TextFlow {
    /// Process one word of the stream: accumulate its line data and commit
    /// as many lines as the content up to and including it requires.
    ///
    /// Hyphenation can splice the word sequence, so the index of the
    /// processed word may shift; the shifted index is returned and callers
    /// iterating the stream must continue from it.
    pub(crate) fn word_wrap(
        &mut self,
        engine: &mut Engine,
        index: usize,
        wrap_all: bool,
    ) -> usize {
        let mut index = index;
        self.accumulate_word_data(engine, index);

        loop {
            let first = self.lines.first_open_word();
            if index < first {
                // The word was swallowed by a line committed in an earlier
                // round of this loop.
                return index;
            }

            let penalty_index = self.penalty_index_for_new_line();
            let at_end = wrap_all && index + 1 == self.words.len();
            let word = &self.words[index];

            let forced = word.bad_penalty.line_must_be_broken(penalty_index) || at_end;
            let too_tight = word.bad_penalty.line_too_tight();
            let breakable_before = self.break_possible(first..index, penalty_index);

            if !forced
                && !(too_tight && (breakable_before || self.more_space_expected(engine)))
            {
                // Neither necessary nor useful to break yet; wait for more
                // content. A line that is too tight but has no break point
                // and no hope for more space overflows rather than being
                // left empty, since an empty line could never help.
                return index;
            }

            // The empty-range case: breaking is useful only because a float
            // border recedes further down, so everything open moves below.
            let empty_line = !forced && too_tight && !breakable_before;

            let mut break_end = if empty_line {
                first
            } else {
                let mut pos = self.search_min_bap(first, index, penalty_index, at_end);

                // Hyphenation can move fragments across the candidate break;
                // splice and search again while opportunities keep turning
                // up.
                loop {
                    let Some(candidate) =
                        self.consider_hyphenation(engine, first, pos)
                    else {
                        break;
                    };
                    let added = self.hyphenate_word(engine, candidate);
                    if added == 0 {
                        break;
                    }
                    if candidate <= index {
                        index += added;
                        for i in candidate..=index {
                            self.accumulate_word_data(engine, i);
                        }
                    }
                    pos = self.search_min_bap(first, index, penalty_index, at_end);
                }

                pos + 1
            };

            // A float anchored in the candidate line narrows it only once
            // the manager learns its position. Tell it, recompute once, and
            // take the second result as is; convergence for multiple
            // interacting floats is not guaranteed, so exactly one retry
            // pass is performed.
            if !self.temporary
                && let Some((float_index, float)) =
                    self.first_unplaced_float(first..break_end)
            {
                let (y, _) = self.next_line_band();
                engine.floats.tell_position(float, y);
                if let Content::Float { placed, .. } =
                    &mut self.words.get_mut(float_index).content
                {
                    *placed = true;
                }
                for i in first..=index {
                    self.accumulate_word_data(engine, i);
                }
                if !empty_line {
                    break_end =
                        self.search_min_bap(first, index, penalty_index, at_end) + 1;
                }
            }

            self.add_line(engine, first..break_end);

            // The remaining words now open a new line; their accumulated
            // data is relative to the old one and must be rebuilt before the
            // next round decides anything.
            for i in break_end..=index {
                self.accumulate_word_data(engine, i);
            }
        }
    }

    /// Recompute the running totals of word `index` from its predecessor and
    /// refresh its badness against the width available to the candidate
    /// line.
    pub(crate) fn accumulate_word_data(&mut self, engine: &mut Engine, index: usize) {
        let first = self.lines.first_open_word();
        debug_assert!(index >= first, "word {index} already committed");

        let word = &self.words[index];
        if index == first {
            self.open_ascent = word.size.ascent;
            self.open_descent = word.size.descent;
        } else {
            self.open_ascent.set_max(word.size.ascent);
            self.open_descent.set_max(word.size.descent);
        }

        // The hyphen of the predecessor only shows when the line breaks
        // there, so it leaves the totals again as soon as a word follows.
        let (total_width, total_stretchability, total_shrinkability) = if index == first
        {
            (word.size.width + word.hyphen_width, Abs::zero(), Abs::zero())
        } else {
            let prev = &self.words[index - 1];
            (
                prev.total_width - prev.hyphen_width
                    + prev.orig_space
                    + word.size.width
                    + word.hyphen_width,
                prev.total_stretchability + prev.stretchability,
                prev.total_shrinkability + prev.shrinkability,
            )
        };

        let ideal = self.available_width(engine);
        let word = self.words.get_mut(index);
        word.total_width = total_width;
        word.total_stretchability = total_stretchability;
        word.total_shrinkability = total_shrinkability;
        word.bad_penalty.calc_badness(
            total_width,
            ideal,
            total_stretchability,
            total_shrinkability,
        );
    }

    /// The width available to the candidate line, after float borders and
    /// a possible first-line indent.
    fn available_width(&self, engine: &Engine) -> Abs {
        let (y, height) = self.next_line_band();
        let mut avail = self.config.line_break_width
            - engine.floats.left_border(y, height)
            - engine.floats.right_border(y, height);
        if let Some(indent) = self.paragraph_indent() {
            avail -= indent;
        }
        avail
    }

    /// The vertical band the next line would occupy, estimated from the open
    /// words.
    pub(crate) fn next_line_band(&self) -> (Abs, Abs) {
        let y = self
            .lines
            .last()
            .map_or(Abs::zero(), |line| line.bottom() + line.break_space);
        let mut height = self.open_ascent + self.open_descent;
        if height.is_zero()
            && let Some(word) = self.words.get(self.lines.first_open_word())
        {
            height = word.style.font_size;
        }
        (y, height)
    }

    /// The first-line indent if the open line starts a paragraph.
    fn paragraph_indent(&self) -> Option<Abs> {
        let first = self.lines.first_open_word();
        let starts_paragraph =
            first == 0 || self.words.get(first - 1).is_some_and(Word::is_break);
        let style = &self.words.get(first)?.style;
        starts_paragraph.then(|| style.text_indent.at(style.font_size))
    }

    /// Whether a break is possible after any word in the range.
    fn break_possible(&self, range: Range<usize>, penalty_index: usize) -> bool {
        self.words
            .range(range)
            .iter()
            .any(|word| word.bad_penalty.line_can_be_broken(penalty_index))
    }

    /// Whether a float currently narrows the candidate line, so that lines
    /// further down can be expected to be wider once it ends.
    fn more_space_expected(&self, engine: &Engine) -> bool {
        let (y, height) = self.next_line_band();
        engine.floats.has_float_left(y, height)
            || engine.floats.has_float_right(y, height)
    }

    /// Which penalty slot applies to ending the open line: the second slot
    /// discourages a hyphen directly below another one.
    fn penalty_index_for_new_line(&self) -> usize {
        let Some(line) = self.lines.last() else { return 0 };
        if line.words.is_empty() {
            return 0;
        }
        let last = &self.words[line.words.end - 1];
        usize::from(
            last.hyphen_width > Abs::zero()
                && !last.flags.contains(WordFlags::WORD_END),
        )
    }

    /// Find the best break position in `[first, last]`.
    ///
    /// Ties favor the later candidate, which packs more words per line. With
    /// `correct_at_end`, the final word of all content is compared with its
    /// penalties zeroed: trailing content cannot be penalized for the text
    /// that would have followed it.
    fn search_min_bap(
        &self,
        first: usize,
        last: usize,
        penalty_index: usize,
        correct_at_end: bool,
    ) -> usize {
        debug_assert!(first <= last, "empty break search window");
        let mut pos = first;
        let mut best = None;
        for i in first..=last {
            let mut bap = self.words[i].bad_penalty;
            if correct_at_end && i == last {
                bap.set_penalties(0, 0);
            }
            if best.is_none_or(|b| bap.compare(penalty_index, &b).is_le()) {
                pos = i;
                best = Some(bap);
            }
        }
        pos
    }

    /// Whether hyphenating some word could improve the chosen break.
    ///
    /// A tight line may be able to push the tail of one of its own words to
    /// the next line; the search runs backward so the earliest tight
    /// candidate wins. A loose line may be able to pull the head of the
    /// following word up.
    fn consider_hyphenation(
        &self,
        engine: &Engine,
        first: usize,
        break_pos: usize,
    ) -> Option<usize> {
        let bap = &self.words[break_pos].bad_penalty;
        let mut candidate = None;

        if bap.line_loose()
            && break_pos + 1 < self.words.len()
            && self.is_hyphenation_candidate(engine, break_pos + 1)
        {
            candidate = Some(break_pos + 1);
        }

        if bap.line_tight() {
            for i in (first..=break_pos).rev() {
                if self.words[i].bad_penalty.line_tight()
                    && self.is_hyphenation_candidate(engine, i)
                {
                    candidate = Some(i);
                }
            }
        }

        candidate
    }

    /// Whether the word may be offered to the hyphenator at all.
    fn is_hyphenation_candidate(&self, engine: &Engine, index: usize) -> bool {
        let word = &self.words[index];
        let Content::Text(text) = &word.content else { return false };
        let Some(lang) = word.style.lang else { return false };
        word.flags.contains(WordFlags::CAN_BE_HYPHENATED)
            && word.style.wrap
            && !engine.hyphenator.hyphenate(text, lang).is_empty()
    }

    /// Splice the word at `index` into hyphenation fragments, re-measuring
    /// each substring, and renumber all index-keyed references.
    ///
    /// Returns the number of added words, zero if the hyphenator found no
    /// usable break point (the word is then no longer offered).
    pub(crate) fn hyphenate_word(&mut self, engine: &mut Engine, index: usize) -> usize {
        let (text, style) = {
            let word = &self.words[index];
            let Content::Text(text) = &word.content else { return 0 };
            (text.clone(), Rc::clone(&word.style))
        };
        let Some(lang) = style.lang else { return 0 };

        let mut offsets: Vec<usize> = engine
            .hyphenator
            .hyphenate(&text, lang)
            .into_iter()
            .filter(|&offset| {
                offset > 0 && offset < text.len() && text.is_char_boundary(offset)
            })
            .collect();
        offsets.dedup();

        if offsets.is_empty() {
            self.words.get_mut(index).flags.remove(WordFlags::CAN_BE_HYPHENATED);
            return 0;
        }

        let original = self.words[index].clone();
        let hyphen_width = engine.measurer.char_width(&style, '-');

        let mut bounds = Vec::with_capacity(offsets.len() + 2);
        bounds.push(0);
        bounds.extend(offsets);
        bounds.push(text.len());

        let mut fragments = Vec::with_capacity(bounds.len() - 1);
        for (k, pair) in bounds.windows(2).enumerate() {
            let part = &text[pair[0]..pair[1]];
            let size = engine.measurer.measure(&style, part);
            let mut fragment =
                Word::new(Content::Text(part.into()), size, Rc::clone(&style));

            fragment.flags = original.flags;
            fragment.flags.remove(WordFlags::CAN_BE_HYPHENATED);
            fragment.flags.insert(WordFlags::DRAW_AS_ONE_UNIT);
            if k > 0 {
                fragment.flags.remove(WordFlags::WORD_START);
            }

            if pair[1] == text.len() {
                // The final fragment takes over the original's line-end
                // role: its space, its break bias, even a hyphen it may
                // itself have carried from an earlier split.
                fragment.orig_space = original.orig_space;
                fragment.effective_space = original.effective_space;
                fragment.stretchability = original.stretchability;
                fragment.shrinkability = original.shrinkability;
                fragment.hyphen_width = original.hyphen_width;
                fragment.bad_penalty = original.bad_penalty;
            } else {
                fragment.flags.remove(WordFlags::WORD_END);
                fragment.hyphen_width = hyphen_width;
                fragment.bad_penalty.set_penalties(
                    self.config.hyphen_penalty,
                    self.config.consecutive_hyphen_penalty,
                );
            }
            fragments.push(fragment);
        }

        log::debug!("hyphenated {text:?} into {} fragments", fragments.len());
        let added = self.words.splice(index, fragments);
        self.shift_references(index, added);
        added
    }

    /// The first float placeholder in the range that has not been assigned a
    /// position yet.
    fn first_unplaced_float(&self, range: Range<usize>) -> Option<(usize, FloatRef)> {
        self.float_words
            .iter()
            .copied()
            .filter(|index| range.contains(index))
            .find_map(|index| match self.words[index].content {
                Content::Float { float, placed: false } => Some((index, float)),
                _ => None,
            })
    }

    /// Commit the words in `range` as a line.
    ///
    /// Computes the vertical metrics and the top offset, performs
    /// justification and alignment, hands out float positions, and appends
    /// the finished record to the line list.
    fn add_line(&mut self, engine: &mut Engine, range: Range<usize>) {
        let top = self
            .lines
            .last()
            .map_or(Abs::zero(), |line| line.bottom() + line.break_space);

        let mut box_ascent = Abs::zero();
        let mut box_descent = Abs::zero();
        let mut content_ascent = Abs::zero();
        let mut content_descent = Abs::zero();
        let mut margin_descent = Abs::zero();
        for word in self.words.range(range.clone()) {
            box_ascent.set_max(word.size.ascent);
            box_descent.set_max(word.size.descent);
            match word.content {
                Content::Text(_) => {
                    content_ascent.set_max(word.size.ascent);
                    content_descent.set_max(word.size.descent);
                }
                Content::Widget(_) => {
                    margin_descent
                        .set_max(word.size.descent + word.style.margin_bottom);
                }
                _ => {}
            }
        }
        debug_assert!(range.start < self.words.len(), "line without any open word");
        let style = Rc::clone(&self.words[range.start].style);

        if range.is_empty() {
            // An empty line still advances the flow by the height of the
            // content waiting to move below a float.
            box_ascent = self.open_ascent;
            box_descent = self.open_descent;
            if (box_ascent + box_descent).is_zero() {
                box_ascent = style.font_size;
            }
        }
        margin_descent.set_max(box_descent);

        let width = if range.is_empty() {
            Abs::zero()
        } else {
            self.words[range.end - 1].total_width
        };

        let height = box_ascent + box_descent;
        let left_border = engine.floats.left_border(top, height);
        let right_border = engine.floats.right_border(top, height);
        let indent = self.paragraph_indent().unwrap_or_else(Abs::zero);
        let avail = self.config.line_break_width - left_border - right_border - indent;
        let diff = avail - width;

        let ends_paragraph = (!range.is_empty()
            && self.words[range.end - 1].is_break())
            || (self.finalized && range.end == self.words.len());

        // Justified styles distribute the width difference over the interior
        // spaces. The closing line of a paragraph keeps its natural spaces,
        // unless skipping justification would make it overflow.
        if !range.is_empty() {
            let justify = style.align == TextAlign::Justify
                && (!ends_paragraph || diff < Abs::zero());
            let interior = self.words.range_mut(range.start..range.end - 1);
            if justify {
                justify_line(interior, diff);
            } else {
                unjustify_line(interior);
            }
        }

        let left_offset = left_border + indent + text_offset(style.align, avail, width);

        // Floats anchored on this line are positioned now at its top.
        if !self.temporary {
            let pending: Vec<(usize, FloatRef)> = self
                .float_words
                .iter()
                .copied()
                .filter(|index| range.contains(index))
                .filter_map(|index| match self.words[index].content {
                    Content::Float { float, placed: false } => Some((index, float)),
                    _ => None,
                })
                .collect();
            for (index, float) in pending {
                engine.floats.tell_position(float, top);
                if let Content::Float { placed, .. } =
                    &mut self.words.get_mut(index).content
                {
                    *placed = true;
                }
            }
        }

        let last_placed_float = self
            .float_words
            .iter()
            .copied()
            .take_while(|&index| index < range.end)
            .filter(|&index| {
                matches!(self.words[index].content, Content::Float { placed: true, .. })
            })
            .last();

        // Only the committed words enter the line's extremes record; the
        // open tail may still be waiting for its trailing spaces.
        let extremes = self.extremes.extremes_up_to(&self.words, range.end);

        let mut break_space = style.leading.at(style.font_size);
        if !range.is_empty()
            && let Content::Break { space, clear } = self.words[range.end - 1].content
        {
            break_space += space;
            if clear {
                let bottom = top + box_ascent + box_descent;
                break_space.set_max(engine.floats.clear_position() - bottom);
            }
        }

        let max_line_width = self
            .lines
            .last()
            .map_or(Abs::zero(), |line| line.max_line_width)
            .max(left_offset + width);

        log::trace!("committing line {range:?} at y {top:?} (width {width:?})");

        let temporary = self.temporary;
        self.lines.push(
            Line {
                words: range,
                top,
                box_ascent,
                box_descent,
                content_ascent,
                content_descent,
                margin_descent,
                break_space,
                left_offset,
                width,
                max_line_width,
                max_par_min: extremes.min_width,
                max_par_max: extremes.max_width,
                last_placed_float,
            },
            temporary,
        );
        self.request_resize();
    }
}
