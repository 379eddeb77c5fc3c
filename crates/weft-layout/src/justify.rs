//! Justification and alignment.

use weft_library::{Abs, TextAlign};
use weft_utils::Numeric;

use crate::word::Word;

/// Distribute a width delta over the spaces of a line.
///
/// The delta is spread proportionally to each interior word's stretchability
/// (shrinkability for a negative delta), writing the result into the words'
/// effective spaces. Only the spaces between words move: `words` must not
/// include the line's final word, whose space falls beyond the line.
///
/// Rounding is handled with a cumulative-remainder scheme: each word is
/// assigned the difference between its cumulative target and the previous
/// cumulative target, so the assigned deltas always sum to exactly the full
/// delta no matter how many words share it.
pub fn justify_line(words: &mut [Word], diff: Abs) {
    let capacity: Abs = if diff >= Abs::zero() {
        words.iter().map(|word| word.stretchability).sum()
    } else {
        words.iter().map(|word| word.shrinkability).sum()
    };

    if capacity.is_zero() {
        return;
    }

    let mut cumulative = Abs::zero();
    let mut assigned = Abs::zero();
    for word in words.iter_mut() {
        cumulative += if diff >= Abs::zero() {
            word.stretchability
        } else {
            word.shrinkability
        };
        let target = diff * (cumulative / capacity);
        word.effective_space = (word.orig_space + target - assigned).max(Abs::zero());
        assigned = target;
    }
}

/// Reset the effective spaces of a line back to their natural widths.
pub fn unjustify_line(words: &mut [Word]) {
    for word in words.iter_mut() {
        word.effective_space = word.orig_space;
    }
}

/// The horizontal offset of a line's content within the available band.
///
/// `avail` is the width between the float borders; justified lines behave
/// like left-aligned ones here because their spaces already absorb the
/// difference.
pub fn text_offset(align: TextAlign, avail: Abs, line_width: Abs) -> Abs {
    let slack = (avail - line_width).max(Abs::zero());
    match align {
        TextAlign::Left | TextAlign::Justify => Abs::zero(),
        TextAlign::Right => slack,
        TextAlign::Center => slack / 2.0,
    }
}
