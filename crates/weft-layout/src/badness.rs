//! Fit quality of candidate lines.
//!
//! Each word caches a [`BadnessAndPenalty`] describing how good a line break
//! immediately after it would be. The badness half measures how far the
//! line's natural width deviates from the available width, cubic in the
//! stretch or shrink ratio of its spaces. The penalty half carries the bias
//! imposed at the break point itself: zero after an ordinary space, a finite
//! cost for hyphenation, negative infinity for a forced break and positive
//! infinity where breaking is forbidden.

use std::cmp::Ordering;

use weft_library::Abs;
use weft_utils::Numeric;

/// A penalty value: a finite signed magnitude or one of the two sentinels.
pub type Penalty = i64;

/// Breaking here is forbidden.
pub const PENALTY_PROHIBIT_BREAK: Penalty = i64::MAX;

/// Breaking here is mandatory.
pub const PENALTY_FORCE_BREAK: Penalty = i64::MIN;

/// Finite penalties are given in percent of a badness unit and scaled into
/// the cubic badness range for comparison: 100³ / 100.
const PENALTY_SCALE: i64 = 100 * 100 * 100 / 100;

/// Stretch ratios above this are no longer distinguished by value.
const QUITE_LOOSE_RATIO: i64 = 1024;

/// The categories a line's fit falls into.
///
/// Infinity levels, from lowest to highest. Two values are compared level by
/// level from the top; the first level at which they differ decides. Plain
/// badness and finite penalties only ever matter when both sides agree on
/// all the categorical levels above.
const INF_VALUE: u8 = 0;
const INF_LARGE: u8 = 1;
const INF_NOT_STRETCHABLE: u8 = 2;
const INF_TOO_TIGHT: u8 = 3;
const INF_PENALTIES: u8 = 4;

/// The badness part of the fit, a tagged state rather than a plain number.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Badness {
    /// The line is too short, but contains nothing stretchable.
    NotStretchable,
    /// The stretch ratio is so large that exact values don't matter anymore.
    QuiteLoose,
    /// A finite cubic badness value.
    Value(i64),
    /// The line cannot be shrunk enough to fit.
    TooTight,
}

/// How well a line that breaks after a given word fits the available width,
/// combined with the penalties for breaking there.
///
/// Total order: see [`compare`](Self::compare).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BadnessAndPenalty {
    badness: Badness,
    /// The signed stretch (positive) or shrink (negative) ratio, times 100.
    /// Kept for the loose/tight predicates.
    ratio: i64,
    /// Two independent penalty slots. Which slot applies is chosen by the
    /// caller per comparison; the line breaker uses slot 1 when the previous
    /// line already ended in a hyphen.
    penalty: [Penalty; 2],
}

impl BadnessAndPenalty {
    /// A perfectly fitting line with breaking forbidden.
    pub fn new() -> Self {
        Self {
            badness: Badness::Value(0),
            ratio: 0,
            penalty: [PENALTY_PROHIBIT_BREAK; 2],
        }
    }

    /// Compute the badness of a line with the given total and ideal widths.
    ///
    /// The penalty slots are left untouched, so the badness can be refreshed
    /// whenever the accumulated widths change without re-deriving the break
    /// bias from the content.
    pub fn calc_badness(
        &mut self,
        total_width: Abs,
        ideal_width: Abs,
        total_stretchability: Abs,
        total_shrinkability: Abs,
    ) {
        self.ratio = 0;

        if total_width == ideal_width {
            self.badness = Badness::Value(0);
        } else if total_width < ideal_width {
            if total_stretchability.is_zero() {
                self.badness = Badness::NotStretchable;
            } else {
                let ratio = ratio100(ideal_width - total_width, total_stretchability);
                self.ratio = ratio;
                self.badness = if ratio > QUITE_LOOSE_RATIO {
                    Badness::QuiteLoose
                } else {
                    Badness::Value(cube(ratio))
                };
            }
        } else if total_shrinkability.is_zero() {
            self.badness = Badness::TooTight;
        } else {
            let ratio = ratio100(ideal_width - total_width, total_shrinkability);
            self.ratio = ratio;
            self.badness = if ratio <= -100 {
                Badness::TooTight
            } else {
                Badness::Value(cube(ratio).saturating_neg())
            };
        }
    }

    /// Set both penalty slots.
    ///
    /// Finite penalties are scaled into the badness range; the infinity
    /// sentinels pass through unchanged and dominate all finite values.
    pub fn set_penalties(&mut self, penalty1: Penalty, penalty2: Penalty) {
        self.set_penalty(0, penalty1);
        self.set_penalty(1, penalty2);
    }

    /// Set a single penalty slot.
    pub fn set_penalty(&mut self, index: usize, penalty: Penalty) {
        self.penalty[index] =
            if penalty == PENALTY_PROHIBIT_BREAK || penalty == PENALTY_FORCE_BREAK {
                penalty
            } else {
                penalty.saturating_mul(PENALTY_SCALE)
            };
    }

    /// Whether the line is on the loose side: its spaces would have to
    /// stretch (or it cannot stretch at all).
    pub fn line_loose(&self) -> bool {
        match self.badness {
            Badness::NotStretchable | Badness::QuiteLoose => true,
            Badness::Value(_) => self.ratio > 0,
            Badness::TooTight => false,
        }
    }

    /// Whether the line is on the tight side: its spaces would have to
    /// shrink.
    pub fn line_tight(&self) -> bool {
        match self.badness {
            Badness::TooTight => true,
            Badness::Value(_) => self.ratio < 0,
            _ => false,
        }
    }

    /// Whether the line cannot be shrunk enough to fit.
    pub fn line_too_tight(&self) -> bool {
        self.badness == Badness::TooTight
    }

    /// Whether a break after this word is mandatory.
    pub fn line_must_be_broken(&self, penalty_index: usize) -> bool {
        self.penalty[penalty_index] == PENALTY_FORCE_BREAK
    }

    /// Whether a break after this word is permitted.
    pub fn line_can_be_broken(&self, penalty_index: usize) -> bool {
        self.penalty[penalty_index] != PENALTY_PROHIBIT_BREAK
    }

    /// Compare two candidate breaks, smaller meaning better.
    ///
    /// Walks the infinity levels from the penalty-dominated top to the plain
    /// value bottom, summing each side's badness and penalty contribution per
    /// level; the first level at which the sums differ decides. This makes
    /// any infinite penalty or extreme badness state outrank every finite
    /// badness, while breaks that agree categorically are decided by value.
    pub fn compare(&self, penalty_index: usize, other: &Self) -> Ordering {
        for level in (INF_VALUE..=INF_PENALTIES).rev() {
            let this = self
                .badness_contribution(level)
                .saturating_add(self.penalty_contribution(penalty_index, level));
            let that = other
                .badness_contribution(level)
                .saturating_add(other.penalty_contribution(penalty_index, level));
            if this != that {
                return this.cmp(&that);
            }
        }
        Ordering::Equal
    }

    /// This badness' contribution at the given infinity level.
    fn badness_contribution(&self, level: u8) -> i64 {
        match self.badness {
            Badness::NotStretchable => i64::from(level == INF_NOT_STRETCHABLE),
            Badness::QuiteLoose => i64::from(level == INF_LARGE),
            Badness::TooTight => i64::from(level == INF_TOO_TIGHT),
            Badness::Value(value) => {
                if level == INF_VALUE {
                    value
                } else {
                    0
                }
            }
        }
    }

    /// A penalty slot's contribution at the given infinity level.
    fn penalty_contribution(&self, index: usize, level: u8) -> i64 {
        match self.penalty[index] {
            PENALTY_FORCE_BREAK => -i64::from(level == INF_PENALTIES),
            PENALTY_PROHIBIT_BREAK => i64::from(level == INF_PENALTIES),
            finite => {
                if level == INF_VALUE {
                    finite
                } else {
                    0
                }
            }
        }
    }
}

impl Default for BadnessAndPenalty {
    fn default() -> Self {
        Self::new()
    }
}

/// The stretch or shrink ratio times 100, as an integer.
fn ratio100(diff: Abs, capacity: Abs) -> i64 {
    (100.0 * (diff / capacity)).round() as i64
}

/// The saturating cube of a ratio.
fn cube(ratio: i64) -> i64 {
    ratio.saturating_mul(ratio).saturating_mul(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badness(total: f64, ideal: f64, stretch: f64, shrink: f64) -> BadnessAndPenalty {
        let mut bap = BadnessAndPenalty::new();
        bap.calc_badness(
            Abs::px(total),
            Abs::px(ideal),
            Abs::px(stretch),
            Abs::px(shrink),
        );
        bap.set_penalties(0, 0);
        bap
    }

    #[test]
    fn test_exact_fit_beats_everything_finite() {
        let exact = badness(100.0, 100.0, 10.0, 10.0);
        let loose = badness(80.0, 100.0, 10.0, 10.0);
        let tight = badness(105.0, 100.0, 10.0, 10.0);
        assert_eq!(exact.compare(0, &loose), Ordering::Less);
        assert_eq!(exact.compare(0, &tight), Ordering::Less);
    }

    #[test]
    fn test_category_order() {
        // Finite < quite loose < not stretchable < too tight.
        let finite = badness(80.0, 100.0, 10.0, 10.0);
        let quite_loose = badness(0.0, 10_000.0, 10.0, 10.0);
        let not_stretchable = badness(80.0, 100.0, 0.0, 10.0);
        let too_tight = badness(200.0, 100.0, 10.0, 10.0);
        assert_eq!(finite.compare(0, &quite_loose), Ordering::Less);
        assert_eq!(quite_loose.compare(0, &not_stretchable), Ordering::Less);
        assert_eq!(not_stretchable.compare(0, &too_tight), Ordering::Less);
    }

    #[test]
    fn test_infinite_penalties_dominate() {
        let mut forbidden = badness(100.0, 100.0, 10.0, 10.0);
        forbidden.set_penalties(PENALTY_PROHIBIT_BREAK, PENALTY_PROHIBIT_BREAK);
        let mut forced = badness(200.0, 100.0, 0.0, 0.0);
        forced.set_penalties(PENALTY_FORCE_BREAK, PENALTY_FORCE_BREAK);
        let plain = badness(80.0, 100.0, 10.0, 10.0);

        assert_eq!(forced.compare(0, &plain), Ordering::Less);
        assert_eq!(plain.compare(0, &forbidden), Ordering::Less);
        assert_eq!(forced.compare(0, &forbidden), Ordering::Less);

        assert!(forced.line_must_be_broken(0));
        assert!(!forbidden.line_can_be_broken(0));
        assert!(plain.line_can_be_broken(0));
    }

    #[test]
    fn test_cubic_growth() {
        // Ratio 50 cubes to 125000, ratio 100 to 1000000.
        let mild = badness(95.0, 100.0, 10.0, 10.0);
        let strong = badness(90.0, 100.0, 10.0, 10.0);
        assert_eq!(mild.compare(0, &strong), Ordering::Less);
        assert!(mild.line_loose());
        assert!(!mild.line_tight());
    }

    #[test]
    fn test_shrink_side() {
        let tight = badness(105.0, 100.0, 10.0, 10.0);
        assert!(tight.line_tight());
        assert!(!tight.line_too_tight());

        // Shrink ratio at or below -100 is hopeless.
        let hopeless = badness(110.0, 100.0, 10.0, 10.0);
        assert!(hopeless.line_too_tight());
    }

    #[test]
    fn test_penalty_scaling_comparable_to_badness() {
        // A penalty of 100 equals the badness of a full stretch ratio of 100.
        let mut penalized = badness(100.0, 100.0, 10.0, 10.0);
        penalized.set_penalties(100, 100);
        let stretched = badness(90.0, 100.0, 10.0, 10.0);
        assert_eq!(penalized.compare(0, &stretched), Ordering::Equal);
    }

    #[test]
    fn test_ordering_transitive() {
        let a = badness(100.0, 100.0, 10.0, 10.0);
        let b = badness(95.0, 100.0, 10.0, 10.0);
        let c = badness(85.0, 100.0, 10.0, 10.0);
        assert_eq!(a.compare(0, &b), Ordering::Less);
        assert_eq!(b.compare(0, &c), Ordering::Less);
        assert_eq!(a.compare(0, &c), Ordering::Less);
    }

    #[test]
    fn test_penalty_slots_independent() {
        let mut bap = badness(100.0, 100.0, 10.0, 10.0);
        bap.set_penalties(0, PENALTY_PROHIBIT_BREAK);
        assert!(bap.line_can_be_broken(0));
        assert!(!bap.line_can_be_broken(1));
    }
}
