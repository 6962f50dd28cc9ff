//! Sequence Comparator - positional agreement between symbol sequences

use crate::symbol::Symbol;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Agreement between two symbol sequences.
///
/// Only positions where both sides carry a trend are compared. When no such
/// position exists the score is the sentinel 0.0 and [`MatchScore::is_empty`]
/// is true, which distinguishes "nothing to compare" from "nothing agreed".
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchScore {
    /// Aligned pairs where neither side is flat.
    pub compared: usize,

    /// Compared pairs with identical symbols.
    pub matched: usize,
}

impl MatchScore {
    /// Fraction of compared pairs that matched, in [0, 1]. 0.0 when empty.
    pub fn value(&self) -> f64 {
        if self.compared == 0 {
            0.0
        } else {
            self.matched as f64 / self.compared as f64
        }
    }

    /// True when no comparable pair existed.
    pub fn is_empty(&self) -> bool {
        self.compared == 0
    }
}

/// Align by index up to the shorter length and score exact agreement.
pub fn compare(a: &[Symbol], b: &[Symbol]) -> MatchScore {
    let (compared, matched) = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_trend() && y.is_trend())
        .fold((0, 0), |(n, m), (x, y)| (n + 1, m + usize::from(x == y)));

    MatchScore { compared, matched }
}
