//! Exact point arithmetic and the running score ledger.
//!
//! Awards are whole points except highlight credit (0.75 / 0.5), so every
//! amount the engine hands out is a multiple of a quarter point.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Serialize, Serializer};

/// A non-negative score counted in quarter points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Points(u32);

impl Points {
    pub const ZERO: Points = Points(0);
    pub const HALF: Points = Points(2);
    pub const THREE_QUARTERS: Points = Points(3);
    pub const ONE: Points = Points(4);

    pub const fn from_quarters(q: u32) -> Self {
        Points(q)
    }

    pub const fn whole(n: u32) -> Self {
        Points(n * 4)
    }

    pub const fn quarters(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 4.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Points {
    type Output = Points;
    fn add(self, rhs: Points) -> Points {
        Points(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        *self = *self + rhs;
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Points {
        iter.fold(Points::ZERO, Add::add)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(self.as_f64())
    }
}

/// Running total for one playthrough. Only grows; cleared when a lesson starts.
#[derive(Clone, Debug, Default)]
pub struct ScoreLedger {
    total: Points,
    awards: usize,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the points of one graded unit. Zero awards are counted but change nothing.
    pub fn award(&mut self, points: Points) -> Points {
        self.total += points;
        self.awards += 1;
        self.total
    }

    pub fn total(&self) -> Points {
        self.total
    }

    /// Number of graded units recorded so far.
    pub fn awards(&self) -> usize {
        self.awards
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
