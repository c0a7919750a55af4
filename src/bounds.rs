//! Closed integer intervals used for occurrence counts and string lengths.
//!
//! A `Bounds` is `[min, max]` where `max` may be the [`UNBOUNDED`] sentinel.
//! Arithmetic saturates to the sentinel instead of overflowing, so lengths
//! derived from `.*`-style repetitions stay unbounded no matter how they are
//! combined.
//!
//! ```text
//! [2,3] + [1,UNBOUNDED]  = [3,UNBOUNDED]
//! [2,3] * [0,4]          = [0,12]
//! [2,3] ∩ [5,9]          = error (requested range above the maximum)
//! ```

use std::fmt;

use crate::Error;

/// Sentinel for an unbounded maximum.
pub const UNBOUNDED: usize = usize::MAX;

/// Inclusive `[min, max]` interval with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    min: usize,
    max: usize,
}

/// Reason a requested range does not intersect a feasible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthError {
    /// The request lies entirely below the feasible minimum (the value).
    BelowMinimum(usize),
    /// The request lies entirely above the feasible maximum (the value).
    AboveMaximum(usize),
    /// The length is inside the bounds but no string of that exact length exists.
    Infeasible(usize),
}

impl fmt::Display for LengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthError::BelowMinimum(min) => write!(f, "Length cannot be less than {min}"),
            LengthError::AboveMaximum(max) => write!(f, "Length cannot be greater than {max}"),
            LengthError::Infeasible(len) => write!(f, "No string of length {len} can be produced"),
        }
    }
}

impl Bounds {
    /// `[1,1]`, the default occurrence of every node.
    pub const ONCE: Bounds = Bounds { min: 1, max: 1 };
    /// `[0,1]`
    pub const OPTIONAL: Bounds = Bounds { min: 0, max: 1 };
    /// `[0,UNBOUNDED]`
    pub const ANY: Bounds = Bounds { min: 0, max: UNBOUNDED };
    /// `[0,0]`
    pub const EMPTY: Bounds = Bounds { min: 0, max: 0 };

    /// Create `[min, max]`, rejecting `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, Error> {
        if min > max {
            return Err(Error::InvalidBounds { min, max });
        }
        Ok(Bounds { min, max })
    }

    /// `[n, n]`
    pub const fn exactly(n: usize) -> Self {
        Bounds { min: n, max: n }
    }

    /// `[n, UNBOUNDED]`
    pub const fn at_least(n: usize) -> Self {
        Bounds { min: n, max: UNBOUNDED }
    }

    /// `[0, n]`
    pub const fn at_most(n: usize) -> Self {
        Bounds { min: 0, max: n }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max == UNBOUNDED
    }

    pub fn contains(&self, value: usize) -> bool {
        self.min <= value && value <= self.max
    }

    /// Element-wise saturating sum.
    pub fn sum(self, other: Bounds) -> Bounds {
        Bounds { min: self.min.saturating_add(other.min), max: self.max.saturating_add(other.max) }
    }

    /// Element-wise saturating product. `0 * UNBOUNDED` is 0: a node that
    /// never occurs contributes nothing however long it could be.
    pub fn product(self, other: Bounds) -> Bounds {
        Bounds { min: self.min.saturating_mul(other.min), max: self.max.saturating_mul(other.max) }
    }

    /// Intersect `self` with `range`.
    ///
    /// Fails with [`LengthError::BelowMinimum`] when `range` ends before
    /// `self` starts and [`LengthError::AboveMaximum`] when it starts after
    /// `self` ends.
    pub fn clipped_to(self, range: Bounds) -> Result<Bounds, LengthError> {
        if range.max < self.min {
            return Err(LengthError::BelowMinimum(self.min));
        }
        if range.min > self.max {
            return Err(LengthError::AboveMaximum(self.max));
        }
        Ok(Bounds { min: self.min.max(range.min), max: self.max.min(range.max) })
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::ONCE
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() { write!(f, "[{},∞)", self.min) } else { write!(f, "[{},{}]", self.min, self.max) }
    }
}

/// `a - b`, floored at zero. An unbounded `a` stays unbounded.
pub fn reduce_by(a: usize, b: usize) -> usize {
    if a == UNBOUNDED { UNBOUNDED } else { a.saturating_sub(b) }
}

/// `a / b` rounded down; `UNBOUNDED` when `b` is zero or `a` is unbounded.
pub fn divided_by(a: usize, b: usize) -> usize {
    if b == 0 || a == UNBOUNDED { UNBOUNDED } else { a / b }
}

/// `a / b` rounded up. Dividing by an unbounded value yields 1 for a
/// positive `a`: one unbounded part can hold any finite amount.
pub fn divided_by_ceil(a: usize, b: usize) -> usize {
    if a == 0 {
        0
    } else if b == 0 || a == UNBOUNDED {
        UNBOUNDED
    } else if b == UNBOUNDED {
        usize::from(a > 0)
    } else {
        a.div_ceil(b)
    }
}

/// `value + 1` for an exclusive upper limit, keeping `UNBOUNDED` sticky.
pub(crate) fn exclusive(value: usize) -> usize {
    value.saturating_add(1)
}
