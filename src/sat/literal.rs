#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Literals as signed integers.
//!
//! A literal is a non-zero `i32`: the magnitude names the variable and the sign
//! its polarity, exactly as in DIMACS. `0` is reserved and never a valid literal.

use core::fmt;
use core::ops::{Neg, Not};

/// A boolean variable, numbered from `1`.
pub type Variable = u32;

/// A signed reference to a [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Builds the literal of `var` with the given polarity.
    ///
    /// # Panics
    ///
    /// If `var` is `0` or does not fit in an `i32`.
    #[must_use]
    pub fn new(var: Variable, polarity: bool) -> Self {
        let var = i32::try_from(var).expect("literal variable overflowed");
        assert!(var != 0, "variable 0 is reserved");

        if polarity { Self(var) } else { Self(-var) }
    }

    /// Wraps a DIMACS integer, or `None` for the reserved `0`.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        if value == 0 || value == i32::MIN {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The DIMACS integer for this literal.
    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0
    }

    /// The variable, without sign.
    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 > 0
    }

    /// The literal of opposite sign.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self(-self.0)
    }

    /// Whether the literal holds when its variable takes `value`.
    #[must_use]
    pub const fn is_satisfied_by(self, value: bool) -> bool {
        self.polarity() == value
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Literal {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i32(value).ok_or(value)
    }
}

impl From<Literal> for i32 {
    fn from(literal: Literal) -> Self {
        literal.0
    }
}
