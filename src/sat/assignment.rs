//! Truth values and satisfying assignments.

use crate::sat::literal::{Literal, Variable};
use bit_vec::BitVec;
use itertools::Itertools;

/// The three-valued state of a clause or a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
pub enum Value {
    /// Neither satisfied nor falsified yet.
    #[default]
    Unassigned,
    /// Satisfied by the current trail.
    True,
    /// Falsified by the current trail: a conflict.
    False,
}

impl Value {
    /// Neither satisfied nor falsified.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        matches!(self, Self::Unassigned)
    }

    /// Satisfied.
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    /// Falsified.
    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }
}

/// A total assignment of the variables `1..=num_vars`.
///
/// Built from the trail once the formula is satisfied. Variables the search
/// never had to fix are completed positively, so two runs that end on the
/// same trail always report the same model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: BitVec,
}

impl Model {
    /// Completes `assigned` to a model over `num_vars` variables.
    ///
    /// Variables that do not occur in `assigned` are set to `true`.
    pub fn complete<I: IntoIterator<Item = Literal>>(num_vars: usize, assigned: I) -> Self {
        let mut values = BitVec::from_elem(num_vars, true);
        for lit in assigned {
            let idx = lit.variable() as usize - 1;
            values.set(idx, lit.polarity());
        }
        Self { values }
    }

    /// Number of variables the model covers.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.values.len()
    }

    /// The value of `var`, or `None` if it is out of range.
    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        let idx = (var as usize).checked_sub(1)?;
        self.values.get(idx)
    }

    /// Whether `lit` is true in the model. Out-of-range literals are not.
    #[must_use]
    pub fn satisfies(&self, lit: Literal) -> bool {
        self.value(lit.variable())
            .is_some_and(|v| lit.is_satisfied_by(v))
    }

    /// One signed literal per variable, in increasing variable order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.values
            .iter()
            .zip(1..)
            .map(|(v, var)| Literal::new(var, v))
    }

    /// The model in DIMACS form, e.g. `[1, -2, 3]`.
    #[must_use]
    pub fn to_dimacs(&self) -> Vec<i32> {
        self.literals().map(Literal::to_i32).collect_vec()
    }

    /// The model as a `0/1` vector indexed by `variable - 1`, the form
    /// consumed by the LP relaxations.
    #[must_use]
    pub fn to_linear(&self) -> Vec<u8> {
        self.values.iter().map(u8::from).collect_vec()
    }
}
