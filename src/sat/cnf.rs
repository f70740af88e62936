#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Validated CNF input.
//!
//! [`Cnf`] is what a solver is built from: a variable count together with a
//! list of clauses, each a list of [`Literal`]s whose variables lie in
//! `1..=num_vars`. Everything is checked once, here, so the solver itself can
//! treat bad input as an invariant violation.
//!
//! Clauses are stored as written (order and repeats included). Deduplication
//! and tautology detection happen when the clauses are turned into
//! [`Clause`](crate::sat::clause::Clause)s.

use crate::sat::assignment::Model;
use crate::sat::literal::Literal;
use core::fmt;
use itertools::Itertools;
use thiserror::Error;

/// Reasons a clause list is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CnfError {
    /// A clause contains `0`, which is reserved as the DIMACS terminator.
    #[error("clause {index} contains the reserved literal 0")]
    ZeroLiteral {
        /// Position of the offending clause.
        index: usize,
    },
    /// A literal names a variable outside `1..=num_vars`.
    #[error("literal {literal} is outside the declared {num_vars} variables")]
    VariableOutOfRange {
        /// The offending literal.
        literal: i32,
        /// The declared variable count.
        num_vars: usize,
    },
    /// A clause has no literals.
    #[error("clause {index} is empty")]
    EmptyClause {
        /// Position of the offending clause.
        index: usize,
    },
    /// The formula has no clauses at all.
    #[error("the formula has no clauses")]
    NoClauses,
}

/// A formula in conjunctive normal form over the variables `1..=num_vars`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    num_vars: usize,
    clauses: Vec<Vec<Literal>>,
}

impl Cnf {
    /// Validates `clauses` against `num_vars`.
    ///
    /// # Arguments
    ///
    /// * `num_vars`: The number of variables; literals must name `1..=num_vars`.
    /// * `clauses`: The clauses, as DIMACS integers without the trailing `0`.
    ///
    /// # Errors
    ///
    /// [`CnfError::NoClauses`] if `clauses` is empty, otherwise the first
    /// problem met while checking the clauses in order.
    pub fn new<I, C>(num_vars: usize, clauses: I) -> Result<Self, CnfError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        let mut cnf = Self {
            num_vars,
            clauses: Vec::new(),
        };

        for clause in clauses {
            cnf.add_clause(clause)?;
        }

        if cnf.clauses.is_empty() {
            return Err(CnfError::NoClauses);
        }

        Ok(cnf)
    }

    /// Validates and appends one clause, returning its position.
    ///
    /// # Errors
    ///
    /// See [`CnfError`]; a rejected clause leaves the formula unchanged.
    pub fn add_clause<C: IntoIterator<Item = i32>>(&mut self, clause: C) -> Result<usize, CnfError> {
        let index = self.clauses.len();
        let literals = clause
            .into_iter()
            .map(|value| self.check_literal(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        if literals.is_empty() {
            return Err(CnfError::EmptyClause { index });
        }

        self.clauses.push(literals);
        Ok(index)
    }

    fn check_literal(&self, index: usize, value: i32) -> Result<Literal, CnfError> {
        if value == 0 {
            return Err(CnfError::ZeroLiteral { index });
        }
        match Literal::from_i32(value) {
            Some(literal) if literal.variable() as usize <= self.num_vars => Ok(literal),
            _ => Err(CnfError::VariableOutOfRange {
                literal: value,
                num_vars: self.num_vars,
            }),
        }
    }

    /// Declared number of variables.
    #[must_use]
    pub const fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// The clauses in input order.
    #[must_use]
    pub fn clauses(&self) -> &[Vec<Literal>] {
        &self.clauses
    }

    /// Iterates over the clauses in input order.
    pub fn iter(&self) -> impl Iterator<Item = &[Literal]> {
        self.clauses.iter().map(Vec::as_slice)
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether `model` satisfies every clause.
    #[must_use]
    pub fn verify(&self, model: &Model) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|&lit| model.satisfies(lit)))
    }
}

impl fmt::Display for Cnf {
    /// Writes the formula in DIMACS form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{} 0", clause.iter().join(" "))?;
        }
        Ok(())
    }
}
