#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The solver interface and the types it speaks.
//!
//! [`Solver`] is implemented by [`Cdcl`](crate::sat::cdcl::Cdcl). Policies are
//! chosen at compile time through a [`SolverConfig`]; everything that can vary
//! per run (seed, budgets) lives in [`Options`].

use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::restarter::{Fixed, Restarter};
use crate::sat::variable_selection::{LiteralCount, VariableSelection};
use core::fmt::{self, Debug, Display};
use itertools::Itertools;

/// Compile-time choice of the solver's pluggable policies.
pub trait SolverConfig: Debug + Clone {
    /// The branching heuristic.
    type VariableSelector: VariableSelection;
    /// When to restart.
    type Restarter: Restarter;
}

/// Dynamic largest literal count with a restart after every 100 conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefaultConfig;

impl SolverConfig for DefaultConfig {
    type VariableSelector = LiteralCount;
    type Restarter = Fixed<100>;
}

/// Run-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Seed for any randomised policy.
    pub seed: u64,
    /// Resolution steps allowed per conflict before the solver gives up on
    /// the conflict and restarts. `None` for no limit; at least one step is
    /// always taken.
    pub max_resolution_steps: Option<usize>,
    /// Conflicts allowed per call to [`Solver::solve`] before it answers
    /// [`SolveResult::Unknown`]. `None` for no limit.
    pub max_conflicts: Option<usize>,
}

/// The answer to a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// A model of the formula (and of the current hypotheses).
    Sat(Model),
    /// The formula, together with the current hypotheses, has no model.
    Unsat,
    /// The conflict budget ran out first.
    Unknown,
}

impl SolveResult {
    /// Whether a model was found.
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    /// Whether the search refuted the formula.
    #[must_use]
    pub const fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }

    /// The model, if one was found.
    #[must_use]
    pub const fn model(&self) -> Option<&Model> {
        match self {
            Self::Sat(model) => Some(model),
            _ => None,
        }
    }
}

impl Display for SolveResult {
    /// The SAT competition status line, followed by the model for `Sat`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat(model) => {
                writeln!(f, "s SATISFIABLE")?;
                write!(f, "v {} 0", model.to_dimacs().iter().join(" "))
            }
            Self::Unsat => write!(f, "s UNSATISFIABLE"),
            Self::Unknown => write!(f, "s UNKNOWN"),
        }
    }
}

/// What came of fixing a set of hypotheses at level `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HypothesisOutcome {
    /// Propagation went through.
    Consistent {
        /// Every literal fixed at level `0`, in assignment order.
        trail: Vec<Literal>,
    },
    /// Some of the hypotheses cannot hold together.
    Contradictory {
        /// The hypotheses the refutation used. Empty when the formula is
        /// unsatisfiable on its own.
        core: Vec<Literal>,
    },
}

impl HypothesisOutcome {
    /// Whether propagation went through without a conflict.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent { .. })
    }
}

/// What came of probing one decision under a set of hypotheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The clauses learned while resolving the conflicts the decision led to,
    /// in the order they were learned. Empty if the decision caused none.
    Learned(Vec<Vec<Literal>>),
    /// The hypotheses cannot hold together; see
    /// [`HypothesisOutcome::Contradictory`].
    Contradictory {
        /// The hypotheses the refutation used.
        core: Vec<Literal>,
    },
}

/// What came of extending the current trail with heuristic decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// Branching stopped at a model or at a conflict that was then resolved.
    Extended {
        /// Assigned literals once propagation settled, in trail order.
        trail: Vec<Literal>,
        /// Clauses learned while resolving the conflicts, oldest first.
        /// Empty when branching reached a model.
        learned: Vec<Vec<Literal>>,
    },
    /// The hypotheses cannot hold together; see
    /// [`HypothesisOutcome::Contradictory`].
    Contradictory {
        /// The hypotheses the refutation used.
        core: Vec<Literal>,
    },
}

/// Counters kept over the lifetime of a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Branching decisions made.
    pub decisions: usize,
    /// Literals fixed by unit propagation.
    pub propagations: usize,
    /// Falsified clauses met, in any search mode.
    pub conflicts: usize,
    /// Conflicts since the last restart of either kind.
    pub conflicts_since_restart: usize,
    /// Clauses kept by conflict analysis.
    pub learned_clauses: usize,
    /// Restarts of any cause.
    pub restarts: usize,
}

impl Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "c decisions       {}", self.decisions)?;
        writeln!(f, "c propagations    {}", self.propagations)?;
        writeln!(f, "c conflicts       {}", self.conflicts)?;
        writeln!(f, "c learned clauses {}", self.learned_clauses)?;
        write!(f, "c restarts        {}", self.restarts)
    }
}

/// A complete solver for CNF formulas.
pub trait Solver<C: SolverConfig = DefaultConfig> {
    /// Creates a solver for `cnf`.
    fn new(cnf: Cnf, options: Options) -> Self;

    /// Searches for a model.
    fn solve(&mut self) -> SolveResult;

    /// Counters accumulated so far.
    fn stats(&self) -> Stats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_display() {
        let model = Model::complete(3, [Literal::from_i32(-2).unwrap()]);
        assert_eq!(
            SolveResult::Sat(model).to_string(),
            "s SATISFIABLE\nv 1 -2 3 0"
        );
        assert_eq!(SolveResult::Unsat.to_string(), "s UNSATISFIABLE");
    }

    #[test]
    fn test_default_options_are_unbounded() {
        let options = Options::default();
        assert_eq!(options.max_conflicts, None);
        assert_eq!(options.max_resolution_steps, None);
    }
}
