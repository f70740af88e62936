#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The SAT engine: input formats, the clause database, the implication graph
//! and the CDCL search built on top of them.

/// Solver answers: per-literal values of clauses and complete models.
pub mod assignment;
/// The CDCL solver with hypothesis and probing support.
pub mod cdcl;
/// Clauses with per-literal assignment levels.
pub mod clause;
/// Validated CNF formulas.
pub mod cnf;
/// Named heuristic and restart combinations.
pub mod configs;
/// All-decision conflict analysis.
pub mod conflict_analysis;
/// DIMACS CNF parsing.
pub mod dimacs;
/// The clause database and its propagation.
pub mod formula;
/// Variables and literals.
pub mod literal;
/// Restart policies.
pub mod restarter;
/// The solver trait, its configuration and its result types.
pub mod solver;
/// The implication graph.
pub mod trail;
/// Branching heuristics.
pub mod variable_selection;
