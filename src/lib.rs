#![deny(missing_docs)]
//! A conflict-driven clause-learning SAT engine with a hypothesis interface.
//!
//! Besides plain solving, the engine can fix a set of literals at level `0`,
//! report which of them clash, and probe single decisions under them to
//! collect the clauses the resulting conflicts teach.

/// Shared plumbing that is not specific to SAT solving.
pub mod misc;

/// The SAT engine itself.
pub mod sat;
