/*!
Targets for the [log] macros called throughout the library.

The library only emits records; installing a logger is left to the binary (or
to whoever embeds the solver). Filter by target to follow one part of a solve,
e.g. `RUST_LOG=analysis=debug`.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Unit propagation and clause updates.
    pub const PROPAGATION: &str = "propagation";

    /// Conflict analysis and resolution steps.
    pub const ANALYSIS: &str = "analysis";

    /// Non-chronological backtracking.
    pub const BACKJUMP: &str = "backjump";

    /// Restarts, forced or scheduled.
    pub const RESTART: &str = "restart";

    /// Branching decisions.
    pub const DECISION: &str = "decision";

    /// Hypotheses fixed at level zero and probing.
    pub const HYPOTHESIS: &str = "hypothesis";

    /// Additions to the clause database.
    pub const CLAUSE_DB: &str = "clause_db";

    /// Terminal outcomes of a solve.
    pub const SOLVE: &str = "solve";
}
