#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The conflict-driven clause-learning solver.
//!
//! [`Cdcl`] runs the usual loop over a [`Formula`] and an
//! [`ImplicationGraph`] it owns:
//!
//! 1. Propagate units at the current level.
//! 2. If every clause is satisfied, report the trail as a model.
//! 3. If a clause is falsified, analyse the conflict down to the decisions
//!    responsible for it, learn the resulting clause and jump back to the
//!    second highest level in it. A conflict that depends on no decision ends
//!    the search as unsatisfiable.
//! 4. Otherwise ask the branching heuristic for a literal, open a new level
//!    with it and go back to 1.
//!
//! After each learned clause the restart policy may ask for a restart, which
//! rebuilds the formula from the original and learned clauses and starts over
//! at level `0`. Learned clauses are never forgotten.
//!
//! Besides plain solving, the solver can fix *hypotheses*: literals asserted at
//! level `0` without a reason. They stay in force across internal restarts and
//! are cleared by [`Cdcl::restart`]. [`Cdcl::probe`] combines them with a single
//! decision to harvest learned clauses, which is what an outer LP relaxation
//! driver feeds back into its model.

use crate::misc::log::targets;
use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, CnfError};
use crate::sat::conflict_analysis::{Conflict, analyse_conflict, explain};
use crate::sat::formula::{ClauseRef, Formula, Propagation};
use crate::sat::literal::{Literal, Variable};
use crate::sat::restarter::Restarter;
use crate::sat::solver::{
    DefaultConfig, ExtendOutcome, HypothesisOutcome, Options, ProbeOutcome, SolveResult, Solver,
    SolverConfig, Stats,
};
use crate::sat::trail::{DecisionLevel, ImplicationGraph};
use crate::sat::variable_selection::{DEFAULT_DECAY, VariableSelection};
use core::ops::ControlFlow;
use itertools::Itertools;

/// A CDCL solver over a single formula.
#[derive(Debug, Clone)]
pub struct Cdcl<Config: SolverConfig = DefaultConfig> {
    /// The input clauses, including any added after construction.
    cnf: Cnf,
    /// Clauses derived by conflict analysis, in the order they were learned.
    learned: Vec<Vec<Literal>>,
    /// Literals fixed at level `0` by the caller.
    hypotheses: Vec<Literal>,

    formula: Formula,
    graph: ImplicationGraph,
    decision_level: DecisionLevel,

    selector: Config::VariableSelector,
    restarter: Config::Restarter,
    options: Options,
    stats: Stats,

    /// Set once the formula itself is known to be unsatisfiable.
    refuted: bool,
    /// The hypotheses in force are known not to hold together.
    contradiction: Option<Vec<Literal>>,
}

impl<Config: SolverConfig> Solver<Config> for Cdcl<Config> {
    fn new(cnf: Cnf, options: Options) -> Self {
        let num_vars = cnf.num_vars();
        let formula = Formula::new(cnf.iter().map(|c| c.iter().copied()));

        log::debug!(
            "solver created for {} clauses over {num_vars} variables",
            formula.len()
        );

        Self {
            cnf,
            learned: Vec::new(),
            hypotheses: Vec::new(),
            formula,
            graph: ImplicationGraph::new(num_vars),
            decision_level: 0,
            selector: <Config::VariableSelector as VariableSelection>::new(num_vars, options.seed),
            restarter: <Config::Restarter as Restarter>::new(),
            options,
            stats: Stats::default(),
            refuted: false,
            contradiction: None,
        }
    }

    /// Runs the search from the current state.
    ///
    /// The answer is relative to the hypotheses in force: `Unsat` with
    /// hypotheses fixed only says that they admit no model. Calling `solve`
    /// again after `Unknown` resumes where the budget ran out.
    fn solve(&mut self) -> SolveResult {
        if self.contradiction.is_some() {
            log::info!(target: targets::SOLVE, "unsatisfiable (already known)");
            return SolveResult::Unsat;
        }

        let conflicts_at_start = self.stats.conflicts;
        let mut propagation = self.propagate();

        loop {
            propagation = match propagation {
                Propagation::Satisfied => {
                    let model = self.witness();
                    log::info!(
                        target: targets::SOLVE,
                        "satisfiable after {} decisions and {} conflicts",
                        self.stats.decisions,
                        self.stats.conflicts
                    );
                    return SolveResult::Sat(model);
                }
                Propagation::Undecided => {
                    let Some(literal) = self.selector.pick(&self.formula, &self.graph) else {
                        unreachable!("an undecided formula has an open clause with a live literal");
                    };
                    self.decide(literal)
                }
                Propagation::Conflict(cref) => match self.handle_conflict(cref, conflicts_at_start) {
                    ControlFlow::Continue(next) => next,
                    ControlFlow::Break(result) => return result,
                },
            };
        }
    }

    fn stats(&self) -> Stats {
        self.stats
    }
}

impl<Config: SolverConfig> Cdcl<Config> {
    /// Forgets the trail and the hypotheses and rebuilds the formula from the
    /// input and learned clauses.
    ///
    /// Afterwards the solver behaves exactly like a fresh one built from the
    /// same clause database: re-applying the same hypotheses and decisions
    /// reproduces the same propagation, and the branching heuristic and the
    /// restart policy start over from their initial state.
    pub fn restart(&mut self) {
        self.hypotheses.clear();
        self.contradiction = self.refuted.then(Vec::new);
        self.rebuild();
        self.selector = VariableSelection::new(self.cnf.num_vars(), self.options.seed);
        self.restarter = Restarter::new();
        self.stats.restarts += 1;
        log::info!(target: targets::RESTART, "restart requested, {} learned clauses kept", self.learned.len());
    }

    /// Fixes `hypotheses` as level `0` facts and propagates them.
    ///
    /// Any decision made so far is undone first. Hypotheses accumulate until
    /// the next [`Cdcl::restart`]; internal restarts re-apply them.
    ///
    /// When the hypotheses contradict the formula, the clause refuting them is
    /// derived and kept as a learned clause.
    ///
    /// # Errors
    ///
    /// [`CnfError::VariableOutOfRange`] if a hypothesis names an unknown
    /// variable. Nothing is fixed in that case.
    pub fn assign_hypotheses(&mut self, hypotheses: &[Literal]) -> Result<HypothesisOutcome, CnfError> {
        for &h in hypotheses {
            self.check_literal(h)?;
        }

        if self.decision_level > 0 {
            self.backjump(0);
        }

        self.hypotheses.extend_from_slice(hypotheses);
        if let Some(core) = &self.contradiction {
            return Ok(HypothesisOutcome::Contradictory { core: core.clone() });
        }

        log::debug!(target: targets::HYPOTHESIS, "fixing {}", hypotheses.iter().join(" "));
        Ok(match self.apply_hypotheses(hypotheses) {
            Ok(()) => HypothesisOutcome::Consistent {
                trail: self.graph.literals().collect(),
            },
            Err(core) => HypothesisOutcome::Contradictory { core },
        })
    }

    /// Restarts, fixes `hypotheses`, then branches on `decision` at level `1`
    /// and resolves every conflict that follows until propagation settles.
    ///
    /// Returns the clauses learned on the way. They are kept like any other
    /// learned clause. The solver is left at the point propagation settled,
    /// so [`Solver::solve`] may continue from there. A spent resolution budget
    /// restarts with the hypotheses re-applied and settles at level `0`.
    ///
    /// # Errors
    ///
    /// [`CnfError::VariableOutOfRange`] if a literal names an unknown variable.
    pub fn probe(&mut self, hypotheses: &[Literal], decision: Literal) -> Result<ProbeOutcome, CnfError> {
        for &literal in hypotheses.iter().chain([&decision]) {
            self.check_literal(literal)?;
        }
        self.restart();

        if let HypothesisOutcome::Contradictory { core } = self.assign_hypotheses(hypotheses)? {
            return Ok(ProbeOutcome::Contradictory { core });
        }
        if self.graph.is_assigned(decision) {
            log::debug!(target: targets::HYPOTHESIS, "probe on {decision} is already decided by propagation");
            return Ok(ProbeOutcome::Learned(Vec::new()));
        }

        let first_new = self.learned.len();
        let propagation = self.decide(decision);

        Ok(match self.settle(propagation) {
            Ok(()) => ProbeOutcome::Learned(self.learned[first_new..].to_vec()),
            Err(core) => ProbeOutcome::Contradictory { core },
        })
    }

    /// Branches with the heuristic from the current state until the formula
    /// is satisfied or a conflict appears, then resolves every conflict that
    /// follows until propagation settles.
    ///
    /// Nothing is undone first: the hypotheses in force and any decisions
    /// already on the trail stay. An empty `learned` list means branching
    /// reached a model, which [`Cdcl::witness`] then reports.
    pub fn extend(&mut self) -> ExtendOutcome {
        if let Some(core) = &self.contradiction {
            return ExtendOutcome::Contradictory { core: core.clone() };
        }

        let first_new = self.learned.len();
        let mut propagation = self.propagate();
        while propagation == Propagation::Undecided {
            let Some(literal) = self.selector.pick(&self.formula, &self.graph) else {
                unreachable!("an undecided formula has an open clause with a live literal");
            };
            propagation = self.decide(literal);
        }

        match self.settle(propagation) {
            Ok(()) => {
                log::debug!(
                    target: targets::SOLVE,
                    "extension settled at level {} with {} new clauses",
                    self.decision_level,
                    self.learned.len() - first_new
                );
                ExtendOutcome::Extended {
                    trail: self.trail(),
                    learned: self.learned[first_new..].to_vec(),
                }
            }
            Err(core) => ExtendOutcome::Contradictory { core },
        }
    }

    /// Appends an input clause.
    ///
    /// The trail is cut back to level `0` (hypotheses stay) and the clause is
    /// brought up to date with it.
    ///
    /// # Errors
    ///
    /// See [`Cnf::add_clause`]; a rejected clause changes nothing.
    pub fn add_clause<C: IntoIterator<Item = i32>>(&mut self, clause: C) -> Result<ClauseRef, CnfError> {
        let idx = self.cnf.add_clause(clause)?;
        let literals = self.cnf.clauses()[idx].clone();

        if self.decision_level > 0 {
            self.backjump(0);
        }

        let cref = self.formula.add_clause(Clause::new(literals));
        self.formula.refresh(cref, &self.graph);
        Ok(cref)
    }

    /// The model given by the current trail, completed positively.
    #[must_use]
    pub fn witness(&self) -> Model {
        Model::complete(self.cnf.num_vars(), self.graph.literals())
    }

    /// The input formula, including clauses added since construction.
    #[must_use]
    pub const fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Learned clauses, oldest first.
    #[must_use]
    pub fn learned_clauses(&self) -> &[Vec<Literal>] {
        &self.learned
    }

    /// Hypotheses in force, in the order they were fixed.
    #[must_use]
    pub fn hypotheses(&self) -> &[Literal] {
        &self.hypotheses
    }

    /// Assigned literals in trail order.
    #[must_use]
    pub fn trail(&self) -> Vec<Literal> {
        self.graph.literals().collect()
    }

    /// The current implication graph.
    #[must_use]
    pub const fn graph(&self) -> &ImplicationGraph {
        &self.graph
    }

    /// The live clause database.
    #[must_use]
    pub const fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The current decision level. `0` when only hypotheses and their
    /// consequences are fixed.
    #[must_use]
    pub const fn decision_level(&self) -> DecisionLevel {
        self.decision_level
    }

    /// The run-time options the solver was built with.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    fn check_literal(&self, literal: Literal) -> Result<(), CnfError> {
        if literal.variable() as usize > self.cnf.num_vars() {
            return Err(CnfError::VariableOutOfRange {
                literal: literal.to_i32(),
                num_vars: self.cnf.num_vars(),
            });
        }
        Ok(())
    }

    /// Analyses the conflict at `cref` within the resolution budget. A partial
    /// resolvent that is already kept would make the restart pointless, so the
    /// analysis is then finished without a budget.
    fn analyse(&self, cref: ClauseRef) -> (Conflict, Vec<Variable>) {
        let budget = self.options.max_resolution_steps.map(|max| max.max(1));
        let analysis = analyse_conflict(&self.formula, &self.graph, cref, budget);

        let stale = matches!(
            &analysis.0,
            Conflict::Restart(partial) if self.is_learned(partial.literals())
        );
        if stale {
            log::debug!(target: targets::ANALYSIS, "partial resolvent already kept, finishing the analysis");
            analyse_conflict(&self.formula, &self.graph, cref, None)
        } else {
            analysis
        }
    }

    fn is_learned(&self, literals: &[Literal]) -> bool {
        self.learned.iter().any(|c| c.as_slice() == literals)
    }

    fn propagate(&mut self) -> Propagation {
        let before = self.graph.len();
        let propagation = self.formula.unit_propagate(self.decision_level, &mut self.graph);
        self.stats.propagations += self.graph.len() - before;
        propagation
    }

    /// Opens a new level with `literal` and propagates it.
    fn decide(&mut self, literal: Literal) -> Propagation {
        self.decision_level += 1;
        self.stats.decisions += 1;
        log::debug!(target: targets::DECISION, "{literal}@{}", self.decision_level);

        self.graph.add_node(literal, None, self.decision_level);
        match self.formula.bcp(literal, self.decision_level, &self.graph) {
            Propagation::Conflict(cref) => Propagation::Conflict(cref),
            Propagation::Satisfied | Propagation::Undecided => self.propagate(),
        }
    }

    /// Resolves conflicts starting from `propagation` until none is left.
    /// A spent resolution budget restarts the search with the hypotheses
    /// re-applied. Returns the core when the hypotheses turn out
    /// contradictory.
    fn settle(&mut self, mut propagation: Propagation) -> Result<(), Vec<Literal>> {
        while let Propagation::Conflict(cref) = propagation {
            self.stats.conflicts += 1;
            self.stats.conflicts_since_restart += 1;

            let (conflict, involved) = self.analyse(cref);
            self.selector.bumps(involved);

            propagation = match conflict {
                Conflict::Learned {
                    clause,
                    backtrack_level,
                } => {
                    self.learn(&clause, backtrack_level);
                    self.propagate()
                }
                Conflict::Restart(clause) => {
                    self.retain(clause.literals().to_vec());
                    log::info!(target: targets::RESTART, "resolution budget exhausted");
                    self.restarter.restart();
                    match self.restart_search() {
                        ControlFlow::Continue(settled) => settled,
                        ControlFlow::Break(_) => return Err(self.contradiction.clone().unwrap_or_default()),
                    }
                }
                Conflict::Ground(clause) => return Err(self.refute(&clause)),
            };
        }
        Ok(())
    }

    fn handle_conflict(
        &mut self,
        cref: ClauseRef,
        conflicts_at_start: usize,
    ) -> ControlFlow<SolveResult, Propagation> {
        self.stats.conflicts += 1;
        self.stats.conflicts_since_restart += 1;

        if self
            .options
            .max_conflicts
            .is_some_and(|max| self.stats.conflicts - conflicts_at_start > max)
        {
            log::info!(target: targets::SOLVE, "conflict budget exhausted");
            return ControlFlow::Break(SolveResult::Unknown);
        }

        log::debug!(
            target: targets::ANALYSIS,
            "conflict in clause {cref} at level {}",
            self.decision_level
        );
        let (conflict, involved) = self.analyse(cref);
        self.selector.bumps(involved);
        self.selector.decay(DEFAULT_DECAY);

        match conflict {
            Conflict::Ground(clause) => {
                self.refute(&clause);
                log::info!(
                    target: targets::SOLVE,
                    "unsatisfiable after {} conflicts",
                    self.stats.conflicts
                );
                ControlFlow::Break(SolveResult::Unsat)
            }
            Conflict::Restart(clause) => {
                self.retain(clause.literals().to_vec());
                log::info!(target: targets::RESTART, "resolution budget exhausted");
                self.restarter.restart();
                self.restart_search()
            }
            Conflict::Learned {
                clause,
                backtrack_level,
            } => {
                self.learn(&clause, backtrack_level);
                if self.restarter.should_restart() {
                    log::info!(
                        target: targets::RESTART,
                        "restart after {} conflicts",
                        self.stats.conflicts_since_restart
                    );
                    self.restart_search()
                } else {
                    ControlFlow::Continue(self.propagate())
                }
            }
        }
    }

    /// Keeps `clause`, jumps back to `level` and adds it to the formula, where
    /// it is now unit.
    fn learn(&mut self, clause: &Clause, level: DecisionLevel) {
        self.backjump(level);
        if let Some(cref) = self.retain(clause.literals().to_vec()) {
            debug_assert!(
                self.formula[cref].is_unit(),
                "learned clause {} is not unit after the backjump",
                self.formula[cref]
            );
        }
    }

    /// Records a learned clause and adds it to the live formula. Returns
    /// `None` for a clause already kept.
    fn retain(&mut self, literals: Vec<Literal>) -> Option<ClauseRef> {
        if self.is_learned(&literals) {
            return None;
        }

        self.learned.push(literals.clone());
        self.stats.learned_clauses += 1;

        let cref = self.formula.add_clause(Clause::new(literals));
        self.formula.refresh(cref, &self.graph);
        Some(cref)
    }

    /// Handles a conflict that depends on no decision. `clause` negates the
    /// hypotheses involved; returns them.
    fn refute(&mut self, clause: &Clause) -> Vec<Literal> {
        let core = clause.iter().map(|&l| -l).collect_vec();

        if clause.is_empty() {
            self.refuted = true;
        } else if !self.is_learned(clause.literals()) {
            self.learned.push(clause.literals().to_vec());
            self.stats.learned_clauses += 1;
        }

        log::debug!(target: targets::HYPOTHESIS, "contradictory core: {}", core.iter().join(" "));
        self.contradiction = Some(core.clone());
        core
    }

    fn backjump(&mut self, level: DecisionLevel) {
        log::debug!(target: targets::BACKJUMP, "{} -> {level}", self.decision_level);
        self.graph.backtrack(level);
        self.formula.backtrack(level, &self.graph);
        self.decision_level = level;

        debug_assert!(self.formula.is_below(level));
    }

    /// Rebuilds the formula and trail at level `0`.
    fn rebuild(&mut self) {
        let clauses = self
            .cnf
            .iter()
            .chain(self.learned.iter().map(Vec::as_slice))
            .map(|c| c.iter().copied());
        self.formula = Formula::new(clauses);
        self.graph = ImplicationGraph::new(self.cnf.num_vars());
        self.decision_level = 0;
        self.stats.conflicts_since_restart = 0;
    }

    /// Restart inside a solve: keeps the hypotheses in force.
    fn restart_search(&mut self) -> ControlFlow<SolveResult, Propagation> {
        self.rebuild();
        self.stats.restarts += 1;

        let hypotheses = self.hypotheses.clone();
        match self.apply_hypotheses(&hypotheses) {
            Ok(()) => ControlFlow::Continue(self.propagate()),
            Err(_) => ControlFlow::Break(SolveResult::Unsat),
        }
    }

    /// Fixes `hypotheses` at level `0` and propagates. On a contradiction the
    /// solver is marked as such and the core is returned.
    fn apply_hypotheses(&mut self, hypotheses: &[Literal]) -> Result<(), Vec<Literal>> {
        debug_assert_eq!(self.decision_level, 0);

        for &h in hypotheses {
            match self.graph.value(h) {
                Some(true) => {}
                Some(false) => return Err(self.refute_falsified(h)),
                None => {
                    self.graph.add_node(h, None, 0);
                    if let Propagation::Conflict(cref) = self.formula.bcp(h, 0, &self.graph) {
                        return Err(self.refute_conflict(cref));
                    }
                }
            }
        }

        match self.propagate() {
            Propagation::Conflict(cref) => Err(self.refute_conflict(cref)),
            Propagation::Satisfied | Propagation::Undecided => Ok(()),
        }
    }

    fn refute_conflict(&mut self, cref: ClauseRef) -> Vec<Literal> {
        self.stats.conflicts += 1;
        let (conflict, _) = analyse_conflict(&self.formula, &self.graph, cref, None);
        match conflict {
            Conflict::Ground(clause) | Conflict::Restart(clause) | Conflict::Learned { clause, .. } => {
                self.refute(&clause)
            }
        }
    }

    /// `hypothesis` is already false at level `0`.
    fn refute_falsified(&mut self, hypothesis: Literal) -> Vec<Literal> {
        match explain(&self.formula, &self.graph, -hypothesis) {
            Some(clause) => self.refute(&clause),
            None => {
                let core = vec![-hypothesis, hypothesis];
                log::debug!(target: targets::HYPOTHESIS, "hypotheses {} and {hypothesis} clash", -hypothesis);
                self.contradiction = Some(core.clone());
                core
            }
        }
    }
}
