#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The clause database of a single solve episode.
//!
//! A [`Formula`] owns its clauses, dispatches newly assigned literals to them
//! and runs unit propagation to a fixpoint. It caches the aggregate [`Value`]:
//! `False` as soon as one clause is falsified, `True` once every clause is
//! satisfied, `Unassigned` otherwise.
//!
//! Clauses are visited in insertion order, original clauses first and learned
//! clauses after them. The first falsified clause met in that order is the
//! conflict handed to analysis, so the order is part of the observable
//! behaviour of the solver.
//!
//! A restart throws the whole formula away and builds a fresh one from the
//! retained clause lists.

use crate::misc::log::targets;
use crate::sat::assignment::Value;
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use crate::sat::trail::{DecisionLevel, ImplicationGraph};
use core::cmp::Reverse;
use core::ops::Index;
use itertools::Itertools;
use rustc_hash::FxHashMap;

/// Position of a clause in its [`Formula`]. Stable for the lifetime of the
/// formula, since clauses are only ever appended.
pub type ClauseRef = usize;

/// Result of pushing a literal (or a round of unit propagation) through the
/// formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Nothing left to propagate and some clause still open.
    Undecided,
    /// Every clause is satisfied.
    Satisfied,
    /// The referenced clause is falsified.
    Conflict(ClauseRef),
}

impl Propagation {
    /// The aggregate value this outcome stands for.
    #[must_use]
    pub const fn value(self) -> Value {
        match self {
            Self::Undecided => Value::Unassigned,
            Self::Satisfied => Value::True,
            Self::Conflict(_) => Value::False,
        }
    }
}

/// An ordered clause database with a cached aggregate value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Formula {
    clauses: Vec<Clause>,
    value: Value,
}

impl Formula {
    /// Builds one clause per non-empty literal list.
    pub fn new<I, C>(clause_lists: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = Literal>,
    {
        let clauses = clause_lists
            .into_iter()
            .map(Clause::new)
            .filter(|clause| !clause.is_empty())
            .collect_vec();

        let mut formula = Self {
            clauses,
            value: Value::Unassigned,
        };
        formula.value = formula.aggregate();
        formula
    }

    /// `False` if any clause is falsified, else `Unassigned` if any is open,
    /// else `True`.
    #[must_use]
    pub fn aggregate(&self) -> Value {
        let mut value = Value::True;
        for clause in &self.clauses {
            match clause.value() {
                Value::False => return Value::False,
                Value::Unassigned => value = Value::Unassigned,
                Value::True => {}
            }
        }
        value
    }

    /// The cached aggregate value.
    #[must_use]
    pub const fn value(&self) -> Value {
        self.value
    }

    /// Dispatches `literal`, just assigned at `level`, to every open clause.
    ///
    /// Stops at the first clause found falsified, whether this call falsified
    /// it or it already was.
    pub fn bcp(
        &mut self,
        literal: Literal,
        level: DecisionLevel,
        graph: &ImplicationGraph,
    ) -> Propagation {
        let mut conflict = None;

        for (cref, clause) in self.clauses.iter_mut().enumerate() {
            let falsified = match clause.value() {
                Value::False => true,
                Value::Unassigned => clause.bcp(literal, level, graph).is_false(),
                Value::True => false,
            };
            if falsified {
                conflict = Some(cref);
                break;
            }
        }

        self.value = self.aggregate();

        match conflict {
            Some(cref) => {
                log::trace!(target: targets::PROPAGATION, "{literal}@{level} falsified clause {cref}");
                Propagation::Conflict(cref)
            }
            None if self.value.is_true() => Propagation::Satisfied,
            None => Propagation::Undecided,
        }
    }

    /// Propagates unit clauses until none is left or a clause is falsified.
    ///
    /// Each round takes the first unit clause, records its live literal on
    /// `graph` with that clause as antecedent, dispatches it with
    /// [`Formula::bcp`] and starts over from the first clause.
    ///
    /// # Panics
    ///
    /// If a unit clause's live literal is already false on `graph`; that
    /// clause should have been falsified by the earlier assignment.
    pub fn unit_propagate(
        &mut self,
        level: DecisionLevel,
        graph: &mut ImplicationGraph,
    ) -> Propagation {
        if let Some(cref) = self.clauses.iter().position(|c| c.value().is_false()) {
            self.value = Value::False;
            return Propagation::Conflict(cref);
        }
        self.value = self.aggregate();

        while self.value.is_unassigned() {
            let Some(cref) = self.clauses.iter().position(Clause::is_unit) else {
                break;
            };

            let unit = self.clauses[cref].live()[0];
            if !graph.contains(unit) {
                log::trace!(target: targets::PROPAGATION, "{unit}@{level} from clause {cref}");
                graph.add_node(unit, Some(cref), level);
            }

            if let Propagation::Conflict(conflict) = self.bcp(unit, level, graph) {
                return Propagation::Conflict(conflict);
            }
        }

        if self.value.is_true() {
            Propagation::Satisfied
        } else {
            Propagation::Undecided
        }
    }

    /// Restores every clause for a trail cut back to `level`.
    ///
    /// `graph` must be backtracked first. The aggregate value is reset and
    /// recomputed by the next propagation.
    pub fn backtrack(&mut self, level: DecisionLevel, graph: &ImplicationGraph) {
        for clause in &mut self.clauses {
            clause.restore(level, graph);
        }
        self.value = Value::Unassigned;
    }

    /// Appends a clause and returns its reference.
    pub fn add_clause(&mut self, clause: Clause) -> ClauseRef {
        self.clauses.push(clause);
        log::trace!(target: targets::CLAUSE_DB, "clause {} added", self.clauses.len() - 1);
        self.clauses.len() - 1
    }

    /// Brings the clause at `cref` up to date with `graph`, e.g. after adding
    /// it while literals are assigned.
    pub fn refresh(&mut self, cref: ClauseRef, graph: &ImplicationGraph) {
        self.clauses[cref].update(graph);
        self.value = self.aggregate();
    }

    /// Occurrence counts of live literals in open clauses, most frequent first.
    /// Equal counts keep the order in which the literals were first met.
    #[must_use]
    pub fn get_counter(&self) -> Vec<(Literal, usize)> {
        let mut counts: FxHashMap<Literal, usize> = FxHashMap::default();
        let mut order = Vec::new();

        for clause in self.clauses.iter().filter(|c| c.value().is_unassigned()) {
            for &lit in clause.live() {
                let count = counts.entry(lit).or_insert_with(|| {
                    order.push(lit);
                    0
                });
                *count += 1;
            }
        }

        order
            .into_iter()
            .map(|lit| (lit, counts[&lit]))
            .sorted_by_key(|&(_, count)| Reverse(count))
            .collect_vec()
    }

    /// Number of clauses, learned ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the database holds no clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clauses in database order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Checks that no clause records a level above `level`. Meant for tests and
    /// debug assertions after a backtrack.
    #[must_use]
    pub fn is_below(&self, level: DecisionLevel) -> bool {
        self.clauses
            .iter()
            .all(|c| c.levels().iter().flatten().all(|&l| l <= level))
    }
}

impl Index<ClauseRef> for Formula {
    type Output = Clause;

    fn index(&self, index: ClauseRef) -> &Self::Output {
        &self.clauses[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    fn formula(clauses: &[&[i32]]) -> Formula {
        Formula::new(clauses.iter().map(|c| c.iter().map(|&v| lit(v))))
    }

    #[test]
    fn test_new_skips_empty_lists() {
        let f = formula(&[&[1, 2], &[], &[-1]]);
        assert_eq!(f.len(), 2);
        assert_eq!(f.value(), Value::Unassigned);
    }

    #[test]
    fn test_only_tautologies_is_true() {
        let f = formula(&[&[1, -1], &[2, 3, -2]]);
        assert_eq!(f.value(), Value::True);
    }

    #[test]
    fn test_propagation_chain() {
        let mut f = formula(&[&[1], &[-1, 2], &[-2, 3]]);
        let mut graph = ImplicationGraph::new(3);

        assert_eq!(f.unit_propagate(0, &mut graph), Propagation::Satisfied);
        assert_eq!(
            graph.literals().collect_vec(),
            vec![lit(1), lit(2), lit(3)]
        );
        assert_eq!(graph.get_antecedent(lit(2)), Some(1));
        assert_eq!(graph.get_antecedent(lit(3)), Some(2));
    }

    #[test]
    fn test_unit_conflict() {
        let mut f = formula(&[&[1], &[-1]]);
        let mut graph = ImplicationGraph::new(1);
        assert_eq!(f.unit_propagate(0, &mut graph), Propagation::Conflict(1));
        assert_eq!(f.value(), Value::False);
    }

    #[test]
    fn test_bcp_reports_first_conflict_in_clause_order() {
        let mut f = formula(&[&[1, 2], &[-1, 3], &[-1, -3], &[4, -3]]);
        let mut graph = ImplicationGraph::new(4);
        graph.add_node(lit(-2), None, 1);
        assert_eq!(f.bcp(lit(-2), 1, &graph), Propagation::Undecided);

        assert_eq!(f.unit_propagate(1, &mut graph), Propagation::Conflict(2));
        assert_eq!(graph.get_antecedent(lit(1)), Some(0));
        assert_eq!(graph.get_antecedent(lit(3)), Some(1));
    }

    #[test]
    fn test_backtrack_reopens_clauses() {
        let mut f = formula(&[&[1, 2], &[-1, 3]]);
        let mut graph = ImplicationGraph::new(3);

        graph.add_node(lit(1), None, 1);
        f.bcp(lit(1), 1, &graph);
        assert_eq!(f.unit_propagate(1, &mut graph), Propagation::Satisfied);

        graph.backtrack(0);
        f.backtrack(0, &graph);
        assert!(f.is_below(0));
        assert!(f.iter().all(|c| c.size() == 2));
        assert_eq!(f.unit_propagate(0, &mut graph), Propagation::Undecided);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_counter_orders_by_frequency_then_first_occurrence() {
        let f = formula(&[&[1, 2], &[-1, 2], &[3, -1], &[3, 4]]);
        let counter = f.get_counter();
        assert_eq!(
            counter,
            vec![(lit(2), 2), (lit(-1), 2), (lit(3), 2), (lit(1), 1), (lit(4), 1)]
        );
    }

    #[test]
    fn test_counter_ignores_satisfied_clauses() {
        let mut f = formula(&[&[1, 2], &[-1, 3]]);
        let graph = {
            let mut g = ImplicationGraph::new(3);
            g.add_node(lit(2), None, 1);
            g
        };
        f.bcp(lit(2), 1, &graph);
        assert_eq!(f.get_counter(), vec![(lit(3), 1), (lit(-1), 1)]);
    }
}
