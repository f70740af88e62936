#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! All-decision conflict analysis.
//!
//! Starting from the falsified clause, every literal whose negation was
//! implied by propagation is resolved away against the clause that implied it.
//! What is left mentions only decisions (and level `0` hypotheses), so the
//! learned clause is the negation of the decisions responsible for the
//! conflict.
//!
//! Each resolution step picks the first literal of the current resolvent, in
//! the resolvent's own order, whose negation has an antecedent.

use crate::misc::log::targets;
use crate::sat::clause::{Clause, ResolutionError};
use crate::sat::formula::{ClauseRef, Formula};
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::{DecisionLevel, ImplicationGraph};
use itertools::Itertools;
use rustc_hash::FxHashSet;

/// The outcome of analysing one conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The conflict does not depend on any decision above level `0`. The
    /// clause holds the negated level `0` decisions (hypotheses) it does
    /// depend on; when it is empty the formula itself is unsatisfiable.
    Ground(Clause),
    /// A clause to learn and the level to jump back to.
    Learned {
        /// The negated decisions behind the conflict.
        clause: Clause,
        /// The second highest level in `clause`.
        backtrack_level: DecisionLevel,
    },
    /// The resolution budget ran out. The partial resolvent is still entailed
    /// by the formula and may be kept across the restart.
    Restart(Clause),
}

/// A resolvent together with what it took to derive it.
struct Derivation {
    clause: Clause,
    involved: Vec<Variable>,
    steps: usize,
    exhausted: bool,
}

/// Resolves `start` until every literal left has a decision as its negation,
/// or until `max_steps` resolutions have been made.
fn derive(
    start: Clause,
    formula: &Formula,
    graph: &ImplicationGraph,
    max_steps: Option<usize>,
) -> Derivation {
    let mut learned = start;
    let mut involved: Vec<Variable> = learned.iter().map(|l| l.variable()).collect();
    let mut rejected: FxHashSet<Literal> = FxHashSet::default();
    let mut steps = 0_usize;

    while let Some((pivot, reason)) = next_pivot(&learned, graph, &rejected) {
        if max_steps.is_some_and(|max| steps >= max) {
            return Derivation {
                clause: learned,
                involved,
                steps,
                exhausted: true,
            };
        }

        let antecedent = &formula[reason];
        match learned.resolution_operate(antecedent, pivot) {
            Ok(resolvent) => {
                log::trace!(target: targets::ANALYSIS, "{learned} ⊗ {antecedent} on {pivot} = {resolvent}");
                involved.extend(antecedent.iter().map(|l| l.variable()));
                learned = resolvent;
                steps += 1;
            }
            Err(ResolutionError::Tautology(lit)) => {
                log::warn!(
                    target: targets::ANALYSIS,
                    "skipping pivot {pivot}: resolvent would contain {lit} and {}",
                    -lit
                );
                rejected.insert(pivot);
            }
        }
    }

    Derivation {
        clause: learned,
        involved: involved.into_iter().unique().collect_vec(),
        steps,
        exhausted: false,
    }
}

/// Derives a clause from the falsified clause at `cref`.
///
/// # Arguments
///
/// * `formula`: The clause database the conflict was found in.
/// * `graph`: The implication graph at the moment of the conflict.
/// * `cref`: The falsified clause.
/// * `max_steps`: The most resolution steps to take before giving up with
///   [`Conflict::Restart`]. `None` for no limit.
///
/// # Returns
///
/// The [`Conflict`] together with every variable that took part in the
/// derivation, for the branching heuristic to bump.
///
/// # Panics
///
/// If the clause at `cref` is not falsified.
#[must_use]
pub fn analyse_conflict(
    formula: &Formula,
    graph: &ImplicationGraph,
    cref: ClauseRef,
    max_steps: Option<usize>,
) -> (Conflict, Vec<Variable>) {
    assert!(
        formula[cref].value().is_false(),
        "conflict analysis started from clause {cref}, which is not falsified"
    );

    let Derivation {
        clause,
        involved,
        steps,
        exhausted,
    } = derive(formula[cref].clone(), formula, graph, max_steps);

    if exhausted {
        log::debug!(target: targets::ANALYSIS, "resolution budget of {steps} steps spent");
        return (Conflict::Restart(clause), involved);
    }

    match clause.get_backtrack_level() {
        Some(backtrack_level) => {
            log::debug!(
                target: targets::ANALYSIS,
                "learned {clause} after {steps} steps, backtrack to {backtrack_level}"
            );
            (
                Conflict::Learned {
                    clause,
                    backtrack_level,
                },
                involved,
            )
        }
        None => {
            log::debug!(target: targets::ANALYSIS, "{clause} is falsified at level 0");
            (Conflict::Ground(clause), involved)
        }
    }
}

/// Explains why `literal` holds: the clause obtained by resolving its
/// antecedent down to decisions. It contains `literal` itself and the negation
/// of every decision `literal` depends on.
///
/// `None` if `literal` is not on the trail or is a decision.
#[must_use]
pub fn explain(formula: &Formula, graph: &ImplicationGraph, literal: Literal) -> Option<Clause> {
    let reason = graph.get_antecedent(literal)?;
    Some(derive(formula[reason].clone(), formula, graph, None).clause)
}

/// The first literal of `clause` whose negation was propagated, with the
/// clause that propagated it.
fn next_pivot(
    clause: &Clause,
    graph: &ImplicationGraph,
    rejected: &FxHashSet<Literal>,
) -> Option<(Literal, ClauseRef)> {
    clause
        .iter()
        .filter(|lit| !rejected.contains(lit))
        .find_map(|&lit| graph.get_antecedent(-lit).map(|reason| (lit, reason)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::formula::Propagation;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    fn formula(clauses: &[&[i32]]) -> Formula {
        Formula::new(clauses.iter().map(|c| c.iter().map(|&v| lit(v))))
    }

    /// Decides `decisions` one level at a time, propagating after each, and
    /// returns the first conflict.
    fn run(f: &mut Formula, graph: &mut ImplicationGraph, decisions: &[i32]) -> ClauseRef {
        if let Propagation::Conflict(cref) = f.unit_propagate(0, graph) {
            return cref;
        }
        for (level, &d) in (1..).zip(decisions) {
            graph.add_node(lit(d), None, level);
            if let Propagation::Conflict(cref) = f.bcp(lit(d), level, graph) {
                return cref;
            }
            if let Propagation::Conflict(cref) = f.unit_propagate(level, graph) {
                return cref;
            }
        }
        panic!("no conflict reached");
    }

    #[test]
    fn test_learns_negated_decisions() {
        // x1 and x2 together force x3 and -x3.
        let mut f = formula(&[&[-1, -2, 3], &[-1, -2, -3], &[4, 5]]);
        let mut graph = ImplicationGraph::new(5);
        let cref = run(&mut f, &mut graph, &[1, 2]);
        assert_eq!(cref, 1);

        let (conflict, involved) = analyse_conflict(&f, &graph, cref, None);
        let Conflict::Learned {
            clause,
            backtrack_level,
        } = conflict
        else {
            panic!("expected a learned clause, got {conflict:?}");
        };

        assert_eq!(
            clause.iter().copied().sorted().collect_vec(),
            vec![lit(-2), lit(-1)]
        );
        assert_eq!(backtrack_level, 1);
        assert!(involved.contains(&3));
    }

    #[test]
    fn test_single_decision_backtracks_to_zero() {
        let mut f = formula(&[&[-1, 2], &[-1, -2]]);
        let mut graph = ImplicationGraph::new(2);
        let cref = run(&mut f, &mut graph, &[1]);

        let (conflict, _) = analyse_conflict(&f, &graph, cref, None);
        assert!(matches!(
            conflict,
            Conflict::Learned { ref clause, backtrack_level: 0 } if clause.to_dimacs() == vec![-1]
        ));
    }

    #[test]
    fn test_level_zero_conflict_is_ground() {
        let mut f = formula(&[&[1], &[-1, 2], &[-2, -1]]);
        let mut graph = ImplicationGraph::new(2);
        let cref = run(&mut f, &mut graph, &[]);

        let (conflict, _) = analyse_conflict(&f, &graph, cref, None);
        assert!(matches!(conflict, Conflict::Ground(ref c) if c.is_empty()));
    }

    #[test]
    fn test_hypothesis_only_conflict_is_ground() {
        let mut f = formula(&[&[-1, -2]]);
        let mut graph = ImplicationGraph::new(2);
        graph.add_node(lit(1), None, 0);
        f.bcp(lit(1), 0, &graph);
        graph.add_node(lit(2), None, 0);
        let Propagation::Conflict(cref) = f.bcp(lit(2), 0, &graph) else {
            panic!("expected a conflict");
        };

        let (conflict, _) = analyse_conflict(&f, &graph, cref, None);
        let Conflict::Ground(clause) = conflict else {
            panic!("expected a ground conflict, got {conflict:?}");
        };
        assert_eq!(
            clause.iter().copied().sorted().collect_vec(),
            vec![lit(-2), lit(-1)]
        );
    }

    #[test]
    fn test_explain_implied_literal() {
        // Hypotheses 1 and 2 force 3, which forces 4.
        let mut f = formula(&[&[-1, -2, 3], &[-3, 4], &[5, 6]]);
        let mut graph = ImplicationGraph::new(6);
        for h in [1, 2] {
            graph.add_node(lit(h), None, 0);
            f.bcp(lit(h), 0, &graph);
        }
        assert_eq!(f.unit_propagate(0, &mut graph), Propagation::Undecided);

        let why = explain(&f, &graph, lit(4)).unwrap();
        assert_eq!(
            why.iter().copied().sorted().collect_vec(),
            vec![lit(-2), lit(-1), lit(4)]
        );
        assert_eq!(explain(&f, &graph, lit(1)), None);
        assert_eq!(explain(&f, &graph, lit(-4)), None);
    }

    #[test]
    fn test_budget_exhausted_restarts() {
        let mut f = formula(&[&[-1, -2, 3], &[-1, -2, -3], &[4, 5]]);
        let mut graph = ImplicationGraph::new(5);
        let cref = run(&mut f, &mut graph, &[1, 2]);

        let (conflict, _) = analyse_conflict(&f, &graph, cref, Some(0));
        assert!(matches!(conflict, Conflict::Restart(ref c) if c == &f[cref]));
    }
}
