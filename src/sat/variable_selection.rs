#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Branching heuristics.
//!
//! A [`VariableSelection`] picks the next decision literal, polarity included.
//! Every heuristic here only ever returns a literal that is live in some open
//! clause, so a decision always makes progress on the formula.
//!
//! - [`LiteralCount`]: the literal occurring most often among the live
//!   literals of open clauses, recomputed at every decision.
//! - [`FixedOrder`]: the live literal with the smallest variable.
//! - [`RandomOrder`]: a uniformly random live literal from a seeded generator.
//! - [`Vsids`]: the live literal whose variable has the highest activity, with
//!   activities bumped by conflict analysis and decayed after each conflict.

use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::ImplicationGraph;
use core::fmt::Debug;
use itertools::Itertools;
use ordered_float::OrderedFloat;

/// Decay applied to VSIDS activities after each conflict.
pub const DEFAULT_DECAY: f64 = 0.95;

/// A branching heuristic.
pub trait VariableSelection: Debug + Clone {
    /// Creates the heuristic for `num_vars` variables. `seed` feeds any
    /// randomness it uses.
    fn new(num_vars: usize, seed: u64) -> Self;

    /// The next decision literal, or `None` if no open clause has a live
    /// literal left.
    fn pick(&mut self, formula: &Formula, graph: &ImplicationGraph) -> Option<Literal>;

    /// Reports the variables involved in a conflict.
    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T);

    /// Called once per conflict.
    fn decay(&mut self, decay: f64);
}

/// Live literals of open clauses that are still unassigned, in clause order.
fn candidates<'a>(
    formula: &'a Formula,
    graph: &'a ImplicationGraph,
) -> impl Iterator<Item = Literal> + 'a {
    formula
        .iter()
        .filter(|clause| clause.value().is_unassigned())
        .flat_map(|clause| clause.live().iter().copied())
        .filter(|&lit| !graph.is_assigned(lit))
}

/// Dynamic largest literal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiteralCount;

impl VariableSelection for LiteralCount {
    fn new(_: usize, _: u64) -> Self {
        Self
    }

    fn pick(&mut self, formula: &Formula, graph: &ImplicationGraph) -> Option<Literal> {
        formula
            .get_counter()
            .into_iter()
            .map(|(lit, _)| lit)
            .find(|&lit| !graph.is_assigned(lit))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self, _: f64) {}
}

/// Smallest unassigned variable of any open clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedOrder;

impl VariableSelection for FixedOrder {
    fn new(_: usize, _: u64) -> Self {
        Self
    }

    fn pick(&mut self, formula: &Formula, graph: &ImplicationGraph) -> Option<Literal> {
        candidates(formula, graph).min_by_key(|lit| lit.variable())
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self, _: f64) {}
}

/// Uniform choice among the live literals of open clauses, from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomOrder {
    rng: fastrand::Rng,
}

impl VariableSelection for RandomOrder {
    fn new(_: usize, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn pick(&mut self, formula: &Formula, graph: &ImplicationGraph) -> Option<Literal> {
        let pool = candidates(formula, graph).unique().collect_vec();
        self.rng.choice(pool)
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self, _: f64) {}
}

/// Variable State Independent Decaying Sum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vsids {
    activity: Vec<OrderedFloat<f64>>,
}

impl Vsids {
    /// Current activity of `var`.
    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activity.get(var as usize).map_or(0.0, |a| a.0)
    }

    fn bump(&mut self, var: Variable) {
        let idx = var as usize;
        if idx >= self.activity.len() {
            self.activity.resize(idx + 1, OrderedFloat(0.0));
        }
        self.activity[idx] += 1.0;
    }
}

impl VariableSelection for Vsids {
    fn new(num_vars: usize, _: u64) -> Self {
        Self {
            activity: vec![OrderedFloat(0.0); num_vars + 1],
        }
    }

    /// Ties go to the candidate met first.
    fn pick(&mut self, formula: &Formula, graph: &ImplicationGraph) -> Option<Literal> {
        let mut best: Option<(OrderedFloat<f64>, Literal)> = None;
        for lit in candidates(formula, graph) {
            let score = OrderedFloat(self.activity(lit.variable()));
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, lit));
            }
        }
        best.map(|(_, lit)| lit)
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        for var in vars {
            self.bump(var);
        }
    }

    fn decay(&mut self, decay: f64) {
        for activity in &mut self.activity {
            *activity *= decay;
        }
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
    fn test_literal_count_picks_most_frequent() {
        let f = formula(&[&[1, -2], &[-2, 3], &[-2, -3]]);
        let graph = ImplicationGraph::new(3);
        assert_eq!(LiteralCount::new(3, 0).pick(&f, &graph), Some(lit(-2)));
    }

    #[test]
    fn test_fixed_order_picks_smallest_variable() {
        let f = formula(&[&[3, -2], &[-4, 2]]);
        let graph = ImplicationGraph::new(4);
        assert_eq!(FixedOrder::new(4, 0).pick(&f, &graph), Some(lit(-2)));
    }

    #[test]
    fn test_random_order_is_seeded() {
        let f = formula(&[&[1, 2, 3], &[4, 5, 6], &[-1, -6]]);
        let graph = ImplicationGraph::new(6);

        let picks = |seed| {
            let mut selector = RandomOrder::new(6, seed);
            (0..8).map(|_| selector.pick(&f, &graph)).collect_vec()
        };
        assert_eq!(picks(7), picks(7));
        assert!(picks(7).iter().all(Option::is_some));
    }

    #[test]
    fn test_vsids_follows_activity() {
        let f = formula(&[&[1, 2], &[-3, 2]]);
        let graph = ImplicationGraph::new(3);
        let mut vsids = Vsids::new(3, 0);

        assert_eq!(vsids.pick(&f, &graph), Some(lit(1)));

        vsids.bumps([3, 3, 2]);
        assert_eq!(vsids.pick(&f, &graph), Some(lit(-3)));

        vsids.decay(0.5);
        assert!((vsids.activity(3) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nothing_to_pick_when_satisfied() {
        let f = formula(&[&[1, -1]]);
        let graph = ImplicationGraph::new(1);
        assert_eq!(LiteralCount::new(1, 0).pick(&f, &graph), None);
        assert_eq!(FixedOrder::new(1, 0).pick(&f, &graph), None);
        assert_eq!(RandomOrder::new(1, 0).pick(&f, &graph), None);
        assert_eq!(Vsids::new(1, 0).pick(&f, &graph), None);
    }
}
