#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The implication graph: the assignment trail together with the reason each
//! literal was assigned.
//!
//! Every assigned literal is a node carrying the decision level it was fixed at
//! and, for implied literals, the clause that forced it. Nodes without an
//! antecedent are decisions (or hypotheses at level `0`). Insertion order is the
//! trail order.
//!
//! At most one polarity of a variable may be on the trail at a time. Breaking
//! that rule means propagation went wrong, so [`ImplicationGraph::add_node`]
//! panics instead of reporting it.

use crate::sat::formula::ClauseRef;
use crate::sat::literal::Literal;

/// Branching depth at which a literal was fixed. `0` holds facts forced
/// before any decision, including hypotheses.
pub type DecisionLevel = u32;

/// A trail entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    /// The literal made true.
    pub literal: Literal,
    /// The clause that was unit when `literal` was propagated, or `None` for
    /// a decision.
    pub antecedent: Option<ClauseRef>,
    /// The decision level of the assignment.
    pub level: DecisionLevel,
}

impl Node {
    /// A node without antecedent: a decision or a hypothesis.
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        self.antecedent.is_none()
    }
}

/// Assigned literals, their justification and their trail order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImplicationGraph {
    /// Indexed by variable; slot `0` is unused.
    nodes: Vec<Option<Node>>,
    trail: Vec<Literal>,
}

impl ImplicationGraph {
    /// An empty graph over `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            nodes: vec![None; num_vars + 1],
            trail: Vec::with_capacity(num_vars),
        }
    }

    /// Records `literal` as true.
    ///
    /// # Panics
    ///
    /// If `literal` or its negation is already assigned.
    pub fn add_node(
        &mut self,
        literal: Literal,
        antecedent: Option<ClauseRef>,
        level: DecisionLevel,
    ) {
        let idx = literal.variable() as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, None);
        }

        if let Some(existing) = self.nodes[idx] {
            panic!(
                "cannot assign {literal}: {} is already on the trail at level {}",
                existing.literal, existing.level
            );
        }

        self.nodes[idx] = Some(Node {
            literal,
            antecedent,
            level,
        });
        self.trail.push(literal);
    }

    /// Removes whichever polarity of `literal` is assigned and returns its node.
    pub fn remove_node(&mut self, literal: Literal) -> Option<Node> {
        let node = self.nodes.get_mut(literal.variable() as usize)?.take()?;
        if let Some(pos) = self.trail.iter().rposition(|&l| l == node.literal) {
            self.trail.remove(pos);
        }
        Some(node)
    }

    /// Drops every node above `level`, newest first.
    pub fn backtrack(&mut self, level: DecisionLevel) {
        let nodes = &mut self.nodes;
        let mut kept = Vec::with_capacity(self.trail.len());

        for &lit in self.trail.iter().rev() {
            let slot = &mut nodes[lit.variable() as usize];
            if slot.is_some_and(|node| node.level > level) {
                *slot = None;
            } else {
                kept.push(lit);
            }
        }

        kept.reverse();
        self.trail = kept;

        debug_assert!(
            self.max_level().is_none_or(|max| max <= level),
            "trail still holds literals above level {level}"
        );
    }

    /// The reason `literal` holds. `None` if it is unassigned, false, or a
    /// decision.
    #[must_use]
    pub fn get_antecedent(&self, literal: Literal) -> Option<ClauseRef> {
        self.get(literal).and_then(|node| node.antecedent)
    }

    /// The node of `literal`, if that exact polarity is assigned.
    #[must_use]
    pub fn get(&self, literal: Literal) -> Option<&Node> {
        self.node_of(literal)
            .filter(|node| node.literal == literal)
    }

    /// The node of the variable of `literal`, in either polarity.
    #[must_use]
    pub fn node_of(&self, literal: Literal) -> Option<&Node> {
        self.nodes
            .get(literal.variable() as usize)
            .and_then(Option::as_ref)
    }

    /// `Some(true)` if `literal` is on the trail, `Some(false)` if its negation
    /// is, `None` otherwise.
    #[must_use]
    pub fn value(&self, literal: Literal) -> Option<bool> {
        self.node_of(literal).map(|node| node.literal == literal)
    }

    /// Whether `literal` itself is on the trail.
    #[must_use]
    pub fn contains(&self, literal: Literal) -> bool {
        self.value(literal) == Some(true)
    }

    /// Whether the variable of `literal` has a value, of either sign.
    #[must_use]
    pub fn is_assigned(&self, literal: Literal) -> bool {
        self.node_of(literal).is_some()
    }

    /// Number of assigned literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    /// Whether nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Trail entries in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.trail.iter().filter_map(|&lit| self.get(lit))
    }

    /// Assigned literals in assignment order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.trail.iter().copied()
    }

    /// The deepest level on the trail.
    #[must_use]
    pub fn max_level(&self) -> Option<DecisionLevel> {
        self.iter().map(|node| node.level).max()
    }
}
