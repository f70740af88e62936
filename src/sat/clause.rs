#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Clauses with assignment-aware bookkeeping.
//!
//! A [`Clause`] keeps its literals next to the decision level each one was
//! assigned at (`None` while unassigned) and partitions both sequences in place:
//! the first [`Clause::size`] entries are the live literals, the rest have been
//! fixed by the trail. Alongside the partition it caches its [`Value`].
//!
//! The clause does not keep watch pointers. Once more than one literal is live,
//! every propagated literal triggers a full rescan against the implication
//! graph ([`Clause::update`]). This keeps the accounting trivially correct and
//! makes the order in which conflicts are discovered depend only on clause
//! order.
//!
//! Invariants, checked in debug builds after every mutation:
//!
//! - `size` equals the number of `None` levels, and those come first.
//! - `value == True` iff a literal is satisfied (tautologies are `True` from
//!   construction on and are never rescanned).
//! - `value == False` iff `size == 0` and no literal is satisfied.
//! - `value == Unassigned` implies `size >= 1`.

use crate::sat::assignment::Value;
use crate::sat::literal::Literal;
use crate::sat::trail::{DecisionLevel, ImplicationGraph};
use core::fmt;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

/// Inline storage for the literals of a clause.
pub type LiteralStorage = SmallVec<[Literal; 8]>;

type LevelStorage = SmallVec<[Option<DecisionLevel>; 8]>;

/// Reasons a resolution step is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Both `literal` and its negation would end up in the resolvent.
    #[error("resolvent would contain both {0} and its negation")]
    Tautology(Literal),
}

/// A disjunction of literals together with its state under the current trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: LiteralStorage,
    levels: LevelStorage,
    size: usize,
    value: Value,
    tautology: bool,
}

impl Clause {
    /// Creates an unassigned clause.
    ///
    /// Repeated literals are kept once. A clause holding a literal and its
    /// negation is marked `True` here, once, and stays that way.
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        let literals: LiteralStorage = literals.into_iter().unique().collect();
        let levels = smallvec::smallvec![None; literals.len()];

        let seen: FxHashSet<Literal> = literals.iter().copied().collect();
        let tautology = literals.iter().any(|&lit| seen.contains(&-lit));

        Self {
            size: literals.len(),
            literals,
            levels,
            value: if tautology { Value::True } else { Value::Unassigned },
            tautology,
        }
    }

    /// Creates a clause whose literals were already assigned at `levels`.
    ///
    /// Used for resolvents, which inherit the levels of their parents. A clause
    /// with nothing live is taken to be falsified.
    ///
    /// # Panics
    ///
    /// If the two sequences differ in length.
    #[must_use]
    pub fn with_levels(literals: LiteralStorage, levels: LevelStorage) -> Self {
        assert_eq!(
            literals.len(),
            levels.len(),
            "every literal needs a decision level"
        );

        let size = levels.iter().filter(|l| l.is_none()).count();
        let mut clause = Self {
            literals,
            levels,
            size,
            value: if size == 0 { Value::False } else { Value::Unassigned },
            tautology: false,
        };
        clause.arrange();
        clause
    }

    /// Applies `literal` having just been made true at `level`.
    ///
    /// A unit clause is decided directly. Larger clauses are rescanned against
    /// the whole of `graph`.
    pub fn bcp(
        &mut self,
        literal: Literal,
        level: DecisionLevel,
        graph: &ImplicationGraph,
    ) -> Value {
        if self.tautology {
            return self.value;
        }
        self.debug_check();

        match self.size {
            0 => debug_assert!(
                !self.value.is_unassigned(),
                "a clause with nothing live must be decided"
            ),
            1 => {
                debug_assert!(self.value.is_unassigned());
                let unit = self.literals[0];
                if unit == literal {
                    self.levels[0] = Some(level);
                    self.size = 0;
                    self.value = Value::True;
                } else if unit == -literal {
                    self.levels[0] = Some(level);
                    self.size = 0;
                    self.value = Value::False;
                }
            }
            _ => {
                debug_assert!(self.value.is_unassigned());
                self.update(graph);
            }
        }

        self.debug_check();
        self.value
    }

    /// Rescans every literal against `graph`.
    ///
    /// Satisfied literals mark the clause `True` at the lowest level any of
    /// them was assigned; every other literal is capped to that level.
    /// Falsified literals keep the first level they were seen at.
    pub fn update(&mut self, graph: &ImplicationGraph) {
        if self.tautology {
            return;
        }

        let mut satisfied_at: Option<DecisionLevel> = None;

        for (lit, level) in self.literals.iter().zip(self.levels.iter_mut()) {
            match graph.node_of(*lit) {
                Some(node) if node.literal == *lit => {
                    *level = Some(node.level);
                    satisfied_at = Some(satisfied_at.map_or(node.level, |l| l.min(node.level)));
                }
                Some(node) if level.is_none() => *level = Some(node.level),
                _ => {}
            }
        }

        if let Some(min) = satisfied_at {
            self.value = Value::True;
            for level in &mut self.levels {
                if level.is_none_or(|l| l > min) {
                    *level = Some(min);
                }
            }
        }

        self.size = self.levels.iter().filter(|l| l.is_none()).count();
        if self.size == 0 && satisfied_at.is_none() {
            self.value = Value::False;
        }

        self.arrange();
    }

    /// Re-derives the state for a trail cut back to `level`.
    ///
    /// `graph` must already be backtracked. Every literal assigned above `level`
    /// becomes live again.
    pub fn restore(&mut self, level: DecisionLevel, graph: &ImplicationGraph) {
        if self.tautology {
            return;
        }

        self.update(graph);

        for entry in &mut self.levels {
            if entry.is_some_and(|l| l > level) {
                *entry = None;
            }
        }

        self.size = self.levels.iter().filter(|l| l.is_none()).count();
        if self.size > 0 {
            self.value = Value::Unassigned;
        }

        debug_assert!(
            self.levels.iter().flatten().all(|&l| l <= level),
            "clause keeps a level above {level} after restore"
        );
        self.debug_check();
    }

    /// Resolves `self` against `other` on `pivot`.
    ///
    /// The resolvent holds every literal of `self` except `pivot` followed by
    /// every literal of `other` except `-pivot`, each once and with the level it
    /// had in its parent.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::Tautology`] if the resolvent would contain a
    /// complementary pair. No clause is produced in that case.
    ///
    /// # Panics
    ///
    /// If `pivot` is not in `self` or `-pivot` is not in `other`.
    pub fn resolution_operate(
        &self,
        other: &Self,
        pivot: Literal,
    ) -> Result<Self, ResolutionError> {
        assert!(
            self.contains(pivot) && other.contains(-pivot),
            "resolution on {pivot} needs it in the first clause and its negation in the second"
        );

        let mut literals = LiteralStorage::new();
        let mut levels = LevelStorage::new();
        let mut present: FxHashSet<Literal> = FxHashSet::default();

        let parents = self.pairs().chain(other.pairs());
        for (lit, level) in parents {
            if lit.variable() == pivot.variable() || present.contains(&lit) {
                continue;
            }
            if present.contains(&-lit) {
                return Err(ResolutionError::Tautology(lit));
            }
            present.insert(lit);
            literals.push(lit);
            levels.push(level);
        }

        let resolvent = Self::with_levels(literals, levels);
        debug_assert!(!resolvent.contains(pivot) && !resolvent.contains(-pivot));
        Ok(resolvent)
    }

    /// The level to jump back to once this clause is learned: the second
    /// highest distinct level among its literals, or one below the highest if
    /// all share a level.
    ///
    /// `None` stands for "below level 0": the clause is falsified by level 0
    /// alone (or has no assigned literal at all).
    #[must_use]
    pub fn get_backtrack_level(&self) -> Option<DecisionLevel> {
        let highest = self.levels.iter().flatten().copied().max()?;
        self.levels
            .iter()
            .flatten()
            .copied()
            .filter(|&l| l < highest)
            .max()
            .or_else(|| highest.checked_sub(1))
    }

    /// Literals recorded at exactly `level`.
    pub fn literal_at_level(&self, level: DecisionLevel) -> impl Iterator<Item = Literal> + '_ {
        self.pairs()
            .filter(move |&(_, l)| l == Some(level))
            .map(|(lit, _)| lit)
    }

    /// Puts literals in decreasing (level, literal) order, then moves the live
    /// ones to the front.
    fn arrange(&mut self) {
        let mut pairs: SmallVec<[(Option<DecisionLevel>, Literal); 8]> = self
            .levels
            .iter()
            .copied()
            .zip(self.literals.iter().copied())
            .collect();
        pairs.sort_unstable_by(|a, b| b.cmp(a));
        pairs.rotate_right(self.size);

        for (i, (level, lit)) in pairs.into_iter().enumerate() {
            self.levels[i] = level;
            self.literals[i] = lit;
        }
    }

    fn pairs(&self) -> impl Iterator<Item = (Literal, Option<DecisionLevel>)> + '_ {
        self.literals.iter().copied().zip(self.levels.iter().copied())
    }

    fn debug_check(&self) {
        debug_assert_eq!(
            self.size,
            self.levels.iter().filter(|l| l.is_none()).count(),
            "clause size out of step with its levels"
        );
        debug_assert!(
            self.levels[..self.size].iter().all(Option::is_none),
            "live literals must lead the clause"
        );
        debug_assert!(
            !self.value.is_unassigned() || self.size >= 1,
            "an unassigned clause needs a live literal"
        );
    }

    /// Number of literals, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Whether the clause has no literals at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Number of live literals.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The clause value under the trail it was last updated with.
    #[must_use]
    pub const fn value(&self) -> Value {
        self.value
    }

    /// Open with exactly one live literal.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.size == 1 && self.value.is_unassigned()
    }

    /// Whether some literal occurs with both signs.
    #[must_use]
    pub const fn is_tautology(&self) -> bool {
        self.tautology
    }

    /// Whether `literal` occurs in the clause, live or not.
    #[must_use]
    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(&literal)
    }

    /// All literals, live ones first.
    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// The live literals.
    #[must_use]
    pub fn live(&self) -> &[Literal] {
        &self.literals[..self.size]
    }

    /// Assignment level of each literal, parallel to [`Clause::literals`]. `None` for a live literal.
    #[must_use]
    pub fn levels(&self) -> &[Option<DecisionLevel>] {
        &self.levels
    }

    /// Iterates over all literals, live ones first.
    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// The literals as DIMACS integers.
    #[must_use]
    pub fn to_dimacs(&self) -> Vec<i32> {
        self.literals.iter().map(|l| l.to_i32()).collect_vec()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.literals.iter().join(" ∨ "))
    }
}

impl From<Vec<i32>> for Clause {
    /// # Panics
    ///
    /// If a literal is `0`.
    fn from(literals: Vec<i32>) -> Self {
        Self::new(
            literals
                .into_iter()
                .map(|v| Literal::from_i32(v).expect("0 is not a literal")),
        )
    }
}
