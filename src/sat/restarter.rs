#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Restart policies.
//!
//! A restart abandons the current trail and rebuilds the clause database from
//! the original and learned clauses. The policy only decides *when*: the
//! solver consults it once per conflict through [`Restarter::should_restart`].
//!
//! This module provides:
//! - The `Restarter` trait, the interface the solver drives.
//! - `Fixed`: restart once more than `N` conflicts have been seen since the
//!   last restart. `Fixed<100>` is the solver's default.
//! - `Luby`: intervals following the Luby sequence scaled by `N`
//!   (`N, N, 2N, N, N, 2N, 4N, ...`).
//! - `Never`: restarts are disabled.

use core::fmt::Debug;

/// Trait defining the interface for restart strategies.
///
/// Implementors count down the conflicts left before the next restart. The
/// count is reset (to a possibly different interval) by every restart.
pub trait Restarter: Debug + Clone {
    /// Creates the policy in its starting state.
    fn new() -> Self;

    /// Returns the number of conflicts remaining until the next restart.
    /// When this count reaches zero, the next conflict triggers a restart.
    fn restarts_in(&self) -> usize;

    /// Decrements the count of conflicts remaining until the next restart.
    fn increment_restarts_in(&mut self);

    /// Records a restart and resets the countdown to the next interval.
    fn restart(&mut self);

    /// Returns the total number of restarts triggered by this policy.
    fn num_restarts(&self) -> usize;

    /// Called once per conflict.
    ///
    /// If `restarts_in()` is 0, this method calls `restart()` and returns `true`.
    /// Otherwise, it counts the conflict down and returns `false`.
    ///
    /// # Returns
    /// `true` if a restart was triggered, `false` otherwise.
    fn should_restart(&mut self) -> bool {
        if self.restarts_in() == 0 {
            self.restart();
            true
        } else {
            self.increment_restarts_in();
            false
        }
    }
}

/// A fixed interval restart strategy.
///
/// The countdown starts at `N`, so the restart happens on the conflict after
/// the `N`th, i.e. once the number of conflicts since the last restart exceeds
/// `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed<const N: usize> {
    /// Total number of restarts performed.
    restarts: usize,
    /// Number of conflicts remaining until the next restart.
    restarts_in: usize,
}

impl<const N: usize> Restarter for Fixed<N> {
    /// # Panics
    ///
    /// If `N` is zero.
    fn new() -> Self {
        assert!(N > 0, "Fixed interval N must be positive.");
        Self {
            restarts: 0,
            restarts_in: N,
        }
    }

    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn increment_restarts_in(&mut self) {
        self.restarts_in = self.restarts_in.saturating_sub(1);
    }

    fn restart(&mut self) {
        self.restarts += 1;
        self.restarts_in = N;
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

/// A restart strategy based on the Luby sequence.
///
/// The sequence `1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...` repeats every
/// finished prefix before doubling. The `i`th interval is `luby(i) * N`
/// conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Luby<const N: usize> {
    /// Total number of restarts performed.
    restarts: usize,
    /// Number of conflicts remaining until the next restart.
    restarts_in: usize,
    /// 1-based index into the sequence of the interval that follows the next
    /// restart.
    restarts_next: usize,
}

impl<const N: usize> Luby<N> {
    /// The `i`th element (1-based) of the Luby sequence.
    fn luby(mut i: usize) -> usize {
        loop {
            let mut k = 1;
            while (1 << k) - 1 < i {
                k += 1;
            }
            if (1 << k) - 1 == i {
                return 1 << (k - 1);
            }
            i -= (1 << (k - 1)) - 1;
        }
    }
}

impl<const N: usize> Restarter for Luby<N> {
    /// The first interval is `N * luby(1) = N`.
    fn new() -> Self {
        assert!(N > 0, "Luby unit N must be positive.");
        Self {
            restarts: 0,
            restarts_in: N,
            restarts_next: 2,
        }
    }

    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn increment_restarts_in(&mut self) {
        self.restarts_in = self.restarts_in.saturating_sub(1);
    }

    fn restart(&mut self) {
        self.restarts += 1;
        self.restarts_in = Self::luby(self.restarts_next) * N;
        self.restarts_next += 1;
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

/// A strategy that never triggers a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Never {}

impl Restarter for Never {
    fn new() -> Self {
        Self {}
    }

    fn restarts_in(&self) -> usize {
        usize::MAX
    }

    fn increment_restarts_in(&mut self) {}

    fn restart(&mut self) {}

    fn num_restarts(&self) -> usize {
        0
    }

    fn should_restart(&mut self) -> bool {
        false
    }
}
