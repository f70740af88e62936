#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Ready-made solver configurations.
//!
//! [`Config`] pairs any branching heuristic with any restart policy; the
//! aliases below name the combinations the command line offers.

use crate::sat::restarter::{Fixed, Luby, Never, Restarter};
use crate::sat::solver::SolverConfig;
use crate::sat::variable_selection::{
    FixedOrder, LiteralCount, RandomOrder, VariableSelection, Vsids,
};
use core::fmt::{self, Debug};
use core::marker::PhantomData;

/// A configuration built from a heuristic `V` and a restart policy `R`.
pub struct Config<V, R>(PhantomData<(V, R)>);

impl<V, R> Debug for Config<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config<{}, {}>",
            core::any::type_name::<V>(),
            core::any::type_name::<R>()
        )
    }
}

impl<V, R> Clone for Config<V, R> {
    fn clone(&self) -> Self {
        Self(PhantomData)
    }
}

impl<V: VariableSelection, R: Restarter> SolverConfig for Config<V, R> {
    type VariableSelector = V;
    type Restarter = R;
}

/// Unit of the Luby restart sequence used by the `luby` aliases.
pub const LUBY_UNIT: usize = 32;

/// Restart after more than this many conflicts in the `fixed` aliases.
pub const FIXED_INTERVAL: usize = 100;

/// [`LiteralCount`] with a fixed restart interval.
pub type CountFixed = Config<LiteralCount, Fixed<FIXED_INTERVAL>>;
/// [`LiteralCount`] with Luby restarts.
pub type CountLuby = Config<LiteralCount, Luby<LUBY_UNIT>>;
/// [`LiteralCount`] without restarts.
pub type CountNever = Config<LiteralCount, Never>;

/// [`FixedOrder`] with a fixed restart interval.
pub type OrderFixed = Config<FixedOrder, Fixed<FIXED_INTERVAL>>;
/// [`FixedOrder`] with Luby restarts.
pub type OrderLuby = Config<FixedOrder, Luby<LUBY_UNIT>>;
/// [`FixedOrder`] without restarts.
pub type OrderNever = Config<FixedOrder, Never>;

/// [`RandomOrder`] with a fixed restart interval.
pub type RandomFixed = Config<RandomOrder, Fixed<FIXED_INTERVAL>>;
/// [`RandomOrder`] with Luby restarts.
pub type RandomLuby = Config<RandomOrder, Luby<LUBY_UNIT>>;
/// [`RandomOrder`] without restarts.
pub type RandomNever = Config<RandomOrder, Never>;

/// [`Vsids`] with a fixed restart interval.
pub type VsidsFixed = Config<Vsids, Fixed<FIXED_INTERVAL>>;
/// [`Vsids`] with Luby restarts.
pub type VsidsLuby = Config<Vsids, Luby<LUBY_UNIT>>;
/// [`Vsids`] without restarts.
pub type VsidsNever = Config<Vsids, Never>;
