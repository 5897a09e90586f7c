//! Generates target allocations

mod equalweight;
mod staticweight;

pub use equalweight::{Direction, EqualWeightStrategy};
pub use staticweight::{StaticWeightMemory, StaticWeightStrategy};

use crate::clock::DateTime;
use crate::input::PriceTable;
use crate::types::{PositionVector, Signal, TraderMemory};

/// Point-in-time view of the simulation handed to [Strategy::get_signal].
///
/// Built fresh for every simulated day and dropped once the strategy returns. `processed_data`
/// only contains rows for days before `timestamp`, so nothing from the current day's prices is
/// visible. `investment`, `cash` and `positions` are as of the previous close.
#[derive(Clone, Debug)]
pub struct Snapshot<'a, P> {
    pub processed_data: &'a [P],
    pub investment: f64,
    pub cash: f64,
    pub timestamp: DateTime,
    pub trader_memory: TraderMemory,
    pub positions: &'a PositionVector,
}

/// User-supplied signal generation.
///
/// The simulation calls `process_data` once before the first day, and `get_signal` once per
/// simulated day after that. Strategies hold no state between days except through the
/// [TraderMemory] they return: the simulation gives that value back unchanged on the next call.
///
/// A strategy does not have to produce a valid signal, the simulation checks it. Returning `None`
/// aborts the run.
pub trait Strategy {
    /// One row of whatever the strategy derives from prices, there should be one row per day.
    type Processed;

    fn process_data(&self, prices: &PriceTable) -> Vec<Self::Processed>;
    fn get_signal(&self, snapshot: &Snapshot<'_, Self::Processed>)
        -> (Option<Signal>, TraderMemory);
}
