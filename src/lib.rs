//! # How does Islay work?
//!
//! Islay replays a target-weight strategy against daily open and close prices. The goal is a
//! small, deterministic daily simulator where every number in the output can be reproduced by
//! hand from the price table.
//!
//! A replay is composed of a [PriceTable](input::PriceTable), a [Strategy](strategy::Strategy),
//! and an initial portfolio value. Each day after the first, the strategy is shown a
//! [Snapshot](strategy::Snapshot) of prices up to (but excluding) that day along with the current
//! cash, investment and positions. It returns a signal: a map of ticker to target weight, which
//! must be well-formed and have a gross weight of no more than one.
//!
//! ## Execution
//!
//! Trades execute at the open. The previous day's positions are first marked from yesterday's
//! close to today's open, the new target weights are then converted into whole shares against
//! the open, and cash is settled at the open. The new positions are held until the close, where
//! they are marked again. Every short and long position consumes cash equal to its gross value,
//! so there is no leverage and no short proceeds are credited.
//!
//! Share counts are floored and negative counts are moved one share towards zero. This means
//! that shorts can be one share smaller than a naive rounding would suggest.
//!
//! Any failure, a missing signal or a signal that fails validation, stops the replay. Everything
//! up to the failing day is kept in the [History](history::History).
//!
//! ## Example
//!
//! ```
//!     use islay::input::PriceTable;
//!     use islay::simcontext::SimContextBuilder;
//!     use islay::strategy::StaticWeightStrategy;
//!     use islay::types::Signal;
//!
//!     let prices = PriceTable::random(100, vec!["ABC", "BCD"]);
//!     let weights: Signal = vec![("ABC", 0.5), ("BCD", 0.5)].into_iter().collect();
//!
//!     let mut sim = SimContextBuilder::new()
//!         .with_prices(prices)
//!         .with_strategy(StaticWeightStrategy::new(weights))
//!         .with_initial_value(100_000.0)
//!         .build()
//!         .unwrap();
//!
//!     sim.run().unwrap();
//!     let perf = sim.perf();
//!     assert_eq!(perf.values.len(), 100);
//! ```
//!
//! ## Data
//!
//! Prices can be built quote by quote with [PriceTableBuilder](input::PriceTableBuilder),
//! generated randomly, or read from a CSV with a two-row header (ticker, then field). Only the
//! `open` and `close` fields are used.
//!
//! # Missing features that you may expect
//!
//! * Transaction costs
//! * Leverage
//! * Intraday data

pub mod accountant;
pub mod clock;
pub mod error;
pub mod history;
pub mod input;
pub mod perf;
pub mod signal;
pub mod simcontext;
pub mod sizing;
pub mod strategy;
pub mod types;
