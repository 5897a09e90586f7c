//! Running context for backtest

mod builder;

pub use builder::SimContextBuilder;

use log::{debug, info, warn};

use crate::accountant::{Leg, PortfolioAccountant};
use crate::error::BacktestError;
use crate::history::{DayRecord, History};
use crate::input::PriceTable;
use crate::perf::{BacktestOutput, PerformanceCalculator};
use crate::signal::SignalValidator;
use crate::sizing::PositionSizer;
use crate::strategy::{Snapshot, Strategy};
use crate::types::{PortfolioState, PositionVector, PriceField, TraderMemory};

/// Everything carried from the close of one simulated day into the next. `day` is the index of the
/// next day to simulate.
///
/// This is a plain value so that any day can be set up and stepped without replaying the days
/// before it.
#[derive(Clone, Debug, PartialEq)]
pub struct SimState {
    pub day: usize,
    pub portfolio: PortfolioState,
    pub positions: PositionVector,
    pub trader_memory: TraderMemory,
}

impl SimState {
    /// Flat book in every ticker, everything in cash, ready to simulate the day after the first.
    pub fn seed(initial_value: f64, symbols: &[String]) -> Self {
        Self {
            day: 1,
            portfolio: PortfolioState::new(initial_value),
            positions: PositionVector::flat(symbols),
            trader_memory: TraderMemory::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Status {
    Running,
    Finished,
    Failed(BacktestError),
}

/// Context for a single replay.
///
/// Days run strictly in order, each one depending on the previous close. For every day after the
/// first: the strategy is shown a [Snapshot] and returns a signal, the signal is validated, the
/// previous positions are marked from the last close to today's open, new positions are sized
/// against today's open, cash is settled at the open, and the new positions are marked to today's
/// close. The first day is the seed: no positions, all cash.
///
/// Any failure stops the replay for good. The history keeps every day before the failing one.
pub struct SimContext<S>
where
    S: Strategy,
{
    prices: PriceTable,
    strategy: S,
    processed: Vec<S::Processed>,
    state: SimState,
    history: History,
    status: Status,
}

impl<S> SimContext<S>
where
    S: Strategy,
{
    pub(crate) fn new(prices: PriceTable, strategy: S, initial_value: f64) -> Self {
        let processed = strategy.process_data(&prices);
        let state = SimState::seed(initial_value, prices.symbols());

        let mut history = History::new(prices.symbols().to_vec());
        if let Some(date) = prices.date(0) {
            let weights = PortfolioAccountant::weights(
                &state.positions,
                state.portfolio.portfolio_value(),
                &prices,
                0,
            );
            history.push(DayRecord {
                date,
                positions: state.positions.clone(),
                weights,
                state: state.portfolio,
            });
        }

        Self {
            prices,
            strategy,
            processed,
            state,
            history,
            status: Status::Running,
        }
    }

    /// What the strategy sees before trading on `state.day`. `None` once past the last day.
    pub fn snapshot<'a>(&'a self, state: &'a SimState) -> Option<Snapshot<'a, S::Processed>> {
        let timestamp = self.prices.date(state.day)?;
        let visible = state.day.min(self.processed.len());
        Some(Snapshot {
            processed_data: &self.processed[..visible],
            investment: state.portfolio.investment(),
            cash: state.portfolio.cash(),
            timestamp,
            trader_memory: state.trader_memory.clone(),
            positions: &state.positions,
        })
    }

    /// Simulates `state.day` and returns the state to carry into the next day along with the
    /// record for this one. Returns `Ok(None)` when there are no days left.
    pub fn step(&self, state: &SimState) -> Result<Option<(SimState, DayRecord)>, BacktestError> {
        let Some(snapshot) = self.snapshot(state) else {
            return Ok(None);
        };
        let timestamp = snapshot.timestamp;
        let (signal, trader_memory) = self.strategy.get_signal(&snapshot);
        debug!("SIM: Trader memory on {}: {:?}", timestamp, trader_memory.as_str());

        let signal = signal.ok_or(BacktestError::MissingSignal { timestamp })?;
        let signal = SignalValidator::validate(signal, &self.prices, timestamp)?;

        let day = state.day;
        let investment = PortfolioAccountant::mark_to_market(
            &state.positions,
            &self.prices,
            day,
            Leg::Overnight,
            state.portfolio.investment(),
        );
        let at_open = PortfolioState::from_parts(state.portfolio.cash(), investment);

        let positions = PositionSizer::size(
            &signal,
            at_open.portfolio_value(),
            &self.prices,
            day,
            PriceField::Open,
        );
        let cash = PortfolioAccountant::compute_cash(
            &positions,
            at_open.portfolio_value(),
            &self.prices,
            day,
            PriceField::Open,
        );
        let settled = PortfolioState::from_total(at_open.portfolio_value(), cash);

        let investment = PortfolioAccountant::mark_to_market(
            &positions,
            &self.prices,
            day,
            Leg::Intraday,
            settled.investment(),
        );
        let at_close = PortfolioState::from_parts(settled.cash(), investment);
        let weights = PortfolioAccountant::weights(
            &positions,
            at_close.portfolio_value(),
            &self.prices,
            day,
        );

        let record = DayRecord {
            date: timestamp,
            positions: positions.clone(),
            weights,
            state: at_close,
        };
        let next = SimState {
            day: day + 1,
            portfolio: at_close,
            positions,
            trader_memory,
        };
        Ok(Some((next, record)))
    }

    /// Runs every remaining day. Calling again after the replay has finished does nothing, calling
    /// again after a failure returns the same failure.
    pub fn run(&mut self) -> Result<(), BacktestError> {
        match &self.status {
            Status::Finished => return Ok(()),
            Status::Failed(err) => return Err(err.clone()),
            Status::Running => {}
        }

        info!(
            "SIM: Starting replay over {:?} days and {:?} symbols",
            self.prices.len(),
            self.prices.symbols().len()
        );
        loop {
            match self.step(&self.state) {
                Ok(Some((next, record))) => {
                    info!(
                        "SIM: {} closed with portfolio value {:?}",
                        record.date,
                        record.state.portfolio_value()
                    );
                    self.history.push(record);
                    self.state = next;
                }
                Ok(None) => {
                    self.status = Status::Finished;
                    info!(
                        "SIM: Finished with portfolio value {:?}",
                        self.portfolio_value()
                    );
                    return Ok(());
                }
                Err(err) => {
                    warn!("SIM: Replay aborted: {}", err);
                    self.status = Status::Failed(err.clone());
                    return Err(err);
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn portfolio_value(&self) -> f64 {
        self.state.portfolio.portfolio_value()
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    pub fn perf(&self) -> BacktestOutput {
        //Intended to be called at end of simulation
        PerformanceCalculator::calculate(&self.history)
    }
}
