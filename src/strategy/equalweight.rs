use crate::input::{PriceRow, PriceTable};
use crate::strategy::{Snapshot, Strategy};
use crate::types::{Signal, TraderMemory};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Long,
    Short,
}

///Splits the whole portfolio evenly across every ticker currently held, long or short.
///
///The universe is read from the snapshot positions, which are seeded with every ticker in the
///price table on the first day.
#[derive(Clone, Debug)]
pub struct EqualWeightStrategy {
    direction: Direction,
}

impl EqualWeightStrategy {
    pub const MEMORY: &'static str = "Equal weight signals generated";

    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    pub fn long() -> Self {
        Self::new(Direction::Long)
    }

    pub fn short() -> Self {
        Self::new(Direction::Short)
    }
}

impl Strategy for EqualWeightStrategy {
    type Processed = PriceRow;

    fn process_data(&self, prices: &PriceTable) -> Vec<PriceRow> {
        prices.rows()
    }

    fn get_signal(&self, snapshot: &Snapshot<'_, PriceRow>) -> (Option<Signal>, TraderMemory) {
        let tickers = snapshot.positions.keys();
        if tickers.is_empty() {
            return (Some(Signal::new()), TraderMemory::from(Self::MEMORY));
        }

        let weight = 1.0 / tickers.len() as f64;
        let weight = match self.direction {
            Direction::Long => weight,
            Direction::Short => -weight,
        };
        let signal = tickers.into_iter().map(|ticker| (ticker, weight)).collect();
        (Some(signal), TraderMemory::from(Self::MEMORY))
    }
}
