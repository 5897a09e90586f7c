use log::debug;
use serde::{Deserialize, Serialize};

use crate::input::PriceTable;
use crate::strategy::{Snapshot, Strategy};
use crate::types::{Signal, TraderMemory};

/// State [StaticWeightStrategy] threads between days.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StaticWeightMemory {
    pub rebalances: u64,
}

///Returns the same target weights every day, so positions are resized daily back towards them.
#[derive(Clone, Debug)]
pub struct StaticWeightStrategy {
    target_weights: Signal,
}

impl StaticWeightStrategy {
    pub fn new(target_weights: Signal) -> Self {
        Self { target_weights }
    }
}

impl Strategy for StaticWeightStrategy {
    type Processed = ();

    fn process_data(&self, prices: &PriceTable) -> Vec<()> {
        vec![(); prices.len()]
    }

    fn get_signal(&self, snapshot: &Snapshot<'_, ()>) -> (Option<Signal>, TraderMemory) {
        //First call receives empty memory
        let mut memory: StaticWeightMemory = snapshot.trader_memory.decode().unwrap_or_default();
        memory.rebalances += 1;
        debug!(
            "STRATEGY: Rebalancing to static weights, {:?} times so far",
            memory.rebalances
        );
        let memory =
            TraderMemory::encode(&memory).unwrap_or_else(|_| snapshot.trader_memory.clone());
        (Some(self.target_weights.clone()), memory)
    }
}
