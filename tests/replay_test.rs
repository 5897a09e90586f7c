mod common;

use islay::clock::DateTime;
use islay::error::{BacktestError, ErrorKind};
use islay::input::{PriceRow, PriceTable};
use islay::simcontext::SimContextBuilder;
use islay::strategy::{
    EqualWeightStrategy, Snapshot, StaticWeightMemory, StaticWeightStrategy, Strategy,
};
use islay::types::{Signal, TraderMemory};

/// Returns fixed weights until `stop_at`, then nothing.
struct StopsSignalling {
    stop_at: DateTime,
}

impl Strategy for StopsSignalling {
    type Processed = PriceRow;

    fn process_data(&self, prices: &PriceTable) -> Vec<PriceRow> {
        prices.rows()
    }

    fn get_signal(&self, snapshot: &Snapshot<'_, PriceRow>) -> (Option<Signal>, TraderMemory) {
        if snapshot.timestamp == self.stop_at {
            return (None, snapshot.trader_memory.clone());
        }
        let signal = vec![("ABC", 0.25), ("BCD", 0.25)].into_iter().collect();
        (Some(signal), snapshot.trader_memory.clone())
    }
}

/// Checks that strategies only ever see days before the one being traded.
struct RecordsVisibleDays;

impl Strategy for RecordsVisibleDays {
    type Processed = DateTime;

    fn process_data(&self, prices: &PriceTable) -> Vec<DateTime> {
        prices.dates().to_vec()
    }

    fn get_signal(&self, snapshot: &Snapshot<'_, DateTime>) -> (Option<Signal>, TraderMemory) {
        assert!(snapshot
            .processed_data
            .iter()
            .all(|date| *date < snapshot.timestamp));
        let seen = format!("{}", snapshot.processed_data.len());
        (Some(Signal::new()), TraderMemory::from(seen.as_str()))
    }
}

#[test]
fn short_equal_weight_replay_matches_hand_calculation() {
    common::setup();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(EqualWeightStrategy::short())
        .with_initial_value(1000.0)
        .build()
        .unwrap();
    sim.run().unwrap();

    let history = sim.history();
    assert_eq!(history.len(), 3);

    let first = history.get(DateTime::from(200)).unwrap();
    assert_eq!(first.positions.get("ABC"), -49);
    assert_eq!(first.positions.get("BCD"), -24);
    assert_eq!(first.state.cash(), 1000.0 - (49.0 * 10.0 + 24.0 * 20.0));
    assert_eq!(first.state.investment(), 945.0);
    assert_eq!(first.state.portfolio_value(), 975.0);
    assert_eq!(first.weights.get("ABC"), -49.0 * 11.0 / 975.0);
    assert_eq!(first.weights.get("BCD"), -24.0 * 19.0 / 975.0);

    let second = history.get(DateTime::from(300)).unwrap();
    assert_eq!(second.positions.get("ABC"), -39);
    assert_eq!(second.positions.get("BCD"), -26);
    assert_eq!(second.state.cash(), 14.0);
    assert_eq!(second.state.portfolio_value(), 950.0);
    assert_eq!(sim.portfolio_value(), 950.0);
}

#[test]
fn every_record_conserves_value() {
    common::setup();
    let mut sim = SimContextBuilder::new()
        .with_prices(PriceTable::random(200, vec!["ABC", "BCD", "CDE"]))
        .with_strategy(EqualWeightStrategy::long())
        .build()
        .unwrap();
    sim.run().unwrap();

    assert_eq!(sim.history().len(), 200);
    for record in sim.history().records() {
        let state = record.state;
        assert!((state.cash() + state.investment() - state.portfolio_value()).abs() < 1e-9);
    }
}

#[test]
fn missing_signal_stops_replay_and_keeps_earlier_days() {
    common::setup();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(StopsSignalling {
            stop_at: DateTime::from(300),
        })
        .with_initial_value(1000.0)
        .build()
        .unwrap();

    let err = sim.run().unwrap_err();
    assert_eq!(
        err,
        BacktestError::MissingSignal {
            timestamp: DateTime::from(300)
        }
    );
    assert_eq!(sim.history().len(), 2);
    assert_eq!(sim.history().dates(), vec![DateTime::from(100), DateTime::from(200)]);
    assert!(!sim.is_finished());

    //Failure sticks
    assert_eq!(sim.run().unwrap_err(), err);
    assert_eq!(sim.history().len(), 2);
}

#[test]
fn oversized_signal_fails_on_first_trading_day() {
    common::setup();
    let weights: Signal = vec![("ABC", 0.7), ("BCD", -0.5)].into_iter().collect();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(StaticWeightStrategy::new(weights))
        .with_initial_value(1000.0)
        .build()
        .unwrap();

    let err = sim.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.timestamp(), DateTime::from(200));
    assert_eq!(sim.history().len(), 1);
}

#[test]
fn signal_within_tolerance_is_traded() {
    common::setup();
    let weights: Signal = vec![("ABC", 0.5), ("BCD", 0.5000005)].into_iter().collect();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(StaticWeightStrategy::new(weights))
        .with_initial_value(1000.0)
        .build()
        .unwrap();

    sim.run().unwrap();
    assert!(sim.is_finished());
    assert_eq!(sim.history().len(), 3);
}

#[test]
fn unknown_ticker_is_malformed() {
    common::setup();
    let weights: Signal = vec![("ABC", 0.5), ("XYZ", 0.5)].into_iter().collect();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(StaticWeightStrategy::new(weights))
        .build()
        .unwrap();

    let err = sim.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.timestamp(), DateTime::from(200));
}

#[test]
fn worthless_portfolio_has_zero_weights() {
    common::setup();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(EqualWeightStrategy::short())
        .with_initial_value(0.0)
        .build()
        .unwrap();
    sim.run().unwrap();

    for record in sim.history().records() {
        assert_eq!(record.state.portfolio_value(), 0.0);
        assert!(record.weights.iter().all(|(_, weight)| *weight == 0.0));
        assert!(record.weights.iter().all(|(_, weight)| !weight.is_nan()));
    }
}

#[test]
fn same_inputs_give_identical_histories() {
    common::setup();
    let run = || {
        let mut sim = SimContextBuilder::new()
            .with_prices(PriceTable::random_with_seed(7, 100, vec!["ABC", "BCD", "CDE"]))
            .with_strategy(EqualWeightStrategy::long())
            .with_initial_value(100_000.0)
            .build()
            .unwrap();
        sim.run().unwrap();
        sim.into_history()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    let last_value = |history: &islay::history::History| {
        history.last().unwrap().state.portfolio_value().to_bits()
    };
    assert_eq!(last_value(&first), last_value(&second));
}

#[test]
fn trader_memory_is_threaded_between_days() {
    common::setup();
    let weights: Signal = vec![("ABC", 0.5), ("BCD", 0.5)].into_iter().collect();
    let mut sim = SimContextBuilder::new()
        .with_prices(PriceTable::random(10, vec!["ABC", "BCD"]))
        .with_strategy(StaticWeightStrategy::new(weights))
        .build()
        .unwrap();
    sim.run().unwrap();

    let memory: StaticWeightMemory = sim.state().trader_memory.decode().unwrap();
    assert_eq!(memory.rebalances, 9);
}

#[test]
fn strategy_never_sees_the_day_it_trades() {
    common::setup();
    let mut sim = SimContextBuilder::new()
        .with_prices(PriceTable::random(20, vec!["ABC"]))
        .with_strategy(RecordsVisibleDays)
        .build()
        .unwrap();
    sim.run().unwrap();

    //Last day traded is day 19, which sees days 0 through 18
    assert_eq!(sim.state().trader_memory.as_str(), "19");
}

#[test]
fn perf_summarises_recorded_values() {
    common::setup();
    let mut sim = SimContextBuilder::new()
        .with_prices(common::three_day_prices())
        .with_strategy(EqualWeightStrategy::short())
        .with_initial_value(1000.0)
        .build()
        .unwrap();
    sim.run().unwrap();

    let perf = sim.perf();
    assert_eq!(perf.values, vec![1000.0, 975.0, 950.0]);
    assert_eq!(perf.final_value, 950.0);
    assert_eq!(perf.first_date, 100);
    assert_eq!(perf.last_date, 300);
    assert!((perf.ret - (-0.05)).abs() < 1e-12);
    assert!((perf.mdd - (-0.05)).abs() < 1e-12);
}
