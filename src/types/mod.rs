//! Generic types used across package

use std::collections::BTreeMap;

use derive_more::{Display, From};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Slack allowed on the absolute sum of signal weights before a signal is rejected.
pub const SIGNAL_TOLERANCE: f64 = 1e-6;

/// The two prices recorded for every asset on every day.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum PriceField {
    #[display("open")]
    Open,
    #[display("close")]
    Close,
}

///Target allocation produced by a strategy: signed fraction of total portfolio value per ticker,
///negative for short.
//Ordered map so that every sum over assets happens in the same order on every run, floating-point
//results are then reproducible bit-for-bit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal(BTreeMap<String, f64>);

impl Signal {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, ticker: impl AsRef<str>) -> Option<f64> {
        self.0.get(ticker.as_ref()).copied()
    }

    pub fn insert(&mut self, ticker: impl AsRef<str>, weight: f64) {
        self.0.insert(ticker.as_ref().to_string(), weight);
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gross exposure requested by the signal.
    pub fn abs_sum(&self) -> f64 {
        self.0.values().map(|weight| weight.abs()).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Signal {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

///Integer share count held per ticker, negative for short. Tickers absent from the map are flat.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PositionVector(BTreeMap<String, i64>);

impl PositionVector {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Zero shares in every ticker given.
    pub fn flat<S: AsRef<str>>(tickers: &[S]) -> Self {
        Self(
            tickers
                .iter()
                .map(|ticker| (ticker.as_ref().to_string(), 0))
                .collect(),
        )
    }

    pub fn get(&self, ticker: impl AsRef<str>) -> i64 {
        self.0.get(ticker.as_ref()).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, ticker: impl AsRef<str>, shares: i64) {
        self.0.insert(ticker.as_ref().to_string(), shares);
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for PositionVector {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

///Realised exposure per ticker as a fraction of portfolio value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightVector(BTreeMap<String, f64>);

impl WeightVector {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, ticker: impl AsRef<str>) -> f64 {
        self.0.get(ticker.as_ref()).copied().unwrap_or(0.0)
    }

    pub fn insert(&mut self, ticker: impl AsRef<str>, weight: f64) {
        self.0.insert(ticker.as_ref().to_string(), weight);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WeightVector {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Cash, invested value and their total. Constructors always derive one field from the other two
/// so `portfolio_value == cash + investment` holds for every value of this type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    cash: f64,
    investment: f64,
    portfolio_value: f64,
}

impl PortfolioState {
    /// Everything in cash, nothing invested.
    pub fn new(initial_value: f64) -> Self {
        Self {
            cash: initial_value,
            investment: 0.0,
            portfolio_value: initial_value,
        }
    }

    /// Total is recomputed from the parts.
    pub fn from_parts(cash: f64, investment: f64) -> Self {
        Self {
            cash,
            investment,
            portfolio_value: cash + investment,
        }
    }

    /// Investment is recomputed as the residual of total less cash.
    pub fn from_total(portfolio_value: f64, cash: f64) -> Self {
        Self {
            cash,
            investment: portfolio_value - cash,
            portfolio_value,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn investment(&self) -> f64 {
        self.investment
    }

    pub fn portfolio_value(&self) -> f64 {
        self.portfolio_value
    }
}

///Opaque state owned by a strategy and handed back to it on the next day. The simulation only
///forwards this value, it never reads it.
#[derive(Clone, Debug, Default, Display, Eq, From, PartialEq, Serialize, Deserialize)]
pub struct TraderMemory(String);

impl TraderMemory {
    pub fn new() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stores any serializable value as JSON.
    pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self(serde_json::to_string(value)?))
    }

    /// Reads back a value stored with [TraderMemory::encode].
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.0)
    }
}

impl From<&str> for TraderMemory {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{PortfolioState, PositionVector, Signal, TraderMemory};

    #[test]
    fn test_that_signal_abs_sum_counts_shorts() {
        let signal: Signal = vec![("ABC", -0.5), ("BCD", 0.25)].into_iter().collect();
        assert_eq!(signal.abs_sum(), 0.75);
        assert_eq!(signal.keys(), vec!["ABC".to_string(), "BCD".to_string()]);
    }

    #[test]
    fn test_that_missing_positions_are_flat() {
        let mut positions = PositionVector::flat(&["ABC"]);
        positions.insert("BCD", -3);
        assert_eq!(positions.get("ABC"), 0);
        assert_eq!(positions.get("BCD"), -3);
        assert_eq!(positions.get("XYZ"), 0);
    }

    #[test]
    fn test_that_portfolio_state_constructors_keep_identity() {
        let state = PortfolioState::from_parts(30.0, 945.0);
        assert_eq!(state.portfolio_value(), 975.0);

        let state = PortfolioState::from_total(1000.0, 30.0);
        assert_eq!(state.investment(), 970.0);
        assert_eq!(state.cash() + state.investment(), state.portfolio_value());
    }

    #[test]
    fn test_that_trader_memory_round_trips_typed_state() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Counter {
            days: u32,
        }

        let memory = TraderMemory::encode(&Counter { days: 4 }).unwrap();
        let decoded: Counter = memory.decode().unwrap();
        assert_eq!(decoded, Counter { days: 4 });

        let raw = TraderMemory::from("Equal weight signals generated");
        assert_eq!(raw.to_string(), "Equal weight signals generated");
        assert!(raw.decode::<Counter>().is_err());
    }
}
