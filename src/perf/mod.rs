//! Generates performance stats for backtest

use itertools::Itertools;
use serde::Serialize;

use crate::history::History;

const TRADING_DAYS: f64 = 252.0;

/// Output for single backtest run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BacktestOutput {
    pub ret: f64,
    pub vol: f64,
    pub mdd: f64,
    pub final_value: f64,
    pub values: Vec<f64>,
    pub returns: Vec<f64>,
    pub dates: Vec<i64>,
    pub first_date: i64,
    pub last_date: i64,
}

/// Worst fall from a running peak as a negative fraction, 0 for a series that never falls.
fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for value in values {
        peak = peak.max(*value);
        //Nothing to fall from until the portfolio has had positive value
        if peak > 0.0 {
            worst = worst.min(value / peak - 1.0);
        }
    }
    worst
}

/// Population standard deviation of daily returns scaled to a year of trading days.
fn annualised_vol(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let count = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / count;
    let var = returns.iter().map(|ret| (ret - mean).powi(2)).sum::<f64>() / count;
    (var * TRADING_DAYS).sqrt()
}

/// Calculates performance statistics from the daily portfolio values in a [History].
///
/// Intended to be run after the simulation is completed.
pub struct PerformanceCalculator;

impl PerformanceCalculator {
    fn get_returns(values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .tuple_windows()
            .map(|(start, end)| {
                //Short books can push value through zero, there is no return to speak of then
                if *start == 0.0 {
                    0.0
                } else {
                    (end / start) - 1.0
                }
            })
            .collect_vec()
    }

    pub fn calculate(history: &History) -> BacktestOutput {
        let values = history.portfolio_values();
        let dates = history.dates().into_iter().map(i64::from).collect_vec();
        let returns = Self::get_returns(&values);

        let first_value = values.first().copied().unwrap_or(0.0);
        let final_value = values.last().copied().unwrap_or(0.0);
        let ret = if first_value == 0.0 {
            0.0
        } else {
            (final_value / first_value) - 1.0
        };
        let vol = annualised_vol(&returns);
        let mdd = max_drawdown(&values);

        BacktestOutput {
            ret,
            vol,
            mdd,
            final_value,
            first_date: dates.first().copied().unwrap_or(0),
            last_date: dates.last().copied().unwrap_or(0),
            values,
            returns,
            dates,
        }
    }
}
