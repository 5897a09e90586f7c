//! Converts target weights into whole shares

use log::debug;

use crate::input::PriceTable;
use crate::types::{PositionVector, PriceField, Signal};

/// Sizes positions from a validated [Signal].
///
/// Each ticker gets `floor(weight * portfolio_value / price)` shares, using floor division so a
/// fractional short rounds away from zero. Every negative result is then moved one share towards
/// zero. The intent of that correction is unverified: it may be compensating for the floor on shorts
/// rather than being a trading rule. Do not remove it without checking downstream results.
///
/// Only tickers listed in the signal appear in the output.
pub struct PositionSizer;

impl PositionSizer {
    pub fn size(
        signal: &Signal,
        portfolio_value: f64,
        prices: &PriceTable,
        day: usize,
        field: PriceField,
    ) -> PositionVector {
        let mut positions = PositionVector::new();
        for (ticker, weight) in signal.iter() {
            //Validated signals only contain tickers from the table, nothing to size otherwise
            let Some(price) = prices.price(ticker, day, field) else {
                continue;
            };
            let shares = Self::shares(*weight, portfolio_value, price);
            debug!(
                "SIZER: {:?} weight {:?} at {:?} {:?} -> {:?} shares",
                ticker, weight, field, price, shares
            );
            positions.insert(ticker, shares);
        }
        positions
    }

    /// Share count for one ticker.
    pub fn shares(weight: f64, portfolio_value: f64, price: f64) -> i64 {
        //Floor of the rounded quotient, not euclidean division on the remainder
        let raw = (weight * portfolio_value / price).floor() as i64;
        if raw < 0 {
            raw + 1
        } else {
            raw
        }
    }
}
