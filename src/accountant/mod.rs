//! Mark-to-market and cash bookkeeping

use log::debug;

use crate::input::PriceTable;
use crate::types::{PositionVector, PriceField, WeightVector};

/// One of the two price moves a position is held across during a simulated day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Leg {
    /// Previous day's close to this day's open.
    Overnight,
    /// This day's open to this day's close.
    Intraday,
}

impl Leg {
    /// (day, field) the leg starts and ends at. There is no overnight leg into the first day.
    pub fn bounds(&self, day: usize) -> Option<((usize, PriceField), (usize, PriceField))> {
        match self {
            Leg::Overnight => day
                .checked_sub(1)
                .map(|prev| ((prev, PriceField::Close), (day, PriceField::Open))),
            Leg::Intraday => Some(((day, PriceField::Open), (day, PriceField::Close))),
        }
    }
}

/// Pure calculations over positions and prices, the caller owns the portfolio state.
///
/// Cash is modelled with gross collateral: every share, long or short, ties up its full notional
/// value at the pricing field. Cash can go negative when gross exposure exceeds portfolio value,
/// nothing here treats that as an error.
pub struct PortfolioAccountant;

impl PortfolioAccountant {
    /// Returns `investment` plus the change in value of `positions` over `leg` of `day`.
    pub fn mark_to_market(
        positions: &PositionVector,
        prices: &PriceTable,
        day: usize,
        leg: Leg,
        investment: f64,
    ) -> f64 {
        let Some(((start_day, start_field), (end_day, end_field))) = leg.bounds(day) else {
            return investment;
        };

        let mut pnl = 0.0;
        for (ticker, shares) in positions.iter() {
            let start = prices.price(ticker, start_day, start_field);
            let end = prices.price(ticker, end_day, end_field);
            if let (Some(start), Some(end)) = (start, end) {
                pnl += *shares as f64 * (end - start);
            }
        }
        debug!("ACCOUNTANT: {:?} leg on day {:?} moved {:?}", leg, day, pnl);
        pnl + investment
    }

    /// Cash left once every position has been collateralised at its absolute notional value.
    pub fn compute_cash(
        positions: &PositionVector,
        portfolio_value: f64,
        prices: &PriceTable,
        day: usize,
        field: PriceField,
    ) -> f64 {
        let gross: f64 = positions
            .iter()
            .filter_map(|(ticker, shares)| {
                prices
                    .price(ticker, day, field)
                    .map(|price| shares.abs() as f64 * price)
            })
            .sum();
        portfolio_value - gross
    }

    /// Closing value of each position as a share of `portfolio_value`. All weights are zero when
    /// the portfolio has no value.
    pub fn weights(
        positions: &PositionVector,
        portfolio_value: f64,
        prices: &PriceTable,
        day: usize,
    ) -> WeightVector {
        positions
            .iter()
            .map(|(ticker, shares)| {
                let weight = match prices.price(ticker, day, PriceField::Close) {
                    Some(price) if portfolio_value != 0.0 => {
                        *shares as f64 * price / portfolio_value
                    }
                    _ => 0.0,
                };
                (ticker.clone(), weight)
            })
            .collect()
    }
}
