//! Record of a replay, one entry per simulated day

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::clock::DateTime;
use crate::error::InputError;
use crate::input::PriceTable;
use crate::types::{PortfolioState, PositionVector, PriceField, WeightVector};

/// Everything observable about one simulated day once it has closed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: DateTime,
    pub positions: PositionVector,
    pub weights: WeightVector,
    pub state: PortfolioState,
}

/// Day-over-day change in shares per ticker. `None` means the position did not change, so there
/// is no order to send.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderRow {
    pub date: DateTime,
    pub sizes: BTreeMap<String, Option<i64>>,
}

/// Append-only history of a replay. Records are in day order and share the price table's
/// timestamps. `symbols` fixes the column order of every exported table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct History {
    symbols: Vec<String>,
    records: Vec<DayRecord>,
}

impl History {
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: DayRecord) {
        self.records.push(record);
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.records.last()
    }

    pub fn get(&self, date: DateTime) -> Option<&DayRecord> {
        self.records.iter().find(|record| record.date == date)
    }

    pub fn dates(&self) -> Vec<DateTime> {
        self.records.iter().map(|record| record.date).collect_vec()
    }

    pub fn portfolio_values(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|record| record.state.portfolio_value())
            .collect_vec()
    }

    /// Order sizes that reproduce the recorded positions, for replay through an execution engine.
    /// The first day has no previous position to diff against so it never has orders.
    pub fn order_sizes(&self) -> Vec<OrderRow> {
        let mut rows = Vec::with_capacity(self.records.len());
        let mut previous: Option<&PositionVector> = None;
        for record in &self.records {
            let sizes = self
                .symbols
                .iter()
                .map(|symbol| {
                    let diff = previous
                        .map(|prev| record.positions.get(symbol) - prev.get(symbol))
                        .unwrap_or(0);
                    (symbol.clone(), if diff == 0 { None } else { Some(diff) })
                })
                .collect();
            rows.push(OrderRow {
                date: record.date,
                sizes,
            });
            previous = Some(&record.positions);
        }
        rows
    }

    /// Re-derives weights from positions alone: each position's closing value over the sum of
    /// all position values that day, cash is ignored. Days where positions net to zero value get
    /// zero weights.
    pub fn exposure_weights(
        &self,
        prices: &PriceTable,
    ) -> Result<Vec<(DateTime, WeightVector)>, InputError> {
        let mut res = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let day = prices
                .dates()
                .binary_search(&record.date)
                .map_err(|_| InputError::MissingDate { date: record.date })?;

            let mut values: Vec<(String, f64)> = Vec::with_capacity(self.symbols.len());
            for symbol in &self.symbols {
                let price = prices.price(symbol, day, PriceField::Close).ok_or_else(|| {
                    InputError::MissingQuote {
                        symbol: symbol.clone(),
                        date: record.date,
                        field: PriceField::Close,
                    }
                })?;
                values.push((symbol.clone(), record.positions.get(symbol) as f64 * price));
            }

            let total: f64 = values.iter().map(|(_, value)| value).sum();
            let weights = values
                .into_iter()
                .map(|(symbol, value)| {
                    let weight = if total == 0.0 { 0.0 } else { value / total };
                    (symbol, weight)
                })
                .collect();
            res.push((record.date, weights));
        }
        Ok(res)
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec!["date".to_string()];
        header.extend(self.symbols.iter().cloned());
        header
    }

    pub fn write_positions<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header())?;
        for record in &self.records {
            let mut row = vec![record.date.to_string()];
            row.extend(
                self.symbols
                    .iter()
                    .map(|symbol| record.positions.get(symbol).to_string()),
            );
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_weights<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header())?;
        for record in &self.records {
            let mut row = vec![record.date.to_string()];
            row.extend(
                self.symbols
                    .iter()
                    .map(|symbol| record.weights.get(symbol).to_string()),
            );
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Unchanged positions are written as empty cells.
    pub fn write_order_sizes<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header())?;
        for order in self.order_sizes() {
            let mut row = vec![order.date.to_string()];
            row.extend(self.symbols.iter().map(|symbol| {
                match order.sizes.get(symbol).copied().flatten() {
                    Some(size) => size.to_string(),
                    None => String::new(),
                }
            }));
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_portfolio<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["date", "cash", "investment", "portfolio_value"])?;
        for record in &self.records {
            wtr.write_record([
                record.date.to_string(),
                record.state.cash().to_string(),
                record.state.investment().to_string(),
                record.state.portfolio_value().to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes `positions.csv`, `weights.csv`, `order_size.csv` and `portfolio.csv` into `dir`,
    /// creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.write_positions(File::create(dir.join("positions.csv"))?)?;
        self.write_weights(File::create(dir.join("weights.csv"))?)?;
        self.write_order_sizes(File::create(dir.join("order_size.csv"))?)?;
        self.write_portfolio(File::create(dir.join("portfolio.csv"))?)?;
        info!("HISTORY: Saved {:?} days to {:?}", self.records.len(), dir);
        Ok(())
    }
}
