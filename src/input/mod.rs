//! Price data consumed by the simulation

mod loader;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::clock::DateTime;
use crate::error::InputError;
use crate::types::PriceField;

//Date - 4/1/21 9:00:0000
const RANDOM_START_DATE: i64 = 1609750800;
const RANDOM_DAILY_VOL: f64 = 0.01;

#[derive(Clone, Debug, PartialEq)]
struct PriceSeries {
    open: Vec<f64>,
    close: Vec<f64>,
}

impl PriceSeries {
    fn get(&self, field: PriceField) -> &[f64] {
        match field {
            PriceField::Open => &self.open,
            PriceField::Close => &self.close,
        }
    }
}

/// All prices from one day, handed to strategies as the default processed data.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRow {
    pub date: DateTime,
    pub open: BTreeMap<String, f64>,
    pub close: BTreeMap<String, f64>,
}

///Read-only open/close prices for a fixed universe of tickers over a fixed set of days.
///
///Lookups are by (ticker, field) and then by day index. Every ticker has a strictly positive open
///and close on every day, [PriceTableBuilder] refuses to build anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTable {
    dates: Vec<DateTime>,
    symbols: Vec<String>,
    inner: HashMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[DateTime] {
        &self.dates
    }

    pub fn date(&self, day: usize) -> Option<DateTime> {
        self.dates.get(day).copied()
    }

    /// Tickers in sorted order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.inner.contains_key(symbol)
    }

    pub fn series(&self, symbol: &str, field: PriceField) -> Option<&[f64]> {
        self.inner.get(symbol).map(|series| series.get(field))
    }

    pub fn price(&self, symbol: &str, day: usize, field: PriceField) -> Option<f64> {
        self.series(symbol, field)
            .and_then(|series| series.get(day))
            .copied()
    }

    pub fn row(&self, day: usize) -> Option<PriceRow> {
        let date = self.date(day)?;
        let mut open = BTreeMap::new();
        let mut close = BTreeMap::new();
        for symbol in &self.symbols {
            if let Some(price) = self.price(symbol, day, PriceField::Open) {
                open.insert(symbol.clone(), price);
            }
            if let Some(price) = self.price(symbol, day, PriceField::Close) {
                close.insert(symbol.clone(), price);
            }
        }
        Some(PriceRow { date, open, close })
    }

    pub fn rows(&self) -> Vec<PriceRow> {
        (0..self.len()).filter_map(|day| self.row(day)).collect()
    }

    /// Random-walk prices for tests and benchmarks that don't depend on specific values.
    pub fn random(length: usize, symbols: Vec<&str>) -> Self {
        let mut rng = thread_rng();
        Self::random_walk(&mut rng, length, symbols)
    }

    /// Same as [PriceTable::random] but reproducible.
    pub fn random_with_seed(seed: u64, length: usize, symbols: Vec<&str>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::random_walk(&mut rng, length, symbols)
    }

    fn random_walk<R: Rng>(rng: &mut R, length: usize, symbols: Vec<&str>) -> Self {
        let start_dist = Uniform::new(90.0, 100.0);
        let dates = DateTime::daily_sequence(RANDOM_START_DATE, length);

        let mut inner = HashMap::new();
        for symbol in &symbols {
            let mut open = Vec::with_capacity(length);
            let mut close = Vec::with_capacity(length);
            let mut last: f64 = start_dist.sample(rng);
            for _ in 0..length {
                let gap: f64 = rng.sample(StandardNormal);
                let drift: f64 = rng.sample(StandardNormal);
                let day_open = last * (gap * RANDOM_DAILY_VOL * 0.5).exp();
                let day_close = day_open * (drift * RANDOM_DAILY_VOL).exp();
                open.push(day_open);
                close.push(day_close);
                last = day_close;
            }
            inner.insert(symbol.to_string(), PriceSeries { open, close });
        }

        Self {
            dates,
            symbols: symbols.into_iter().map(String::from).sorted().dedup().collect(),
            inner,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct PartialQuote {
    open: Option<f64>,
    close: Option<f64>,
}

/// Collects prices in any order and checks completeness when the table is built.
#[derive(Debug, Default)]
pub struct PriceTableBuilder {
    inner: HashMap<DateTime, HashMap<String, PartialQuote>>,
    symbols: BTreeSet<String>,
}

impl PriceTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_quote(
        &mut self,
        open: f64,
        close: f64,
        date: i64,
        symbol: impl Into<String>,
    ) -> &mut Self {
        let symbol = symbol.into();
        self.add_price(open, PriceField::Open, date, symbol.clone());
        self.add_price(close, PriceField::Close, date, symbol)
    }

    pub fn add_price(
        &mut self,
        price: f64,
        field: PriceField,
        date: i64,
        symbol: impl Into<String>,
    ) -> &mut Self {
        let symbol = symbol.into();
        let quote = self
            .inner
            .entry(DateTime::from(date))
            .or_default()
            .entry(symbol.clone())
            .or_default();
        match field {
            PriceField::Open => quote.open = Some(price),
            PriceField::Close => quote.close = Some(price),
        }
        self.symbols.insert(symbol);
        self
    }

    pub fn build(&mut self) -> Result<PriceTable, InputError> {
        let inner = std::mem::take(&mut self.inner);
        let symbols = std::mem::take(&mut self.symbols);
        if inner.is_empty() {
            return Err(InputError::Empty);
        }

        let dates = inner.keys().copied().sorted().collect_vec();
        let mut series: HashMap<String, PriceSeries> = HashMap::with_capacity(symbols.len());
        for symbol in &symbols {
            let mut open = Vec::with_capacity(dates.len());
            let mut close = Vec::with_capacity(dates.len());
            for date in &dates {
                let quote = inner
                    .get(date)
                    .and_then(|row| row.get(symbol))
                    .copied()
                    .unwrap_or_default();
                open.push(Self::checked(quote.open, symbol, *date, PriceField::Open)?);
                close.push(Self::checked(quote.close, symbol, *date, PriceField::Close)?);
            }
            series.insert(symbol.clone(), PriceSeries { open, close });
        }

        Ok(PriceTable {
            dates,
            symbols: symbols.into_iter().collect(),
            inner: series,
        })
    }

    fn checked(
        price: Option<f64>,
        symbol: &str,
        date: DateTime,
        field: PriceField,
    ) -> Result<f64, InputError> {
        let price = price.ok_or_else(|| InputError::MissingQuote {
            symbol: symbol.to_string(),
            date,
            field,
        })?;
        //NaN fails this comparison as well
        if price > 0.0 && price.is_finite() {
            Ok(price)
        } else {
            Err(InputError::NonPositivePrice {
                symbol: symbol.to_string(),
                date,
                field,
                price,
            })
        }
    }
}
