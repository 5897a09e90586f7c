use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Result;
use log::info;

use super::{PriceTable, PriceTableBuilder};
use crate::clock::DateTime;
use crate::error::InputError;
use crate::types::PriceField;

impl PriceTable {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("INPUT: Loading prices from {:?}", path);
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Reads a table with a two-row column header: tickers on the first row and the price field
    /// (`open`, `close`, `high`, ...) on the second, dates in the first column.
    ///
    /// ```text
    /// ,ABC,ABC,BCD,BCD
    /// ,open,close,open,close
    /// Date,,,,
    /// 2021-01-04,10.0,10.5,20.0,19.5
    /// ```
    ///
    /// Fields other than open and close are ignored. A row with an unparseable date and no prices
    /// is taken to be the index-name row that pandas writes and is skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = rdr.records();

        let tickers = records.next().ok_or(InputError::MissingHeader)??;
        let fields = records.next().ok_or(InputError::MissingHeader)??;

        //Some writers only print the ticker above the first of its columns
        let mut columns: Vec<Option<(String, PriceField)>> = Vec::with_capacity(fields.len());
        let mut last_ticker = String::new();
        for (pos, field) in fields.iter().enumerate() {
            if pos == 0 {
                columns.push(None);
                continue;
            }
            let ticker = tickers.get(pos).unwrap_or_default().trim();
            if !ticker.is_empty() {
                last_ticker = ticker.to_string();
            }
            let field = match field.trim().to_lowercase().as_str() {
                "open" => Some(PriceField::Open),
                "close" => Some(PriceField::Close),
                _ => None,
            };
            columns.push(field.map(|field| (last_ticker.clone(), field)));
        }

        let mut builder = PriceTableBuilder::new();
        let mut rows = 0;
        for record in records {
            let record = record?;
            let raw_date = record.get(0).unwrap_or_default();
            let date = match DateTime::parse(raw_date) {
                Some(date) => date,
                None if record.iter().skip(1).all(|cell| cell.trim().is_empty()) => continue,
                None => {
                    return Err(InputError::Unparseable {
                        value: raw_date.to_string(),
                    }
                    .into())
                }
            };

            for (cell, column) in record.iter().zip(columns.iter()) {
                let Some((ticker, field)) = column else {
                    continue;
                };
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }
                let price: f64 = cell.parse().map_err(|_| InputError::Unparseable {
                    value: cell.to_string(),
                })?;
                builder.add_price(price, *field, i64::from(date), ticker.as_str());
            }
            rows += 1;
        }

        let table = builder.build()?;
        info!(
            "INPUT: Loaded {:?} rows for {:?} symbols",
            rows,
            table.symbols().len()
        );
        Ok(table)
    }
}
