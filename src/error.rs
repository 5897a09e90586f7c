//! Failure types

use derive_more::{Display, Error};

use crate::clock::DateTime;
use crate::types::PriceField;

/// Aborts a replay. There is no recovery: the day that produced the error, and every day after it,
/// is never recorded.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum BacktestError {
    #[display("For timestamp {timestamp}, signal is malformed: {reason}")]
    Type { timestamp: DateTime, reason: String },
    #[display(
        "For timestamp {timestamp} the sum of the abs(signals) must not be greater than 1, got {sum}"
    )]
    Range { timestamp: DateTime, sum: f64 },
    #[display("For timestamp {timestamp}, signal is None")]
    MissingSignal { timestamp: DateTime },
}

/// Fieldless mirror of [BacktestError] for matching without caring about the payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Type,
    Range,
    MissingSignal,
}

impl BacktestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BacktestError::Type { .. } => ErrorKind::Type,
            BacktestError::Range { .. } => ErrorKind::Range,
            BacktestError::MissingSignal { .. } => ErrorKind::MissingSignal,
        }
    }

    pub fn timestamp(&self) -> DateTime {
        match self {
            BacktestError::Type { timestamp, .. }
            | BacktestError::Range { timestamp, .. }
            | BacktestError::MissingSignal { timestamp } => *timestamp,
        }
    }
}

/// Price data could not be turned into a complete price table.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum InputError {
    #[display("No {field} price for {symbol} at {date}")]
    MissingQuote {
        symbol: String,
        date: DateTime,
        field: PriceField,
    },
    #[display("{field} price for {symbol} at {date} must be positive, got {price}")]
    NonPositivePrice {
        symbol: String,
        date: DateTime,
        field: PriceField,
        price: f64,
    },
    #[display("Price table has no row for {date}")]
    MissingDate { date: DateTime },
    #[display("Price table has no dates")]
    Empty,
    #[display("Price table header must have a ticker row and a field row")]
    MissingHeader,
    #[display("Could not parse {value:?} in price table")]
    Unparseable { value: String },
}

/// Builder was asked to produce a context without everything a replay needs.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum BuildError {
    #[display("SimContext must be built with a price table")]
    MissingPrices,
    #[display("SimContext must be built with a strategy")]
    MissingStrategy,
}
