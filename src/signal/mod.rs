//! Checks strategy output before it reaches the sizer

use log::debug;

use crate::clock::DateTime;
use crate::error::BacktestError;
use crate::input::PriceTable;
use crate::types::{Signal, SIGNAL_TOLERANCE};

/// Gatekeeper between the strategy and [PositionSizer](crate::sizing::PositionSizer).
///
/// A signal is well-formed when every weight is finite and every ticker is priced by the table the
/// simulation is running over. A well-formed signal is in range when its gross weight is no more
/// than one plus [SIGNAL_TOLERANCE].
pub struct SignalValidator;

impl SignalValidator {
    pub fn validate(
        signal: Signal,
        prices: &PriceTable,
        timestamp: DateTime,
    ) -> Result<Signal, BacktestError> {
        for (ticker, weight) in signal.iter() {
            if !weight.is_finite() {
                return Err(BacktestError::Type {
                    timestamp,
                    reason: format!("weight for {} is {}", ticker, weight),
                });
            }
            if !prices.contains(ticker) {
                return Err(BacktestError::Type {
                    timestamp,
                    reason: format!("{} is not in the price table", ticker),
                });
            }
        }

        let sum = signal.abs_sum();
        if sum - 1.0 > SIGNAL_TOLERANCE {
            return Err(BacktestError::Range { timestamp, sum });
        }
        debug!("SIGNAL: Accepted signal with gross weight {:?}", sum);
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::SignalValidator;
    use crate::clock::DateTime;
    use crate::error::{BacktestError, ErrorKind};
    use crate::input::{PriceTable, PriceTableBuilder};
    use crate::types::Signal;

    fn prices() -> PriceTable {
        let mut builder = PriceTableBuilder::new();
        builder
            .add_quote(10.0, 10.0, 100, "ABC")
            .add_quote(20.0, 20.0, 100, "BCD");
        builder.build().unwrap()
    }

    #[test]
    fn test_that_sum_within_tolerance_is_accepted() {
        let signal: Signal = vec![("ABC", 0.5000005), ("BCD", -0.5)].into_iter().collect();
        let res = SignalValidator::validate(signal.clone(), &prices(), DateTime::from(100));
        assert_eq!(res, Ok(signal));
    }

    #[test]
    fn test_that_exact_full_short_is_accepted() {
        let signal: Signal = vec![("ABC", -0.5), ("BCD", -0.5)].into_iter().collect();
        assert!(SignalValidator::validate(signal, &prices(), DateTime::from(100)).is_ok());
    }

    #[test]
    fn test_that_sum_over_tolerance_is_rejected() {
        let signal: Signal = vec![("ABC", 0.51), ("BCD", -0.5)].into_iter().collect();
        let err = SignalValidator::validate(signal, &prices(), DateTime::from(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        if let BacktestError::Range { timestamp, sum } = err {
            assert_eq!(timestamp, DateTime::from(100));
            assert!((sum - 1.01).abs() < 1e-12);
        }
    }

    #[test]
    fn test_that_unknown_ticker_is_malformed() {
        let signal: Signal = vec![("XYZ", 0.5)].into_iter().collect();
        let err = SignalValidator::validate(signal, &prices(), DateTime::from(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(err.timestamp(), DateTime::from(100));
    }

    #[test]
    fn test_that_nan_weight_is_malformed() {
        let signal: Signal = vec![("ABC", f64::NAN)].into_iter().collect();
        let err = SignalValidator::validate(signal, &prices(), DateTime::from(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_that_empty_signal_is_accepted() {
        assert!(SignalValidator::validate(Signal::new(), &prices(), DateTime::from(100)).is_ok());
    }
}
