use crate::error::BuildError;
use crate::input::PriceTable;
use crate::strategy::Strategy;

use super::SimContext;

/// Creates a [SimContext]
pub struct SimContextBuilder<S>
where
    S: Strategy,
{
    prices: Option<PriceTable>,
    strategy: Option<S>,
    initial_value: f64,
}

impl<S> Default for SimContextBuilder<S>
where
    S: Strategy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SimContextBuilder<S>
where
    S: Strategy,
{
    pub const DEFAULT_INITIAL_VALUE: f64 = 100_000.0;

    pub fn with_prices(&mut self, prices: PriceTable) -> &mut Self {
        self.prices = Some(prices);
        self
    }

    pub fn with_strategy(&mut self, strategy: S) -> &mut Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_initial_value(&mut self, initial_value: f64) -> &mut Self {
        self.initial_value = initial_value;
        self
    }

    //The strategy processes the full price table here, so a context is never handed back before
    //the data the strategy will see has been prepared.
    pub fn build(&mut self) -> Result<SimContext<S>, BuildError> {
        let prices = self.prices.take().ok_or(BuildError::MissingPrices)?;
        let strategy = self.strategy.take().ok_or(BuildError::MissingStrategy)?;
        Ok(SimContext::new(prices, strategy, self.initial_value))
    }

    pub fn new() -> Self {
        Self {
            prices: None,
            strategy: None,
            initial_value: Self::DEFAULT_INITIAL_VALUE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimContextBuilder;
    use crate::error::BuildError;
    use crate::input::PriceTable;
    use crate::strategy::EqualWeightStrategy;

    #[test]
    fn test_that_build_needs_prices_and_strategy() {
        let res = SimContextBuilder::<EqualWeightStrategy>::new()
            .with_strategy(EqualWeightStrategy::long())
            .build();
        assert_eq!(res.err(), Some(BuildError::MissingPrices));

        let res = SimContextBuilder::<EqualWeightStrategy>::new()
            .with_prices(PriceTable::random(5, vec!["ABC"]))
            .build();
        assert_eq!(res.err(), Some(BuildError::MissingStrategy));
    }

    #[test]
    fn test_that_initial_value_defaults() {
        let sim = SimContextBuilder::new()
            .with_prices(PriceTable::random(5, vec!["ABC"]))
            .with_strategy(EqualWeightStrategy::long())
            .build()
            .unwrap();
        assert_eq!(
            sim.portfolio_value(),
            SimContextBuilder::<EqualWeightStrategy>::DEFAULT_INITIAL_VALUE
        );
    }
}
