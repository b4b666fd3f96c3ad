use tracing::warn;

use valuation_core::{
    covariance_matrix, Frequency, LookbackPeriod, PriceSeries, ReturnSeries, ValuationError,
};

/// Observations needed to cover `period` at `frequency`, plus one so the
/// first return has a predecessor.
pub fn required_observations(period: LookbackPeriod, frequency: Frequency) -> usize {
    period.years() as usize * frequency.observations_per_year() + 1
}

/// Systematic-risk coefficient of a stock against a benchmark index.
///
/// Beta is Cov(stock, benchmark) / Var(benchmark) over the cumulative
/// returns of the trailing window, with the degenerate leading cumulative
/// value excluded.
pub fn estimate_beta(
    stock_prices: &PriceSeries,
    benchmark_prices: &PriceSeries,
    period: LookbackPeriod,
    frequency: Frequency,
) -> Result<f64, ValuationError> {
    let required = required_observations(period, frequency);
    if stock_prices.len() < required || benchmark_prices.len() < required {
        warn!(
            required,
            stock = stock_prices.len(),
            benchmark = benchmark_prices.len(),
            "not enough observations to estimate beta"
        );
        return Err(ValuationError::InsufficientData(format!(
            "{}-year {} beta needs {} observations, got {} (stock) and {} (benchmark)",
            period.years(),
            frequency.name(),
            required,
            stock_prices.len(),
            benchmark_prices.len()
        )));
    }

    let stock_returns = ReturnSeries::from_closes(&stock_prices.trailing_closes(required));
    let benchmark_returns = ReturnSeries::from_closes(&benchmark_prices.trailing_closes(required));

    let covariance = covariance_matrix(
        stock_returns.cumulative_excluding_first(),
        benchmark_returns.cumulative_excluding_first(),
    )?;

    let benchmark_variance = covariance[(1, 1)];
    if benchmark_variance == 0.0 {
        return Err(ValuationError::NumericDegeneracy(
            "benchmark cumulative returns have zero variance".to_string(),
        ));
    }

    Ok(covariance[(0, 1)] / benchmark_variance)
}
