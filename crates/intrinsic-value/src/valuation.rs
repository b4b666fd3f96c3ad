use serde::{Deserialize, Serialize};
use tracing::debug;

use valuation_core::{threshold_median, ValuationError};

/// How the base dividend for the dividend discount model is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DividendBasis {
    /// Last observed dividend
    Last,
    /// Threshold-median over the trailing prediction window
    Median,
}

/// Ordered candidate discount rates for a valuation sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRateCandidates(Vec<f64>);

impl DiscountRateCandidates {
    pub fn new(rates: Vec<f64>) -> Self {
        DiscountRateCandidates(rates)
    }

    /// `count` rates centered on `mid`, spaced `step` apart
    pub fn centered_on(mid: f64, step: f64, count: usize) -> Self {
        let half = (count / 2) as i32;
        let rates = (0..count as i32)
            .map(|i| mid + f64::from(i - half) * step)
            .collect();
        DiscountRateCandidates(rates)
    }

    pub fn rates(&self) -> &[f64] {
        &self.0
    }
}

/// Valuation model that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationModel {
    DiscountedCashFlow,
    DiscountedDividends,
}

/// Intrinsic value per share at one candidate discount rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEntry {
    pub label: String,
    pub discount_rate: f64,
    pub intrinsic_value_per_share: f64,
}

/// Intrinsic values per share keyed by discount-rate label, in sweep order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub model: ValuationModel,
    pub entries: Vec<ValuationEntry>,
}

impl ValuationResult {
    pub fn value_for_label(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.intrinsic_value_per_share)
    }
}

/// Present value of all flows beyond the projection horizon: a Gordon
/// perpetuity seeded at year `prediction_years + 1`, discounted back over
/// the same horizon.
pub fn terminal_value(
    seed: f64,
    discount_rate: f64,
    growth_rate: f64,
    terminal_growth_rate: f64,
    prediction_years: u32,
) -> Result<f64, ValuationError> {
    let spread = rate_spread(discount_rate, terminal_growth_rate)?;
    let horizon = prediction_years as i32 + 1;
    let perpetuity =
        seed * (1.0 + growth_rate).powi(horizon) * (1.0 + terminal_growth_rate) / spread;
    Ok(perpetuity / (1.0 + discount_rate).powi(horizon))
}

/// Intrinsic value per share via a discounted cash flow model, swept
/// across the candidate discount rates.
///
/// The projection seed is the threshold-median of the full metric series;
/// each candidate rate discounts the projected years and the terminal
/// value independently.
pub fn discounted_cash_flow(
    metric_series: &[Option<f64>],
    current_shares: f64,
    growth_rate: f64,
    candidates: &DiscountRateCandidates,
    terminal_growth_rate: f64,
    prediction_years: u32,
) -> Result<ValuationResult, ValuationError> {
    validate_prediction_years(prediction_years)?;

    let seed = threshold_median(metric_series).ok_or_else(|| {
        ValuationError::MissingInput("median of the projected metric is undefined".to_string())
    })?;

    let mut entries = Vec::with_capacity(candidates.rates().len());
    for &rate in candidates.rates() {
        let mut discounted_sum = 0.0;
        let mut projected = seed;
        for year in 1..=prediction_years {
            projected *= 1.0 + growth_rate;
            discounted_sum += projected / (1.0 + rate).powi(year as i32);
        }

        let terminal = terminal_value(seed, rate, growth_rate, terminal_growth_rate, prediction_years)?;
        entries.push(ValuationEntry {
            label: rate_label(rate),
            discount_rate: rate,
            intrinsic_value_per_share: (discounted_sum + terminal) / current_shares,
        });
    }

    debug!(
        entries = entries.len(),
        prediction_years, "discounted cash flow sweep complete"
    );
    Ok(ValuationResult {
        model: ValuationModel::DiscountedCashFlow,
        entries,
    })
}

/// Intrinsic value per share via the dividend discount model.
///
/// The next-period dividend grows the base dividend one step; each
/// candidate rate values it as a perpetuity against the terminal growth
/// rate.
pub fn discounted_dividends(
    dividend_series: &[Option<f64>],
    basis: DividendBasis,
    growth_rate: f64,
    candidates: &DiscountRateCandidates,
    terminal_growth_rate: f64,
    prediction_years: u32,
) -> Result<ValuationResult, ValuationError> {
    validate_prediction_years(prediction_years)?;

    let base_dividend = match basis {
        DividendBasis::Last => dividend_series
            .last()
            .copied()
            .flatten()
            .ok_or_else(|| {
                ValuationError::MissingInput("last observed dividend is missing".to_string())
            })?,
        DividendBasis::Median => {
            let start = dividend_series
                .len()
                .saturating_sub(prediction_years as usize);
            threshold_median(&dividend_series[start..]).ok_or_else(|| {
                ValuationError::MissingInput(
                    "median dividend over the prediction window is undefined".to_string(),
                )
            })?
        }
    };

    let next_dividend = base_dividend * (1.0 + growth_rate);

    let mut entries = Vec::with_capacity(candidates.rates().len());
    for &rate in candidates.rates() {
        let spread = rate_spread(rate, terminal_growth_rate)?;
        entries.push(ValuationEntry {
            label: rate_label(rate),
            discount_rate: rate,
            intrinsic_value_per_share: next_dividend / spread,
        });
    }

    debug!(entries = entries.len(), "dividend discount sweep complete");
    Ok(ValuationResult {
        model: ValuationModel::DiscountedDividends,
        entries,
    })
}

fn validate_prediction_years(prediction_years: u32) -> Result<(), ValuationError> {
    if !(1..=10).contains(&prediction_years) {
        return Err(ValuationError::InvalidParameter(format!(
            "prediction_years must lie in [1, 10], got {}",
            prediction_years
        )));
    }
    Ok(())
}

fn rate_spread(discount_rate: f64, terminal_growth_rate: f64) -> Result<f64, ValuationError> {
    let spread = discount_rate - terminal_growth_rate;
    if spread == 0.0 {
        return Err(ValuationError::NumericDegeneracy(format!(
            "discount rate {} equals the terminal growth rate, perpetuity is undefined",
            discount_rate
        )));
    }
    Ok(spread)
}

fn rate_label(rate: f64) -> String {
    format!("{:.1} %", rate * 100.0)
}
