use nalgebra::Matrix2;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::error::ValuationError;

/// Median of the present values, gated on how much of the series is missing.
///
/// Returns `None` when at least half of the slots are missing, guarding
/// against a biased median over a mostly-missing series.
pub fn threshold_median(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    let missing = values.len() - present.len();
    if missing * 2 >= values.len() {
        return None;
    }
    let mut data = Data::new(present);
    Some(data.median())
}

/// 2x2 population covariance matrix of two equal-length series.
///
/// Layout: [[Var(x), Cov(x, y)], [Cov(x, y), Var(y)]].
pub fn covariance_matrix(x: &[f64], y: &[f64]) -> Result<Matrix2<f64>, ValuationError> {
    if x.len() != y.len() {
        return Err(ValuationError::InvalidParameter(format!(
            "covariance inputs must have equal length, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(ValuationError::InvalidParameter(
            "covariance of an empty series is undefined".to_string(),
        ));
    }

    let cov_xy = x.population_covariance(y);
    Ok(Matrix2::new(
        x.population_variance(),
        cov_xy,
        cov_xy,
        y.population_variance(),
    ))
}
