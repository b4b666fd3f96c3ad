use serde::{Deserialize, Serialize};
use tracing::debug;

use valuation_core::threshold_median;

/// Which bound ended up binding when selecting a growth rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthRateSource {
    MetricCagr,
    BenchmarkCagr,
    ReturnOnEquity,
    ZeroFloor,
}

impl GrowthRateSource {
    pub fn name(&self) -> &'static str {
        match self {
            GrowthRateSource::MetricCagr => "metric CAGR",
            GrowthRateSource::BenchmarkCagr => "benchmark CAGR",
            GrowthRateSource::ReturnOnEquity => "return on equity",
            GrowthRateSource::ZeroFloor => "zero growth",
        }
    }
}

/// Growth rate selected for valuation, with the bound that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalGrowthRate {
    pub rate: f64,
    pub source: GrowthRateSource,
}

/// Median compound annual growth rate across every start/end pair within
/// the trailing `period + 1` fiscal years.
///
/// A pair with a missing or non-positive endpoint contributes a missing
/// slot (roots of non-positive bases are undefined); the median is gated
/// on those slots staying below half of all pairs.
pub fn median_cagr(series: &[(i32, Option<f64>)], period: u32) -> Option<f64> {
    let window_len = (period as usize + 1).min(series.len());
    let window = &series[series.len() - window_len..];

    let mut cagrs: Vec<Option<f64>> = Vec::new();
    for i in 0..window.len() {
        for j in (i + 1)..window.len() {
            let slot = match (window[i].1, window[j].1) {
                (Some(start), Some(end)) if start > 0.0 && end > 0.0 => {
                    let years = f64::from(window[j].0 - window[i].0);
                    Some((end / start).powf(1.0 / years) - 1.0)
                }
                _ => None,
            };
            cagrs.push(slot);
        }
    }

    threshold_median(&cagrs)
}

/// Pick the growth rate a valuation may assume.
///
/// The metric CAGR is capped by the benchmark CAGR when one is supplied,
/// then by the return on equity, and finally floored at zero.
pub fn optimal_growth_rate(
    metric_cagr: Option<f64>,
    return_on_equity: f64,
    benchmark_cagr: Option<f64>,
) -> Option<OptimalGrowthRate> {
    let metric = match metric_cagr {
        Some(rate) => rate,
        None => {
            debug!("metric growth rate is missing, no growth rate selected");
            return None;
        }
    };

    let (mut rate, mut source) = match benchmark_cagr {
        Some(benchmark) if metric > benchmark => (benchmark, GrowthRateSource::BenchmarkCagr),
        _ => (metric, GrowthRateSource::MetricCagr),
    };

    if rate > return_on_equity {
        rate = return_on_equity;
        source = GrowthRateSource::ReturnOnEquity;
    }

    if rate < 0.0 {
        rate = 0.0;
        source = GrowthRateSource::ZeroFloor;
    }

    debug!(rate, source = source.name(), "selected growth rate");
    Some(OptimalGrowthRate { rate, source })
}
