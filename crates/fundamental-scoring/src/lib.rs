use serde::{Deserialize, Serialize};
use tracing::debug;

use beta_estimator::estimate_beta;
use intrinsic_value::median_cagr;
use valuation_core::{
    metric, threshold_median, Frequency, FundamentalsDataset, LookbackPeriod, PriceSeries,
    ValuationError,
};

#[cfg(test)]
mod tests;

/// Trailing windows, in years, each metric is scored over
const SCORING_WINDOWS: [u32; 3] = [10, 3, 1];

/// Sessions in one trading year, for the momentum lookback
const SESSIONS_PER_YEAR: usize = 252;

/// Metrics whose growth trajectory earns points
const GROWTH_METRICS: [&str; 6] = [
    metric::REVENUE,
    metric::OPERATING_INCOME,
    metric::NET_INCOME,
    metric::EPS,
    metric::OPERATING_CASH_FLOW,
    metric::FREE_CASH_FLOW,
];

/// Level metrics with their per-window pass conditions
const VALUE_METRICS: [(&str, fn(f64) -> bool); 11] = [
    (metric::PAYOUT_RATIO, |v| v < 80.0),
    (metric::INTEREST_COVERAGE_RATIO, |v| v > 1.5),
    (metric::OPERATING_MARGIN_PCT, |v| v > 10.0),
    (metric::NET_MARGIN_PCT, |v| v > 10.0),
    (metric::GROSS_MARGIN_PCT, |v| v > 10.0),
    (metric::RETURN_ON_EQUITY_PCT, |v| v > 8.0),
    (metric::RETURN_ON_ASSETS_PCT, |v| v > 8.0),
    (metric::RETURN_ON_INVESTED_CAPITAL_PCT, |v| v > 8.0),
    (metric::FREE_CASH_FLOW_TO_REVENUE, |v| v > 5.0),
    (metric::CURRENT_RATIO, |v| v > 1.0),
    (metric::DEBT_TO_EQUITY_RATIO, |v| v < 1.0),
];

/// One scored criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub point: u8,
}

/// Named 0/1 criteria plus their aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub criteria: Vec<Criterion>,
    pub total: u8,
}

impl ScoreCard {
    fn from_criteria(criteria: Vec<(&str, bool)>) -> Self {
        let criteria: Vec<Criterion> = criteria
            .into_iter()
            .map(|(name, passed)| Criterion {
                name: name.to_string(),
                point: passed as u8,
            })
            .collect();
        let total = criteria.iter().map(|c| c.point).sum();
        ScoreCard { criteria, total }
    }

    pub fn point(&self, name: &str) -> Option<u8> {
        self.criteria
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.point)
    }
}

/// Score for one metric over one trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowScore {
    pub window_years: u32,
    pub median: Option<f64>,
    pub point: u8,
}

/// Windowed scores for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub metric: String,
    pub windows: Vec<WindowScore>,
    pub points: u8,
}

impl MetricScore {
    fn new(metric: &str, windows: Vec<WindowScore>) -> Self {
        let points = windows.iter().map(|w| w.point).sum();
        MetricScore {
            metric: metric.to_string(),
            windows,
            points,
        }
    }
}

/// Point totals across growth and level metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAssessment {
    pub growth: Vec<MetricScore>,
    pub value: Vec<MetricScore>,
    pub total_points: u32,
}

/// Point-score every growth and level metric over the trailing windows.
///
/// Growth metrics earn a point per window whose median CAGR is positive;
/// level metrics earn a point per window whose median value passes the
/// metric's threshold. A window with an undefined median earns nothing.
pub fn assess_metrics(dataset: &FundamentalsDataset) -> MetricAssessment {
    let growth: Vec<MetricScore> = GROWTH_METRICS
        .iter()
        .map(|name| {
            let series = dataset.metric_with_years(name).unwrap_or_default();
            let windows = SCORING_WINDOWS
                .iter()
                .map(|&window_years| {
                    let median = median_cagr(&series, window_years);
                    WindowScore {
                        window_years,
                        median,
                        point: matches!(median, Some(m) if m > 0.0) as u8,
                    }
                })
                .collect();
            MetricScore::new(name, windows)
        })
        .collect();

    let value: Vec<MetricScore> = VALUE_METRICS
        .iter()
        .map(|&(name, passes)| {
            let windows = SCORING_WINDOWS
                .iter()
                .map(|&window_years| {
                    let median = dataset
                        .trailing(name, window_years as usize)
                        .and_then(threshold_median);
                    WindowScore {
                        window_years,
                        median,
                        point: matches!(median, Some(m) if passes(m)) as u8,
                    }
                })
                .collect();
            MetricScore::new(name, windows)
        })
        .collect();

    let total_points = growth
        .iter()
        .chain(value.iter())
        .map(|score| u32::from(score.points))
        .sum();

    debug!(total_points, "metric assessment complete");
    MetricAssessment {
        growth,
        value,
        total_points,
    }
}

/// Nine-criterion fundamental-health score, latest fiscal year against
/// the prior one. A criterion with a missing operand scores zero.
pub fn piotroski_f_score(dataset: &FundamentalsDataset) -> Result<ScoreCard, ValuationError> {
    if dataset.years().len() < 2 {
        return Err(ValuationError::InsufficientData(format!(
            "Piotroski F-Score needs two fiscal years, got {}",
            dataset.years().len()
        )));
    }

    let (net_income, _) = dataset.latest_pair(metric::NET_INCOME);
    let (operating_cash_flow, _) = dataset.latest_pair(metric::OPERATING_CASH_FLOW);
    let (roa, prior_roa) = dataset.latest_pair(metric::RETURN_ON_ASSETS_PCT);
    let (debt_to_equity, prior_debt_to_equity) = dataset.latest_pair(metric::DEBT_TO_EQUITY_RATIO);
    let (current_ratio, prior_current_ratio) = dataset.latest_pair(metric::CURRENT_RATIO);
    let (shares, prior_shares) = dataset.latest_pair(metric::SHARES);
    let (gross_margin, prior_gross_margin) = dataset.latest_pair(metric::GROSS_MARGIN_PCT);
    let (asset_turnover, prior_asset_turnover) = dataset.latest_pair(metric::ASSET_TURNOVER);

    let card = ScoreCard::from_criteria(vec![
        ("positive_net_income", gt(net_income, Some(0.0))),
        ("positive_operating_cash_flow", gt(operating_cash_flow, Some(0.0))),
        ("cash_flow_exceeds_net_income", gt(operating_cash_flow, net_income)),
        ("return_on_assets_increased", gt(roa, prior_roa)),
        ("leverage_decreased", lt(debt_to_equity, prior_debt_to_equity)),
        ("current_ratio_increased", gt(current_ratio, prior_current_ratio)),
        ("shares_not_increased", le(shares, prior_shares)),
        ("gross_margin_increased", gt(gross_margin, prior_gross_margin)),
        ("asset_turnover_increased", gt(asset_turnover, prior_asset_turnover)),
    ]);

    debug!(total = card.total, "Piotroski F-Score computed");
    Ok(card)
}

/// Three-factor risk/return screen: market beta, one-year momentum, and
/// dividend yield.
pub fn hrlr_score(
    stock_prices: &PriceSeries,
    benchmark_prices: &PriceSeries,
    latest_dividend: f64,
) -> Result<ScoreCard, ValuationError> {
    let period = LookbackPeriod::new(1)?;
    let beta = estimate_beta(stock_prices, benchmark_prices, period, Frequency::Daily)?;

    let last_close = stock_prices.last_close().ok_or_else(|| {
        ValuationError::InsufficientData("stock price series is empty".to_string())
    })?;
    let year_ago_close = stock_prices
        .close_sessions_ago(SESSIONS_PER_YEAR)
        .ok_or_else(|| {
            ValuationError::InsufficientData(
                "stock price series does not cover one trading year".to_string(),
            )
        })?;

    let momentum = last_close / year_ago_close - 1.0;
    // The yield is dividend/price, a fraction; the gate is the literal 3
    // from the screen definition, which a fractional yield practically
    // never meets.
    let dividend_yield = latest_dividend / last_close;

    let card = ScoreCard::from_criteria(vec![
        ("beta_below_one", beta < 1.0),
        ("positive_momentum", momentum > 0.0),
        ("dividend_yield_at_least_three", dividend_yield >= 3.0),
    ]);

    debug!(
        beta,
        momentum,
        dividend_yield,
        total = card.total,
        "HRLR score computed"
    );
    Ok(card)
}

fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x > y)
}

fn lt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x < y)
}

fn le(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x <= y)
}
