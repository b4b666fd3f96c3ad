use std::collections::BTreeMap;

use chrono::NaiveDate;

use valuation_core::{metric, FundamentalsDataset, PricePoint, PriceSeries, ValuationError};

use crate::{assess_metrics, hrlr_score, piotroski_f_score};

/// Build an aligned dataset from (metric, values) rows.
fn dataset(first_year: i32, rows: Vec<(&str, Vec<Option<f64>>)>) -> FundamentalsDataset {
    let year_count = rows.first().map(|(_, v)| v.len()).unwrap_or(0);
    let years: Vec<i32> = (first_year..first_year + year_count as i32).collect();
    let metrics: BTreeMap<String, Vec<Option<f64>>> = rows
        .into_iter()
        .map(|(name, values)| (name.to_string(), values))
        .collect();
    FundamentalsDataset::new(years, metrics).unwrap()
}

fn present(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| Some(v)).collect()
}

/// Daily price series from raw closes.
fn series(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &adj_close)| PricePoint {
            date: start + chrono::Days::new(i as u64),
            adj_close,
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

fn wiggly(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + (i % 7) as f64 + i as f64 * 0.01)
        .collect()
}

/// Two-year dataset on which every Piotroski criterion passes.
fn healthy_two_years() -> Vec<(&'static str, Vec<Option<f64>>)> {
    vec![
        (metric::NET_INCOME, present(&[50.0, 60.0])),
        (metric::OPERATING_CASH_FLOW, present(&[55.0, 70.0])),
        (metric::RETURN_ON_ASSETS_PCT, present(&[7.0, 9.0])),
        (metric::DEBT_TO_EQUITY_RATIO, present(&[1.2, 0.9])),
        (metric::CURRENT_RATIO, present(&[1.0, 1.3])),
        (metric::SHARES, present(&[102.0, 100.0])),
        (metric::GROSS_MARGIN_PCT, present(&[40.0, 42.0])),
        (metric::ASSET_TURNOVER, present(&[0.5, 0.6])),
    ]
}

// ---------------------------------------------------------------------------
// assess_metrics
// ---------------------------------------------------------------------------

#[test]
fn growing_revenue_earns_every_window_point() {
    let assessment = assess_metrics(&dataset(
        2019,
        vec![(metric::REVENUE, present(&[100.0, 110.0, 121.0, 133.1]))],
    ));

    let revenue = assessment
        .growth
        .iter()
        .find(|score| score.metric == metric::REVENUE)
        .unwrap();
    assert_eq!(revenue.points, 3);

    // Every other growth metric is absent and must earn nothing.
    assert_eq!(assessment.growth.len(), 6);
    let other_points: u8 = assessment
        .growth
        .iter()
        .filter(|score| score.metric != metric::REVENUE)
        .map(|score| score.points)
        .sum();
    assert_eq!(other_points, 0);
}

#[test]
fn shrinking_metric_earns_nothing() {
    let assessment = assess_metrics(&dataset(
        2019,
        vec![(metric::EPS, present(&[4.0, 3.5, 3.0, 2.5]))],
    ));

    let eps = assessment
        .growth
        .iter()
        .find(|score| score.metric == metric::EPS)
        .unwrap();
    assert_eq!(eps.points, 0);
}

#[test]
fn level_thresholds_point_in_both_directions() {
    let assessment = assess_metrics(&dataset(
        2020,
        vec![
            (metric::CURRENT_RATIO, present(&[2.0, 2.1, 2.2])),
            (metric::DEBT_TO_EQUITY_RATIO, present(&[2.0, 2.0, 2.0])),
            (metric::PAYOUT_RATIO, present(&[35.0, 40.0, 45.0])),
        ],
    ));

    let points = |name: &str| {
        assessment
            .value
            .iter()
            .find(|score| score.metric == name)
            .unwrap()
            .points
    };

    assert_eq!(points(metric::CURRENT_RATIO), 3);
    assert_eq!(points(metric::DEBT_TO_EQUITY_RATIO), 0);
    assert_eq!(points(metric::PAYOUT_RATIO), 3);
    assert_eq!(assessment.total_points, 6);
}

#[test]
fn return_on_assets_gate_sits_at_eight_percent() {
    let assessment = assess_metrics(&dataset(
        2020,
        vec![(metric::RETURN_ON_ASSETS_PCT, present(&[7.0, 7.0, 7.0]))],
    ));

    // 7% clears a 6% bar but not the applied 8% one.
    let roa = assessment
        .value
        .iter()
        .find(|score| score.metric == metric::RETURN_ON_ASSETS_PCT)
        .unwrap();
    assert_eq!(roa.points, 0);
}

#[test]
fn mostly_missing_window_earns_nothing() {
    let assessment = assess_metrics(&dataset(
        2020,
        vec![(metric::CURRENT_RATIO, vec![Some(2.0), None, None])],
    ));

    let current_ratio = assessment
        .value
        .iter()
        .find(|score| score.metric == metric::CURRENT_RATIO)
        .unwrap();
    // 10- and 3-year windows are mostly missing; the 1-year window is a
    // lone missing value. No points anywhere.
    assert_eq!(current_ratio.points, 0);
}

#[test]
fn assessment_is_idempotent() {
    let data = dataset(
        2015,
        vec![
            (metric::REVENUE, present(&[90.0, 95.0, 80.0, 120.0, 121.0])),
            (metric::CURRENT_RATIO, present(&[1.1, 0.9, 1.4, 1.2, 1.3])),
        ],
    );

    assert_eq!(assess_metrics(&data), assess_metrics(&data));
}

// ---------------------------------------------------------------------------
// piotroski_f_score
// ---------------------------------------------------------------------------

#[test]
fn all_nine_criteria_true_scores_nine() {
    let card = piotroski_f_score(&dataset(2021, healthy_two_years())).unwrap();
    assert_eq!(card.total, 9);
    assert!(card.criteria.iter().all(|c| c.point == 1));
}

#[test]
fn negative_net_income_zeroes_exactly_its_criterion() {
    let mut rows = healthy_two_years();
    rows[0] = (metric::NET_INCOME, present(&[50.0, -10.0]));

    let card = piotroski_f_score(&dataset(2021, rows)).unwrap();

    assert_eq!(card.point("positive_net_income"), Some(0));
    // Cash flow still exceeds the (negative) net income.
    assert_eq!(card.point("cash_flow_exceeds_net_income"), Some(1));
    assert_eq!(card.total, 8);
}

#[test]
fn missing_operand_scores_its_criterion_zero() {
    let rows: Vec<_> = healthy_two_years()
        .into_iter()
        .filter(|(name, _)| *name != metric::ASSET_TURNOVER)
        .collect();

    let card = piotroski_f_score(&dataset(2021, rows)).unwrap();

    assert_eq!(card.point("asset_turnover_increased"), Some(0));
    assert_eq!(card.total, 8);
}

#[test]
fn dilution_drops_the_share_criterion() {
    let mut rows = healthy_two_years();
    rows[5] = (metric::SHARES, present(&[100.0, 104.0]));

    let card = piotroski_f_score(&dataset(2021, rows)).unwrap();
    assert_eq!(card.point("shares_not_increased"), Some(0));
    assert_eq!(card.total, 8);
}

#[test]
fn single_year_is_insufficient() {
    let result = piotroski_f_score(&dataset(
        2022,
        vec![(metric::NET_INCOME, present(&[60.0]))],
    ));
    assert!(matches!(
        result,
        Err(ValuationError::InsufficientData(_))
    ));
}

// ---------------------------------------------------------------------------
// hrlr_score
// ---------------------------------------------------------------------------

#[test]
fn low_beta_and_rich_dividend_score_two() {
    // Flat stock: beta 0, momentum 0. Dividend of 3.5 against a price of
    // 1.0 clears the literal threshold of 3.
    let stock = series(&vec![1.0; 253]);
    let benchmark = series(&wiggly(253));

    let card = hrlr_score(&stock, &benchmark, 3.5).unwrap();

    assert_eq!(card.point("beta_below_one"), Some(1));
    assert_eq!(card.point("positive_momentum"), Some(0));
    assert_eq!(card.point("dividend_yield_at_least_three"), Some(1));
    assert_eq!(card.total, 2);
}

#[test]
fn high_beta_trending_stock_scores_only_momentum() {
    // Stock amplifies every benchmark move: beta well above 1, no beta
    // point, but positive momentum.
    let benchmark_closes: Vec<f64> = (0..253).map(|i| 100.0 + i as f64 * 0.1).collect();
    let stock_closes: Vec<f64> = (0..253).map(|i| 100.0 + i as f64 * 0.5).collect();
    let stock = series(&stock_closes);
    let benchmark = series(&benchmark_closes);

    let card = hrlr_score(&stock, &benchmark, 0.5).unwrap();

    assert_eq!(card.point("beta_below_one"), Some(0));
    assert_eq!(card.point("positive_momentum"), Some(1));
    assert_eq!(card.point("dividend_yield_at_least_three"), Some(0));
    assert_eq!(card.total, 1);
}

#[test]
fn short_price_history_propagates_insufficient_data() {
    let stock = series(&wiggly(252));
    let benchmark = series(&wiggly(253));

    let result = hrlr_score(&stock, &benchmark, 1.0);
    assert!(matches!(
        result,
        Err(ValuationError::InsufficientData(_))
    ));
}

#[test]
fn score_cards_serialize_round_trip() {
    let card = piotroski_f_score(&dataset(2021, healthy_two_years())).unwrap();

    let json = serde_json::to_string(&card).unwrap();
    let back: crate::ScoreCard = serde_json::from_str(&json).unwrap();

    assert_eq!(card, back);
}
