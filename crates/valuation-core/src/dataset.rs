use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::types::DataCategory;

/// Metric names shared between the fundamentals providers and the scoring
/// and valuation engines.
pub mod metric {
    pub const SHARES: &str = "shares_mil";
    pub const REVENUE: &str = "revenue_mil";
    pub const OPERATING_INCOME: &str = "operating_income_mil";
    pub const NET_INCOME: &str = "net_income_mil";
    pub const EPS: &str = "eps";
    pub const DIVIDENDS: &str = "dividends";
    pub const PAYOUT_RATIO: &str = "payout_ratio";
    pub const BOOK_VALUE_PER_SHARE: &str = "bvps";
    pub const OPERATING_MARGIN_PCT: &str = "operating_margin_pct";
    pub const NET_MARGIN_PCT: &str = "net_margin_pct";
    pub const GROSS_MARGIN_PCT: &str = "gross_margin_pct";
    pub const INTEREST_COVERAGE_RATIO: &str = "interest_coverage_ratio";
    pub const TAX_RATE_PCT: &str = "tax_rate_pct";
    pub const RETURN_ON_ASSETS_PCT: &str = "return_on_assets_pct";
    pub const RETURN_ON_EQUITY_PCT: &str = "return_on_equity_pct";
    pub const RETURN_ON_INVESTED_CAPITAL_PCT: &str = "return_on_invested_capital_pct";
    pub const OPERATING_CASH_FLOW: &str = "operating_cash_flow_mil";
    pub const FREE_CASH_FLOW: &str = "free_cash_flow_mil";
    pub const FREE_CASH_FLOW_TO_REVENUE: &str = "free_cash_flow_to_revenue";
    pub const CAPEX: &str = "capex_mil";
    pub const CURRENT_RATIO: &str = "current_ratio";
    pub const DEBT_TO_EQUITY_RATIO: &str = "debt_to_equity_ratio";
    pub const EQUITY_RATIO_PCT: &str = "equity_ratio_pct";
    pub const ASSET_TURNOVER: &str = "asset_turnover";
}

/// One provider category's raw year table, before alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFrame {
    pub category: DataCategory,
    pub years: Vec<i32>,
    pub metrics: BTreeMap<String, Vec<Option<f64>>>,
}

/// Fiscal-year-aligned fundamentals.
///
/// Every metric shares one ascending, contiguous year axis; `None` marks a
/// missing value. Construction checks the invariant so cross-metric
/// computations can assume alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsDataset {
    years: Vec<i32>,
    metrics: BTreeMap<String, Vec<Option<f64>>>,
}

impl FundamentalsDataset {
    pub fn new(
        years: Vec<i32>,
        metrics: BTreeMap<String, Vec<Option<f64>>>,
    ) -> Result<Self, ValuationError> {
        validate_year_axis(&years)?;
        for (name, values) in &metrics {
            if values.len() != years.len() {
                return Err(ValuationError::InvalidParameter(format!(
                    "metric '{}' has {} values for {} years",
                    name,
                    values.len(),
                    years.len()
                )));
            }
        }
        Ok(FundamentalsDataset { years, metrics })
    }

    /// Merge per-category frames onto one contiguous year axis.
    ///
    /// The axis spans the earliest through the latest year any category
    /// covers; years a category does not cover are back-filled with the
    /// missing marker. A frame with a gapped or unsorted axis, or a metric
    /// appearing in two categories, is rejected.
    pub fn align(frames: &[CategoryFrame]) -> Result<Self, ValuationError> {
        if frames.is_empty() {
            return Err(ValuationError::InvalidParameter(
                "no fundamentals categories to align".to_string(),
            ));
        }

        let mut first_year = i32::MAX;
        let mut last_year = i32::MIN;
        for frame in frames {
            validate_year_axis(&frame.years).map_err(|_| {
                ValuationError::InvalidParameter(format!(
                    "category '{}' has a gapped or unsorted year axis",
                    frame.category.name()
                ))
            })?;
            first_year = first_year.min(frame.years[0]);
            last_year = last_year.max(frame.years[frame.years.len() - 1]);
        }
        let years: Vec<i32> = (first_year..=last_year).collect();

        let mut metrics: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for frame in frames {
            let offset = (frame.years[0] - first_year) as usize;
            for (name, values) in &frame.metrics {
                if values.len() != frame.years.len() {
                    return Err(ValuationError::InvalidParameter(format!(
                        "metric '{}' has {} values for {} years in category '{}'",
                        name,
                        values.len(),
                        frame.years.len(),
                        frame.category.name()
                    )));
                }
                if metrics.contains_key(name) {
                    return Err(ValuationError::InvalidParameter(format!(
                        "metric '{}' appears in more than one category",
                        name
                    )));
                }

                let mut row = vec![None; years.len()];
                row[offset..offset + values.len()].copy_from_slice(values);
                metrics.insert(name.clone(), row);
            }
        }

        FundamentalsDataset::new(years, metrics)
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    pub fn metric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    /// Last `count` values of a metric (all of them when shorter)
    pub fn trailing(&self, name: &str, count: usize) -> Option<&[Option<f64>]> {
        self.metric(name)
            .map(|values| &values[values.len().saturating_sub(count)..])
    }

    /// Metric values paired with their fiscal years
    pub fn metric_with_years(&self, name: &str) -> Option<Vec<(i32, Option<f64>)>> {
        self.metric(name)
            .map(|values| self.years.iter().copied().zip(values.iter().copied()).collect())
    }

    /// Latest and prior fiscal-year values of a metric.
    ///
    /// An absent metric, or a single-year axis, reads as missing values.
    pub fn latest_pair(&self, name: &str) -> (Option<f64>, Option<f64>) {
        let Some(values) = self.metric(name) else {
            return (None, None);
        };
        match values.len() {
            0 => (None, None),
            1 => (values[0], None),
            n => (values[n - 1], values[n - 2]),
        }
    }
}

fn validate_year_axis(years: &[i32]) -> Result<(), ValuationError> {
    if years.is_empty() {
        return Err(ValuationError::InvalidParameter(
            "year axis is empty".to_string(),
        ));
    }
    if !years.windows(2).all(|w| w[1] == w[0] + 1) {
        return Err(ValuationError::InvalidParameter(
            "year axis must be ascending and contiguous".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(
        category: DataCategory,
        years: Vec<i32>,
        metrics: Vec<(&str, Vec<Option<f64>>)>,
    ) -> CategoryFrame {
        CategoryFrame {
            category,
            years,
            metrics: metrics
                .into_iter()
                .map(|(name, values)| (name.to_string(), values))
                .collect(),
        }
    }

    #[test]
    fn construction_rejects_ragged_metrics() {
        let mut metrics = BTreeMap::new();
        metrics.insert("eps".to_string(), vec![Some(1.0), Some(2.0)]);
        let result = FundamentalsDataset::new(vec![2020, 2021, 2022], metrics);
        assert!(matches!(result, Err(ValuationError::InvalidParameter(_))));
    }

    #[test]
    fn construction_rejects_gapped_year_axis() {
        let result = FundamentalsDataset::new(vec![2020, 2022], BTreeMap::new());
        assert!(matches!(result, Err(ValuationError::InvalidParameter(_))));
    }

    #[test]
    fn align_backfills_late_starting_category() {
        let growth = frame(
            DataCategory::Growth,
            vec![2019, 2020, 2021],
            vec![("revenue_mil", vec![Some(10.0), Some(11.0), Some(12.0)])],
        );
        let dividends = frame(
            DataCategory::Dividends,
            vec![2021],
            vec![("dividends", vec![Some(0.8)])],
        );

        let dataset = FundamentalsDataset::align(&[growth, dividends]).unwrap();

        assert_eq!(dataset.years(), &[2019, 2020, 2021]);
        assert_eq!(
            dataset.metric("dividends").unwrap(),
            &[None, None, Some(0.8)]
        );
        assert_eq!(
            dataset.metric("revenue_mil").unwrap(),
            &[Some(10.0), Some(11.0), Some(12.0)]
        );
    }

    #[test]
    fn align_rejects_gapped_category_axis() {
        let gapped = frame(
            DataCategory::CashFlow,
            vec![2019, 2021],
            vec![("free_cash_flow_mil", vec![Some(1.0), Some(2.0)])],
        );
        let result = FundamentalsDataset::align(&[gapped]);
        assert!(matches!(result, Err(ValuationError::InvalidParameter(_))));
    }

    #[test]
    fn align_rejects_duplicate_metric_across_categories() {
        let a = frame(
            DataCategory::Growth,
            vec![2020],
            vec![("eps", vec![Some(1.0)])],
        );
        let b = frame(
            DataCategory::Financials,
            vec![2020],
            vec![("eps", vec![Some(2.0)])],
        );
        let result = FundamentalsDataset::align(&[a, b]);
        assert!(matches!(result, Err(ValuationError::InvalidParameter(_))));
    }

    #[test]
    fn trailing_clamps_to_series_start() {
        let mut metrics = BTreeMap::new();
        metrics.insert("eps".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        let dataset = FundamentalsDataset::new(vec![2020, 2021, 2022], metrics).unwrap();

        assert_eq!(dataset.trailing("eps", 2).unwrap(), &[Some(2.0), Some(3.0)]);
        assert_eq!(dataset.trailing("eps", 10).unwrap().len(), 3);
        assert!(dataset.trailing("revenue_mil", 2).is_none());
    }

    #[test]
    fn latest_pair_reads_last_two_years() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "current_ratio".to_string(),
            vec![Some(1.1), None, Some(1.4)],
        );
        let dataset = FundamentalsDataset::new(vec![2020, 2021, 2022], metrics).unwrap();

        assert_eq!(dataset.latest_pair("current_ratio"), (Some(1.4), None));
        assert_eq!(dataset.latest_pair("eps"), (None, None));
    }
}
