use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;

/// Sampling frequency of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Monthly,
}

impl Frequency {
    /// Observations per trading year (252 sessions, or 12 months)
    pub fn observations_per_year(&self) -> usize {
        match self {
            Frequency::Daily => 252,
            Frequency::Monthly => 12,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(ValuationError::InvalidParameter(format!(
                "unknown data frequency '{}'",
                other
            ))),
        }
    }
}

/// Whole-year trailing window for betas, medians, and valuation sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookbackPeriod(u32);

impl LookbackPeriod {
    pub fn new(years: u32) -> Result<Self, ValuationError> {
        if years == 0 {
            return Err(ValuationError::InvalidParameter(
                "lookback period must cover at least one year".to_string(),
            ));
        }
        Ok(LookbackPeriod(years))
    }

    pub fn years(&self) -> u32 {
        self.0
    }
}

/// Company classification selecting the applicable credit-spread table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyType {
    Nonfinancial,
    Financial,
}

impl CompanyType {
    pub fn name(&self) -> &'static str {
        match self {
            CompanyType::Nonfinancial => "nonfinancial",
            CompanyType::Financial => "financial",
        }
    }
}

impl FromStr for CompanyType {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nonfinancial" => Ok(CompanyType::Nonfinancial),
            "financial" => Ok(CompanyType::Financial),
            other => Err(ValuationError::InvalidParameter(format!(
                "unknown company type '{}'",
                other
            ))),
        }
    }
}

/// Region keying the equity-risk-premium table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CompanyRegion {
    AfricaAndMidEast,
    Asia,
    AustraliaAndNewZealand,
    Caribbean,
    CentralAndSouthAmerica,
    EasternEuropeAndRussia,
    MiddleEast,
    NorthAmerica,
    WesternEurope,
}

impl CompanyRegion {
    /// Region label as published in the premium dataset
    pub fn label(&self) -> &'static str {
        match self {
            CompanyRegion::AfricaAndMidEast => "Africa & Mid East",
            CompanyRegion::Asia => "Asia",
            CompanyRegion::AustraliaAndNewZealand => "Australia & New Zealand",
            CompanyRegion::Caribbean => "Caribbean",
            CompanyRegion::CentralAndSouthAmerica => "Central and South America",
            CompanyRegion::EasternEuropeAndRussia => "Eastern Europe & Russia",
            CompanyRegion::MiddleEast => "Middle East",
            CompanyRegion::NorthAmerica => "North America",
            CompanyRegion::WesternEurope => "Western Europe",
        }
    }

    pub fn all() -> [CompanyRegion; 9] {
        [
            CompanyRegion::AfricaAndMidEast,
            CompanyRegion::Asia,
            CompanyRegion::AustraliaAndNewZealand,
            CompanyRegion::Caribbean,
            CompanyRegion::CentralAndSouthAmerica,
            CompanyRegion::EasternEuropeAndRussia,
            CompanyRegion::MiddleEast,
            CompanyRegion::NorthAmerica,
            CompanyRegion::WesternEurope,
        ]
    }
}

impl FromStr for CompanyRegion {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CompanyRegion::all()
            .into_iter()
            .find(|region| region.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ValuationError::InvalidParameter(format!("unknown company region '{}'", trimmed))
            })
    }
}

/// Fundamentals category a provider delivers as one raw year table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataCategory {
    Growth,
    OperatingAndEfficiency,
    FinancialHealth,
    CashFlow,
    Dividends,
    Financials,
}

impl DataCategory {
    pub fn name(&self) -> &'static str {
        match self {
            DataCategory::Growth => "growth",
            DataCategory::OperatingAndEfficiency => "operating and efficiency",
            DataCategory::FinancialHealth => "financial health",
            DataCategory::CashFlow => "cash flow",
            DataCategory::Dividends => "dividends",
            DataCategory::Financials => "financials",
        }
    }
}

/// One adjusted closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

/// Ascending date-indexed series of adjusted closing prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ValuationError> {
        if !points.windows(2).all(|w| w[0].date < w[1].date) {
            return Err(ValuationError::InvalidParameter(
                "price series dates must be strictly ascending".to_string(),
            ));
        }
        Ok(PriceSeries { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Last `count` closes (all of them when the series is shorter)
    pub fn trailing_closes(&self, count: usize) -> Vec<f64> {
        self.points[self.points.len().saturating_sub(count)..]
            .iter()
            .map(|p| p.adj_close)
            .collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.adj_close)
    }

    /// Close `sessions` observations before the latest one
    pub fn close_sessions_ago(&self, sessions: usize) -> Option<f64> {
        self.points
            .len()
            .checked_sub(sessions + 1)
            .map(|idx| self.points[idx].adj_close)
    }
}

/// Period-over-period simple returns and their running product.
///
/// `cumulative()[0]` is the degenerate leading 1;
/// `cumulative_excluding_first()` is what enters covariance estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    returns: Vec<f64>,
    cumulative: Vec<f64>,
}

impl ReturnSeries {
    pub fn from_closes(closes: &[f64]) -> Self {
        let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();

        let mut cumulative = Vec::with_capacity(returns.len() + 1);
        let mut acc = 1.0;
        cumulative.push(acc);
        for r in &returns {
            acc *= 1.0 + r;
            cumulative.push(acc);
        }

        ReturnSeries {
            returns,
            cumulative,
        }
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn cumulative_excluding_first(&self) -> &[f64] {
        &self.cumulative[1..]
    }
}

/// One credit-spread bracket over the interest-coverage-ratio axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadBucket {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub rating: String,
    pub spread: f64,
}

/// Ordered, non-overlapping coverage-ratio brackets mapping to credit spreads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadTable {
    buckets: Vec<SpreadBucket>,
}

impl SpreadTable {
    pub fn new(buckets: Vec<SpreadBucket>) -> Result<Self, ValuationError> {
        for bucket in &buckets {
            if bucket.lower_bound >= bucket.upper_bound {
                return Err(ValuationError::InvalidParameter(format!(
                    "spread bucket '{}' has bounds {} >= {}",
                    bucket.rating, bucket.lower_bound, bucket.upper_bound
                )));
            }
        }
        if !buckets.windows(2).all(|w| w[0].upper_bound <= w[1].lower_bound) {
            return Err(ValuationError::InvalidParameter(
                "spread buckets must be ascending and non-overlapping".to_string(),
            ));
        }
        Ok(SpreadTable { buckets })
    }

    /// Bucket satisfying lower_bound < ratio <= upper_bound
    pub fn spread_for(&self, coverage_ratio: f64) -> Option<&SpreadBucket> {
        self.buckets
            .iter()
            .find(|b| coverage_ratio > b.lower_bound && coverage_ratio <= b.upper_bound)
    }

    pub fn buckets(&self) -> &[SpreadBucket] {
        &self.buckets
    }
}

/// Spread tables keyed by company type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadTables {
    pub nonfinancial: SpreadTable,
    pub financial: SpreadTable,
}

impl SpreadTables {
    pub fn for_company_type(&self, company_type: CompanyType) -> &SpreadTable {
        match company_type {
            CompanyType::Nonfinancial => &self.nonfinancial,
            CompanyType::Financial => &self.financial,
        }
    }
}

/// Equity risk premium per region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskPremiumTable {
    premiums: BTreeMap<CompanyRegion, f64>,
}

impl RiskPremiumTable {
    pub fn new(premiums: BTreeMap<CompanyRegion, f64>) -> Self {
        RiskPremiumTable { premiums }
    }

    pub fn premium_for(&self, region: CompanyRegion) -> Option<f64> {
        self.premiums.get(&region).copied()
    }
}

impl FromIterator<(CompanyRegion, f64)> for RiskPremiumTable {
    fn from_iter<I: IntoIterator<Item = (CompanyRegion, f64)>>(iter: I) -> Self {
        RiskPremiumTable {
            premiums: iter.into_iter().collect(),
        }
    }
}
