use async_trait::async_trait;

use crate::dataset::CategoryFrame;
use crate::error::ValuationError;
use crate::types::{Frequency, LookbackPeriod, PriceSeries, RiskPremiumTable, SpreadTables};

/// Source of historical adjusted-close prices
#[async_trait]
pub trait PriceDataProvider: Send + Sync {
    async fn fetch_prices(
        &self,
        ticker: &str,
        period: LookbackPeriod,
        frequency: Frequency,
    ) -> Result<PriceSeries, ValuationError>;
}

/// Source of per-category fundamentals tables
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch_fundamentals(
        &self,
        identifier: &str,
    ) -> Result<Vec<CategoryFrame>, ValuationError>;
}

/// Source of credit-spread and equity-risk-premium reference tables
#[async_trait]
pub trait SpreadAndPremiumProvider: Send + Sync {
    async fn fetch_spread_tables(&self) -> Result<SpreadTables, ValuationError>;

    async fn fetch_risk_premiums(&self) -> Result<RiskPremiumTable, ValuationError>;
}
