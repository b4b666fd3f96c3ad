use tracing::warn;

use valuation_core::{
    metric, threshold_median, CompanyRegion, CompanyType, FundamentalsDataset, LookbackPeriod,
    RiskPremiumTable, SpreadTables, ValuationError,
};

/// After-tax cost of debt from the credit-spread table.
///
/// The spread comes from the bracket the interest coverage ratio falls
/// into; a ratio outside every bracket is an explicit failure, not a
/// default spread.
pub fn debt_cost_after_tax(
    company_type: CompanyType,
    spread_tables: &SpreadTables,
    median_tax_rate_pct: f64,
    median_interest_coverage_ratio: f64,
    risk_free_rate: f64,
) -> Result<f64, ValuationError> {
    let table = spread_tables.for_company_type(company_type);
    let bucket = table
        .spread_for(median_interest_coverage_ratio)
        .ok_or_else(|| {
            ValuationError::NumericDegeneracy(format!(
                "interest coverage ratio {} matches no {} spread bracket",
                median_interest_coverage_ratio,
                company_type.name()
            ))
        })?;

    let debt_cost_before_tax = risk_free_rate + bucket.spread;
    Ok(debt_cost_before_tax * (1.0 - median_tax_rate_pct / 100.0))
}

/// Cost of equity in CAPM form: risk-free rate plus the regional equity
/// risk premium scaled by beta.
pub fn equity_cost(
    region: CompanyRegion,
    risk_premiums: &RiskPremiumTable,
    risk_free_rate: f64,
    beta: f64,
) -> Result<f64, ValuationError> {
    let premium = risk_premiums.premium_for(region).ok_or_else(|| {
        ValuationError::InvalidParameter(format!(
            "no equity risk premium for region '{}'",
            region.label()
        ))
    })?;

    Ok(risk_free_rate + premium * beta)
}

/// Weighted average cost of capital over the trailing period, the proxy
/// for the valuation discount rate.
///
/// Returns `Ok(None)` when the tax-rate, interest-coverage, or
/// equity-ratio median is undefined over the window.
#[allow(clippy::too_many_arguments)]
pub fn estimate_discount_rate(
    dataset: &FundamentalsDataset,
    spread_tables: &SpreadTables,
    risk_premiums: &RiskPremiumTable,
    risk_free_rate: f64,
    beta: f64,
    company_type: CompanyType,
    region: CompanyRegion,
    period: LookbackPeriod,
) -> Result<Option<f64>, ValuationError> {
    let window = period.years() as usize;

    let median_tax_rate = trailing_median(dataset, metric::TAX_RATE_PCT, window);
    let median_coverage = trailing_median(dataset, metric::INTEREST_COVERAGE_RATIO, window);
    let (Some(tax_rate), Some(coverage)) = (median_tax_rate, median_coverage) else {
        warn!("median tax rate or interest coverage ratio undefined, discount rate is missing");
        return Ok(None);
    };

    let debt_cost = debt_cost_after_tax(
        company_type,
        spread_tables,
        tax_rate,
        coverage,
        risk_free_rate,
    )?;
    let equity_cost = equity_cost(region, risk_premiums, risk_free_rate, beta)?;

    let Some(equity_ratio_pct) = trailing_median(dataset, metric::EQUITY_RATIO_PCT, window) else {
        warn!("median equity ratio undefined, discount rate is missing");
        return Ok(None);
    };
    let equity_ratio = equity_ratio_pct / 100.0;
    let debt_ratio = 1.0 - equity_ratio;

    Ok(Some(equity_ratio * equity_cost + debt_ratio * debt_cost))
}

fn trailing_median(dataset: &FundamentalsDataset, name: &str, window: usize) -> Option<f64> {
    dataset.trailing(name, window).and_then(threshold_median)
}
