//! Nigerian PAYE (Pay-As-You-Earn) personal income tax
//!
//! Annual tax is assessed on gross income less the Consolidated Relief
//! Allowance, pushed through a fixed progressive bracket table. Monthly
//! withholding annualizes the gross, assesses, and divides by twelve.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Consolidated Relief Allowance floor (annual)
fn cra_floor() -> BigDecimal {
    BigDecimal::from(200_000)
}

/// CRA percentage of gross annual income
const CRA_RATE_PERCENT: i64 = 21;

/// The progressive annual bracket table: (band width, rate %).
/// `None` width means the band is unbounded.
fn bracket_table() -> Vec<(Option<BigDecimal>, BigDecimal)> {
    vec![
        (Some(BigDecimal::from(300_000)), BigDecimal::from(7)),
        (Some(BigDecimal::from(300_000)), BigDecimal::from(11)),
        (Some(BigDecimal::from(500_000)), BigDecimal::from(15)),
        (Some(BigDecimal::from(500_000)), BigDecimal::from(19)),
        (Some(BigDecimal::from(1_600_000)), BigDecimal::from(21)),
        (None, BigDecimal::from(24)),
    ]
}

/// Tax charged within one bracket of an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTax {
    /// The slice of taxable income that fell into this bracket
    pub taxed_amount: BigDecimal,
    /// Bracket rate in percent
    pub rate_percent: BigDecimal,
    /// Tax charged on the slice
    pub tax: BigDecimal,
}

/// Full annual PAYE assessment breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeAssessment {
    pub gross_annual: BigDecimal,
    /// Consolidated Relief Allowance: max(200,000, 21% of gross)
    pub cra: BigDecimal,
    /// Gross less CRA, floored at zero
    pub taxable_income: BigDecimal,
    /// Per-bracket breakdown, in table order, until taxable income is
    /// exhausted
    pub brackets: Vec<BracketTax>,
    pub total_tax: BigDecimal,
    /// Gross less total tax
    pub net_income: BigDecimal,
}

/// Assess annual PAYE on a gross annual income
pub fn calculate_annual_paye(gross_annual: &BigDecimal) -> PayeAssessment {
    let zero = BigDecimal::from(0);
    let gross = if *gross_annual < zero {
        zero.clone()
    } else {
        gross_annual.clone()
    };

    let cra_percent = (&gross * BigDecimal::from(CRA_RATE_PERCENT)) / BigDecimal::from(100);
    let cra = if cra_percent > cra_floor() {
        cra_percent
    } else {
        cra_floor()
    };

    let taxable_income = if gross > cra {
        &gross - &cra
    } else {
        zero.clone()
    };

    let mut brackets = Vec::new();
    let mut total_tax = zero.clone();
    let mut remaining = taxable_income.clone();

    for (width, rate_percent) in bracket_table() {
        if remaining <= zero {
            break;
        }
        let taxed_amount = match width {
            Some(width) if width < remaining => width,
            _ => remaining.clone(),
        };
        let tax = (&taxed_amount * &rate_percent) / BigDecimal::from(100);
        remaining -= &taxed_amount;
        total_tax += &tax;
        brackets.push(BracketTax {
            taxed_amount,
            rate_percent,
            tax,
        });
    }

    let net_income = &gross - &total_tax;
    PayeAssessment {
        gross_annual: gross,
        cra,
        taxable_income,
        brackets,
        total_tax,
        net_income,
    }
}

/// Monthly PAYE withholding on a monthly gross: annualize, assess, divide
/// by twelve, rounded to kobo
pub fn calculate_monthly_paye(monthly_gross: &BigDecimal) -> BigDecimal {
    let annual = monthly_gross * BigDecimal::from(12);
    let assessment = calculate_annual_paye(&annual);
    (assessment.total_tax / BigDecimal::from(12)).round(2)
}
