//! Composite statutory payroll deductions
//!
//! NHF, pension (employee and employer), NHIS, and PAYE for one staff
//! member's month, computed from basic salary and allowances.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::paye::calculate_monthly_paye;

/// NHF rate: 2.5% of basic salary
const NHF_RATE_PERMILLE: i64 = 25;

/// Minimum monthly basic salary for NHF eligibility
const NHF_MIN_BASIC: i64 = 30_000;

/// Employee pension contribution: 8% of (basic + allowances)
const PENSION_EMPLOYEE_PERCENT: i64 = 8;

/// Employer pension contribution: 10% of (basic + allowances)
const PENSION_EMPLOYER_PERCENT: i64 = 10;

/// NHIS rate: 5% of basic salary
const NHIS_RATE_PERCENT: i64 = 5;

/// NHIS monthly cap
const NHIS_MONTHLY_CAP: i64 = 20_000;

/// One month's statutory deductions for a staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryDeductions {
    /// National Housing Fund, withheld from the employee
    pub nhf: BigDecimal,
    /// Employee pension contribution, withheld
    pub pension_employee: BigDecimal,
    /// Employer pension contribution, an additional cost beyond gross
    pub pension_employer: BigDecimal,
    /// National Health Insurance Scheme, withheld
    pub nhis: BigDecimal,
    /// Monthly PAYE withholding
    pub paye: BigDecimal,
    /// nhf + pension_employee + nhis + paye
    pub total_employee_deductions: BigDecimal,
    /// pension_employer
    pub total_employer_contributions: BigDecimal,
}

impl StatutoryDeductions {
    /// All-zero deductions (e.g. casual staff outside the statutory net)
    pub fn zero() -> Self {
        let zero = BigDecimal::from(0);
        Self {
            nhf: zero.clone(),
            pension_employee: zero.clone(),
            pension_employer: zero.clone(),
            nhis: zero.clone(),
            paye: zero.clone(),
            total_employee_deductions: zero.clone(),
            total_employer_contributions: zero,
        }
    }
}

/// Calculator composing all statutory deductions
pub struct StatutoryDeductionsCalculator;

impl StatutoryDeductionsCalculator {
    /// Compute one month's statutory deductions from basic salary and
    /// allowances
    pub fn calculate_all(basic: &BigDecimal, allowances: &BigDecimal) -> StatutoryDeductions {
        let zero = BigDecimal::from(0);

        let nhf = if *basic >= BigDecimal::from(NHF_MIN_BASIC) {
            ((basic * BigDecimal::from(NHF_RATE_PERMILLE)) / BigDecimal::from(1000)).round(2)
        } else {
            zero.clone()
        };

        let pensionable = basic + allowances;
        let pension_employee = ((&pensionable * BigDecimal::from(PENSION_EMPLOYEE_PERCENT))
            / BigDecimal::from(100))
        .round(2);
        let pension_employer = ((&pensionable * BigDecimal::from(PENSION_EMPLOYER_PERCENT))
            / BigDecimal::from(100))
        .round(2);

        let nhis_raw =
            ((basic * BigDecimal::from(NHIS_RATE_PERCENT)) / BigDecimal::from(100)).round(2);
        let nhis_cap = BigDecimal::from(NHIS_MONTHLY_CAP);
        let nhis = if nhis_raw > nhis_cap { nhis_cap } else { nhis_raw };

        let paye = calculate_monthly_paye(&pensionable);

        let total_employee_deductions = &nhf + &pension_employee + &nhis + &paye;
        let total_employer_contributions = pension_employer.clone();

        StatutoryDeductions {
            nhf,
            pension_employee,
            pension_employer,
            nhis,
            paye,
            total_employee_deductions,
            total_employer_contributions,
        }
    }
}
