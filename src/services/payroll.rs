//! Payroll: statutory deduction computation and salary payment records
//!
//! One salary record may exist per staff member per period. The record is
//! stored under the natural key `{staff_id}:{period}`, so a second payment
//! for the same period fails at the storage layer by construction rather
//! than by a read-then-write scan.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posting::{AutoPostingEngine, PaymentMethod, PostingEvent, SalaryPosting};
use crate::tax::{StatutoryDeductions, StatutoryDeductionsCalculator};
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::*;
use crate::utils::references;
use crate::utils::validation::{validate_non_negative, validate_positive_amount};

/// One month's salary payment for one staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub id: String,
    pub staff_id: String,
    pub staff_name: String,
    /// Payroll period, "YYYY-MM"
    pub period: String,
    pub basic: BigDecimal,
    pub allowances: BigDecimal,
    pub gross: BigDecimal,
    pub statutory: StatutoryDeductions,
    /// Non-statutory deductions (loan repayments, cooperative dues, ...)
    pub other_deductions: BigDecimal,
    pub net_pay: BigDecimal,
    /// Audit reference, `SAL-{year}-{month:02}-{6 alphanumeric}`
    pub reference: String,
    pub paid_on: NaiveDate,
    pub recorded_at: NaiveDateTime,
}

impl SalaryRecord {
    /// The storage key enforcing one record per staff member per period
    pub fn natural_key(&self) -> String {
        format!("{}:{}", self.staff_id, self.period)
    }
}

/// Service owning the payroll lifecycle
pub struct PayrollService<S: FinanceStore + Clone> {
    storage: S,
    engine: AutoPostingEngine<S>,
}

impl<S: FinanceStore + Clone> PayrollService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            engine: AutoPostingEngine::new(storage.clone()),
            storage,
        }
    }

    /// Pay one staff member for the month containing `paid_on`.
    ///
    /// Statutory deductions are computed here; the salary record is the
    /// primary write, and the accounting entry is shadow-posted after it.
    #[allow(clippy::too_many_arguments)]
    pub async fn pay_salary(
        &mut self,
        staff_id: String,
        staff_name: String,
        basic: BigDecimal,
        allowances: BigDecimal,
        other_deductions: BigDecimal,
        method: PaymentMethod,
        paid_on: NaiveDate,
    ) -> FinanceResult<SalaryRecord> {
        validate_positive_amount(&basic)?;
        validate_non_negative(&allowances, "Allowances")?;
        validate_non_negative(&other_deductions, "Other deductions")?;

        let statutory = StatutoryDeductionsCalculator::calculate_all(&basic, &allowances);
        let gross = &basic + &allowances;
        let net_pay = &gross - &statutory.total_employee_deductions - &other_deductions;
        if net_pay < BigDecimal::from(0) {
            return Err(FinanceError::Validation(format!(
                "Deductions exceed gross salary for {}",
                staff_name
            )));
        }

        let period = format!("{:04}-{:02}", paid_on.year(), paid_on.month());
        let record = SalaryRecord {
            id: Uuid::new_v4().to_string(),
            staff_id,
            staff_name: staff_name.clone(),
            period: period.clone(),
            basic,
            allowances,
            gross: gross.clone(),
            statutory: statutory.clone(),
            other_deductions: other_deductions.clone(),
            net_pay: net_pay.clone(),
            reference: references::salary_reference(paid_on.year(), paid_on.month()),
            paid_on,
            recorded_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.create_salary_record(&record).await?;

        let event = PostingEvent::Salary(SalaryPosting {
            staff_name,
            period,
            gross,
            other_deductions,
            net_pay,
            statutory: Some(statutory),
            method,
            reference: record.reference.clone(),
            entry_date: paid_on,
        });
        super::shadow_post(&mut self.storage, &mut self.engine, event).await;

        Ok(record)
    }

    /// List salary records, optionally for one period
    pub async fn list_salaries(&self, period: Option<&str>) -> FinanceResult<Vec<SalaryRecord>> {
        self.storage.list_salary_records(period).await
    }
}
