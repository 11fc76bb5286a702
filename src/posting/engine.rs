//! The auto-posting engine
//!
//! One method per business event family. Each resolves the affected
//! accounts (through the mapping table where configurable), builds a
//! balanced entry, and persists it. Posting is idempotent per
//! `(reference_type, reference_id)`: replaying an already-posted event
//! returns the existing entry.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chart::{codes, ChartManager};
use crate::journal::{EntryBuilder, JournalManager};
use crate::mapping::{MappingResolver, MappingType};
use crate::tax::StatutoryDeductions;
use crate::traits::FinanceStore;
use crate::types::*;
use crate::utils::validation::{validate_non_negative, validate_positive_amount};

use super::PostingEvent;

/// How a payment or disbursement was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Pos,
    Cheque,
}

impl PaymentMethod {
    /// The cash or bank account money moves through for this method
    pub fn settlement_account(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => codes::CASH,
            PaymentMethod::BankTransfer | PaymentMethod::Pos | PaymentMethod::Cheque => {
                codes::BANK
            }
        }
    }
}

/// A confirmed fee payment from a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPayment {
    pub amount: BigDecimal,
    pub method: PaymentMethod,
    pub payer: String,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// One fee-type slice of a fee assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeAllocation {
    pub fee_type: String,
    pub amount: BigDecimal,
}

/// Fees billed to a student, split by fee type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeAssignment {
    pub student: String,
    pub allocations: Vec<FeeAllocation>,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// An approved expense payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePosting {
    pub amount: BigDecimal,
    pub category: String,
    pub method: PaymentMethod,
    pub vendor: String,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// A salary payment with its deduction breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryPosting {
    pub staff_name: String,
    /// Payroll period, "YYYY-MM"
    pub period: String,
    pub gross: BigDecimal,
    /// Non-statutory deductions (loans, cooperative dues, ...)
    pub other_deductions: BigDecimal,
    pub net_pay: BigDecimal,
    pub statutory: Option<StatutoryDeductions>,
    pub method: PaymentMethod,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// An asset purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPurchasePosting {
    pub asset_name: String,
    /// Asset category, resolved through the asset mapping table
    pub asset_type: String,
    pub price: BigDecimal,
    pub method: PaymentMethod,
    pub vendor: String,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// A periodic depreciation charge for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationPosting {
    pub asset_name: String,
    pub amount: BigDecimal,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// Translates business events into balanced, posted journal entries
pub struct AutoPostingEngine<S: FinanceStore + Clone> {
    chart: ChartManager<S>,
    resolver: MappingResolver<S>,
    journal: JournalManager<S>,
    post_immediately: bool,
}

impl<S: FinanceStore + Clone> AutoPostingEngine<S> {
    /// Engine that posts entries as soon as they are created
    pub fn new(storage: S) -> Self {
        Self {
            chart: ChartManager::new(storage.clone()),
            resolver: MappingResolver::new(storage.clone()),
            journal: JournalManager::new(storage),
            post_immediately: true,
        }
    }

    /// Engine that leaves entries in draft for manual review
    pub fn draft_only(storage: S) -> Self {
        Self {
            post_immediately: false,
            ..Self::new(storage)
        }
    }

    async fn existing_entry(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> FinanceResult<Option<JournalEntry>> {
        let mut entries = self
            .journal
            .find_by_reference(reference_type, reference_id)
            .await?;
        if entries.is_empty() {
            Ok(None)
        } else {
            debug!(reference_id, "entry already exists for reference; skipping repost");
            Ok(Some(entries.remove(0)))
        }
    }

    async fn finalize(&mut self, entry: JournalEntry) -> FinanceResult<JournalEntry> {
        if self.post_immediately {
            self.journal.create_and_post(entry).await
        } else {
            self.journal.create_entry(entry).await
        }
    }

    /// A fixed chart account, by code
    async fn account(&self, code: &str) -> FinanceResult<Account> {
        self.chart.get_required(code).await
    }

    /// Resolve a mapped account, falling back to the mapping type's
    /// generic account when the mapped code is missing or inactive
    async fn mapped_account(
        &self,
        mapping_type: MappingType,
        source_type: &str,
    ) -> FinanceResult<Account> {
        let code = self.resolver.resolve(mapping_type, source_type).await?;
        match self.chart.get_by_code(&code).await? {
            Some(account) if account.is_active => Ok(account),
            _ => {
                warn!(
                    source_type,
                    code = %code,
                    "mapped account missing or inactive; using fallback account"
                );
                self.chart
                    .get_required(mapping_type.fallback_account())
                    .await
            }
        }
    }

    /// Dr Cash/Bank (method-dependent), Cr Accounts Receivable
    pub async fn post_student_payment(
        &mut self,
        payment: &StudentPayment,
    ) -> FinanceResult<JournalEntry> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::Payment, &payment.reference)
            .await?
        {
            return Ok(entry);
        }
        validate_positive_amount(&payment.amount)?;

        let settlement = self.account(payment.method.settlement_account()).await?;
        let receivable = self.account(codes::ACCOUNTS_RECEIVABLE).await?;

        let entry = EntryBuilder::new(
            payment.entry_date,
            format!("Fee payment from {}", payment.payer),
        )
        .reference(ReferenceType::Payment, payment.reference.clone())
        .debit(settlement.code, settlement.name, payment.amount.clone(), None)
        .credit(receivable.code, receivable.name, payment.amount.clone(), None)
        .build()?;

        self.finalize(entry).await
    }

    /// Dr Accounts Receivable for the total, one Cr revenue line per
    /// fee-type allocation
    pub async fn post_fee_assignment(
        &mut self,
        assignment: &FeeAssignment,
    ) -> FinanceResult<JournalEntry> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::FeeAssignment, &assignment.reference)
            .await?
        {
            return Ok(entry);
        }
        if assignment.allocations.is_empty() {
            return Err(FinanceError::Validation(
                "Fee assignment must have at least one allocation".to_string(),
            ));
        }
        for allocation in &assignment.allocations {
            validate_positive_amount(&allocation.amount)?;
        }

        let total: BigDecimal = assignment.allocations.iter().map(|a| &a.amount).sum();
        let receivable = self.account(codes::ACCOUNTS_RECEIVABLE).await?;

        let mut builder = EntryBuilder::new(
            assignment.entry_date,
            format!("Fee assignment for {}", assignment.student),
        )
        .reference(ReferenceType::FeeAssignment, assignment.reference.clone())
        .debit(receivable.code, receivable.name, total, None);

        for allocation in &assignment.allocations {
            let revenue = self
                .mapped_account(MappingType::Revenue, &allocation.fee_type)
                .await?;
            builder = builder.credit(
                revenue.code,
                revenue.name,
                allocation.amount.clone(),
                Some(allocation.fee_type.clone()),
            );
        }

        self.finalize(builder.build()?).await
    }

    /// Dr resolved expense account, Cr Cash/Bank
    pub async fn post_expense(&mut self, expense: &ExpensePosting) -> FinanceResult<JournalEntry> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::Expense, &expense.reference)
            .await?
        {
            return Ok(entry);
        }
        validate_positive_amount(&expense.amount)?;

        let expense_account = self
            .mapped_account(MappingType::Expense, &expense.category)
            .await?;
        let settlement = self.account(expense.method.settlement_account()).await?;

        let entry = EntryBuilder::new(
            expense.entry_date,
            format!("{} expense - {}", expense.category, expense.vendor),
        )
        .reference(ReferenceType::Expense, expense.reference.clone())
        .debit(
            expense_account.code,
            expense_account.name,
            expense.amount.clone(),
            None,
        )
        .credit(settlement.code, settlement.name, expense.amount.clone(), None)
        .build()?;

        self.finalize(entry).await
    }

    /// Salary posting:
    /// Dr Salary Expense (gross) and Pension Expense (employer share);
    /// Cr Cash/Bank (net), one liability line per statutory deduction
    /// present, and Salaries Payable for residual non-statutory
    /// deductions. Balances by construction: debits are
    /// gross + employer pension, credits are net pay plus every withheld
    /// or payable amount.
    pub async fn post_salary_payment(
        &mut self,
        salary: &SalaryPosting,
    ) -> FinanceResult<JournalEntry> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::Salary, &salary.reference)
            .await?
        {
            return Ok(entry);
        }
        validate_positive_amount(&salary.gross)?;
        validate_non_negative(&salary.other_deductions, "Other deductions")?;

        let statutory = salary
            .statutory
            .clone()
            .unwrap_or_else(StatutoryDeductions::zero);

        let expected_net =
            &salary.gross - &statutory.total_employee_deductions - &salary.other_deductions;
        if expected_net < BigDecimal::from(0) {
            return Err(FinanceError::Validation(format!(
                "Deductions exceed gross salary for {}",
                salary.staff_name
            )));
        }
        if (&expected_net - &salary.net_pay).abs() >= balance_tolerance() {
            return Err(FinanceError::Validation(format!(
                "Net pay {} does not match gross less deductions {} for {}",
                salary.net_pay, expected_net, salary.staff_name
            )));
        }

        let zero = BigDecimal::from(0);
        let salary_expense = self.account(codes::SALARY_EXPENSE).await?;
        let settlement = self.account(salary.method.settlement_account()).await?;

        let mut builder = EntryBuilder::new(
            salary.entry_date,
            format!("Salary for {} ({})", salary.staff_name, salary.period),
        )
        .reference(ReferenceType::Salary, salary.reference.clone())
        .debit(
            salary_expense.code,
            salary_expense.name,
            salary.gross.clone(),
            None,
        );

        // Employer pension is an additional expense beyond gross salary
        if statutory.pension_employer > zero {
            let pension_expense = self.account(codes::PENSION_EXPENSE).await?;
            builder = builder.debit(
                pension_expense.code,
                pension_expense.name,
                statutory.pension_employer.clone(),
                None,
            );
        }

        if salary.net_pay > zero {
            builder = builder.credit(
                settlement.code,
                settlement.name,
                salary.net_pay.clone(),
                Some("Net pay".to_string()),
            );
        }

        if statutory.paye > zero {
            let paye = self.account(codes::PAYE_PAYABLE).await?;
            builder = builder.credit(paye.code, paye.name, statutory.paye.clone(), None);
        }

        let pension_total = &statutory.pension_employee + &statutory.pension_employer;
        if pension_total > zero {
            let pension = self.account(codes::PENSION_PAYABLE).await?;
            builder = builder.credit(
                pension.code,
                pension.name,
                pension_total,
                Some("Employee and employer pension".to_string()),
            );
        }

        if statutory.nhf > zero {
            let nhf = self.account(codes::NHF_PAYABLE).await?;
            builder = builder.credit(nhf.code, nhf.name, statutory.nhf.clone(), None);
        }

        if statutory.nhis > zero {
            let nhis = self.account(codes::NHIS_PAYABLE).await?;
            builder = builder.credit(nhis.code, nhis.name, statutory.nhis.clone(), None);
        }

        if salary.other_deductions > zero {
            let payable = self.account(codes::SALARIES_PAYABLE).await?;
            builder = builder.credit(
                payable.code,
                payable.name,
                salary.other_deductions.clone(),
                Some("Non-statutory deductions".to_string()),
            );
        }

        self.finalize(builder.build()?).await
    }

    /// Dr resolved asset account (fallback Fixed Assets), Cr Cash/Bank
    pub async fn post_asset_purchase(
        &mut self,
        purchase: &AssetPurchasePosting,
    ) -> FinanceResult<JournalEntry> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::AssetPurchase, &purchase.reference)
            .await?
        {
            return Ok(entry);
        }
        validate_positive_amount(&purchase.price)?;

        let asset_account = self
            .mapped_account(MappingType::Asset, &purchase.asset_type)
            .await?;
        let settlement = self.account(purchase.method.settlement_account()).await?;

        let entry = EntryBuilder::new(
            purchase.entry_date,
            format!("Purchase of {} from {}", purchase.asset_name, purchase.vendor),
        )
        .reference(ReferenceType::AssetPurchase, purchase.reference.clone())
        .debit(
            asset_account.code,
            asset_account.name,
            purchase.price.clone(),
            None,
        )
        .credit(settlement.code, settlement.name, purchase.price.clone(), None)
        .build()?;

        self.finalize(entry).await
    }

    /// Dr Depreciation Expense, Cr Accumulated Depreciation
    pub async fn post_depreciation(
        &mut self,
        depreciation: &DepreciationPosting,
    ) -> FinanceResult<JournalEntry> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::Depreciation, &depreciation.reference)
            .await?
        {
            return Ok(entry);
        }
        validate_positive_amount(&depreciation.amount)?;

        let expense = self.account(codes::DEPRECIATION_EXPENSE).await?;
        let accumulated = self.account(codes::ACCUMULATED_DEPRECIATION).await?;

        let entry = EntryBuilder::new(
            depreciation.entry_date,
            format!("Depreciation - {}", depreciation.asset_name),
        )
        .reference(ReferenceType::Depreciation, depreciation.reference.clone())
        .debit(expense.code, expense.name, depreciation.amount.clone(), None)
        .credit(
            accumulated.code,
            accumulated.name,
            depreciation.amount.clone(),
            None,
        )
        .build()?;

        self.finalize(entry).await
    }

    /// Replay a stored posting event. Bank events post through
    /// [`super::BankPostingEngine`], not here.
    pub async fn post_event(&mut self, event: &PostingEvent) -> FinanceResult<JournalEntry> {
        match event {
            PostingEvent::StudentPayment(e) => self.post_student_payment(e).await,
            PostingEvent::FeeAssignment(e) => self.post_fee_assignment(e).await,
            PostingEvent::Expense(e) => self.post_expense(e).await,
            PostingEvent::Salary(e) => self.post_salary_payment(e).await,
            PostingEvent::AssetPurchase(e) => self.post_asset_purchase(e).await,
            PostingEvent::Depreciation(e) => self.post_depreciation(e).await,
            PostingEvent::BankTransaction(_) | PostingEvent::BankTransfer(_) => {
                Err(FinanceError::Validation(
                    "Bank events post through the bank posting engine".to_string(),
                ))
            }
        }
    }

    /// Read access to the journal, for trial balances and queries
    pub fn journal(&self) -> &JournalManager<S> {
        &self.journal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartManager;
    use crate::tax::StatutoryDeductionsCalculator;
    use crate::utils::memory_store::MemoryStore;
    use chrono::NaiveDate;

    async fn seeded_engine() -> (MemoryStore, AutoPostingEngine<MemoryStore>) {
        let storage = MemoryStore::new();
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();
        let mut resolver = MappingResolver::new(storage.clone());
        resolver.seed_defaults().await.unwrap();
        let engine = AutoPostingEngine::new(storage.clone());
        (storage, engine)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[tokio::test]
    async fn student_payment_hits_method_account() {
        let (_, mut engine) = seeded_engine().await;

        let cash = engine
            .post_student_payment(&StudentPayment {
                amount: BigDecimal::from(45_000),
                method: PaymentMethod::Cash,
                payer: "Adaeze Obi".to_string(),
                reference: "PAY-2026-AAAA0001".to_string(),
                entry_date: date(2),
            })
            .await
            .unwrap();
        assert_eq!(cash.status, EntryStatus::Posted);
        assert_eq!(cash.lines[0].account_code, codes::CASH);
        assert_eq!(cash.lines[1].account_code, codes::ACCOUNTS_RECEIVABLE);
        assert!(cash.is_balanced());

        let transfer = engine
            .post_student_payment(&StudentPayment {
                amount: BigDecimal::from(45_000),
                method: PaymentMethod::BankTransfer,
                payer: "Adaeze Obi".to_string(),
                reference: "PAY-2026-AAAA0002".to_string(),
                entry_date: date(2),
            })
            .await
            .unwrap();
        assert_eq!(transfer.lines[0].account_code, codes::BANK);
    }

    #[tokio::test]
    async fn reposting_the_same_reference_is_idempotent() {
        let (_, mut engine) = seeded_engine().await;

        let payment = StudentPayment {
            amount: BigDecimal::from(10_000),
            method: PaymentMethod::Pos,
            payer: "Bola Akin".to_string(),
            reference: "PAY-2026-BBBB0001".to_string(),
            entry_date: date(4),
        };

        let first = engine.post_student_payment(&payment).await.unwrap();
        let second = engine.post_student_payment(&payment).await.unwrap();
        assert_eq!(first.id, second.id);

        let entries = engine
            .journal()
            .find_by_reference(ReferenceType::Payment, &payment.reference)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn fee_assignment_credits_one_line_per_allocation() {
        let (_, mut engine) = seeded_engine().await;

        let entry = engine
            .post_fee_assignment(&FeeAssignment {
                student: "Chinedu Eze".to_string(),
                allocations: vec![
                    FeeAllocation {
                        fee_type: "tuition".to_string(),
                        amount: BigDecimal::from(120_000),
                    },
                    FeeAllocation {
                        fee_type: "examination".to_string(),
                        amount: BigDecimal::from(15_000),
                    },
                    // unmapped fee type lands on the fallback revenue account
                    FeeAllocation {
                        fee_type: "sports_levy".to_string(),
                        amount: BigDecimal::from(5_000),
                    },
                ],
                reference: "FEE-2026-0001".to_string(),
                entry_date: date(1),
            })
            .await
            .unwrap();

        assert!(entry.is_balanced());
        assert_eq!(entry.lines.len(), 4);
        assert_eq!(entry.lines[0].account_code, codes::ACCOUNTS_RECEIVABLE);
        assert_eq!(entry.lines[0].debit, BigDecimal::from(140_000));
        assert_eq!(entry.lines[1].account_code, codes::TUITION_FEES);
        assert_eq!(entry.lines[2].account_code, codes::EXAMINATION_FEES);
        assert_eq!(entry.lines[3].account_code, codes::OTHER_INCOME);
    }

    #[tokio::test]
    async fn expense_uses_mapped_account() {
        let (_, mut engine) = seeded_engine().await;

        let entry = engine
            .post_expense(&ExpensePosting {
                amount: BigDecimal::from(30_000),
                category: "utilities".to_string(),
                method: PaymentMethod::BankTransfer,
                vendor: "PHCN".to_string(),
                reference: "EXP-2026-CCCC0001".to_string(),
                entry_date: date(9),
            })
            .await
            .unwrap();

        assert_eq!(entry.lines[0].account_code, codes::UTILITIES_EXPENSE);
        assert_eq!(entry.lines[1].account_code, codes::BANK);
        assert!(entry.is_balanced());
    }

    #[tokio::test]
    async fn salary_posting_balances_across_input_combinations() {
        let (_, mut engine) = seeded_engine().await;

        let cases: Vec<(i64, i64, i64)> = vec![
            // (basic, allowances, other_deductions)
            (25_000, 0, 0),      // below every statutory threshold except pension
            (30_000, 0, 0),      // NHF boundary
            (80_000, 20_000, 5_000),
            (250_000, 100_000, 0),
            (1_500_000, 500_000, 50_000),
            (9_000_000, 1_000_000, 0), // top bracket
        ];

        for (index, (basic, allowances, other)) in cases.into_iter().enumerate() {
            let basic = BigDecimal::from(basic);
            let allowances = BigDecimal::from(allowances);
            let other_deductions = BigDecimal::from(other);
            let statutory = StatutoryDeductionsCalculator::calculate_all(&basic, &allowances);
            let gross = &basic + &allowances;
            let net_pay = &gross - &statutory.total_employee_deductions - &other_deductions;

            let entry = engine
                .post_salary_payment(&SalaryPosting {
                    staff_name: format!("Staff {}", index),
                    period: "2026-03".to_string(),
                    gross: gross.clone(),
                    other_deductions,
                    net_pay,
                    statutory: Some(statutory.clone()),
                    method: PaymentMethod::BankTransfer,
                    reference: format!("SAL-2026-03-CASE{:02}", index),
                    entry_date: date(28),
                })
                .await
                .unwrap();

            assert!(entry.is_balanced(), "case {} does not balance", index);
            assert_eq!(
                entry.total_debits(),
                &gross + &statutory.pension_employer,
                "case {} debits are not gross + employer pension",
                index
            );
        }
    }

    #[tokio::test]
    async fn salary_with_no_deductions_is_two_lines() {
        let (_, mut engine) = seeded_engine().await;

        let entry = engine
            .post_salary_payment(&SalaryPosting {
                staff_name: "Casual Worker".to_string(),
                period: "2026-03".to_string(),
                gross: BigDecimal::from(20_000),
                other_deductions: BigDecimal::from(0),
                net_pay: BigDecimal::from(20_000),
                statutory: None,
                method: PaymentMethod::Cash,
                reference: "SAL-2026-03-ZERO01".to_string(),
                entry_date: date(28),
            })
            .await
            .unwrap();

        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.lines[0].account_code, codes::SALARY_EXPENSE);
        assert_eq!(entry.lines[1].account_code, codes::CASH);
        assert!(entry.is_balanced());
    }

    #[tokio::test]
    async fn inconsistent_net_pay_is_rejected() {
        let (_, mut engine) = seeded_engine().await;

        let result = engine
            .post_salary_payment(&SalaryPosting {
                staff_name: "Mismatch".to_string(),
                period: "2026-03".to_string(),
                gross: BigDecimal::from(100_000),
                other_deductions: BigDecimal::from(0),
                net_pay: BigDecimal::from(95_000), // should be 100,000 with no deductions
                statutory: None,
                method: PaymentMethod::BankTransfer,
                reference: "SAL-2026-03-BAD001".to_string(),
                entry_date: date(28),
            })
            .await;

        assert!(matches!(result, Err(FinanceError::Validation(_))));
    }

    #[tokio::test]
    async fn asset_purchase_falls_back_to_fixed_assets() {
        let (_, mut engine) = seeded_engine().await;

        let mapped = engine
            .post_asset_purchase(&AssetPurchasePosting {
                asset_name: "School Bus".to_string(),
                asset_type: "vehicle".to_string(),
                price: BigDecimal::from(8_000_000),
                method: PaymentMethod::BankTransfer,
                vendor: "Lagos Motors".to_string(),
                reference: "AST-2026-DDD001".to_string(),
                entry_date: date(11),
            })
            .await
            .unwrap();
        assert_eq!(mapped.lines[0].account_code, codes::MOTOR_VEHICLES);

        let fallback = engine
            .post_asset_purchase(&AssetPurchasePosting {
                asset_name: "Borehole".to_string(),
                asset_type: "water_infrastructure".to_string(),
                price: BigDecimal::from(1_200_000),
                method: PaymentMethod::Cheque,
                vendor: "DrillCo".to_string(),
                reference: "AST-2026-DDD002".to_string(),
                entry_date: date(12),
            })
            .await
            .unwrap();
        assert_eq!(fallback.lines[0].account_code, codes::FIXED_ASSETS);
    }

    #[tokio::test]
    async fn depreciation_hits_contra_asset() {
        let (_, mut engine) = seeded_engine().await;

        let entry = engine
            .post_depreciation(&DepreciationPosting {
                asset_name: "School Bus".to_string(),
                amount: BigDecimal::from(66_250),
                reference: "DEP-2026-03-EEE001".to_string(),
                entry_date: date(31),
            })
            .await
            .unwrap();

        assert_eq!(entry.lines[0].account_code, codes::DEPRECIATION_EXPENSE);
        assert_eq!(entry.lines[1].account_code, codes::ACCUMULATED_DEPRECIATION);
    }

    #[tokio::test]
    async fn draft_mode_leaves_entries_unposted() {
        let storage = MemoryStore::new();
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();
        let mut engine = AutoPostingEngine::draft_only(storage);

        let entry = engine
            .post_student_payment(&StudentPayment {
                amount: BigDecimal::from(5_000),
                method: PaymentMethod::Cash,
                payer: "Draft Payer".to_string(),
                reference: "PAY-2026-FFFF0001".to_string(),
                entry_date: date(6),
            })
            .await
            .unwrap();

        assert_eq!(entry.status, EntryStatus::Draft);
    }
}
