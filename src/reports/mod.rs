//! Financial statements derived purely from posted journal entries and
//! chart-of-accounts metadata
//!
//! The generator holds no state of its own: every report is an
//! aggregation over the ledger at the moment it is asked for.

pub mod fixed_assets;

pub use fixed_assets::*;

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chart::ChartManager;
use crate::journal::JournalManager;
use crate::traits::{EntryQuery, FinanceStore};
use crate::types::*;

/// One account's contribution to a report section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    pub account_code: String,
    pub account_name: String,
    pub amount: BigDecimal,
}

/// A titled group of report lines with its total
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSection {
    pub lines: Vec<ReportLine>,
    pub total: BigDecimal,
}

impl ReportSection {
    fn push(&mut self, line: ReportLine) {
        self.total += &line.amount;
        self.lines.push(line);
    }
}

/// Revenue and expenses over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub revenue: ReportSection,
    pub expenses: ReportSection,
    pub total_revenue: BigDecimal,
    pub total_expenses: BigDecimal,
    pub net_income: BigDecimal,
}

/// Assets, liabilities, and equity as of a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub as_of_date: NaiveDate,
    pub current_assets: ReportSection,
    pub fixed_assets: ReportSection,
    pub current_liabilities: ReportSection,
    pub long_term_liabilities: ReportSection,
    pub equity: ReportSection,
    pub total_assets: BigDecimal,
    pub total_liabilities: BigDecimal,
    pub total_equity: BigDecimal,
    pub is_balanced: bool,
}

/// One cash movement in the cash-flow statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowItem {
    pub description: String,
    pub reference_type: ReferenceType,
    /// Net cash effect; inflows positive
    pub amount: BigDecimal,
}

/// Cash movements over a date range, bucketed by activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub operating: Vec<CashFlowItem>,
    pub investing: Vec<CashFlowItem>,
    pub net_operating: BigDecimal,
    pub net_investing: BigDecimal,
    pub net_cash_flow: BigDecimal,
}

/// Whether an account code is a cash or bank account under the numbering
/// convention
fn is_cash_code(code: &str) -> bool {
    code.starts_with("111") || code.starts_with("112")
}

/// Generates financial statements from the ledger
pub struct ReportsGenerator<S: FinanceStore + Clone> {
    pub(crate) storage: S,
    pub(crate) chart: ChartManager<S>,
    pub(crate) journal: JournalManager<S>,
}

impl<S: FinanceStore + Clone> ReportsGenerator<S> {
    pub fn new(storage: S) -> Self {
        Self {
            chart: ChartManager::new(storage.clone()),
            journal: JournalManager::new(storage.clone()),
            storage,
        }
    }

    /// The trial balance the other statements are built on
    pub async fn trial_balance(&self, as_of: Option<NaiveDate>) -> FinanceResult<TrialBalance> {
        self.journal.trial_balance(as_of).await
    }

    /// Revenue and expense activity between two dates.
    /// Revenue credit-balances are reported positive; expense
    /// debit-balances as-is.
    pub async fn income_statement(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> FinanceResult<IncomeStatement> {
        let entries = self
            .journal
            .find_entries(&EntryQuery::posted_between(start_date, end_date))
            .await?;

        #[derive(Default)]
        struct Accumulated {
            name: String,
            debit: BigDecimal,
            credit: BigDecimal,
        }

        let mut per_account: BTreeMap<String, Accumulated> = BTreeMap::new();
        for entry in &entries {
            for line in &entry.lines {
                let slot = per_account.entry(line.account_code.clone()).or_default();
                if slot.name.is_empty() {
                    slot.name = line.account_name.clone();
                }
                slot.debit += &line.debit;
                slot.credit += &line.credit;
            }
        }

        let mut revenue = ReportSection::default();
        let mut expenses = ReportSection::default();

        for (code, accumulated) in per_account {
            let category = match self.chart.get_by_code(&code).await? {
                Some(account) => account.category,
                None => match AccountCategory::from_code(&code) {
                    Some(category) => category,
                    None => continue,
                },
            };
            match category {
                AccountCategory::Revenue => revenue.push(ReportLine {
                    account_code: code,
                    account_name: accumulated.name,
                    amount: &accumulated.credit - &accumulated.debit,
                }),
                AccountCategory::Expense => expenses.push(ReportLine {
                    account_code: code,
                    account_name: accumulated.name,
                    amount: &accumulated.debit - &accumulated.credit,
                }),
                _ => {}
            }
        }

        let total_revenue = revenue.total.clone();
        let total_expenses = expenses.total.clone();
        let net_income = &total_revenue - &total_expenses;

        Ok(IncomeStatement {
            start_date,
            end_date,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income,
        })
    }

    /// Financial position as of a date, partitioned by each account's
    /// explicit category tag. Accumulated net income to date is folded
    /// into equity so that assets equal liabilities plus equity.
    pub async fn balance_sheet(&self, as_of_date: NaiveDate) -> FinanceResult<BalanceSheet> {
        let trial_balance = self.journal.trial_balance(Some(as_of_date)).await?;

        let mut current_assets = ReportSection::default();
        let mut fixed_assets = ReportSection::default();
        let mut current_liabilities = ReportSection::default();
        let mut long_term_liabilities = ReportSection::default();
        let mut equity = ReportSection::default();
        let mut net_income = BigDecimal::from(0);

        for row in &trial_balance.rows {
            let category = match self.chart.get_by_code(&row.account_code).await? {
                Some(account) => account.category,
                None => match AccountCategory::from_code(&row.account_code) {
                    Some(category) => category,
                    None => continue,
                },
            };

            let debit_balance = &row.total_debit - &row.total_credit;
            let credit_balance = &row.total_credit - &row.total_debit;

            match category {
                AccountCategory::CurrentAsset => current_assets.push(ReportLine {
                    account_code: row.account_code.clone(),
                    account_name: row.account_name.clone(),
                    amount: debit_balance,
                }),
                AccountCategory::FixedAsset => fixed_assets.push(ReportLine {
                    account_code: row.account_code.clone(),
                    account_name: row.account_name.clone(),
                    amount: debit_balance,
                }),
                AccountCategory::CurrentLiability => current_liabilities.push(ReportLine {
                    account_code: row.account_code.clone(),
                    account_name: row.account_name.clone(),
                    amount: credit_balance,
                }),
                AccountCategory::LongTermLiability => long_term_liabilities.push(ReportLine {
                    account_code: row.account_code.clone(),
                    account_name: row.account_name.clone(),
                    amount: credit_balance,
                }),
                AccountCategory::Equity => equity.push(ReportLine {
                    account_code: row.account_code.clone(),
                    account_name: row.account_name.clone(),
                    amount: credit_balance,
                }),
                AccountCategory::Revenue | AccountCategory::Expense => {
                    net_income += credit_balance;
                }
            }
        }

        if net_income != BigDecimal::from(0) {
            equity.push(ReportLine {
                account_code: "3900".to_string(),
                account_name: "Accumulated Surplus (Deficit)".to_string(),
                amount: net_income,
            });
        }

        let total_assets = &current_assets.total + &fixed_assets.total;
        let total_liabilities = &current_liabilities.total + &long_term_liabilities.total;
        let total_equity = equity.total.clone();
        let is_balanced = (&total_assets - (&total_liabilities + &total_equity)).abs()
            < balance_tolerance();

        Ok(BalanceSheet {
            as_of_date,
            current_assets,
            fixed_assets,
            current_liabilities,
            long_term_liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            is_balanced,
        })
    }

    /// Cash movements over a date range, from posted lines touching cash
    /// and bank accounts, bucketed by the entry's source event family.
    /// Internal transfers net to zero and drop out.
    pub async fn cash_flow(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> FinanceResult<CashFlowStatement> {
        let entries = self
            .journal
            .find_entries(&EntryQuery::posted_between(start_date, end_date))
            .await?;

        let mut operating = Vec::new();
        let mut investing = Vec::new();
        let zero = BigDecimal::from(0);

        for entry in &entries {
            let cash_delta: BigDecimal = entry
                .lines
                .iter()
                .filter(|line| is_cash_code(&line.account_code))
                .map(|line| &line.debit - &line.credit)
                .sum();
            if cash_delta == zero {
                continue;
            }

            let item = CashFlowItem {
                description: entry.description.clone(),
                reference_type: entry.reference_type,
                amount: cash_delta,
            };
            match entry.reference_type {
                ReferenceType::AssetPurchase | ReferenceType::Depreciation => {
                    investing.push(item)
                }
                ReferenceType::Transfer => {}
                _ => operating.push(item),
            }
        }

        let net_operating: BigDecimal = operating.iter().map(|i| &i.amount).sum();
        let net_investing: BigDecimal = investing.iter().map(|i| &i.amount).sum();
        let net_cash_flow = &net_operating + &net_investing;

        Ok(CashFlowStatement {
            start_date,
            end_date,
            operating,
            investing,
            net_operating,
            net_investing,
            net_cash_flow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{codes, ChartManager};
    use crate::mapping::MappingResolver;
    use crate::posting::{
        AssetPurchasePosting, AutoPostingEngine, ExpensePosting, PaymentMethod, StudentPayment,
    };
    use crate::utils::memory_store::MemoryStore;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    async fn populated_storage() -> MemoryStore {
        let storage = MemoryStore::new();
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();
        let mut resolver = MappingResolver::new(storage.clone());
        resolver.seed_defaults().await.unwrap();

        let mut engine = AutoPostingEngine::new(storage.clone());
        engine
            .post_student_payment(&StudentPayment {
                amount: BigDecimal::from(300_000),
                method: PaymentMethod::Cash,
                payer: "Term fees".to_string(),
                reference: "PAY-2026-RPT00001".to_string(),
                entry_date: date(1, 10),
            })
            .await
            .unwrap();
        engine
            .post_fee_assignment(&crate::posting::FeeAssignment {
                student: "All Students".to_string(),
                allocations: vec![crate::posting::FeeAllocation {
                    fee_type: "tuition".to_string(),
                    amount: BigDecimal::from(500_000),
                }],
                reference: "FEE-2026-RPT00001".to_string(),
                entry_date: date(1, 5),
            })
            .await
            .unwrap();
        engine
            .post_expense(&ExpensePosting {
                amount: BigDecimal::from(120_000),
                category: "utilities".to_string(),
                method: PaymentMethod::BankTransfer,
                vendor: "PHCN".to_string(),
                reference: "EXP-2026-RPT00001".to_string(),
                entry_date: date(1, 20),
            })
            .await
            .unwrap();
        engine
            .post_asset_purchase(&AssetPurchasePosting {
                asset_name: "Generator".to_string(),
                asset_type: "plant".to_string(),
                price: BigDecimal::from(900_000),
                method: PaymentMethod::BankTransfer,
                vendor: "Mikano".to_string(),
                reference: "AST-2026-RPT001".to_string(),
                entry_date: date(1, 25),
            })
            .await
            .unwrap();

        storage
    }

    #[tokio::test]
    async fn income_statement_partitions_revenue_and_expenses() {
        let storage = populated_storage().await;
        let reports = ReportsGenerator::new(storage);

        let statement = reports
            .income_statement(date(1, 1), date(1, 31))
            .await
            .unwrap();

        assert_eq!(statement.total_revenue, BigDecimal::from(500_000));
        assert_eq!(statement.total_expenses, BigDecimal::from(120_000));
        assert_eq!(statement.net_income, BigDecimal::from(380_000));
        assert_eq!(statement.revenue.lines.len(), 1);
        assert_eq!(statement.revenue.lines[0].account_code, codes::TUITION_FEES);
    }

    #[tokio::test]
    async fn balance_sheet_balances_with_net_income_in_equity() {
        let storage = populated_storage().await;
        let reports = ReportsGenerator::new(storage);

        let sheet = reports.balance_sheet(date(1, 31)).await.unwrap();
        assert!(sheet.is_balanced);

        // generator landed on the Fixed Assets fallback account
        assert!(sheet
            .fixed_assets
            .lines
            .iter()
            .any(|l| l.account_code == codes::FIXED_ASSETS));

        // cash 300,000 in, 0 out of cash; bank paid 120,000 + 900,000
        let cash = sheet
            .current_assets
            .lines
            .iter()
            .find(|l| l.account_code == codes::CASH)
            .unwrap();
        assert_eq!(cash.amount, BigDecimal::from(300_000));

        let surplus = sheet
            .equity
            .lines
            .iter()
            .find(|l| l.account_code == "3900")
            .unwrap();
        assert_eq!(surplus.amount, BigDecimal::from(380_000));
    }

    #[tokio::test]
    async fn cash_flow_buckets_operating_and_investing() {
        let storage = populated_storage().await;
        let reports = ReportsGenerator::new(storage);

        let statement = reports.cash_flow(date(1, 1), date(1, 31)).await.unwrap();

        // +300,000 payment, -120,000 expense
        assert_eq!(statement.net_operating, BigDecimal::from(180_000));
        // -900,000 generator
        assert_eq!(statement.net_investing, BigDecimal::from(-900_000));
        assert_eq!(statement.net_cash_flow, BigDecimal::from(-720_000));

        // the fee assignment touches no cash account and must not appear
        assert!(statement
            .operating
            .iter()
            .all(|item| item.reference_type != ReferenceType::FeeAssignment));
    }

    #[tokio::test]
    async fn internal_transfers_drop_out_of_cash_flow() {
        let storage = populated_storage().await;

        // second GL bank account plus a transfer between the two
        let mut chart = ChartManager::new(storage.clone());
        chart
            .create_account(
                "1121".to_string(),
                "Capital Project Account".to_string(),
                AccountType::Asset,
                None,
            )
            .await
            .unwrap();
        let mut journal = crate::journal::JournalManager::new(storage.clone());
        let entry = crate::journal::EntryBuilder::new(date(1, 28), "Transfer to project account")
            .reference(ReferenceType::Transfer, "TRF-2026-RPT00001")
            .debit("1121", "Capital Project Account", BigDecimal::from(50_000), None)
            .credit(codes::BANK, "School Bank Account", BigDecimal::from(50_000), None)
            .build()
            .unwrap();
        journal.create_and_post(entry).await.unwrap();

        let reports = ReportsGenerator::new(storage);
        let statement = reports.cash_flow(date(1, 1), date(1, 31)).await.unwrap();
        assert_eq!(statement.net_cash_flow, BigDecimal::from(-720_000));
    }
}
