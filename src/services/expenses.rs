//! Expense lifecycle: recorded pending, then approved or rejected
//!
//! The accounting entry is only posted when an expense is approved.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posting::{AutoPostingEngine, ExpensePosting, PaymentMethod, PostingEvent};
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::*;
use crate::utils::references;
use crate::utils::validation::{validate_description, validate_positive_amount};

/// Lifecycle status of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

/// A school expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    /// Expense category, resolved through the expense mapping table
    pub category: String,
    pub description: String,
    pub vendor: String,
    pub amount: BigDecimal,
    pub method: PaymentMethod,
    pub status: ExpenseStatus,
    /// Audit reference, `EXP-{year}-{8 alphanumeric}`
    pub reference: String,
    pub incurred_on: NaiveDate,
    pub recorded_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Optimistic-concurrency token
    pub version: u64,
}

/// Service owning the expense lifecycle
pub struct ExpenseService<S: FinanceStore + Clone> {
    storage: S,
    engine: AutoPostingEngine<S>,
}

impl<S: FinanceStore + Clone> ExpenseService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            engine: AutoPostingEngine::new(storage.clone()),
            storage,
        }
    }

    /// Record a new expense in pending state; nothing is posted yet
    pub async fn record_expense(
        &mut self,
        category: String,
        description: String,
        vendor: String,
        amount: BigDecimal,
        method: PaymentMethod,
        incurred_on: NaiveDate,
    ) -> FinanceResult<Expense> {
        validate_positive_amount(&amount)?;
        validate_description(&description)?;

        let now = chrono::Utc::now().naive_utc();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category,
            description,
            vendor,
            amount,
            method,
            status: ExpenseStatus::Pending,
            reference: references::expense_reference(incurred_on.year()),
            incurred_on,
            recorded_at: now,
            updated_at: now,
            version: 0,
        };
        self.storage.save_expense(&expense).await?;
        Ok(expense)
    }

    /// Approve a pending expense and shadow-post it
    pub async fn approve_expense(&mut self, id: &str) -> FinanceResult<Expense> {
        let mut expense = self.get_required(id).await?;
        if expense.status != ExpenseStatus::Pending {
            return Err(FinanceError::Validation(format!(
                "Only pending expenses can be approved; '{}' is {:?}",
                expense.reference, expense.status
            )));
        }

        expense.status = ExpenseStatus::Approved;
        expense.updated_at = chrono::Utc::now().naive_utc();
        let approved = self.storage.update_expense(&expense).await?;

        let event = PostingEvent::Expense(ExpensePosting {
            amount: approved.amount.clone(),
            category: approved.category.clone(),
            method: approved.method,
            vendor: approved.vendor.clone(),
            reference: approved.reference.clone(),
            entry_date: approved.incurred_on,
        });
        super::shadow_post(&mut self.storage, &mut self.engine, event).await;

        Ok(approved)
    }

    /// Reject a pending expense; nothing is posted
    pub async fn reject_expense(&mut self, id: &str) -> FinanceResult<Expense> {
        let mut expense = self.get_required(id).await?;
        if expense.status != ExpenseStatus::Pending {
            return Err(FinanceError::Validation(format!(
                "Only pending expenses can be rejected; '{}' is {:?}",
                expense.reference, expense.status
            )));
        }
        expense.status = ExpenseStatus::Rejected;
        expense.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_expense(&expense).await
    }

    pub async fn get_required(&self, id: &str) -> FinanceResult<Expense> {
        self.storage
            .get_expense(id)
            .await?
            .ok_or_else(|| FinanceError::RecordNotFound(format!("expense {}", id)))
    }

    pub async fn list_expenses(&self) -> FinanceResult<Vec<Expense>> {
        self.storage.list_expenses().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{codes, ChartManager};
    use crate::journal::JournalManager;
    use crate::mapping::MappingResolver;
    use crate::utils::memory_store::MemoryStore;

    async fn seeded_storage() -> MemoryStore {
        let storage = MemoryStore::new();
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();
        let mut resolver = MappingResolver::new(storage.clone());
        resolver.seed_defaults().await.unwrap();
        storage
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[tokio::test]
    async fn approval_posts_the_expense() {
        let storage = seeded_storage().await;
        let mut service = ExpenseService::new(storage.clone());

        let expense = service
            .record_expense(
                "maintenance".to_string(),
                "Generator servicing".to_string(),
                "Musa & Sons".to_string(),
                BigDecimal::from(45_000),
                PaymentMethod::Cash,
                date(10),
            )
            .await
            .unwrap();
        assert_eq!(expense.status, ExpenseStatus::Pending);

        // nothing posted while pending
        let journal = JournalManager::new(storage.clone());
        assert!(journal
            .find_by_reference(ReferenceType::Expense, &expense.reference)
            .await
            .unwrap()
            .is_empty());

        let approved = service.approve_expense(&expense.id).await.unwrap();
        assert_eq!(approved.status, ExpenseStatus::Approved);

        let entries = journal
            .find_by_reference(ReferenceType::Expense, &expense.reference)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines[0].account_code, codes::REPAIRS_MAINTENANCE);
        assert_eq!(entries[0].lines[1].account_code, codes::CASH);
    }

    #[tokio::test]
    async fn approval_is_single_shot() {
        let storage = seeded_storage().await;
        let mut service = ExpenseService::new(storage);

        let expense = service
            .record_expense(
                "utilities".to_string(),
                "Water rates".to_string(),
                "Water Board".to_string(),
                BigDecimal::from(12_000),
                PaymentMethod::BankTransfer,
                date(12),
            )
            .await
            .unwrap();

        service.approve_expense(&expense.id).await.unwrap();
        assert!(service.approve_expense(&expense.id).await.is_err());
    }

    #[tokio::test]
    async fn rejected_expenses_never_post() {
        let storage = seeded_storage().await;
        let mut service = ExpenseService::new(storage.clone());

        let expense = service
            .record_expense(
                "utilities".to_string(),
                "Disputed invoice".to_string(),
                "Unknown Vendor".to_string(),
                BigDecimal::from(99_000),
                PaymentMethod::Cheque,
                date(15),
            )
            .await
            .unwrap();

        let rejected = service.reject_expense(&expense.id).await.unwrap();
        assert_eq!(rejected.status, ExpenseStatus::Rejected);

        let journal = JournalManager::new(storage);
        assert!(journal
            .find_by_reference(ReferenceType::Expense, &expense.reference)
            .await
            .unwrap()
            .is_empty());
    }
}
