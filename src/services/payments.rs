//! Student fee payments and fee assignments

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posting::{
    AutoPostingEngine, FeeAllocation, FeeAssignment, PaymentMethod, PostingEvent, StudentPayment,
};
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::*;
use crate::utils::references;
use crate::utils::validation::validate_positive_amount;

/// Default cap on a single cash payment
fn default_cash_cap() -> BigDecimal {
    BigDecimal::from(500_000)
}

/// A confirmed student fee payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub student: String,
    pub amount: BigDecimal,
    pub method: PaymentMethod,
    /// Audit reference, `PAY-{year}-{8 alphanumeric}`
    pub reference: String,
    pub payment_date: NaiveDate,
    pub recorded_at: NaiveDateTime,
}

/// Service owning the payment lifecycle
pub struct PaymentService<S: FinanceStore + Clone> {
    storage: S,
    engine: AutoPostingEngine<S>,
    cash_cap: BigDecimal,
}

impl<S: FinanceStore + Clone> PaymentService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            engine: AutoPostingEngine::new(storage.clone()),
            storage,
            cash_cap: default_cash_cap(),
        }
    }

    /// Override the cash-payment cap policy
    pub fn with_cash_cap(mut self, cash_cap: BigDecimal) -> Self {
        self.cash_cap = cash_cap;
        self
    }

    /// Record a confirmed payment and shadow-post it.
    ///
    /// Cash payments above the cap are rejected outright; the cap does not
    /// apply to bank-settled methods.
    pub async fn record_payment(
        &mut self,
        student: String,
        amount: BigDecimal,
        method: PaymentMethod,
        payment_date: NaiveDate,
    ) -> FinanceResult<Payment> {
        validate_positive_amount(&amount)?;
        if method == PaymentMethod::Cash && amount > self.cash_cap {
            return Err(FinanceError::PolicyViolation(format!(
                "Cash payment of {} exceeds the cap of {}",
                amount, self.cash_cap
            )));
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            student: student.clone(),
            amount: amount.clone(),
            method,
            reference: references::payment_reference(payment_date.year()),
            payment_date,
            recorded_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.save_payment(&payment).await?;

        let event = PostingEvent::StudentPayment(StudentPayment {
            amount,
            method,
            payer: student,
            reference: payment.reference.clone(),
            entry_date: payment_date,
        });
        super::shadow_post(&mut self.storage, &mut self.engine, event).await;

        Ok(payment)
    }

    /// Bill a student for a term's fees, split by fee type, and
    /// shadow-post the receivable. Returns the assignment reference.
    pub async fn assign_fees(
        &mut self,
        student: String,
        allocations: Vec<FeeAllocation>,
        entry_date: NaiveDate,
    ) -> FinanceResult<String> {
        if allocations.is_empty() {
            return Err(FinanceError::Validation(
                "Fee assignment must have at least one allocation".to_string(),
            ));
        }
        for allocation in &allocations {
            validate_positive_amount(&allocation.amount)?;
        }

        let reference = references::fee_reference(entry_date.year());
        let event = PostingEvent::FeeAssignment(FeeAssignment {
            student,
            allocations,
            reference: reference.clone(),
            entry_date,
        });
        super::shadow_post(&mut self.storage, &mut self.engine, event).await;

        Ok(reference)
    }

    pub async fn list_payments(&self) -> FinanceResult<Vec<Payment>> {
        self.storage.list_payments().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{codes, ChartManager};
    use crate::mapping::MappingResolver;
    use crate::traits::RegistryStore;
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
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[tokio::test]
    async fn payment_is_recorded_and_posted() {
        let storage = seeded_storage().await;
        let mut service = PaymentService::new(storage.clone());

        let payment = service
            .record_payment(
                "Adaeze Obi".to_string(),
                BigDecimal::from(80_000),
                PaymentMethod::BankTransfer,
                date(4),
            )
            .await
            .unwrap();

        assert!(payment.reference.starts_with("PAY-2026-"));
        assert_eq!(service.list_payments().await.unwrap().len(), 1);

        let entries = crate::journal::JournalManager::new(storage.clone())
            .find_by_reference(ReferenceType::Payment, &payment.reference)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines[0].account_code, codes::BANK);
        assert!(storage.list_unposted().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cash_cap_policy_rejects_large_cash_payments() {
        let storage = seeded_storage().await;
        let mut service = PaymentService::new(storage);

        let result = service
            .record_payment(
                "Big Spender".to_string(),
                BigDecimal::from(600_000),
                PaymentMethod::Cash,
                date(5),
            )
            .await;
        assert!(matches!(result, Err(FinanceError::PolicyViolation(_))));
    }

    #[tokio::test]
    async fn cap_does_not_apply_to_bank_settled_methods() {
        let storage = seeded_storage().await;
        let mut service = PaymentService::new(storage);

        let result = service
            .record_payment(
                "Big Transfer".to_string(),
                BigDecimal::from(600_000),
                PaymentMethod::BankTransfer,
                date(5),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn posting_failure_keeps_payment_and_records_marker() {
        // no chart initialized: posting must fail, payment must survive
        let storage = MemoryStore::new();
        let mut service = PaymentService::new(storage.clone());

        let payment = service
            .record_payment(
                "Orphan Payment".to_string(),
                BigDecimal::from(10_000),
                PaymentMethod::Cash,
                date(6),
            )
            .await
            .unwrap();

        assert_eq!(service.list_payments().await.unwrap().len(), 1);
        let markers = storage.list_unposted().await.unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].event.reference_id(), payment.reference);
    }
}
