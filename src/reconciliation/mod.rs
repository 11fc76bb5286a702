//! Reconciliation of failed shadow postings
//!
//! Domain services never fail their primary operation because an
//! accounting entry could not post; they record an unposted-transaction
//! marker instead. This module is the other half of that bargain: the
//! report of stuck markers, and an idempotent retry that replays each
//! stored event through the posting engines and clears what succeeds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::posting::{AutoPostingEngine, BankPostingEngine, PostingEvent};
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::FinanceResult;

/// A business event whose shadow posting failed, kept until a retry
/// succeeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpostedTransaction {
    pub id: String,
    /// The original posting event, replayable verbatim
    pub event: PostingEvent,
    /// The most recent posting error
    pub error: String,
    pub occurred_at: NaiveDateTime,
    /// Retry attempts made so far
    pub attempts: u32,
}

impl UnpostedTransaction {
    pub fn new(event: PostingEvent, error: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event,
            error,
            occurred_at: chrono::Utc::now().naive_utc(),
            attempts: 0,
        }
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub pending_before: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Replays unposted transactions through the posting engines
pub struct ReconciliationEngine<S: FinanceStore + Clone> {
    storage: S,
    engine: AutoPostingEngine<S>,
    bank_engine: BankPostingEngine<S>,
}

impl<S: FinanceStore + Clone> ReconciliationEngine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            engine: AutoPostingEngine::new(storage.clone()),
            bank_engine: BankPostingEngine::new(storage.clone()),
            storage,
        }
    }

    /// The reconciliation report: every business transaction whose
    /// accounting shadow is still missing
    pub async fn pending(&self) -> FinanceResult<Vec<UnpostedTransaction>> {
        self.storage.list_unposted().await
    }

    /// Replay every pending event. Posting is idempotent per reference, so
    /// retrying an event that actually posted last time is harmless.
    pub async fn retry_pending(&mut self) -> FinanceResult<ReconciliationReport> {
        let markers = self.storage.list_unposted().await?;
        let pending_before = markers.len();
        let mut succeeded = 0;
        let mut failed = 0;

        for mut marker in markers {
            let result = match &marker.event {
                PostingEvent::BankTransaction(txn) => {
                    self.bank_engine.post_bank_transaction(txn).await.map(|_| ())
                }
                PostingEvent::BankTransfer(transfer) => {
                    self.bank_engine.post_bank_transfer(transfer).await.map(|_| ())
                }
                event => self.engine.post_event(event).await.map(|_| ()),
            };

            match result {
                Ok(()) => {
                    self.storage.delete_unposted(&marker.id).await?;
                    info!(
                        reference = marker.event.reference_id(),
                        "unposted transaction reconciled"
                    );
                    succeeded += 1;
                }
                Err(err) => {
                    warn!(
                        reference = marker.event.reference_id(),
                        error = %err,
                        attempts = marker.attempts + 1,
                        "unposted transaction still failing"
                    );
                    marker.attempts += 1;
                    marker.error = err.to_string();
                    self.storage.update_unposted(&marker).await?;
                    failed += 1;
                }
            }
        }

        Ok(ReconciliationReport {
            pending_before,
            succeeded,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartManager;
    use crate::posting::PaymentMethod;
    use crate::services::payments::PaymentService;
    use crate::traits::RegistryStore;
    use crate::types::ReferenceType;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn retry_clears_markers_once_the_cause_is_fixed() {
        // chart not initialized yet: the shadow posting fails
        let storage = crate::utils::memory_store::MemoryStore::new();
        let mut payments = PaymentService::new(storage.clone());
        let payment = payments
            .record_payment(
                "Stuck Payment".to_string(),
                BigDecimal::from(15_000),
                PaymentMethod::Cash,
                NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            )
            .await
            .unwrap();

        let mut reconciliation = ReconciliationEngine::new(storage.clone());
        assert_eq!(reconciliation.pending().await.unwrap().len(), 1);

        // first pass: still failing, attempts climb
        let report = reconciliation.retry_pending().await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 0);
        assert_eq!(reconciliation.pending().await.unwrap()[0].attempts, 1);

        // fix the cause, retry again
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();

        let report = reconciliation.retry_pending().await.unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 0);
        assert!(reconciliation.pending().await.unwrap().is_empty());

        let entries = crate::journal::JournalManager::new(storage)
            .find_by_reference(ReferenceType::Payment, &payment.reference)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn retry_is_harmless_when_the_entry_already_posted() {
        let storage = crate::utils::memory_store::MemoryStore::new();
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();

        let mut payments = PaymentService::new(storage.clone());
        let payment = payments
            .record_payment(
                "Posted Fine".to_string(),
                BigDecimal::from(20_000),
                PaymentMethod::Cash,
                NaiveDate::from_ymd_opt(2026, 2, 11).unwrap(),
            )
            .await
            .unwrap();

        // simulate a marker left behind even though posting succeeded
        let mut storage_mut = storage.clone();
        let marker = UnpostedTransaction::new(
            crate::posting::PostingEvent::StudentPayment(crate::posting::StudentPayment {
                amount: BigDecimal::from(20_000),
                method: PaymentMethod::Cash,
                payer: "Posted Fine".to_string(),
                reference: payment.reference.clone(),
                entry_date: NaiveDate::from_ymd_opt(2026, 2, 11).unwrap(),
            }),
            "spurious".to_string(),
        );
        storage_mut.save_unposted(&marker).await.unwrap();

        let mut reconciliation = ReconciliationEngine::new(storage.clone());
        let report = reconciliation.retry_pending().await.unwrap();
        assert_eq!(report.succeeded, 1);

        // idempotency: still exactly one entry for the reference
        let entries = crate::journal::JournalManager::new(storage)
            .find_by_reference(ReferenceType::Payment, &payment.reference)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }
}
