//! Domain services owning the business-entity lifecycles
//!
//! Each service performs its primary write first, then shadow-posts the
//! accounting entry fire-and-forget: a posting failure is logged and
//! recorded as an unposted-transaction marker for later reconciliation,
//! but never fails or rolls back the business operation.

pub mod assets;
pub mod banking;
pub mod expenses;
pub mod payments;
pub mod payroll;

use tracing::error;

use crate::posting::{AutoPostingEngine, BankPostingEngine, PostingEvent};
use crate::reconciliation::UnpostedTransaction;
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::FinanceError;

/// Shadow-post a business event through the main engine, swallowing (but
/// recording) any failure
pub(crate) async fn shadow_post<S: FinanceStore + Clone>(
    storage: &mut S,
    engine: &mut AutoPostingEngine<S>,
    event: PostingEvent,
) {
    if let Err(err) = engine.post_event(&event).await {
        record_failure(storage, event, err).await;
    }
}

/// Shadow-post a bank event through the bank engine, swallowing (but
/// recording) any failure
pub(crate) async fn shadow_post_bank<S: FinanceStore + Clone>(
    storage: &mut S,
    engine: &mut BankPostingEngine<S>,
    event: PostingEvent,
) {
    let result = match &event {
        PostingEvent::BankTransaction(txn) => {
            engine.post_bank_transaction(txn).await.map(|_| ())
        }
        PostingEvent::BankTransfer(transfer) => {
            engine.post_bank_transfer(transfer).await.map(|_| ())
        }
        _ => Err(FinanceError::Validation(
            "Non-bank events post through the main engine".to_string(),
        )),
    };
    if let Err(err) = result {
        record_failure(storage, event, err).await;
    }
}

async fn record_failure<S: RegistryStore>(
    storage: &mut S,
    event: PostingEvent,
    err: FinanceError,
) {
    error!(
        reference = event.reference_id(),
        error = %err,
        "auto-posting failed; business record kept, marker saved"
    );
    let marker = UnpostedTransaction::new(event, err.to_string());
    if let Err(save_err) = storage.save_unposted(&marker).await {
        error!(error = %save_err, "could not save unposted-transaction marker");
    }
}
