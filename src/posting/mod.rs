//! Auto-posting: translating business events into balanced journal entries
//!
//! Every domain service performs its own write first, then hands the
//! economic facts of the transaction to one of the engines here. The
//! engine resolves accounts through the mapping table, constructs balanced
//! debit/credit lines, validates the balance invariant, and persists the
//! entry (posted immediately unless draft mode is requested).

pub mod bank;
pub mod engine;

pub use bank::*;
pub use engine::*;

use serde::{Deserialize, Serialize};

use crate::types::ReferenceType;

/// A serializable business event awaiting (or retrying) auto-posting.
///
/// Stored verbatim on unposted-transaction markers so a failed shadow
/// posting can be replayed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostingEvent {
    StudentPayment(StudentPayment),
    FeeAssignment(FeeAssignment),
    Expense(ExpensePosting),
    Salary(SalaryPosting),
    AssetPurchase(AssetPurchasePosting),
    Depreciation(DepreciationPosting),
    BankTransaction(BankTransactionPosting),
    BankTransfer(BankTransferPosting),
}

impl PostingEvent {
    /// The source reference carried by the event
    pub fn reference_id(&self) -> &str {
        match self {
            PostingEvent::StudentPayment(e) => &e.reference,
            PostingEvent::FeeAssignment(e) => &e.reference,
            PostingEvent::Expense(e) => &e.reference,
            PostingEvent::Salary(e) => &e.reference,
            PostingEvent::AssetPurchase(e) => &e.reference,
            PostingEvent::Depreciation(e) => &e.reference,
            PostingEvent::BankTransaction(e) => &e.reference,
            PostingEvent::BankTransfer(e) => &e.reference,
        }
    }

    /// The journal reference family the event posts under
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            PostingEvent::StudentPayment(_) => ReferenceType::Payment,
            PostingEvent::FeeAssignment(_) => ReferenceType::FeeAssignment,
            PostingEvent::Expense(_) => ReferenceType::Expense,
            PostingEvent::Salary(_) => ReferenceType::Salary,
            PostingEvent::AssetPurchase(_) => ReferenceType::AssetPurchase,
            PostingEvent::Depreciation(_) => ReferenceType::Depreciation,
            PostingEvent::BankTransaction(_) => ReferenceType::BankTransaction,
            PostingEvent::BankTransfer(_) => ReferenceType::Transfer,
        }
    }
}
