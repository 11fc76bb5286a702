//! # Bursary Core
//!
//! The accounting core of a school financial-management system:
//! double-entry bookkeeping with automatic posting of business events,
//! Nigerian statutory payroll calculations, and financial reporting.
//!
//! ## Features
//!
//! - **Chart of accounts**: typed, categorised accounts under a fixed
//!   numbering convention, seeded with school defaults
//! - **Account mappings**: configurable associations from fee types,
//!   expense categories, and asset categories to ledger accounts, with
//!   fallback resolution that never blocks a business operation
//! - **Auto-posting engine**: payments, fee assignments, expenses,
//!   salaries, asset purchases, depreciation, and bank activity become
//!   balanced journal entries, idempotently per reference
//! - **Statutory calculators**: PAYE brackets, NHF, pension, and NHIS as
//!   pure functions
//! - **Journal ledger**: draft/posted lifecycle, reversing entries, and
//!   trial balance
//! - **Reports**: income statement, balance sheet, cash flow, asset
//!   register, and depreciation schedules derived purely from posted
//!   entries
//! - **Reconciliation**: failed shadow postings are recorded and
//!   replayable
//! - **Storage abstraction**: database-agnostic trait-based storage with
//!   optimistic-concurrency versioning
//!
//! ## Quick start
//!
//! ```rust
//! use bursary_core::{ChartManager, MemoryStore};
//!
//! # async fn demo() -> bursary_core::FinanceResult<()> {
//! let storage = MemoryStore::new();
//! let mut chart = ChartManager::new(storage);
//! chart.initialize_defaults().await?;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod journal;
pub mod mapping;
pub mod posting;
pub mod reconciliation;
pub mod reports;
pub mod services;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use chart::{codes, ChartManager};
pub use journal::{EntryBuilder, JournalManager};
pub use mapping::{AccountMapping, MappingResolver, MappingType};
pub use posting::*;
pub use reconciliation::{ReconciliationEngine, ReconciliationReport, UnpostedTransaction};
pub use reports::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_store::MemoryStore;
