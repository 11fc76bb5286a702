//! Statutory tax and payroll deduction calculators
//!
//! Pure, deterministic arithmetic: no I/O, no storage. PAYE follows the
//! Nigerian progressive bracket table; the statutory calculator composes
//! NHF, pension, NHIS, and PAYE into one monthly result.

pub mod paye;
pub mod statutory;

pub use paye::*;
pub use statutory::*;
