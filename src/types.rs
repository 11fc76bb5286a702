//! Core types and data structures for the school-finance ledger

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Assets - what the school owns (Cash, Bank, Receivables, Equipment, etc.)
    Asset,
    /// Liabilities - what the school owes (Payables, PAYE withheld, Loans, etc.)
    Liability,
    /// Equity - the school's fund balance (General Fund, Retained Earnings)
    Equity,
    /// Revenue - money earned by the school (fees, interest)
    Revenue,
    /// Expenses - costs incurred by the school
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    /// Assets and Expenses normally carry debit balances;
    /// Liabilities, Equity, and Revenue normally carry credit balances.
    pub fn normal_balance(&self) -> BalanceSide {
        match self {
            AccountType::Asset | AccountType::Expense => BalanceSide::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                BalanceSide::Credit
            }
        }
    }
}

/// The two sides of a double-entry line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSide {
    Debit,
    Credit,
}

/// Balance-sheet classification carried explicitly on each account.
///
/// Account codes still follow the numbering convention ("11xx" current
/// assets, "12xx" fixed assets, "21xx" current liabilities, "22xx"
/// long-term liabilities, "3xxx" equity, "4xxx" revenue, "5xxx" expenses),
/// but reports partition on this tag instead of parsing code prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    CurrentAsset,
    FixedAsset,
    CurrentLiability,
    LongTermLiability,
    Equity,
    Revenue,
    Expense,
}

impl AccountCategory {
    /// The account type this category belongs to
    pub fn account_type(&self) -> AccountType {
        match self {
            AccountCategory::CurrentAsset | AccountCategory::FixedAsset => AccountType::Asset,
            AccountCategory::CurrentLiability | AccountCategory::LongTermLiability => {
                AccountType::Liability
            }
            AccountCategory::Equity => AccountType::Equity,
            AccountCategory::Revenue => AccountType::Revenue,
            AccountCategory::Expense => AccountType::Expense,
        }
    }

    /// Derive the category from an account code under the numbering
    /// convention. Returns `None` for codes outside the convention.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.starts_with("11") {
            Some(AccountCategory::CurrentAsset)
        } else if code.starts_with("12") {
            Some(AccountCategory::FixedAsset)
        } else if code.starts_with("21") {
            Some(AccountCategory::CurrentLiability)
        } else if code.starts_with("22") {
            Some(AccountCategory::LongTermLiability)
        } else if code.starts_with('3') {
            Some(AccountCategory::Equity)
        } else if code.starts_with('4') {
            Some(AccountCategory::Revenue)
        } else if code.starts_with('5') {
            Some(AccountCategory::Expense)
        } else {
            None
        }
    }
}

/// A ledger account in the chart of accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account code, unique within the chart (e.g. "1110")
    pub code: String,
    /// Human-readable account name
    pub name: String,
    /// Type of account. Immutable after creation - changing it would
    /// corrupt historical reports.
    pub account_type: AccountType,
    /// Balance-sheet classification
    pub category: AccountCategory,
    /// Optional parent account code for hierarchical charts
    pub parent_code: Option<String>,
    /// Inactive accounts are kept for referential integrity, never deleted
    pub is_active: bool,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the account was last updated
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new active account
    pub fn new(
        code: String,
        name: String,
        account_type: AccountType,
        category: AccountCategory,
        parent_code: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            code,
            name,
            account_type,
            category,
            parent_code,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this account is a cash or bank account.
    ///
    /// Cash accounts carry the "111" code prefix and bank accounts "112";
    /// the cash-flow statement keys off this.
    pub fn is_cash_or_bank(&self) -> bool {
        self.code.starts_with("111") || self.code.starts_with("112")
    }
}

/// A single debit or credit line within a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Code of the account being hit
    pub account_code: String,
    /// Account name snapshot at posting time
    pub account_name: String,
    /// Debit amount (zero for credit lines)
    pub debit: BigDecimal,
    /// Credit amount (zero for debit lines)
    pub credit: BigDecimal,
    /// Optional line-level narration
    pub description: Option<String>,
}

impl JournalLine {
    /// Create a debit line
    pub fn debit(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            account_name: account_name.into(),
            debit: amount,
            credit: BigDecimal::from(0),
            description,
        }
    }

    /// Create a credit line
    pub fn credit(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            account_name: account_name.into(),
            debit: BigDecimal::from(0),
            credit: amount,
            description,
        }
    }
}

/// Lifecycle status of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Created but not yet contributing to reports; still mutable
    Draft,
    /// Finalized. Terminal - corrections happen via reversing entries.
    Posted,
}

/// The business event family a journal entry was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Payment,
    FeeAssignment,
    Expense,
    Salary,
    AssetPurchase,
    Depreciation,
    BankTransaction,
    Transfer,
    Manual,
}

/// A balanced set of debit/credit lines recording one economic event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Generated document id
    pub id: String,
    /// Human-readable entry number (e.g. "JE-2026-4F2A1C")
    pub entry_number: String,
    /// Business date of the underlying event
    pub entry_date: NaiveDate,
    /// Description of the entry
    pub description: String,
    /// Debit/credit lines; debits must equal credits
    pub lines: Vec<JournalLine>,
    /// Source event family
    pub reference_type: ReferenceType,
    /// Source transaction reference (e.g. "PAY-2026-8A41C2D0")
    pub reference_id: String,
    /// Draft or posted
    pub status: EntryStatus,
    /// Who created the entry
    pub created_by: String,
    /// When the entry was posted, if it has been
    pub posted_at: Option<NaiveDateTime>,
    /// When the entry was created
    pub created_at: NaiveDateTime,
    /// When the entry was last updated
    pub updated_at: NaiveDateTime,
    /// Optimistic-concurrency token, bumped by the store on update
    pub version: u64,
}

impl JournalEntry {
    /// Total of all debit lines
    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    /// Total of all credit lines
    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// Check the balance invariant within the monetary tolerance
    pub fn is_balanced(&self) -> bool {
        let diff = self.total_debits() - self.total_credits();
        diff.abs() < balance_tolerance()
    }

    /// Validate the entry before it is persisted or posted
    pub fn validate(&self) -> FinanceResult<()> {
        if self.lines.len() < 2 {
            return Err(FinanceError::Validation(
                "Journal entry must have at least two lines for double-entry bookkeeping"
                    .to_string(),
            ));
        }

        let zero = BigDecimal::from(0);
        for line in &self.lines {
            if line.debit < zero || line.credit < zero {
                return Err(FinanceError::Validation(format!(
                    "Line amounts must not be negative on account '{}'",
                    line.account_code
                )));
            }
            let debit_set = line.debit > zero;
            let credit_set = line.credit > zero;
            if debit_set == credit_set {
                return Err(FinanceError::Validation(format!(
                    "Exactly one of debit/credit must be non-zero on account '{}'",
                    line.account_code
                )));
            }
        }

        if !self.is_balanced() {
            return Err(FinanceError::UnbalancedEntry {
                debits: self.total_debits(),
                credits: self.total_credits(),
            });
        }

        Ok(())
    }
}

/// One account's accumulated posted activity in a trial balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    /// Sum of posted debit lines against this account
    pub total_debit: BigDecimal,
    /// Sum of posted credit lines against this account
    pub total_credit: BigDecimal,
}

impl TrialBalanceRow {
    /// Net balance on the account's normal side (debits minus credits,
    /// negated for credit-normal accounts)
    pub fn net_balance(&self) -> BigDecimal {
        match self.account_type.normal_balance() {
            BalanceSide::Debit => &self.total_debit - &self.total_credit,
            BalanceSide::Credit => &self.total_credit - &self.total_debit,
        }
    }
}

/// Aggregated debit/credit totals per account across all posted entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Cut-off date; `None` means all posted entries
    pub as_of_date: Option<NaiveDate>,
    /// Per-account rows, sorted by account code
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
    pub is_balanced: bool,
}

/// Monetary comparison tolerance (one kobo)
pub fn balance_tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

/// Errors that can occur across the finance core
#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unbalanced entry: debits = {debits}, credits = {credits}")]
    UnbalancedEntry {
        debits: BigDecimal,
        credits: BigDecimal,
    },
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),
    #[error("Journal entry already posted: {0}")]
    AlreadyPosted(String),
    #[error("Duplicate mapping: {0}")]
    DuplicateMapping(String),
    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),
    #[error("Version conflict on document: {0}")]
    VersionConflict(String),
    #[error("Policy violation: {0}")]
    PolicyViolation(String),
    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

/// Result type for finance operations
pub type FinanceResult<T> = Result<T, FinanceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry_with_lines(lines: Vec<JournalLine>) -> JournalEntry {
        let now = chrono::Utc::now().naive_utc();
        JournalEntry {
            id: "je1".to_string(),
            entry_number: "JE-2026-TEST01".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "test".to_string(),
            lines,
            reference_type: ReferenceType::Manual,
            reference_id: "MAN-1".to_string(),
            status: EntryStatus::Draft,
            created_by: "system".to_string(),
            posted_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[test]
    fn line_constructors_set_exactly_one_side() {
        let d = JournalLine::debit("1110", "Cash on Hand", BigDecimal::from(500), None);
        assert_eq!(d.debit, BigDecimal::from(500));
        assert_eq!(d.credit, BigDecimal::from(0));

        let c = JournalLine::credit("4110", "Tuition Fees", BigDecimal::from(500), None);
        assert_eq!(c.debit, BigDecimal::from(0));
        assert_eq!(c.credit, BigDecimal::from(500));
    }

    #[test]
    fn balanced_entry_validates() {
        let entry = entry_with_lines(vec![
            JournalLine::debit("1110", "Cash on Hand", BigDecimal::from(1000), None),
            JournalLine::credit("4110", "Tuition Fees", BigDecimal::from(1000), None),
        ]);
        assert!(entry.is_balanced());
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn unbalanced_entry_rejected() {
        let entry = entry_with_lines(vec![
            JournalLine::debit("1110", "Cash on Hand", BigDecimal::from(1000), None),
            JournalLine::credit("4110", "Tuition Fees", BigDecimal::from(900), None),
        ]);
        assert!(matches!(
            entry.validate(),
            Err(FinanceError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn single_line_entry_rejected() {
        let entry = entry_with_lines(vec![JournalLine::debit(
            "1110",
            "Cash on Hand",
            BigDecimal::from(1000),
            None,
        )]);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn category_from_code_follows_convention() {
        assert_eq!(
            AccountCategory::from_code("1110"),
            Some(AccountCategory::CurrentAsset)
        );
        assert_eq!(
            AccountCategory::from_code("1210"),
            Some(AccountCategory::FixedAsset)
        );
        assert_eq!(
            AccountCategory::from_code("2130"),
            Some(AccountCategory::CurrentLiability)
        );
        assert_eq!(
            AccountCategory::from_code("2210"),
            Some(AccountCategory::LongTermLiability)
        );
        assert_eq!(
            AccountCategory::from_code("3100"),
            Some(AccountCategory::Equity)
        );
        assert_eq!(
            AccountCategory::from_code("4110"),
            Some(AccountCategory::Revenue)
        );
        assert_eq!(
            AccountCategory::from_code("5400"),
            Some(AccountCategory::Expense)
        );
        assert_eq!(AccountCategory::from_code("9999"), None);
    }

    #[test]
    fn entries_serialize_as_documents() {
        let entry = entry_with_lines(vec![
            JournalLine::debit("1120", "School Bank Account", BigDecimal::from(250), None),
            JournalLine::credit("1130", "Accounts Receivable", BigDecimal::from(250), None),
        ]);
        let json = serde_json::to_string(&entry).unwrap();
        let back: JournalEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
