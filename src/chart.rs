//! Chart of accounts management
//!
//! Accounts are read-heavy and seeded once with the school defaults. They
//! are deactivated rather than deleted so historical journal lines always
//! resolve.

use crate::traits::ChartStore;
use crate::types::*;
use crate::utils::cache::TtlCache;
use crate::utils::validation::{validate_account_code, validate_account_name};

/// Well-known account codes in the default school chart
pub mod codes {
    pub const CASH: &str = "1110";
    pub const BANK: &str = "1120";
    pub const ACCOUNTS_RECEIVABLE: &str = "1130";
    pub const FIXED_ASSETS: &str = "1210";
    pub const FURNITURE_EQUIPMENT: &str = "1220";
    pub const MOTOR_VEHICLES: &str = "1230";
    pub const ACCUMULATED_DEPRECIATION: &str = "1290";
    pub const ACCOUNTS_PAYABLE: &str = "2110";
    pub const SALARIES_PAYABLE: &str = "2120";
    pub const PAYE_PAYABLE: &str = "2130";
    pub const PENSION_PAYABLE: &str = "2140";
    pub const NHF_PAYABLE: &str = "2150";
    pub const NHIS_PAYABLE: &str = "2160";
    pub const SUSPENSE: &str = "2190";
    pub const LONG_TERM_LOANS: &str = "2210";
    pub const GENERAL_FUND: &str = "3100";
    pub const RETAINED_EARNINGS: &str = "3200";
    pub const TUITION_FEES: &str = "4110";
    pub const REGISTRATION_FEES: &str = "4120";
    pub const EXAMINATION_FEES: &str = "4130";
    pub const INTEREST_INCOME: &str = "4300";
    pub const OTHER_INCOME: &str = "4900";
    pub const SALARY_EXPENSE: &str = "5100";
    pub const PENSION_EXPENSE: &str = "5110";
    pub const UTILITIES_EXPENSE: &str = "5200";
    pub const REPAIRS_MAINTENANCE: &str = "5300";
    pub const DEPRECIATION_EXPENSE: &str = "5400";
    pub const BANK_CHARGES: &str = "5500";
    pub const OTHER_EXPENSE: &str = "5900";
}

/// The default chart seeded for a school: (code, name, type)
fn default_chart() -> Vec<(&'static str, &'static str, AccountType)> {
    use AccountType::*;
    vec![
        (codes::CASH, "Cash on Hand", Asset),
        (codes::BANK, "School Bank Account", Asset),
        (codes::ACCOUNTS_RECEIVABLE, "Accounts Receivable", Asset),
        (codes::FIXED_ASSETS, "Fixed Assets", Asset),
        (codes::FURNITURE_EQUIPMENT, "Furniture & Equipment", Asset),
        (codes::MOTOR_VEHICLES, "Motor Vehicles", Asset),
        (
            codes::ACCUMULATED_DEPRECIATION,
            "Accumulated Depreciation",
            Asset,
        ),
        (codes::ACCOUNTS_PAYABLE, "Accounts Payable", Liability),
        (codes::SALARIES_PAYABLE, "Salaries Payable", Liability),
        (codes::PAYE_PAYABLE, "PAYE Payable", Liability),
        (codes::PENSION_PAYABLE, "Pension Payable", Liability),
        (codes::NHF_PAYABLE, "NHF Payable", Liability),
        (codes::NHIS_PAYABLE, "NHIS Payable", Liability),
        (codes::SUSPENSE, "Suspense & Clearing", Liability),
        (codes::LONG_TERM_LOANS, "Long-Term Loans", Liability),
        (codes::GENERAL_FUND, "General Fund", Equity),
        (codes::RETAINED_EARNINGS, "Retained Earnings", Equity),
        (codes::TUITION_FEES, "Tuition Fees", Revenue),
        (codes::REGISTRATION_FEES, "Registration Fees", Revenue),
        (codes::EXAMINATION_FEES, "Examination Fees", Revenue),
        (codes::INTEREST_INCOME, "Interest Income", Revenue),
        (codes::OTHER_INCOME, "Other Income", Revenue),
        (codes::SALARY_EXPENSE, "Salary Expense", Expense),
        (codes::PENSION_EXPENSE, "Pension Expense", Expense),
        (codes::UTILITIES_EXPENSE, "Utilities Expense", Expense),
        (codes::REPAIRS_MAINTENANCE, "Repairs & Maintenance", Expense),
        (codes::DEPRECIATION_EXPENSE, "Depreciation Expense", Expense),
        (codes::BANK_CHARGES, "Bank Charges", Expense),
        (codes::OTHER_EXPENSE, "Other Expense", Expense),
    ]
}

/// Manager for chart-of-accounts operations
pub struct ChartManager<S: ChartStore> {
    storage: S,
    list_cache: TtlCache<Option<AccountType>, Vec<Account>>,
}

impl<S: ChartStore> ChartManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            list_cache: TtlCache::default(),
        }
    }

    /// Get an account by code
    pub async fn get_by_code(&self, code: &str) -> FinanceResult<Option<Account>> {
        self.storage.get_account(code).await
    }

    /// Get an account by code, erroring when missing
    pub async fn get_required(&self, code: &str) -> FinanceResult<Account> {
        self.storage
            .get_account(code)
            .await?
            .ok_or_else(|| FinanceError::AccountNotFound(code.to_string()))
    }

    /// List all accounts (cached)
    pub async fn list_accounts(&self) -> FinanceResult<Vec<Account>> {
        self.list_cached(None).await
    }

    /// List all active accounts
    pub async fn active_accounts(&self) -> FinanceResult<Vec<Account>> {
        let accounts = self.list_cached(None).await?;
        Ok(accounts.into_iter().filter(|a| a.is_active).collect())
    }

    /// List accounts of one type (cached)
    pub async fn accounts_by_type(&self, account_type: AccountType) -> FinanceResult<Vec<Account>> {
        self.list_cached(Some(account_type)).await
    }

    async fn list_cached(
        &self,
        account_type: Option<AccountType>,
    ) -> FinanceResult<Vec<Account>> {
        if let Some(cached) = self.list_cache.get(&account_type) {
            return Ok(cached);
        }
        let accounts = self.storage.list_accounts(account_type).await?;
        self.list_cache.put(account_type, accounts.clone());
        Ok(accounts)
    }

    /// Create a new account. The code must follow the numbering convention;
    /// the balance-sheet category is derived from it.
    pub async fn create_account(
        &mut self,
        code: String,
        name: String,
        account_type: AccountType,
        parent_code: Option<String>,
    ) -> FinanceResult<Account> {
        validate_account_code(&code)?;
        validate_account_name(&name)?;

        let category = AccountCategory::from_code(&code).ok_or_else(|| {
            FinanceError::Validation(format!(
                "Account code '{}' does not follow the chart numbering convention",
                code
            ))
        })?;
        if category.account_type() != account_type {
            return Err(FinanceError::Validation(format!(
                "Account code '{}' implies {:?} but account type is {:?}",
                code,
                category.account_type(),
                account_type
            )));
        }

        if self.storage.get_account(&code).await?.is_some() {
            return Err(FinanceError::Validation(format!(
                "Account with code '{}' already exists",
                code
            )));
        }

        if let Some(ref parent) = parent_code {
            if self.storage.get_account(parent).await?.is_none() {
                return Err(FinanceError::Validation(format!(
                    "Parent account '{}' does not exist",
                    parent
                )));
            }
        }

        let account = Account::new(code, name, account_type, category, parent_code);
        self.storage.save_account(&account).await?;
        self.list_cache.clear();
        Ok(account)
    }

    /// Update an account. The account type is immutable.
    pub async fn update_account(&mut self, account: &Account) -> FinanceResult<()> {
        validate_account_name(&account.name)?;

        let existing = self
            .storage
            .get_account(&account.code)
            .await?
            .ok_or_else(|| FinanceError::AccountNotFound(account.code.clone()))?;

        if existing.account_type != account.account_type {
            return Err(FinanceError::Validation(format!(
                "Account type of '{}' is immutable ({:?} -> {:?} rejected)",
                account.code, existing.account_type, account.account_type
            )));
        }

        let mut updated = account.clone();
        updated.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_account(&updated).await?;
        self.list_cache.clear();
        Ok(())
    }

    /// Deactivate an account. Accounts are never deleted.
    pub async fn deactivate(&mut self, code: &str) -> FinanceResult<Account> {
        let mut account = self.get_required(code).await?;
        account.is_active = false;
        account.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_account(&account).await?;
        self.list_cache.clear();
        Ok(account)
    }

    /// Seed the default school chart. Idempotent: codes that already exist
    /// are skipped. Returns the accounts actually created.
    pub async fn initialize_defaults(&mut self) -> FinanceResult<Vec<Account>> {
        let mut created = Vec::new();
        for (code, name, account_type) in default_chart() {
            if self.storage.get_account(code).await?.is_some() {
                continue;
            }
            let account = self
                .create_account(code.to_string(), name.to_string(), account_type, None)
                .await?;
            created.push(account);
        }
        self.list_cache.clear();
        Ok(created)
    }
}
