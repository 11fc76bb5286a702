//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::EntryValidator;
use crate::types::*;

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(amount: &BigDecimal) -> FinanceResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(FinanceError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an amount is not negative
pub fn validate_non_negative(amount: &BigDecimal, label: &str) -> FinanceResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(FinanceError::Validation(format!(
            "{} must not be negative",
            label
        )))
    } else {
        Ok(())
    }
}

/// Validate an account code against the chart numbering convention:
/// four digits, leading digit 1-5
pub fn validate_account_code(code: &str) -> FinanceResult<()> {
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(FinanceError::Validation(format!(
            "Account code '{}' must be four digits",
            code
        )));
    }

    if !matches!(code.as_bytes()[0], b'1'..=b'5') {
        return Err(FinanceError::Validation(format!(
            "Account code '{}' must start with a digit between 1 and 5",
            code
        )));
    }

    Ok(())
}

/// Validate that an account name is usable
pub fn validate_account_name(name: &str) -> FinanceResult<()> {
    if name.trim().is_empty() {
        return Err(FinanceError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(FinanceError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a journal-entry or transaction description
pub fn validate_description(description: &str) -> FinanceResult<()> {
    if description.trim().is_empty() {
        return Err(FinanceError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }

    if description.len() > 500 {
        return Err(FinanceError::Validation(
            "Description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Strict validator layering account-code and duplicate-line checks on top
/// of the basic double-entry rules
pub struct StrictEntryValidator;

impl EntryValidator for StrictEntryValidator {
    fn validate_entry(&self, entry: &JournalEntry) -> FinanceResult<()> {
        entry.validate()?;
        validate_description(&entry.description)?;

        for line in &entry.lines {
            validate_account_code(&line.account_code)?;
        }

        // The same account must not appear twice on the same side
        let mut seen = std::collections::HashSet::new();
        let zero = BigDecimal::from(0);
        for line in &entry.lines {
            let side = if line.debit > zero {
                BalanceSide::Debit
            } else {
                BalanceSide::Credit
            };
            if !seen.insert((line.account_code.clone(), side)) {
                return Err(FinanceError::Validation(format!(
                    "Account '{}' appears more than once on the same side",
                    line.account_code
                )));
            }
        }

        Ok(())
    }
}
