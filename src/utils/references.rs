//! Human-readable transaction reference generators
//!
//! References are audit identifiers, not uniqueness-enforced keys. Formats:
//! `PAY-{year}-{8}`, `EXP-{year}-{8}`, `SAL-{year}-{month:02}-{6}`,
//! `AST-{year}-{6}`, `TRF-{year}-{8}`, `BNK-{year}-{8}`, `JE-{year}-{6}`.

use uuid::Uuid;

fn token(len: usize) -> String {
    Uuid::new_v4().simple().to_string()[..len].to_uppercase()
}

pub fn payment_reference(year: i32) -> String {
    format!("PAY-{year}-{}", token(8))
}

pub fn expense_reference(year: i32) -> String {
    format!("EXP-{year}-{}", token(8))
}

pub fn fee_reference(year: i32) -> String {
    format!("FEE-{year}-{}", token(8))
}

pub fn salary_reference(year: i32, month: u32) -> String {
    format!("SAL-{year}-{month:02}-{}", token(6))
}

pub fn asset_reference(year: i32) -> String {
    format!("AST-{year}-{}", token(6))
}

pub fn transfer_reference(year: i32) -> String {
    format!("TRF-{year}-{}", token(8))
}

pub fn bank_reference(year: i32) -> String {
    format!("BNK-{year}-{}", token(8))
}

pub fn entry_number(year: i32) -> String {
    format!("JE-{year}-{}", token(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_formats() {
        let payment = payment_reference(2026);
        assert!(payment.starts_with("PAY-2026-"));
        assert_eq!(payment.len(), "PAY-2026-".len() + 8);

        let salary = salary_reference(2026, 3);
        assert!(salary.starts_with("SAL-2026-03-"));
        assert_eq!(salary.len(), "SAL-2026-03-".len() + 6);

        let asset = asset_reference(2026);
        assert!(asset.starts_with("AST-2026-"));
        assert_eq!(asset.len(), "AST-2026-".len() + 6);

        let number = entry_number(2026);
        assert!(number.starts_with("JE-2026-"));
    }

    #[test]
    fn tokens_are_uppercase_alphanumeric() {
        let reference = transfer_reference(2026);
        let tail = reference.rsplit('-').next().unwrap();
        assert!(tail.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
    }
}
