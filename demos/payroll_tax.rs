//! PAYE and statutory deduction examples

use bigdecimal::BigDecimal;

use bursary_core::{calculate_annual_paye, calculate_monthly_paye, StatutoryDeductionsCalculator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Bursary Core - Nigerian Payroll Calculations\n");

    // 1. Annual PAYE assessment, bracket by bracket
    println!("📊 Annual PAYE on ₦1,000,000 gross:");
    let assessment = calculate_annual_paye(&BigDecimal::from(1_000_000));
    println!("  CRA (relief):    ₦{}", assessment.cra);
    println!("  Taxable income:  ₦{}", assessment.taxable_income);
    for bracket in &assessment.brackets {
        println!(
            "    ₦{:>9} @ {:>2}% = ₦{}",
            bracket.taxed_amount, bracket.rate_percent, bracket.tax
        );
    }
    println!("  Total tax:       ₦{}", assessment.total_tax);
    println!("  Net income:      ₦{}\n", assessment.net_income);

    // 2. Monthly withholding across salary levels
    println!("📅 Monthly PAYE withholding:");
    for gross in [30_000, 80_000, 100_000, 250_000, 1_000_000] {
        let tax = calculate_monthly_paye(&BigDecimal::from(gross));
        println!("  gross ₦{:>9}/month -> PAYE ₦{}", gross, tax);
    }
    println!();

    // 3. Full statutory composition for one staff member
    println!("👩‍🏫 Statutory deductions (basic ₦80,000 + allowances ₦20,000):");
    let deductions = StatutoryDeductionsCalculator::calculate_all(
        &BigDecimal::from(80_000),
        &BigDecimal::from(20_000),
    );
    println!("  NHF (2.5% basic):          ₦{}", deductions.nhf);
    println!("  Pension, employee (8%):    ₦{}", deductions.pension_employee);
    println!("  Pension, employer (10%):   ₦{}", deductions.pension_employer);
    println!("  NHIS (5% basic, capped):   ₦{}", deductions.nhis);
    println!("  PAYE:                      ₦{}", deductions.paye);
    println!(
        "  Employee deductions total: ₦{}",
        deductions.total_employee_deductions
    );
    println!(
        "  Employer contributions:    ₦{}\n",
        deductions.total_employer_contributions
    );

    // 4. The NHF eligibility boundary
    println!("🏠 NHF eligibility boundary:");
    for basic in [29_999, 30_000] {
        let d = StatutoryDeductionsCalculator::calculate_all(
            &BigDecimal::from(basic),
            &BigDecimal::from(0),
        );
        println!("  basic ₦{} -> NHF ₦{}", basic, d.nhf);
    }

    Ok(())
}
