//! End-to-end school term example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use bursary_core::services::assets::AssetService;
use bursary_core::services::expenses::ExpenseService;
use bursary_core::services::payments::PaymentService;
use bursary_core::services::payroll::PayrollService;
use bursary_core::{
    ChartManager, FeeAllocation, MappingResolver, MemoryStore, PaymentMethod,
    ReconciliationEngine, ReportsGenerator,
};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("🏫 Bursary Core - School Term Example\n");

    let storage = MemoryStore::new();

    // 1. Seed the chart of accounts and default mappings
    println!("📊 Initializing chart of accounts and mappings...");
    let mut chart = ChartManager::new(storage.clone());
    let created = chart.initialize_defaults().await?;
    println!("  ✓ {} accounts created", created.len());

    let mut resolver = MappingResolver::new(storage.clone());
    let seeded = resolver.seed_defaults().await?;
    println!("  ✓ {} default mappings seeded\n", seeded);

    // 2. Bill a student and receive fees
    println!("💰 Fees...");
    let mut payments = PaymentService::new(storage.clone());
    payments
        .assign_fees(
            "Adaeze Obi".to_string(),
            vec![
                FeeAllocation {
                    fee_type: "tuition".to_string(),
                    amount: BigDecimal::from(150_000),
                },
                FeeAllocation {
                    fee_type: "examination".to_string(),
                    amount: BigDecimal::from(20_000),
                },
            ],
            date(1, 5),
        )
        .await?;
    println!("  ✓ Billed Adaeze Obi ₦170,000 for the term");

    let payment = payments
        .record_payment(
            "Adaeze Obi".to_string(),
            BigDecimal::from(100_000),
            PaymentMethod::Cash,
            date(1, 12),
        )
        .await?;
    println!("  ✓ Received ₦100,000 cash ({})\n", payment.reference);

    // 3. Approve an expense
    println!("🧾 Expenses...");
    let mut expenses = ExpenseService::new(storage.clone());
    let expense = expenses
        .record_expense(
            "utilities".to_string(),
            "Electricity for January".to_string(),
            "PHCN".to_string(),
            BigDecimal::from(35_000),
            PaymentMethod::BankTransfer,
            date(1, 18),
        )
        .await?;
    expenses.approve_expense(&expense.id).await?;
    println!("  ✓ Approved ₦35,000 utilities expense ({})\n", expense.reference);

    // 4. Run payroll
    println!("👩‍🏫 Payroll...");
    let mut payroll = PayrollService::new(storage.clone());
    let salary = payroll
        .pay_salary(
            "STF-001".to_string(),
            "Ngozi Adewale".to_string(),
            BigDecimal::from(80_000),
            BigDecimal::from(20_000),
            BigDecimal::from(0),
            PaymentMethod::BankTransfer,
            date(1, 28),
        )
        .await?;
    println!(
        "  ✓ Paid {}: gross ₦{}, PAYE ₦{}, net ₦{}\n",
        salary.staff_name, salary.gross, salary.statutory.paye, salary.net_pay
    );

    // 5. Buy an asset and depreciate it
    println!("🚌 Assets...");
    let mut assets = AssetService::new(storage.clone());
    let bus = assets
        .register_asset(
            "School Bus".to_string(),
            "vehicle".to_string(),
            "Lagos Motors".to_string(),
            PaymentMethod::BankTransfer,
            date(1, 10),
            BigDecimal::from(8_000_000),
            BigDecimal::from(800_000),
            Some(60),
            None,
        )
        .await?;
    let run = assets.run_depreciation(date(1, 31)).await?;
    println!(
        "  ✓ Registered {} ({}), first depreciation charge ₦{}\n",
        bus.name, bus.reference, run.total
    );

    // 6. Confirm nothing is stuck
    let reconciliation = ReconciliationEngine::new(storage.clone());
    println!(
        "🔎 Unposted transactions: {}\n",
        reconciliation.pending().await?.len()
    );

    // 7. Reports
    let reports = ReportsGenerator::new(storage);

    let trial_balance = reports.trial_balance(Some(date(1, 31))).await?;
    println!("📒 Trial balance as of Jan 31:");
    for row in &trial_balance.rows {
        println!(
            "  {} {:<28} Dr {:>12}  Cr {:>12}",
            row.account_code, row.account_name, row.total_debit, row.total_credit
        );
    }
    println!(
        "  Totals: Dr {} / Cr {} (balanced: {})\n",
        trial_balance.total_debits, trial_balance.total_credits, trial_balance.is_balanced
    );

    let income = reports.income_statement(date(1, 1), date(1, 31)).await?;
    println!(
        "📈 Income statement: revenue ₦{}, expenses ₦{}, net ₦{}",
        income.total_revenue, income.total_expenses, income.net_income
    );

    let sheet = reports.balance_sheet(date(1, 31)).await?;
    println!(
        "🏦 Balance sheet: assets ₦{}, liabilities ₦{}, equity ₦{} (balanced: {})",
        sheet.total_assets, sheet.total_liabilities, sheet.total_equity, sheet.is_balanced
    );

    let cash_flow = reports.cash_flow(date(1, 1), date(1, 31)).await?;
    println!(
        "💵 Cash flow: operating ₦{}, investing ₦{}, net ₦{}",
        cash_flow.net_operating, cash_flow.net_investing, cash_flow.net_cash_flow
    );

    Ok(())
}
