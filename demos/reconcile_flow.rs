//! End-to-end reconciliation example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use reconcile_core::utils::validation::{validate_invoice_record, validate_transaction_record};
use reconcile_core::{
    BankTransaction, GstBreakdown, Invoice, MemoryStorage, Party, Reconciler, ReconciliationStore,
    TransactionDirection,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Reconcile Core - Automatic Reconciliation Example\n");

    let mut storage = MemoryStorage::new();
    let company = "demo-co";

    // 1. Invoices as delivered by invoice processing
    println!("🧾 Ingesting Invoices...");
    let invoices = vec![
        Invoice::sales(
            "inv-100",
            company,
            Party::new("b1", "Kiran Enterprises").with_gstin("29AAACK1234F1Z5"),
            "INV-2024-100",
            BigDecimal::from(11800),
            BigDecimal::from(10000),
            GstBreakdown::intra_state(BigDecimal::from(1800)),
        )
        .with_invoice_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        Invoice::sales(
            "inv-101",
            company,
            Party::new("b2", "Mehta Textiles"),
            "INV-2024-101",
            BigDecimal::from(20000),
            BigDecimal::from(16949),
            GstBreakdown::inter_state(BigDecimal::from(3051)),
        )
        .with_invoice_date(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()),
        Invoice::purchase(
            "inv-200",
            company,
            Party::new("v1", "Sharma Supplies"),
            "PUR-2024-77",
            BigDecimal::from(5900),
            BigDecimal::from(5000),
            GstBreakdown::intra_state(BigDecimal::from(900)),
        )
        .with_invoice_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
    ];

    for invoice in &invoices {
        validate_invoice_record(invoice)?;
        storage.save_invoice(invoice).await?;
        println!(
            "  ✓ {} {} for ₹{} ({:?})",
            invoice.invoice_number,
            invoice.counterparty.name(),
            invoice.amount,
            invoice.invoice_type
        );
    }
    println!();

    // 2. Bank statement lines as delivered by statement ingestion
    println!("💳 Ingesting Bank Transactions...");
    let transactions = vec![
        // Exact match for INV-2024-100
        BankTransaction::new(
            "txn-01",
            company,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            BigDecimal::from(11800),
            TransactionDirection::Credit,
        )
        .with_description("NEFT-UTIB0000041 KIRAN ENTERPRISES")
        .with_reference("INV-2024-100"),
        // Half of INV-2024-101, named in the narration
        BankTransaction::new(
            "txn-02",
            company,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            BigDecimal::from(10000),
            TransactionDirection::Credit,
        )
        .with_description("IMPS part payment INV-2024-101"),
        // Supplier payment for PUR-2024-77
        BankTransaction::new(
            "txn-03",
            company,
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            BigDecimal::from(5900),
            TransactionDirection::Debit,
        )
        .with_description("RTGSDR-UTIB0000041 SHARMA SUPPLIES"),
        // Stray deposit nothing matches
        BankTransaction::new(
            "txn-04",
            company,
            NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(),
            BigDecimal::from(777),
            TransactionDirection::Credit,
        )
        .with_description("cash deposit at branch"),
    ];

    for txn in &transactions {
        validate_transaction_record(txn)?;
        storage.save_transaction(txn).await?;
        println!(
            "  ✓ {} ₹{} ({:?})",
            txn.id, txn.amount, txn.direction
        );
    }
    println!();

    // 3. Run automatic reconciliation
    println!("🔁 Running Reconciliation...\n");
    let mut reconciler = Reconciler::new(storage.clone());
    let summary = reconciler.reconcile(company).await?;

    println!("  Transactions considered: {}", summary.total_transactions);
    println!("  Matches found:           {}", summary.matches_found);
    println!("  Exact matches:           {}", summary.exact_matches);
    println!("  Fuzzy matches:           {}", summary.fuzzy_matches);
    println!("  Auto-settled:            {}", summary.auto_settled);
    println!();

    for record in &summary.matches {
        println!(
            "  ✓ {} → {} ({:?}, confidence {:.2})",
            record.transaction_id, record.invoice_id, record.match_type, record.confidence
        );
    }
    println!();

    // 4. Inspect the journal entries settlement produced
    println!("📒 Settlement Journal Entries...\n");
    for entry in storage.journal_entries(company).await? {
        println!("  {} [{}]", entry.narration, entry.id);
        for line in &entry.lines {
            println!(
                "    {:<30} Dr {:>10}  Cr {:>10}",
                line.account_name, line.debit, line.credit
            );
        }
        println!(
            "    balanced: {}\n",
            if entry.is_balanced() { "yes" } else { "NO" }
        );
    }

    Ok(())
}
