//! Partial payment settlement example: GST-aware split of the receipt

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use reconcile_core::{
    BankTransaction, GstBreakdown, Invoice, MemoryStorage, Party, Reconciler, ReconciliationStore,
    TransactionDirection,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Reconcile Core - Partial Payments Example\n");

    let mut storage = MemoryStorage::new();
    let company = "demo-co";

    // One inter-state sales invoice for ₹10,000 (₹8,475 + ₹1,525 IGST)
    let invoice = Invoice::sales(
        "inv-500",
        company,
        Party::new("b1", "Kiran Enterprises"),
        "INV-2024-500",
        BigDecimal::from(10000),
        BigDecimal::from(8475),
        GstBreakdown::inter_state(BigDecimal::from(1525)),
    )
    .with_invoice_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    storage.save_invoice(&invoice).await?;
    println!(
        "🧾 Invoice {} for ₹{} (taxable ₹{}, IGST ₹{})\n",
        invoice.invoice_number, invoice.amount, invoice.taxable_amount, invoice.gst.igst_amount
    );

    // The buyer pays in two halves, each naming the invoice
    let first_half = BankTransaction::new(
        "txn-51",
        company,
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        BigDecimal::from(5000),
        TransactionDirection::Credit,
    )
    .with_description("NEFT-SBIN0050165 first instalment")
    .with_reference("INV-2024-500/1");

    let second_half = BankTransaction::new(
        "txn-52",
        company,
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        BigDecimal::from(5000),
        TransactionDirection::Credit,
    )
    .with_description("NEFT-SBIN0050165 final instalment")
    .with_reference("INV-2024-500/2");

    storage.save_transaction(&first_half).await?;
    storage.save_transaction(&second_half).await?;

    let mut reconciler = Reconciler::new(storage.clone());
    let summary = reconciler.reconcile(company).await?;
    println!(
        "🔁 Reconciled {} of {} transactions\n",
        summary.auto_settled, summary.total_transactions
    );

    let settled = storage.get_invoice("inv-500").await?;
    if let Some(invoice) = settled {
        println!("  Invoice status after both instalments: {:?}\n", invoice.status);
    }

    // Each receipt keeps the 1-debit/2-credit shape: Bank against the
    // debtor's principal portion plus the IGST settlement remainder
    println!("📒 Posted entries:\n");
    for entry in storage.journal_entries(company).await? {
        println!("  {}", entry.narration);
        for line in &entry.lines {
            println!(
                "    {:<28} Dr {:>9}  Cr {:>9}",
                line.account_name, line.debit, line.credit
            );
        }
        println!();
    }

    Ok(())
}
