//! Pure journal entry constructors for invoice ingestion and settlement

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;

use crate::journal::accounts::{self, Account};
use crate::journal::narration;
use crate::tax::gst::GstBreakdown;
use crate::types::*;

/// Builder for journal entries; `build` validates the accounting identity
#[derive(Debug)]
pub struct EntryBuilder {
    entry: JournalEntry,
}

impl EntryBuilder {
    pub fn new(
        company_id: impl Into<String>,
        entry_type: JournalEntryType,
        date: NaiveDate,
        narration: impl Into<String>,
    ) -> Self {
        Self {
            entry: JournalEntry::new(company_id, entry_type, date, narration),
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.entry.reference = Some(reference.into());
        self
    }

    pub fn debit(
        mut self,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.entry
            .add_line(JournalEntryLine::debit(account_code, account_name, amount));
        self
    }

    pub fn credit(
        mut self,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.entry
            .add_line(JournalEntryLine::credit(account_code, account_name, amount));
        self
    }

    pub fn build(self) -> ReconcileResult<JournalEntry> {
        self.entry.validate()?;
        Ok(self.entry)
    }
}

/// Reference string under which a settlement entry is posted; also the
/// key for the already-posted probe
pub fn settlement_reference(transaction: &BankTransaction) -> String {
    transaction
        .reference
        .clone()
        .unwrap_or_else(|| format!("TXN-{}", transaction.id))
}

/// GST settlement account for a partial payment's remainder line
pub fn gst_settlement_account(gst: &GstBreakdown) -> Account {
    if gst.igst_amount > BigDecimal::from(0) {
        accounts::IGST_SETTLEMENT
    } else if gst.cgst_amount > BigDecimal::from(0) || gst.sgst_amount > BigDecimal::from(0) {
        accounts::CGST_SGST_SETTLEMENT
    } else {
        accounts::SUSPENSE
    }
}

/// Entry posted when a settlement consumes a bank transaction
///
/// Full payment: debit Bank, credit the counterparty control account.
/// Partial payment keeps the 1-debit/2-credit shape: the principal portion
/// `taxable * txn/invoice` goes to the control account and the remainder
/// to the GST settlement account (Suspense when the invoice has no GST).
pub fn settlement_entry(
    transaction: &BankTransaction,
    invoice: &Invoice,
) -> ReconcileResult<JournalEntry> {
    let entry_type = match transaction.direction {
        TransactionDirection::Credit => JournalEntryType::Receipt,
        TransactionDirection::Debit => JournalEntryType::Payment,
    };

    let (party_code, party_name) = match &invoice.counterparty {
        Counterparty::Buyer(p) => accounts::debtors_account(&p.name),
        Counterparty::Vendor(p) => accounts::creditors_account(&p.name),
    };

    let builder = EntryBuilder::new(
        &transaction.company_id,
        entry_type,
        transaction.date,
        narration::settlement_narration(transaction, invoice),
    )
    .reference(settlement_reference(transaction))
    .debit(
        accounts::BANK.code,
        accounts::BANK.name,
        transaction.amount.clone(),
    );

    if amounts_match(&transaction.amount, &invoice.amount) {
        return builder
            .credit(party_code, party_name, transaction.amount.clone())
            .build();
    }

    if invoice.amount <= BigDecimal::from(0) {
        return Err(ReconcileError::InvalidEntry(format!(
            "Cannot apportion settlement against zero-amount invoice {}",
            invoice.id
        )));
    }

    let principal = (&invoice.taxable_amount * &transaction.amount / &invoice.amount)
        .with_scale_round(2, RoundingMode::HalfUp);
    // The remainder is derived after rounding so the two credits always
    // sum to the debit
    let remainder = &transaction.amount - &principal;
    let gst_account = gst_settlement_account(&invoice.gst);

    builder
        .credit(party_code, party_name, principal)
        .credit(gst_account.code, gst_account.name, remainder)
        .build()
}

/// Entry posted when an invoice is ingested
///
/// Sales: debit the buyer's control account for the total, credit Sales
/// for the taxable amount and the GST payable accounts per populated
/// component. Purchase: debit expenses plus GST input accounts, credit
/// the vendor's control account for the total.
pub fn entry_from_invoice(invoice: &Invoice) -> ReconcileResult<JournalEntry> {
    invoice.validate()?;

    let date = invoice
        .invoice_date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let zero = BigDecimal::from(0);

    match invoice.invoice_type {
        InvoiceType::Sales => {
            let (code, name) = accounts::debtors_account(invoice.counterparty.name());
            let mut builder = EntryBuilder::new(
                &invoice.company_id,
                JournalEntryType::Sales,
                date,
                format!("Sales invoice {}", invoice.invoice_number),
            )
            .reference(invoice.invoice_number.clone())
            .debit(code, name, invoice.amount.clone())
            .credit(
                accounts::SALES.code,
                accounts::SALES.name,
                invoice.taxable_amount.clone(),
            );

            if invoice.gst.igst_amount > zero {
                builder = builder.credit(
                    accounts::IGST_PAYABLE.code,
                    accounts::IGST_PAYABLE.name,
                    invoice.gst.igst_amount.clone(),
                );
            }
            if invoice.gst.cgst_amount > zero {
                builder = builder.credit(
                    accounts::CGST_PAYABLE.code,
                    accounts::CGST_PAYABLE.name,
                    invoice.gst.cgst_amount.clone(),
                );
            }
            if invoice.gst.sgst_amount > zero {
                builder = builder.credit(
                    accounts::SGST_PAYABLE.code,
                    accounts::SGST_PAYABLE.name,
                    invoice.gst.sgst_amount.clone(),
                );
            }

            builder.build()
        }
        InvoiceType::Purchase => {
            let (code, name) = accounts::creditors_account(invoice.counterparty.name());
            let mut builder = EntryBuilder::new(
                &invoice.company_id,
                JournalEntryType::Purchase,
                date,
                format!("Purchase invoice {}", invoice.invoice_number),
            )
            .reference(invoice.invoice_number.clone())
            .debit(
                accounts::PURCHASE_EXPENSES.code,
                accounts::PURCHASE_EXPENSES.name,
                invoice.taxable_amount.clone(),
            );

            if invoice.gst.igst_amount > zero {
                builder = builder.debit(
                    accounts::IGST_INPUT.code,
                    accounts::IGST_INPUT.name,
                    invoice.gst.igst_amount.clone(),
                );
            }
            if invoice.gst.cgst_amount > zero {
                builder = builder.debit(
                    accounts::CGST_INPUT.code,
                    accounts::CGST_INPUT.name,
                    invoice.gst.cgst_amount.clone(),
                );
            }
            if invoice.gst.sgst_amount > zero {
                builder = builder.debit(
                    accounts::SGST_INPUT.code,
                    accounts::SGST_INPUT.name,
                    invoice.gst.sgst_amount.clone(),
                );
            }

            builder.credit(code, name, invoice.amount.clone()).build()
        }
    }
}
