//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tax::gst::GstBreakdown;

/// Tolerance used for money equality comparisons (0.01 currency units)
pub fn amount_tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

/// Whether two money amounts are equal within the rounding tolerance
pub fn amounts_match(a: &BigDecimal, b: &BigDecimal) -> bool {
    (a - b).abs() <= amount_tolerance()
}

/// Invoice classification, assigned by the (external) classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    /// Sales invoice - the company is owed money by a buyer
    Sales,
    /// Purchase invoice - the company owes money to a vendor
    Purchase,
}

/// Payment lifecycle of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

/// Direction of a bank-statement line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    /// Money into the company's account
    Credit,
    /// Money out of the company's account
    Debit,
}

/// Matching lifecycle of a bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Unmatched,
    Matched,
    Settled,
}

/// How a transaction-to-invoice match was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Manual,
}

/// Settlement lifecycle of a reconciliation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    Pending,
    Verified,
    Settled,
}

/// Journal entry classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEntryType {
    Sales,
    Purchase,
    Payment,
    Receipt,
    Other,
}

/// A vendor or buyer referenced by an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    /// 15-character Indian GST identification number, when registered
    pub gstin: Option<String>,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gstin: None,
        }
    }

    pub fn with_gstin(mut self, gstin: impl Into<String>) -> Self {
        self.gstin = Some(gstin.into());
        self
    }
}

/// Counterparty of an invoice. Sales invoices reference a buyer,
/// purchase invoices a vendor; the variants make the xor structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counterparty {
    Buyer(Party),
    Vendor(Party),
}

impl Counterparty {
    pub fn party(&self) -> &Party {
        match self {
            Counterparty::Buyer(p) | Counterparty::Vendor(p) => p,
        }
    }

    pub fn name(&self) -> &str {
        &self.party().name
    }
}

/// One bank-statement line item
///
/// Created by statement ingestion; mutated only by the settlement engine
/// (status transitions). Never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: String,
    pub company_id: String,
    pub date: NaiveDate,
    /// Positive magnitude; direction carries the sign
    pub amount: BigDecimal,
    pub description: Option<String>,
    /// Reference string parsed out of the bank narration
    pub reference: Option<String>,
    pub direction: TransactionDirection,
    pub status: TransactionStatus,
    pub category: Option<String>,
    pub created_at: NaiveDateTime,
}

impl BankTransaction {
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<String>,
        date: NaiveDate,
        amount: BigDecimal,
        direction: TransactionDirection,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            date,
            amount,
            description: None,
            reference: None,
            direction,
            status: TransactionStatus::Unmatched,
            category: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// One sales or purchase invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub company_id: String,
    pub counterparty: Counterparty,
    pub invoice_type: InvoiceType,
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    /// Total amount including GST
    pub amount: BigDecimal,
    /// Pre-tax amount
    pub taxable_amount: BigDecimal,
    pub gst: GstBreakdown,
    pub status: InvoiceStatus,
    pub created_at: NaiveDateTime,
}

impl Invoice {
    /// Create a sales invoice addressed to a buyer
    pub fn sales(
        id: impl Into<String>,
        company_id: impl Into<String>,
        buyer: Party,
        invoice_number: impl Into<String>,
        amount: BigDecimal,
        taxable_amount: BigDecimal,
        gst: GstBreakdown,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            counterparty: Counterparty::Buyer(buyer),
            invoice_type: InvoiceType::Sales,
            invoice_number: invoice_number.into(),
            invoice_date: None,
            amount,
            taxable_amount,
            gst,
            status: InvoiceStatus::Pending,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Create a purchase invoice owed to a vendor
    pub fn purchase(
        id: impl Into<String>,
        company_id: impl Into<String>,
        vendor: Party,
        invoice_number: impl Into<String>,
        amount: BigDecimal,
        taxable_amount: BigDecimal,
        gst: GstBreakdown,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            counterparty: Counterparty::Vendor(vendor),
            invoice_type: InvoiceType::Purchase,
            invoice_number: invoice_number.into(),
            invoice_date: None,
            amount,
            taxable_amount,
            gst,
            status: InvoiceStatus::Pending,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn with_invoice_date(mut self, date: NaiveDate) -> Self {
        self.invoice_date = Some(date);
        self
    }

    /// Whether the invoice still accepts settlements
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            InvoiceStatus::Pending | InvoiceStatus::PartiallyPaid
        )
    }

    /// Validate structural consistency of the invoice record
    pub fn validate(&self) -> ReconcileResult<()> {
        match (&self.invoice_type, &self.counterparty) {
            (InvoiceType::Sales, Counterparty::Buyer(_)) => {}
            (InvoiceType::Purchase, Counterparty::Vendor(_)) => {}
            (InvoiceType::Sales, Counterparty::Vendor(_)) => {
                return Err(ReconcileError::Validation(
                    "Sales invoice must reference a buyer".to_string(),
                ));
            }
            (InvoiceType::Purchase, Counterparty::Buyer(_)) => {
                return Err(ReconcileError::Validation(
                    "Purchase invoice must reference a vendor".to_string(),
                ));
            }
        }

        if self.amount < BigDecimal::from(0) || self.taxable_amount < BigDecimal::from(0) {
            return Err(ReconcileError::Validation(
                "Invoice amounts must not be negative".to_string(),
            ));
        }

        self.gst.validate()?;

        let expected = &self.taxable_amount + self.gst.total();
        if !amounts_match(&self.amount, &expected) {
            return Err(ReconcileError::Validation(format!(
                "Invoice total {} does not equal taxable {} plus GST {}",
                self.amount,
                self.taxable_amount,
                self.gst.total()
            )));
        }

        Ok(())
    }
}

/// The record of a transaction-to-invoice match
///
/// Invariant: a (transaction, invoice) pair has at most one reconciliation.
/// Transitions to `Settled` only through the settlement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: String,
    pub transaction_id: String,
    pub invoice_id: String,
    pub match_type: MatchType,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    pub status: ReconciliationStatus,
    pub settled_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Reconciliation {
    pub fn new(
        transaction_id: impl Into<String>,
        invoice_id: impl Into<String>,
        match_type: MatchType,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.into(),
            invoice_id: invoice_id.into(),
            match_type,
            confidence,
            status: ReconciliationStatus::Pending,
            settled_at: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// An operator-initiated match; the operator is the confidence signal
    pub fn manual(transaction_id: impl Into<String>, invoice_id: impl Into<String>) -> Self {
        Self::new(transaction_id, invoice_id, MatchType::Manual, 1.0)
    }
}

/// One line of a journal entry. Exactly one of debit/credit is nonzero
/// by convention; a zero on the other side means "no entry on this side".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    pub account_code: String,
    pub account_name: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
}

impl JournalEntryLine {
    pub fn debit(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            account_name: account_name.into(),
            debit: amount,
            credit: BigDecimal::from(0),
        }
    }

    pub fn credit(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            account_name: account_name.into(),
            debit: BigDecimal::from(0),
            credit: amount,
        }
    }
}

/// A double-entry journal entry. Immutable once posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub company_id: String,
    pub entry_type: JournalEntryType,
    pub date: NaiveDate,
    pub narration: String,
    /// Invoice number or bank reference
    pub reference: Option<String>,
    pub lines: Vec<JournalEntryLine>,
    pub created_at: NaiveDateTime,
}

impl JournalEntry {
    pub fn new(
        company_id: impl Into<String>,
        entry_type: JournalEntryType,
        date: NaiveDate,
        narration: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.into(),
            entry_type,
            date,
            narration: narration.into(),
            reference: None,
            lines: Vec::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn add_line(&mut self, line: JournalEntryLine) {
        self.lines.push(line);
    }

    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// The accounting identity: sum(debit) == sum(credit) within tolerance
    pub fn is_balanced(&self) -> bool {
        amounts_match(&self.total_debits(), &self.total_credits())
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        if self.lines.len() < 2 {
            return Err(ReconcileError::InvalidEntry(
                "Journal entry must have at least two lines".to_string(),
            ));
        }

        for line in &self.lines {
            if line.debit < BigDecimal::from(0) || line.credit < BigDecimal::from(0) {
                return Err(ReconcileError::InvalidEntry(
                    "Line amounts must not be negative".to_string(),
                ));
            }
        }

        if !self.is_balanced() {
            return Err(ReconcileError::InvalidEntry(format!(
                "Entry is not balanced: debits = {}, credits = {}",
                self.total_debits(),
                self.total_credits()
            )));
        }

        Ok(())
    }
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
    #[error("Reconciliation not found: {0}")]
    ReconciliationNotFound(String),
    #[error("Invalid journal entry: {0}")]
    InvalidEntry(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(lines: Vec<JournalEntryLine>) -> JournalEntry {
        let mut entry = JournalEntry::new(
            "co1",
            JournalEntryType::Receipt,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "test entry",
        );
        for line in lines {
            entry.add_line(line);
        }
        entry
    }

    #[test]
    fn balanced_entry_validates() {
        let entry = entry_with(vec![
            JournalEntryLine::debit("1200", "Bank A/c", BigDecimal::from(500)),
            JournalEntryLine::credit("1100", "Debtors", BigDecimal::from(500)),
        ]);
        assert!(entry.validate().is_ok());
        assert!(entry.is_balanced());
    }

    #[test]
    fn unbalanced_entry_rejected() {
        let entry = entry_with(vec![
            JournalEntryLine::debit("1200", "Bank A/c", BigDecimal::from(500)),
            JournalEntryLine::credit("1100", "Debtors", BigDecimal::from(400)),
        ]);
        assert!(matches!(
            entry.validate(),
            Err(ReconcileError::InvalidEntry(_))
        ));
    }

    #[test]
    fn rounding_within_tolerance_is_balanced() {
        let entry = entry_with(vec![
            JournalEntryLine::debit("1200", "Bank A/c", "500.00".parse().unwrap()),
            JournalEntryLine::credit("1100", "Debtors", "499.99".parse().unwrap()),
        ]);
        assert!(entry.is_balanced());
    }

    #[test]
    fn single_line_entry_rejected() {
        let entry = entry_with(vec![JournalEntryLine::debit(
            "1200",
            "Bank A/c",
            BigDecimal::from(500),
        )]);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn sales_invoice_requires_buyer() {
        let mut invoice = Invoice::sales(
            "inv1",
            "co1",
            Party::new("b1", "Acme Traders"),
            "INV-001",
            BigDecimal::from(1180),
            BigDecimal::from(1000),
            GstBreakdown::inter_state(BigDecimal::from(180)),
        );
        assert!(invoice.validate().is_ok());

        invoice.counterparty = Counterparty::Vendor(Party::new("v1", "Some Vendor"));
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn invoice_total_must_cover_taxable_plus_gst() {
        let invoice = Invoice::sales(
            "inv1",
            "co1",
            Party::new("b1", "Acme Traders"),
            "INV-001",
            BigDecimal::from(1100),
            BigDecimal::from(1000),
            GstBreakdown::inter_state(BigDecimal::from(180)),
        );
        assert!(invoice.validate().is_err());
    }
}
