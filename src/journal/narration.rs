//! Narration text for settlement entries, including payment-rail detection
//! in bank statement descriptions

use bigdecimal::ToPrimitive;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{BankTransaction, Invoice, TransactionDirection};

/// Payment rail detected in a bank narration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRail {
    /// RTGS, NEFT, IMPS, UPI, CHQ or FT
    pub rail: String,
    /// Bank reference following the rail marker, when present
    pub reference: Option<String>,
}

// Narration shapes like "NEFTDR-SBIN0050165", "RTGS-UTIB0000041",
// "UPI/417223344556" as emitted by Indian bank statements.
static RAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(RTGS|NEFT|IMPS|UPI|CHQ|FT)[A-Z]*(?:[-/ ]*([A-Z0-9]{6,}))?").unwrap()
});

/// Detect the payment rail and its reference in a bank description
pub fn detect_payment_rail(description: &str) -> Option<PaymentRail> {
    let upper = description.to_uppercase();
    let caps = RAIL_RE.captures(&upper)?;
    Some(PaymentRail {
        rail: caps[1].to_string(),
        reference: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Narration describing a settlement: percentage paid, counterparty and,
/// when detectable, the payment rail and reference
pub fn settlement_narration(transaction: &BankTransaction, invoice: &Invoice) -> String {
    let ratio = match (transaction.amount.to_f64(), invoice.amount.to_f64()) {
        (Some(t), Some(i)) if i > 0.0 => t / i,
        _ => 1.0,
    };
    let percent = ratio * 100.0;

    let (kind, link) = match transaction.direction {
        TransactionDirection::Credit => ("Receipt", "from"),
        TransactionDirection::Debit => ("Payment", "to"),
    };

    let mut narration = format!(
        "{kind} of {percent:.0}% against invoice {} {link} {}",
        invoice.invoice_number,
        invoice.counterparty.name()
    );

    if let Some(rail) = transaction
        .description
        .as_deref()
        .and_then(detect_payment_rail)
    {
        narration.push_str(&format!(" via {}", rail.rail));
        if let Some(reference) = rail.reference {
            narration.push_str(&format!(" (ref {reference})"));
        }
    }

    narration
}
