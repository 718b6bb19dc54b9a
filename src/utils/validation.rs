//! Validation utilities for records crossing the ingestion boundary

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> ReconcileResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(ReconcileError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a record ID is usable as a storage key
pub fn validate_record_id(record_id: &str) -> ReconcileResult<()> {
    if record_id.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Record ID cannot be empty".to_string(),
        ));
    }

    if record_id.len() > 50 {
        return Err(ReconcileError::Validation(
            "Record ID cannot exceed 50 characters".to_string(),
        ));
    }

    if !record_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ReconcileError::Validation(
            "Record ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate a confidence score lies in [0, 1]
pub fn validate_confidence(confidence: f64) -> ReconcileResult<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ReconcileError::Validation(format!(
            "Confidence must be within [0, 1], got {confidence}"
        )));
    }
    Ok(())
}

/// Validate a bank transaction as delivered by statement ingestion
pub fn validate_transaction_record(transaction: &BankTransaction) -> ReconcileResult<()> {
    validate_record_id(&transaction.id)?;
    validate_record_id(&transaction.company_id)?;
    validate_positive_amount(&transaction.amount)
}

/// Validate an invoice as delivered by invoice processing
pub fn validate_invoice_record(invoice: &Invoice) -> ReconcileResult<()> {
    validate_record_id(&invoice.id)?;
    validate_record_id(&invoice.company_id)?;

    if invoice.invoice_number.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Invoice number cannot be empty".to_string(),
        ));
    }

    validate_positive_amount(&invoice.amount)?;
    invoice.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::gst::GstBreakdown;
    use chrono::NaiveDate;

    #[test]
    fn record_id_rules() {
        assert!(validate_record_id("txn-42_a").is_ok());
        assert!(validate_record_id("").is_err());
        assert!(validate_record_id("has space").is_err());
        assert!(validate_record_id(&"x".repeat(51)).is_err());
    }

    #[test]
    fn confidence_bounds() {
        assert!(validate_confidence(0.0).is_ok());
        assert!(validate_confidence(0.80325).is_ok());
        assert!(validate_confidence(1.0).is_ok());
        assert!(validate_confidence(-0.1).is_err());
        assert!(validate_confidence(1.1).is_err());
    }

    #[test]
    fn transaction_record_must_have_positive_amount() {
        let txn = BankTransaction::new(
            "t1",
            "co1",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            BigDecimal::from(0),
            TransactionDirection::Credit,
        );
        assert!(validate_transaction_record(&txn).is_err());
    }

    #[test]
    fn invoice_record_needs_a_number() {
        let invoice = Invoice::sales(
            "inv1",
            "co1",
            Party::new("b1", "Acme Traders"),
            "",
            BigDecimal::from(1180),
            BigDecimal::from(1000),
            GstBreakdown::inter_state(BigDecimal::from(180)),
        );
        assert!(validate_invoice_record(&invoice).is_err());
    }
}
