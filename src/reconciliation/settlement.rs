//! Settlement of reconciliations: status transitions and journal posting

use bigdecimal::BigDecimal;
use tracing::{error, info, warn};

use crate::journal::posting;
use crate::traits::ReconciliationStore;
use crate::types::*;

/// Applies an accepted match: marks the transaction consumed, moves the
/// invoice towards `Paid`, and posts the ledger entry for the settlement
pub struct SettlementEngine<S: ReconciliationStore> {
    storage: S,
}

impl<S: ReconciliationStore> SettlementEngine<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Settle a reconciliation. Idempotent: an already-settled record is
    /// returned unchanged, with no second posting.
    pub async fn settle(&mut self, reconciliation_id: &str) -> ReconcileResult<Reconciliation> {
        let mut reconciliation = self
            .storage
            .get_reconciliation(reconciliation_id)
            .await?
            .ok_or_else(|| {
                ReconcileError::ReconciliationNotFound(reconciliation_id.to_string())
            })?;

        if reconciliation.status == ReconciliationStatus::Settled {
            return Ok(reconciliation);
        }

        let mut transaction = self
            .storage
            .get_transaction(&reconciliation.transaction_id)
            .await?
            .ok_or_else(|| {
                ReconcileError::TransactionNotFound(reconciliation.transaction_id.clone())
            })?;

        let mut invoice = self
            .storage
            .get_invoice(&reconciliation.invoice_id)
            .await?
            .ok_or_else(|| ReconcileError::InvoiceNotFound(reconciliation.invoice_id.clone()))?;

        // A transaction, once settled, is consumed and not reused
        if transaction.status == TransactionStatus::Settled {
            return Err(ReconcileError::InvalidState(format!(
                "Transaction {} is already consumed by another settlement",
                transaction.id
            )));
        }

        // Always recomputed from durable state, never cached, so two
        // matches against the same invoice in one run cannot overpay
        let prior = self
            .settled_total(&invoice.id, Some(&reconciliation.id))
            .await?;
        let total_reconciled = &prior + &transaction.amount;

        if total_reconciled > &invoice.amount + amount_tolerance() {
            return Err(ReconcileError::InvalidState(format!(
                "Settling transaction {} would overpay invoice {}: {} against {}",
                transaction.id, invoice.id, total_reconciled, invoice.amount
            )));
        }

        if total_reconciled >= &invoice.amount - amount_tolerance() {
            invoice.status = InvoiceStatus::Paid;
        } else if transaction.amount < invoice.amount {
            invoice.status = InvoiceStatus::PartiallyPaid;
        }

        transaction.status = TransactionStatus::Settled;
        reconciliation.status = ReconciliationStatus::Settled;
        reconciliation.settled_at = Some(chrono::Utc::now().naive_utc());

        self.storage.update_invoice(&invoice).await?;
        self.storage.update_transaction(&transaction).await?;
        self.storage.update_reconciliation(&reconciliation).await?;

        info!(
            reconciliation_id = %reconciliation.id,
            transaction_id = %transaction.id,
            invoice_id = %invoice.id,
            invoice_status = ?invoice.status,
            "Reconciliation settled"
        );

        // Financial status correctness outranks ledger completeness: a
        // posting failure is reported, never rolled back
        if let Err(err) = self.post_entry_if_absent(&transaction, &invoice).await {
            error!(
                reconciliation_id = %reconciliation.id,
                error = %err,
                "Failed to post settlement entry"
            );
        }

        Ok(reconciliation)
    }

    /// Sum of transaction amounts across settled reconciliations for an
    /// invoice, optionally excluding one reconciliation record
    pub(crate) async fn settled_total(
        &self,
        invoice_id: &str,
        exclude: Option<&str>,
    ) -> ReconcileResult<BigDecimal> {
        let mut total = BigDecimal::from(0);
        for settled in self
            .storage
            .settled_reconciliations_for_invoice(invoice_id)
            .await?
        {
            if exclude.is_some_and(|id| id == settled.id) {
                continue;
            }
            let transaction = self
                .storage
                .get_transaction(&settled.transaction_id)
                .await?
                .ok_or_else(|| {
                    ReconcileError::TransactionNotFound(settled.transaction_id.clone())
                })?;
            total += transaction.amount;
        }
        Ok(total)
    }

    /// Post the settlement entry unless one already exists under the
    /// transaction's reference for this company
    async fn post_entry_if_absent(
        &mut self,
        transaction: &BankTransaction,
        invoice: &Invoice,
    ) -> ReconcileResult<()> {
        let reference = posting::settlement_reference(transaction);
        if self
            .storage
            .find_journal_entry_by_reference(&transaction.company_id, &reference)
            .await?
            .is_some()
        {
            return Ok(());
        }

        if !amounts_match(&transaction.amount, &invoice.amount) && !invoice.gst.has_any() {
            warn!(
                transaction_id = %transaction.id,
                invoice_id = %invoice.id,
                "Invoice carries no GST; partial settlement remainder goes to Suspense"
            );
        }

        let entry = posting::settlement_entry(transaction, invoice)?;
        self.storage.save_journal_entry(&entry).await
    }
}
