//! Reconciliation orchestrator: pairs unmatched bank transactions with
//! open invoices and drives settlement

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::reconciliation::matching::{self, MatchPolicy};
use crate::reconciliation::settlement::SettlementEngine;
use crate::traits::ReconciliationStore;
use crate::types::*;

/// One accepted match in a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub transaction_id: String,
    pub invoice_id: String,
    pub match_type: MatchType,
    pub confidence: f64,
    pub auto_settled: bool,
}

/// Summary of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub total_transactions: usize,
    pub matches_found: usize,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub auto_settled: usize,
    /// Previously-pending reconciliations settled by the closing sweep
    pub settled_existing: usize,
    pub matches: Vec<MatchRecord>,
    pub message: Option<String>,
}

/// Orchestrates matching and settlement for one company at a time.
/// Callers serialize runs per company; the engine holds no locks.
pub struct Reconciler<S: ReconciliationStore> {
    storage: S,
    settlement: SettlementEngine<S>,
    policy: MatchPolicy,
}

impl<S: ReconciliationStore + Clone> Reconciler<S> {
    /// Create a reconciler with the default matching policy
    pub fn new(storage: S) -> Self {
        Self::with_policy(storage, MatchPolicy::default())
    }

    pub fn with_policy(storage: S, policy: MatchPolicy) -> Self {
        Self {
            settlement: SettlementEngine::new(storage.clone()),
            storage,
            policy,
        }
    }

    /// Run automatic reconciliation of unmatched bank transactions
    /// against open invoices for a company
    pub async fn reconcile(&mut self, company_id: &str) -> ReconcileResult<ReconcileSummary> {
        let unmatched = self.storage.unmatched_transactions(company_id).await?;
        let open = self.storage.open_invoices(company_id).await?;

        let mut summary = ReconcileSummary {
            total_transactions: unmatched.len(),
            ..Default::default()
        };

        if unmatched.is_empty() || open.is_empty() {
            summary.message =
                Some("Nothing to reconcile: no unmatched transactions or no open invoices".into());
            info!(company_id, "Nothing to reconcile");
            return Ok(summary);
        }

        info!(
            company_id,
            transactions = unmatched.len(),
            invoices = open.len(),
            "Starting reconciliation run"
        );

        for transaction in &unmatched {
            // Re-read open invoices so settlements earlier in this run
            // are reflected before the next pick
            let invoices = self.storage.open_invoices(company_id).await?;
            let Some(candidate) = matching::best_candidate(transaction, &invoices, &self.policy)
            else {
                continue;
            };

            if candidate.score.confidence < self.policy.settlement_threshold {
                debug!(
                    transaction_id = %transaction.id,
                    confidence = candidate.score.confidence,
                    "Best candidate below settlement threshold"
                );
                continue;
            }

            let invoice = candidate.invoice;

            let prior = self.settlement.settled_total(&invoice.id, None).await?;
            if &prior + &transaction.amount > &invoice.amount + amount_tolerance() {
                warn!(
                    transaction_id = %transaction.id,
                    invoice_id = %invoice.id,
                    "Skipping match that would overpay the invoice"
                );
                continue;
            }

            // A pair carries at most one reconciliation; reuse a record
            // left pending by an earlier manual request
            let reconciliation = match self
                .storage
                .find_reconciliation(&transaction.id, &invoice.id)
                .await?
            {
                Some(existing) => existing,
                None => {
                    let created = Reconciliation::new(
                        &transaction.id,
                        &invoice.id,
                        candidate.score.match_type,
                        candidate.score.confidence,
                    );
                    self.storage.save_reconciliation(&created).await?;
                    created
                }
            };

            // Auto-settlement is unconditional above the threshold
            match self.settlement.settle(&reconciliation.id).await {
                Ok(settled) => {
                    match settled.match_type {
                        MatchType::Exact => summary.exact_matches += 1,
                        _ => summary.fuzzy_matches += 1,
                    }
                    summary.matches_found += 1;
                    summary.auto_settled += 1;
                    summary.matches.push(MatchRecord {
                        transaction_id: transaction.id.clone(),
                        invoice_id: invoice.id.clone(),
                        match_type: settled.match_type,
                        confidence: settled.confidence,
                        auto_settled: true,
                    });
                }
                Err(err) => {
                    error!(
                        reconciliation_id = %reconciliation.id,
                        error = %err,
                        "Failed to settle new reconciliation"
                    );
                }
            }
        }

        // Sweep reconciliations already pending from manual settlement
        // requests through the same settlement path
        for pending in self.storage.pending_reconciliations(company_id).await? {
            match self.settlement.settle(&pending.id).await {
                Ok(_) => summary.settled_existing += 1,
                Err(err) => {
                    error!(
                        reconciliation_id = %pending.id,
                        error = %err,
                        "Failed to settle pending reconciliation"
                    );
                }
            }
        }

        info!(
            company_id,
            matches = summary.matches_found,
            exact = summary.exact_matches,
            fuzzy = summary.fuzzy_matches,
            settled_existing = summary.settled_existing,
            "Reconciliation run complete"
        );

        Ok(summary)
    }

    /// Settle an existing reconciliation by id
    pub async fn settle(&mut self, reconciliation_id: &str) -> ReconcileResult<Reconciliation> {
        self.settlement.settle(reconciliation_id).await
    }

    /// Manually pair a transaction with an invoice, bypassing the
    /// confidence gate; the operator is the confidence signal
    pub async fn manual_settle(
        &mut self,
        transaction_id: &str,
        invoice_id: &str,
    ) -> ReconcileResult<Reconciliation> {
        if let Some(existing) = self
            .storage
            .find_reconciliation(transaction_id, invoice_id)
            .await?
        {
            // Idempotent redirect to the existing record
            return self.settlement.settle(&existing.id).await;
        }

        // Resolve both ends first so a bad id surfaces as NotFound
        // instead of a dangling reconciliation
        let transaction = self
            .storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| ReconcileError::TransactionNotFound(transaction_id.to_string()))?;
        let invoice = self
            .storage
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| ReconcileError::InvoiceNotFound(invoice_id.to_string()))?;

        let reconciliation = Reconciliation::manual(&transaction.id, &invoice.id);
        self.storage.save_reconciliation(&reconciliation).await?;

        info!(
            reconciliation_id = %reconciliation.id,
            transaction_id = %transaction.id,
            invoice_id = %invoice.id,
            "Manual settlement requested"
        );

        self.settlement.settle(&reconciliation.id).await
    }
}
