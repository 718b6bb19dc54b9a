//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying maps, so an engine holding a clone
/// observes writes made through the original handle.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    transactions: Arc<RwLock<HashMap<String, BankTransaction>>>,
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
    reconciliations: Arc<RwLock<HashMap<String, Reconciliation>>>,
    journal_entries: Arc<RwLock<HashMap<String, JournalEntry>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
            invoices: Arc::new(RwLock::new(HashMap::new())),
            reconciliations: Arc::new(RwLock::new(HashMap::new())),
            journal_entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.transactions.write().unwrap().clear();
        self.invoices.write().unwrap().clear();
        self.reconciliations.write().unwrap().clear();
        self.journal_entries.write().unwrap().clear();
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReconciliationStore for MemoryStorage {
    async fn save_transaction(&mut self, transaction: &BankTransaction) -> ReconcileResult<()> {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> ReconcileResult<Option<BankTransaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .get(transaction_id)
            .cloned())
    }

    async fn unmatched_transactions(
        &self,
        company_id: &str,
    ) -> ReconcileResult<Vec<BankTransaction>> {
        let transactions = self.transactions.read().unwrap();
        let mut filtered: Vec<BankTransaction> = transactions
            .values()
            .filter(|txn| {
                txn.company_id == company_id && txn.status == TransactionStatus::Unmatched
            })
            .cloned()
            .collect();
        // Primary-key order stands in for load order
        filtered.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(filtered)
    }

    async fn update_transaction(&mut self, transaction: &BankTransaction) -> ReconcileResult<()> {
        if self
            .transactions
            .read()
            .unwrap()
            .contains_key(&transaction.id)
        {
            self.transactions
                .write()
                .unwrap()
                .insert(transaction.id.clone(), transaction.clone());
            Ok(())
        } else {
            Err(ReconcileError::TransactionNotFound(transaction.id.clone()))
        }
    }

    async fn save_invoice(&mut self, invoice: &Invoice) -> ReconcileResult<()> {
        self.invoices
            .write()
            .unwrap()
            .insert(invoice.id.clone(), invoice.clone());
        Ok(())
    }

    async fn get_invoice(&self, invoice_id: &str) -> ReconcileResult<Option<Invoice>> {
        Ok(self.invoices.read().unwrap().get(invoice_id).cloned())
    }

    async fn open_invoices(&self, company_id: &str) -> ReconcileResult<Vec<Invoice>> {
        let invoices = self.invoices.read().unwrap();
        let mut filtered: Vec<Invoice> = invoices
            .values()
            .filter(|invoice| invoice.company_id == company_id && invoice.is_open())
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(filtered)
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> ReconcileResult<()> {
        if self.invoices.read().unwrap().contains_key(&invoice.id) {
            self.invoices
                .write()
                .unwrap()
                .insert(invoice.id.clone(), invoice.clone());
            Ok(())
        } else {
            Err(ReconcileError::InvoiceNotFound(invoice.id.clone()))
        }
    }

    async fn save_reconciliation(
        &mut self,
        reconciliation: &Reconciliation,
    ) -> ReconcileResult<()> {
        self.reconciliations
            .write()
            .unwrap()
            .insert(reconciliation.id.clone(), reconciliation.clone());
        Ok(())
    }

    async fn get_reconciliation(
        &self,
        reconciliation_id: &str,
    ) -> ReconcileResult<Option<Reconciliation>> {
        Ok(self
            .reconciliations
            .read()
            .unwrap()
            .get(reconciliation_id)
            .cloned())
    }

    async fn find_reconciliation(
        &self,
        transaction_id: &str,
        invoice_id: &str,
    ) -> ReconcileResult<Option<Reconciliation>> {
        Ok(self
            .reconciliations
            .read()
            .unwrap()
            .values()
            .find(|rec| rec.transaction_id == transaction_id && rec.invoice_id == invoice_id)
            .cloned())
    }

    async fn pending_reconciliations(
        &self,
        company_id: &str,
    ) -> ReconcileResult<Vec<Reconciliation>> {
        let transactions = self.transactions.read().unwrap();
        let reconciliations = self.reconciliations.read().unwrap();
        let mut filtered: Vec<Reconciliation> = reconciliations
            .values()
            .filter(|rec| {
                rec.status == ReconciliationStatus::Pending
                    && transactions
                        .get(&rec.transaction_id)
                        .is_some_and(|txn| txn.company_id == company_id)
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(filtered)
    }

    async fn settled_reconciliations_for_invoice(
        &self,
        invoice_id: &str,
    ) -> ReconcileResult<Vec<Reconciliation>> {
        Ok(self
            .reconciliations
            .read()
            .unwrap()
            .values()
            .filter(|rec| {
                rec.invoice_id == invoice_id && rec.status == ReconciliationStatus::Settled
            })
            .cloned()
            .collect())
    }

    async fn update_reconciliation(
        &mut self,
        reconciliation: &Reconciliation,
    ) -> ReconcileResult<()> {
        if self
            .reconciliations
            .read()
            .unwrap()
            .contains_key(&reconciliation.id)
        {
            self.reconciliations
                .write()
                .unwrap()
                .insert(reconciliation.id.clone(), reconciliation.clone());
            Ok(())
        } else {
            Err(ReconcileError::ReconciliationNotFound(
                reconciliation.id.clone(),
            ))
        }
    }

    async fn save_journal_entry(&mut self, entry: &JournalEntry) -> ReconcileResult<()> {
        self.journal_entries
            .write()
            .unwrap()
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn find_journal_entry_by_reference(
        &self,
        company_id: &str,
        reference: &str,
    ) -> ReconcileResult<Option<JournalEntry>> {
        Ok(self
            .journal_entries
            .read()
            .unwrap()
            .values()
            .find(|entry| {
                entry.company_id == company_id && entry.reference.as_deref() == Some(reference)
            })
            .cloned())
    }

    async fn journal_entries(&self, company_id: &str) -> ReconcileResult<Vec<JournalEntry>> {
        let entries = self.journal_entries.read().unwrap();
        let mut filtered: Vec<JournalEntry> = entries
            .values()
            .filter(|entry| entry.company_id == company_id)
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(filtered)
    }
}
