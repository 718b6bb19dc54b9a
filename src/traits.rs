//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for the reconciliation engine
///
/// This trait allows the engine to work with any persistence backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these
/// methods. The instance handed to the engine doubles as the unit of
/// work: callers that want a whole reconciliation run to commit
/// atomically should pass a store bound to one transaction.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Save a bank transaction to storage
    async fn save_transaction(&mut self, transaction: &BankTransaction) -> ReconcileResult<()>;

    /// Get a bank transaction by ID
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> ReconcileResult<Option<BankTransaction>>;

    /// List a company's transactions still in `Unmatched` status, in load
    /// (primary-key) order
    async fn unmatched_transactions(
        &self,
        company_id: &str,
    ) -> ReconcileResult<Vec<BankTransaction>>;

    /// Update a bank transaction
    async fn update_transaction(&mut self, transaction: &BankTransaction) -> ReconcileResult<()>;

    /// Save an invoice to storage
    async fn save_invoice(&mut self, invoice: &Invoice) -> ReconcileResult<()>;

    /// Get an invoice by ID
    async fn get_invoice(&self, invoice_id: &str) -> ReconcileResult<Option<Invoice>>;

    /// List a company's invoices in `Pending` or `PartiallyPaid` status
    async fn open_invoices(&self, company_id: &str) -> ReconcileResult<Vec<Invoice>>;

    /// Update an invoice
    async fn update_invoice(&mut self, invoice: &Invoice) -> ReconcileResult<()>;

    /// Save a reconciliation record
    async fn save_reconciliation(&mut self, reconciliation: &Reconciliation)
        -> ReconcileResult<()>;

    /// Get a reconciliation by ID
    async fn get_reconciliation(
        &self,
        reconciliation_id: &str,
    ) -> ReconcileResult<Option<Reconciliation>>;

    /// Find the reconciliation for a (transaction, invoice) pair, if any
    async fn find_reconciliation(
        &self,
        transaction_id: &str,
        invoice_id: &str,
    ) -> ReconcileResult<Option<Reconciliation>>;

    /// List a company's reconciliations still in `Pending` status
    async fn pending_reconciliations(
        &self,
        company_id: &str,
    ) -> ReconcileResult<Vec<Reconciliation>>;

    /// List all `Settled` reconciliations referencing an invoice
    async fn settled_reconciliations_for_invoice(
        &self,
        invoice_id: &str,
    ) -> ReconcileResult<Vec<Reconciliation>>;

    /// Update a reconciliation record
    async fn update_reconciliation(
        &mut self,
        reconciliation: &Reconciliation,
    ) -> ReconcileResult<()>;

    /// Persist a journal entry with its lines
    async fn save_journal_entry(&mut self, entry: &JournalEntry) -> ReconcileResult<()>;

    /// Find a company's journal entry by its reference string
    async fn find_journal_entry_by_reference(
        &self,
        company_id: &str,
        reference: &str,
    ) -> ReconcileResult<Option<JournalEntry>>;

    /// List all journal entries for a company (consumed by report generation)
    async fn journal_entries(&self, company_id: &str) -> ReconcileResult<Vec<JournalEntry>>;
}
