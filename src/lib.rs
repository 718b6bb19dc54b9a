//! # Reconcile Core
//!
//! A reconciliation and settlement engine for a GST-aware bookkeeping
//! backend: matches unmatched bank transactions against open invoices,
//! scores each candidate pair, auto-settles above a confidence threshold,
//! and posts the double-entry journal consequences.
//!
//! ## Features
//!
//! - **Matching strategies**: independent exact, fuzzy, and
//!   partial-payment heuristics with auditable confidence scoring
//! - **Reconciliation orchestrator**: best-match selection per transaction
//!   with a 0.70 auto-settlement gate and manual override
//! - **Settlement engine**: idempotent settlement with overpayment and
//!   double-settlement guards
//! - **Journal posting**: GST-aware receipt/payment entries that always
//!   satisfy the accounting identity (debits = credits)
//! - **Storage abstraction**: database-agnostic design with a trait-based
//!   unit of work
//!
//! ## Quick Start
//!
//! ```rust
//! use reconcile_core::{MemoryStorage, Reconciler};
//!
//! # async fn run() -> reconcile_core::ReconcileResult<()> {
//! let storage = MemoryStorage::new();
//! let mut reconciler = Reconciler::new(storage);
//! let summary = reconciler.reconcile("company-1").await?;
//! println!("settled {} of {}", summary.auto_settled, summary.total_transactions);
//! # Ok(())
//! # }
//! ```

pub mod journal;
pub mod reconciliation;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use journal::*;
pub use reconciliation::*;
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStorage;

// Re-export the chart constants for callers that post their own entries
pub use journal::accounts;
