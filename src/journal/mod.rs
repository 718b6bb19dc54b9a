//! Journal entry construction: chart constants, narration text, and the
//! pure posting builders used by invoice ingestion and settlement

pub mod accounts;
pub mod narration;
pub mod posting;

pub use narration::*;
pub use posting::*;
