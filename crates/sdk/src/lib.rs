//! Folio SDK
//!
//! Shared value types for the Folio content backend: field declarations,
//! reference targets, and ordered child records. The kernel builds its page
//! catalog from these.

pub mod types;
