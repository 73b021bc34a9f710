//! Content modeling.
//!
//! This module provides:
//! - Block schemas and decoded block trees (struct and stream composition)
//! - Typed page field values and the field visitor
//! - Rich-text sanitization

pub mod blocks;
pub mod fields;
pub mod sanitize;
pub mod schemas;

pub use blocks::{BlockDef, BlockError, BlockIssue, BlockValue, StreamChild, StreamDef, StreamValue};
pub use fields::{FieldClass, FieldValue, FieldVisitor, UrlCollector};
pub use sanitize::sanitize_html;
pub use schemas::stream_schema;
