//! Model System - Entity types and their mapping information
//!
//! - `core_trait`: the `NodeEntity` trait implemented by mapped types
//! - `field_table`: name-indexed field accessors and blank instantiation
//! - `metadata`: labels, declared fields and relationship descriptors

pub mod core_trait;
pub mod field_table;
pub mod metadata;

// Re-export main types and traits for convenience
pub use core_trait::NodeEntity;
pub use field_table::{FieldTable, FieldTableBuilder};
pub use metadata::{EntityMetadata, FieldKind, FieldMetadata};
