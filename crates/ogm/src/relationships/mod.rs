//! Relationships Module - Relationship metadata, field values and collections

pub mod containers;
pub mod entity_ref;
pub mod field;
pub mod loader;
pub mod metadata;

// Re-export main types
pub use containers::*;
pub use entity_ref::*;
pub use field::*;
pub use loader::*;
pub use metadata::*;
