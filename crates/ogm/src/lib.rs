//! # nodemap-ogm: Hydration core for a graph object mapper
//!
//! Maps graph nodes onto plain Rust structs. Entity types expose their
//! fields through a field table, relationship fields are described by
//! immutable relationship metadata, and repositories hydrate query records
//! into entities without running user constructors.
//!
//! The crate does not talk to a database itself: queries go through the
//! [`GraphDriver`] trait.

pub mod config;
pub mod driver;
pub mod error;
pub mod hydration;
pub mod model;
pub mod query;
pub mod relationships;
pub mod repository;
pub mod security;
pub mod value;


// Re-export core traits and types
pub use config::*;
pub use driver::*;
pub use error::*;
pub use hydration::Hydrator;
pub use model::{EntityMetadata, FieldKind, FieldMetadata, FieldTable, FieldTableBuilder, NodeEntity};
pub use query::CypherQuery;
pub use relationships::*;
pub use repository::Repository;
pub use value::*;
