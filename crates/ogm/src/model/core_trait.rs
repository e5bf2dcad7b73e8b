//! Core Entity Trait - Base definition for node entities
//!
//! An entity type grants the mapper access to its fields through a
//! [`FieldTable`] built once per type. The mapper never calls the type's
//! own constructors or `Default` impl.

use super::field_table::FieldTable;

/// Core trait for types hydrated from graph nodes
///
/// ```ignore
/// impl NodeEntity for Person {
///     fn field_table() -> &'static FieldTable<Self> {
///         static TABLE: Lazy<FieldTable<Person>> = Lazy::new(|| {
///             FieldTable::<Person>::builder(
///                 || Person { id: None, name: None, friends: RelationshipValue::Unset },
///                 |p| &mut p.id,
///             )
///             .scalar("name", |p| &p.name, |p| &mut p.name)
///             .relationship("friends", |p| &p.friends, |p| &mut p.friends)
///             .build()
///         });
///         &TABLE
///     }
/// }
/// ```
pub trait NodeEntity: Send + Sync + Sized + 'static {
    /// Field accessors for this type
    fn field_table() -> &'static FieldTable<Self>;
}
