//! Relationship Fields - Typed field values and their type-erased view
//!
//! Entity structs declare relationship fields as [`RelationshipValue<T>`].
//! The field table hands them to relationship metadata as
//! `dyn RelationshipSlot`, which is enough to inspect and initialise a field
//! without knowing its target type.

use std::any::Any;
use std::fmt;

use super::containers::{EagerCollection, RelationshipCollection};
use super::entity_ref::EntityRef;

/// Value of a relationship field on an entity
pub enum RelationshipValue<T>
where
    T: Send + Sync + 'static,
{
    /// Not touched by the mapper or by user code yet
    Unset,
    Single(EntityRef<T>),
    Collection(RelationshipCollection<T>),
}

impl<T> RelationshipValue<T>
where
    T: Send + Sync + 'static,
{
    pub fn is_unset(&self) -> bool {
        matches!(self, RelationshipValue::Unset)
    }

    pub fn as_single(&self) -> Option<&EntityRef<T>> {
        match self {
            RelationshipValue::Single(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&RelationshipCollection<T>> {
        match self {
            RelationshipValue::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut RelationshipCollection<T>> {
        match self {
            RelationshipValue::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

impl<T> Default for RelationshipValue<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        RelationshipValue::Unset
    }
}

impl<T> From<Vec<EntityRef<T>>> for RelationshipValue<T>
where
    T: Send + Sync + 'static,
{
    fn from(elements: Vec<EntityRef<T>>) -> Self {
        RelationshipValue::Collection(RelationshipCollection::Sequence(elements))
    }
}

impl<T> fmt::Debug for RelationshipValue<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipValue::Unset => f.write_str("Unset"),
            RelationshipValue::Single(entity) => f.debug_tuple("Single").field(entity).finish(),
            RelationshipValue::Collection(collection) => fmt::Debug::fmt(collection, f),
        }
    }
}

/// Shape of a relationship field's current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unset,
    Single,
    Collection,
}

/// Type-erased access to a relationship field
pub trait RelationshipSlot: Send + Sync {
    fn state(&self) -> SlotState;

    /// Replace the current value with an empty eager collection
    fn install_empty_collection(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> RelationshipSlot for RelationshipValue<T>
where
    T: Send + Sync + 'static,
{
    fn state(&self) -> SlotState {
        match self {
            RelationshipValue::Unset => SlotState::Unset,
            RelationshipValue::Single(_) => SlotState::Single,
            RelationshipValue::Collection(_) => SlotState::Collection,
        }
    }

    fn install_empty_collection(&mut self) {
        *self = RelationshipValue::Collection(RelationshipCollection::Eager(EagerCollection::new()));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
