//! Relationship Containers - Collection representations for to-many fields
//!
//! A collection field holds one of three representations: a plain sequence
//! assigned by user code, the eager collection the mapper installs, or a
//! lazy proxy. All three count as "already a collection" and share
//! identity-based membership.

use std::fmt;
use std::ops::Deref;

use super::entity_ref::EntityRef;
use super::loader::LazyCollection;

/// Collection the mapper installs on an unset to-many field
pub struct EagerCollection<T> {
    elements: Vec<EntityRef<T>>,
}

impl<T> EagerCollection<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn as_slice(&self) -> &[EntityRef<T>] {
        &self.elements
    }

    pub(crate) fn push(&mut self, entity: EntityRef<T>) {
        self.elements.push(entity);
    }
}

impl<T> Default for EagerCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for EagerCollection<T> {
    type Target = [EntityRef<T>];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl<T> From<Vec<EntityRef<T>>> for EagerCollection<T> {
    fn from(elements: Vec<EntityRef<T>>) -> Self {
        Self { elements }
    }
}

impl<T> fmt::Debug for EagerCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

/// Value of a to-many relationship field
pub enum RelationshipCollection<T>
where
    T: Send + Sync + 'static,
{
    /// Plain sequence assigned outside the mapper
    Sequence(Vec<EntityRef<T>>),
    Eager(EagerCollection<T>),
    Lazy(LazyCollection<T>),
}

impl<T> RelationshipCollection<T>
where
    T: Send + Sync + 'static,
{
    /// Check whether `candidate` is already an element, by instance identity.
    ///
    /// For an unresolved lazy collection only elements added so far are
    /// considered.
    pub fn contains(&self, candidate: &EntityRef<T>) -> bool {
        match self {
            RelationshipCollection::Sequence(elements) => {
                elements.iter().any(|existing| existing.ptr_eq(candidate))
            }
            RelationshipCollection::Eager(eager) => {
                eager.iter().any(|existing| existing.ptr_eq(candidate))
            }
            RelationshipCollection::Lazy(lazy) => lazy.contains(candidate),
        }
    }

    /// Append `candidate` unless the same instance is already present.
    ///
    /// Returns whether the collection grew.
    pub fn add_if_absent(&mut self, candidate: EntityRef<T>) -> bool {
        if self.contains(&candidate) {
            return false;
        }

        match self {
            RelationshipCollection::Sequence(elements) => elements.push(candidate),
            RelationshipCollection::Eager(eager) => eager.push(candidate),
            RelationshipCollection::Lazy(lazy) => lazy.push_pending(candidate),
        }
        true
    }

    /// Number of elements currently held in memory
    pub fn len(&self) -> usize {
        match self {
            RelationshipCollection::Sequence(elements) => elements.len(),
            RelationshipCollection::Eager(eager) => eager.len(),
            RelationshipCollection::Lazy(lazy) => lazy.known_len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements currently held in memory, in collection order
    pub fn to_vec(&self) -> Vec<EntityRef<T>> {
        match self {
            RelationshipCollection::Sequence(elements) => elements.clone(),
            RelationshipCollection::Eager(eager) => eager.to_vec(),
            RelationshipCollection::Lazy(lazy) => lazy.known().cloned().collect(),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, RelationshipCollection::Lazy(_))
    }
}

impl<T> fmt::Debug for RelationshipCollection<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipCollection::Sequence(elements) => {
                f.debug_tuple("Sequence").field(elements).finish()
            }
            RelationshipCollection::Eager(eager) => f.debug_tuple("Eager").field(eager).finish(),
            RelationshipCollection::Lazy(lazy) => f.debug_tuple("Lazy").field(lazy).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag;

    #[test]
    fn test_add_if_absent_uses_instance_identity() {
        let mut collection = RelationshipCollection::Eager(EagerCollection::new());
        let rust = EntityRef::new(Tag);
        let graph = EntityRef::new(Tag);

        assert!(collection.add_if_absent(rust.clone()));
        assert!(!collection.add_if_absent(rust.clone()));
        assert!(collection.add_if_absent(graph));
        assert_eq!(collection.len(), 2);
        assert!(collection.contains(&rust));
    }

    #[test]
    fn test_sequence_keeps_order() {
        let first = EntityRef::new(Tag);
        let second = EntityRef::new(Tag);
        let mut collection = RelationshipCollection::Sequence(vec![first.clone()]);

        collection.add_if_absent(second.clone());
        let elements = collection.to_vec();
        assert!(elements[0].ptr_eq(&first));
        assert!(elements[1].ptr_eq(&second));
    }
}
