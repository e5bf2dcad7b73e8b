//! Entity References - Shared handles to hydrated entities
//!
//! Relationship collections hold [`EntityRef`]s rather than entities so the
//! same in-memory instance can sit in several collections at once. Two
//! references are the same entity only when they share an allocation; the
//! entity's field values are never compared.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{OgmError, OgmResult};

/// Shared, identity-compared handle to an entity instance
pub struct EntityRef<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> EntityRef<T> {
    pub fn new(entity: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(entity)),
        }
    }

    /// Check whether both handles point at the same in-memory instance
    pub fn ptr_eq(&self, other: &EntityRef<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn read(&self) -> OgmResult<RwLockReadGuard<'_, T>> {
        self.inner
            .read()
            .map_err(|_| OgmError::Poisoned(type_name::<T>().to_string()))
    }

    pub fn write(&self) -> OgmResult<RwLockWriteGuard<'_, T>> {
        self.inner
            .write()
            .map_err(|_| OgmError::Poisoned(type_name::<T>().to_string()))
    }
}

impl<T> Clone for EntityRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> From<T> for EntityRef<T> {
    fn from(entity: T) -> Self {
        EntityRef::new(entity)
    }
}

// Bidirectional relationships form cycles, so only the address is printed.
impl<T> fmt::Debug for EntityRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef")
            .field(&Arc::as_ptr(&self.inner))
            .finish()
    }
}
