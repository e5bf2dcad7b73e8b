//! Relationship Loading - Lazy collection proxy and its fetch contract
//!
//! A [`LazyCollection`] stands in for a collection field whose elements have
//! not been fetched. The first [`LazyCollection::resolve`] runs the loader;
//! every later call reuses the result.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::trace;

use super::entity_ref::EntityRef;
use super::metadata::{OrderBy, SortOrder};
use crate::error::OgmResult;
use crate::model::NodeEntity;
use crate::value::Value;

/// Fetches the elements of a lazy relationship collection
#[async_trait]
pub trait RelationshipLoader<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Load the related entities in database traversal order
    async fn load(&self) -> OgmResult<Vec<EntityRef<T>>>;
}

/// Collection proxy that fetches its elements on first access
pub struct LazyCollection<T>
where
    T: Send + Sync + 'static,
{
    loader: Arc<dyn RelationshipLoader<T>>,
    order_by: Option<OrderBy>,
    loaded: OnceCell<Vec<EntityRef<T>>>,
    /// Elements added by wiring before the fetch happened
    pending: Vec<EntityRef<T>>,
}

impl<T> LazyCollection<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(loader: Arc<dyn RelationshipLoader<T>>, order_by: Option<OrderBy>) -> Self {
        Self {
            loader,
            order_by,
            loaded: OnceCell::new(),
            pending: Vec::new(),
        }
    }

    /// Check if the loader has already run successfully
    pub fn is_resolved(&self) -> bool {
        self.loaded.initialized()
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    /// Elements known without fetching: resolved elements, then pending ones.
    ///
    /// A pending element the fetch returned as the same instance appears
    /// only once, at its fetched position.
    pub fn known(&self) -> impl Iterator<Item = &EntityRef<T>> {
        let loaded: &[EntityRef<T>] = match self.loaded.get() {
            Some(loaded) => loaded,
            None => &[],
        };
        let pending = self.pending.iter().filter(move |candidate| {
            !loaded.iter().any(|existing| existing.ptr_eq(candidate))
        });
        loaded.iter().chain(pending)
    }

    pub(crate) fn contains(&self, candidate: &EntityRef<T>) -> bool {
        self.known().any(|existing| existing.ptr_eq(candidate))
    }

    pub(crate) fn push_pending(&mut self, candidate: EntityRef<T>) {
        self.pending.push(candidate);
    }

    pub(crate) fn known_len(&self) -> usize {
        self.known().count()
    }
}

impl<T> LazyCollection<T>
where
    T: NodeEntity,
{
    /// Fetch the elements if needed and return the full collection.
    ///
    /// Fetched elements are sorted by the declared ordering when there is
    /// one. Elements added before resolution follow them, minus any that
    /// the fetch returned as the same instance.
    pub async fn resolve(&self) -> OgmResult<Vec<EntityRef<T>>> {
        self.loaded
            .get_or_try_init(|| async {
                let mut elements = self.loader.load().await?;
                if let Some(order_by) = &self.order_by {
                    sort_by_property(&mut elements, order_by)?;
                }
                trace!(
                    entity = std::any::type_name::<T>(),
                    count = elements.len(),
                    "resolved lazy relationship collection"
                );
                Ok::<_, crate::error::OgmError>(elements)
            })
            .await?;

        Ok(self.known().cloned().collect())
    }
}

fn sort_by_property<T: NodeEntity>(
    elements: &mut Vec<EntityRef<T>>,
    order_by: &OrderBy,
) -> OgmResult<()> {
    let table = T::field_table();
    let mut keyed: Vec<(Value, EntityRef<T>)> = Vec::with_capacity(elements.len());
    for element in elements.drain(..) {
        let key = table.scalar_value(&*element.read()?, order_by.property())?;
        keyed.push((key, element));
    }

    match order_by.order() {
        SortOrder::Asc => keyed.sort_by(|a, b| a.0.sort_cmp(&b.0)),
        SortOrder::Desc => keyed.sort_by(|a, b| b.0.sort_cmp(&a.0)),
    }

    elements.extend(keyed.into_iter().map(|(_, element)| element));
    Ok(())
}

impl<T> fmt::Debug for LazyCollection<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCollection")
            .field("resolved", &self.is_resolved())
            .field("order_by", &self.order_by)
            .field("pending", &self.pending.len())
            .finish()
    }
}
