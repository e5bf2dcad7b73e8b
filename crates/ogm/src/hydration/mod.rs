//! Result Hydration - Converting query records to entity instances
//!
//! Instances are created through the entity's field table, so no user
//! constructor or `Default` impl ever runs. Scalar fields are copied from
//! the primary node only when the node carries a value for them; the
//! identity is always taken from the node.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::config::OgmConfig;
use crate::driver::{QueryResult, Record};
use crate::error::OgmResult;
use crate::model::{EntityMetadata, NodeEntity};

/// Builds entities of type `E` from records
pub struct Hydrator<E> {
    metadata: Arc<EntityMetadata>,
    config: OgmConfig,
    _phantom: PhantomData<fn() -> E>,
}

impl<E> Hydrator<E>
where
    E: NodeEntity,
{
    /// Create a hydrator after checking `metadata` against `E`'s field table
    pub fn new(metadata: Arc<EntityMetadata>, config: OgmConfig) -> OgmResult<Self> {
        metadata.validate_against::<E>()?;
        config.validate()?;

        Ok(Self {
            metadata,
            config,
            _phantom: PhantomData,
        })
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &OgmConfig {
        &self.config
    }

    /// Hydrate one entity from the primary node of `record`
    pub fn hydrate(&self, record: &Record) -> OgmResult<E> {
        let node = record.node(&self.config.node_variable)?;
        let table = E::field_table();
        let mut entity = table.instantiate();

        for field in self.metadata.scalar_fields() {
            if let Some(value) = node.value(field) {
                table.set_scalar(&mut entity, field, value.clone())?;
            }
        }

        table.set_identity(&mut entity, node.identity());
        Ok(entity)
    }

    /// Hydrate one entity per record, keeping record order
    pub fn hydrate_result_set(&self, result: &QueryResult) -> OgmResult<Vec<E>> {
        let entities = result
            .records()
            .iter()
            .map(|record| self.hydrate(record))
            .collect::<OgmResult<Vec<E>>>()?;

        debug!(
            entity = %self.metadata.type_name(),
            count = entities.len(),
            "hydrated result set"
        );
        Ok(entities)
    }
}

impl<E> Clone for Hydrator<E> {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            config: self.config.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Hydrator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hydrator")
            .field("entity", &self.metadata.type_name())
            .field("node_variable", &self.config.node_variable)
            .finish()
    }
}
