//! Repository - Read paths for one entity type
//!
//! A repository issues lookup queries through a [`GraphDriver`] and turns
//! the returned records into entities with its [`Hydrator`].

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::OgmConfig;
use crate::driver::{GraphDriver, QueryResult, Record};
use crate::error::OgmResult;
use crate::hydration::Hydrator;
use crate::model::{EntityMetadata, NodeEntity};
use crate::query::CypherQuery;
use crate::value::Value;

/// Entity repository bound to a driver
pub struct Repository<E, D: ?Sized> {
    hydrator: Hydrator<E>,
    driver: Arc<D>,
}

impl<E, D> Repository<E, D>
where
    E: NodeEntity,
    D: GraphDriver + ?Sized,
{
    /// Create a repository; mapping and configuration defects fail here
    pub fn new(metadata: Arc<EntityMetadata>, driver: Arc<D>, config: OgmConfig) -> OgmResult<Self> {
        Ok(Self {
            hydrator: Hydrator::new(metadata, config)?,
            driver,
        })
    }

    pub fn metadata(&self) -> &EntityMetadata {
        self.hydrator.metadata()
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    /// Load every node carrying the entity's label
    pub async fn find_all(&self) -> OgmResult<Vec<E>> {
        let query = CypherQuery::match_all(
            self.metadata().label(),
            &self.hydrator.config().node_variable,
        )?;
        self.execute(query).await
    }

    /// Load every node whose `key` property equals `value`
    pub async fn find_by(&self, key: &str, value: impl Into<Value>) -> OgmResult<Vec<E>> {
        let config = self.hydrator.config();
        let query = CypherQuery::match_by(
            self.metadata().label(),
            &config.node_variable,
            key,
            value.into(),
            config.parameter_style,
        )?;
        self.execute(query).await
    }

    /// Hydrate one entity from a record
    pub fn hydrate(&self, record: &Record) -> OgmResult<E> {
        self.hydrator.hydrate(record)
    }

    /// Hydrate one entity per record, in record order
    pub fn hydrate_result_set(&self, result: &QueryResult) -> OgmResult<Vec<E>> {
        self.hydrator.hydrate_result_set(result)
    }

    async fn execute(&self, query: CypherQuery) -> OgmResult<Vec<E>> {
        debug!(query = %query, "running repository query");

        let (text, parameters) = query.into_parts();
        let result = self.driver.run(&text, parameters).await?;

        debug!(records = result.len(), "query returned");
        self.hydrate_result_set(&result)
    }
}

impl<E, D: ?Sized> fmt::Debug for Repository<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("hydrator", &self.hydrator)
            .finish()
    }
}
