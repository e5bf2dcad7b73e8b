//! Graph Driver Contract
//!
//! The mapper never talks to a database directly. A [`GraphDriver`] runs
//! query text with named parameters and returns ordered records; each
//! record binds pattern variables to nodes or plain values.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{OgmError, OgmResult};
use crate::value::{NodeId, Value};

/// Named query parameters
pub type Parameters = HashMap<String, Value>;

/// Abstract graph database driver
#[async_trait]
pub trait GraphDriver: Send + Sync {
    /// Execute a query and return its records in result order.
    ///
    /// Failures are reported as [`OgmError::Driver`] and reach the caller
    /// unchanged.
    async fn run(&self, query: &str, parameters: Parameters) -> OgmResult<QueryResult>;
}

/// A node returned by a query
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    labels: Vec<String>,
    properties: HashMap<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            properties: HashMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Database identity of the node
    pub fn identity(&self) -> NodeId {
        self.id
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Check if the node carries a property
    pub fn has_value(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Get a property value, if present
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }
}

/// Value bound to a pattern variable in a record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Node(Node),
    Scalar(Value),
}

/// One row of a query result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, RecordValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, variable: impl Into<String>, node: Node) -> Self {
        self.values.insert(variable.into(), RecordValue::Node(node));
        self
    }

    pub fn with_value(mut self, variable: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .insert(variable.into(), RecordValue::Scalar(value.into()));
        self
    }

    /// Get the raw value bound to a variable
    pub fn get(&self, variable: &str) -> Option<&RecordValue> {
        self.values.get(variable)
    }

    /// Get the node bound to a variable.
    ///
    /// A missing variable, or one bound to a plain value, means the record
    /// does not match the query the caller built.
    pub fn node(&self, variable: &str) -> OgmResult<&Node> {
        match self.values.get(variable) {
            Some(RecordValue::Node(node)) => Ok(node),
            _ => Err(OgmError::MissingPrimaryValue {
                variable: variable.to_string(),
            }),
        }
    }
}

/// Ordered records returned by a driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    records: Vec<Record>,
}

impl QueryResult {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for QueryResult {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
