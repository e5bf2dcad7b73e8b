//! Entity Metadata - Per-type mapping information
//!
//! Records the node label an entity type maps to, which of its fields are
//! persisted, and the relationship descriptors declared on it.

use std::any::type_name;

use crate::error::{OgmError, OgmResult};
use crate::relationships::RelationshipMetadata;
use crate::security::validate_identifier;

use super::core_trait::NodeEntity;

/// Kind of a declared entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Relationship,
}

/// A declared entity field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    pub name: String,
    pub kind: FieldKind,
}

/// Mapping information for one entity type
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    type_name: String,
    label: String,
    fields: Vec<FieldMetadata>,
    relationships: Vec<RelationshipMetadata>,
}

impl EntityMetadata {
    /// Create metadata for `type_name` mapped to nodes labelled `label`.
    ///
    /// The label ends up in query text, so it must be a plain identifier.
    pub fn new(type_name: impl Into<String>, label: impl Into<String>) -> OgmResult<Self> {
        let label = label.into();
        validate_identifier(&label)?;

        Ok(Self {
            type_name: type_name.into(),
            label,
            fields: Vec::new(),
            relationships: Vec::new(),
        })
    }

    /// Metadata for `E`, named after its Rust type path
    pub fn for_entity<E: NodeEntity>(label: impl Into<String>) -> OgmResult<Self> {
        Self::new(type_name::<E>(), label)
    }

    /// Declare a persisted scalar field
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldMetadata {
            name: name.into(),
            kind: FieldKind::Scalar,
        });
        self
    }

    /// Declare a relationship field through its descriptor
    pub fn with_relationship(mut self, relationship: RelationshipMetadata) -> Self {
        self.fields.push(FieldMetadata {
            name: relationship.field_name().to_string(),
            kind: FieldKind::Relationship,
        });
        self.relationships.push(relationship);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Names of declared scalar fields, in declaration order
    pub fn scalar_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.kind == FieldKind::Scalar)
            .map(|field| field.name.as_str())
    }

    pub fn relationships(&self) -> &[RelationshipMetadata] {
        &self.relationships
    }

    /// Relationship descriptor governing `field_name`
    pub fn relationship(&self, field_name: &str) -> Option<&RelationshipMetadata> {
        self.relationships
            .iter()
            .find(|relationship| relationship.field_name() == field_name)
    }

    /// Check that every declared field is reachable through `E`'s field table
    pub fn validate_against<E: NodeEntity>(&self) -> OgmResult<()> {
        let table = E::field_table();

        for field in &self.fields {
            let declared = match field.kind {
                FieldKind::Scalar => table.has_scalar(&field.name),
                FieldKind::Relationship => table.has_relationship(&field.name),
            };
            if !declared {
                return Err(OgmError::UndeclaredField {
                    entity: self.type_name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        for relationship in &self.relationships {
            if relationship.owner_type() != self.type_name {
                return Err(OgmError::mapping(format!(
                    "Relationship '{}' is declared on '{}', not on '{}'",
                    relationship.field_name(),
                    relationship.owner_type(),
                    self.type_name
                )));
            }
        }

        Ok(())
    }
}
