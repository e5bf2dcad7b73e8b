//! Relationship Metadata System - Descriptors for relationship-typed fields
//!
//! A [`RelationshipMetadata`] is built once from a field's relationship
//! declaration and never changes afterwards. Besides read accessors it
//! carries the operations the wiring step uses on live entities: reading
//! and writing the governed field, initialising a to-many field and adding
//! to it without duplicating instances.

use std::any::type_name;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::entity_ref::EntityRef;
use super::field::{RelationshipValue, SlotState};
use crate::error::{OgmError, OgmResult};
use crate::model::NodeEntity;

/// Direction of a relationship as seen from the owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Outgoing => "OUTGOING",
            Direction::Incoming => "INCOMING",
            Direction::Both => "BOTH",
        }
    }
}

impl FromStr for Direction {
    type Err = OgmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OUTGOING" => Ok(Direction::Outgoing),
            "INCOMING" => Ok(Direction::Incoming),
            "BOTH" => Ok(Direction::Both),
            _ => Err(OgmError::mapping(format!(
                "The direction \"{}\" is not valid",
                s
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a relationship field holds one related entity or many
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    Single,
    Collection,
}

/// Sort direction of an ordering rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = OgmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(OgmError::mapping(format!("The order \"{}\" is not valid", s))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated ordering rule of a to-many relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    property: String,
    order: SortOrder,
}

impl OrderBy {
    pub fn new(property: impl Into<String>, order: SortOrder) -> Self {
        Self {
            property: property.into(),
            order,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

/// Ordering declaration as written on the field, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByMapping {
    pub property: String,
    pub order: String,
}

impl OrderByMapping {
    pub fn new(property: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            order: order.into(),
        }
    }
}

/// Relationship declaration as written on the field, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipMapping {
    /// Graph relationship type, e.g. `FRIENDS_WITH`
    pub relation_type: String,
    pub direction: String,
    /// Target entity type, absolute or relative to the owner's module
    pub target_entity: String,
    pub collection: bool,
    pub mapped_by: Option<String>,
    pub relationship_entity: Option<String>,
}

impl RelationshipMapping {
    pub fn new(
        relation_type: impl Into<String>,
        direction: impl Into<String>,
        target_entity: impl Into<String>,
    ) -> Self {
        Self {
            relation_type: relation_type.into(),
            direction: direction.into(),
            target_entity: target_entity.into(),
            collection: false,
            mapped_by: None,
            relationship_entity: None,
        }
    }

    /// Declare the field as a to-many collection
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn with_mapped_by(mut self, field: impl Into<String>) -> Self {
        self.mapped_by = Some(field.into());
        self
    }

    pub fn with_relationship_entity(mut self, entity: impl Into<String>) -> Self {
        self.relationship_entity = Some(entity.into());
        self
    }
}

/// Resolve a type name declared on `owner_type`.
///
/// Names containing `::` are taken as absolute paths. Anything else lives
/// in the owner's module: `Movie` declared on `app::model::Person` resolves
/// to `app::model::Movie`.
pub fn resolve_type_name(name: &str, owner_type: &str) -> String {
    if name.contains("::") {
        return name.trim_start_matches("::").to_string();
    }

    match owner_type.rsplit_once("::") {
        Some((module, _)) => format!("{}::{}", module, name),
        None => name.to_string(),
    }
}

/// Immutable descriptor of one relationship field on one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipMetadata {
    owner_type: String,
    field_name: String,
    relation_type: String,
    direction: Direction,
    cardinality: Cardinality,
    target_entity: String,
    relationship_entity: Option<String>,
    mapped_by: Option<String>,
    lazy: bool,
    order_by: Option<OrderBy>,
}

impl RelationshipMetadata {
    /// Build a descriptor from a field's declarations.
    ///
    /// Fails with [`OgmError::Mapping`] when the direction or the ordering
    /// direction is not one of the accepted values.
    pub fn new(
        owner_type: impl Into<String>,
        field_name: impl Into<String>,
        mapping: RelationshipMapping,
        lazy: bool,
        order_by: Option<OrderByMapping>,
    ) -> OgmResult<Self> {
        let owner_type = owner_type.into();
        let direction: Direction = mapping.direction.parse()?;
        let order_by = match order_by {
            Some(raw) => Some(OrderBy::new(raw.property, raw.order.parse::<SortOrder>()?)),
            None => None,
        };

        let cardinality = if mapping.collection {
            Cardinality::Collection
        } else {
            Cardinality::Single
        };

        Ok(Self {
            target_entity: resolve_type_name(&mapping.target_entity, &owner_type),
            relationship_entity: mapping
                .relationship_entity
                .as_deref()
                .map(|name| resolve_type_name(name, &owner_type)),
            owner_type,
            field_name: field_name.into(),
            relation_type: mapping.relation_type,
            direction,
            cardinality,
            mapped_by: mapping.mapped_by,
            lazy,
            order_by,
        })
    }

    /// Declaring entity type
    pub fn owner_type(&self) -> &str {
        &self.owner_type
    }

    /// Name of the governed field
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Graph relationship type label
    pub fn relation_type(&self) -> &str {
        &self.relation_type
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Fully resolved target entity type
    pub fn target_entity(&self) -> &str {
        &self.target_entity
    }

    /// Fully resolved relationship-entity type, when the edge carries properties
    pub fn relationship_entity_class(&self) -> Option<&str> {
        self.relationship_entity.as_deref()
    }

    pub fn is_relationship_entity(&self) -> bool {
        self.relationship_entity.is_some()
    }

    pub fn is_collection(&self) -> bool {
        self.cardinality == Cardinality::Collection
    }

    /// Laziness only applies to collections
    pub fn is_lazy(&self) -> bool {
        self.is_collection() && self.lazy
    }

    pub fn has_mapped_by_property(&self) -> bool {
        self.mapped_by.is_some()
    }

    /// Inverse-side field on the target type
    pub fn mapped_by_property(&self) -> Option<&str> {
        self.mapped_by.as_deref()
    }

    pub fn has_order_by(&self) -> bool {
        self.order_by.is_some()
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn order_by_property(&self) -> Option<&str> {
        self.order_by.as_ref().map(OrderBy::property)
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order_by.as_ref().map(OrderBy::order)
    }

    /// Read the governed field on `entity`
    pub fn value<'a, E, T>(&self, entity: &'a E) -> OgmResult<&'a RelationshipValue<T>>
    where
        E: NodeEntity,
        T: Send + Sync + 'static,
    {
        E::field_table()
            .relationship_slot(entity, &self.field_name)?
            .as_any()
            .downcast_ref::<RelationshipValue<T>>()
            .ok_or_else(|| self.target_mismatch::<E, T>())
    }

    /// Mutable access to the governed field on `entity`
    pub fn value_mut<'a, E, T>(&self, entity: &'a mut E) -> OgmResult<&'a mut RelationshipValue<T>>
    where
        E: NodeEntity,
        T: Send + Sync + 'static,
    {
        E::field_table()
            .relationship_slot_mut(entity, &self.field_name)?
            .as_any_mut()
            .downcast_mut::<RelationshipValue<T>>()
            .ok_or_else(|| self.target_mismatch::<E, T>())
    }

    /// Overwrite the governed field on `entity`
    pub fn set_value<E, T>(&self, entity: &mut E, value: RelationshipValue<T>) -> OgmResult<()>
    where
        E: NodeEntity,
        T: Send + Sync + 'static,
    {
        *self.value_mut::<E, T>(entity)? = value;
        Ok(())
    }

    /// Make sure the governed to-many field holds a collection.
    ///
    /// Any existing collection representation, including a lazy proxy in
    /// whatever load state, is left alone. An unset field receives an empty
    /// eager collection. A field holding a single reference is rejected.
    pub fn initialize_collection<E: NodeEntity>(&self, entity: &mut E) -> OgmResult<()> {
        self.ensure_collection()?;

        let slot = E::field_table().relationship_slot_mut(entity, &self.field_name)?;
        match slot.state() {
            SlotState::Collection => Ok(()),
            SlotState::Unset => {
                slot.install_empty_collection();
                trace!(
                    owner = %self.owner_type,
                    field = %self.field_name,
                    "initialized relationship collection"
                );
                Ok(())
            }
            SlotState::Single => Err(OgmError::logic(format!(
                "Unexpected initial value in \"{}::{}\": a single reference is not a collection",
                self.owner_type, self.field_name
            ))),
        }
    }

    /// Add `candidate` to the governed collection unless that very instance
    /// is already in it. Returns whether the collection grew.
    pub fn add_to_collection<E, T>(&self, entity: &mut E, candidate: EntityRef<T>) -> OgmResult<bool>
    where
        E: NodeEntity,
        T: Send + Sync + 'static,
    {
        self.ensure_collection()?;

        let collection = self
            .value_mut::<E, T>(entity)?
            .as_collection_mut()
            .ok_or_else(|| {
                OgmError::logic(format!(
                    "The collection \"{}::{}\" has not been initialized",
                    self.owner_type, self.field_name
                ))
            })?;

        let added = collection.add_if_absent(candidate);
        trace!(
            owner = %self.owner_type,
            field = %self.field_name,
            added,
            size = collection.len(),
            "add to relationship collection"
        );
        Ok(added)
    }

    fn ensure_collection(&self) -> OgmResult<()> {
        if self.is_collection() {
            Ok(())
        } else {
            Err(OgmError::logic(format!(
                "The property mapping of this relationship is not of collection type in \"{}\"",
                self.owner_type
            )))
        }
    }

    fn target_mismatch<E, T>(&self) -> OgmError {
        OgmError::mapping(format!(
            "Field '{}' on '{}' does not hold relationships to '{}'",
            self.field_name,
            type_name::<E>(),
            type_name::<T>()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friends_mapping() -> RelationshipMapping {
        RelationshipMapping::new("FRIENDS_WITH", "BOTH", "Person").collection()
    }

    #[test]
    fn test_metadata_accessors() {
        let metadata = RelationshipMetadata::new(
            "app::model::Person",
            "friends",
            friends_mapping().with_mapped_by("friends"),
            true,
            Some(OrderByMapping::new("name", "DESC")),
        )
        .unwrap();

        assert_eq!(metadata.owner_type(), "app::model::Person");
        assert_eq!(metadata.field_name(), "friends");
        assert_eq!(metadata.relation_type(), "FRIENDS_WITH");
        assert_eq!(metadata.direction(), Direction::Both);
        assert_eq!(metadata.target_entity(), "app::model::Person");
        assert!(metadata.is_collection());
        assert!(metadata.is_lazy());
        assert!(!metadata.is_relationship_entity());
        assert_eq!(metadata.relationship_entity_class(), None);
        assert_eq!(metadata.mapped_by_property(), Some("friends"));
        assert_eq!(metadata.order_by_property(), Some("name"));
        assert_eq!(metadata.order(), Some(SortOrder::Desc));
    }

    #[test]
    fn test_invalid_order_fails_at_construction() {
        for order in ["asc", "UP", "", "DESC "] {
            let err = RelationshipMetadata::new(
                "app::model::Person",
                "friends",
                friends_mapping(),
                false,
                Some(OrderByMapping::new("name", order)),
            )
            .unwrap_err();
            assert!(err.is_mapping(), "order {:?} should be rejected", order);
        }
    }

    #[test]
    fn test_invalid_direction_fails_at_construction() {
        let mapping = RelationshipMapping::new("ACTED_IN", "SIDEWAYS", "Movie");
        let err = RelationshipMetadata::new("app::model::Person", "movies", mapping, false, None)
            .unwrap_err();
        assert!(err.is_mapping());
    }

    #[test]
    fn test_single_cardinality_is_never_lazy() {
        let mapping = RelationshipMapping::new("DIRECTED_BY", "OUTGOING", "Person");
        let metadata =
            RelationshipMetadata::new("app::model::Movie", "director", mapping, true, None).unwrap();

        assert!(!metadata.is_collection());
        assert!(!metadata.is_lazy());
    }

    #[test]
    fn test_relationship_entity_resolution() {
        let mapping = RelationshipMapping::new("ACTED_IN", "OUTGOING", "other::Movie")
            .collection()
            .with_relationship_entity("Role");
        let metadata =
            RelationshipMetadata::new("app::model::Person", "roles", mapping, false, None).unwrap();

        assert_eq!(metadata.target_entity(), "other::Movie");
        assert!(metadata.is_relationship_entity());
        assert_eq!(metadata.relationship_entity_class(), Some("app::model::Role"));
    }

    #[test]
    fn test_resolve_type_name() {
        assert_eq!(resolve_type_name("Movie", "app::model::Person"), "app::model::Movie");
        assert_eq!(resolve_type_name("::cinema::Movie", "app::Person"), "cinema::Movie");
        assert_eq!(resolve_type_name("Movie", "Person"), "Movie");
    }
}
