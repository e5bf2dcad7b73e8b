//! Field Tables - Name-indexed field access for entity types
//!
//! A [`FieldTable`] replaces runtime reflection: it is built once per entity
//! type from plain accessor functions and lets the mapper create blank
//! instances and read or write any mapped field by name, whatever the
//! field's visibility to other code.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;

use crate::error::{OgmError, OgmResult};
use crate::relationships::{RelationshipSlot, RelationshipValue};
use crate::value::{FromValue, IntoValue, NodeId, Value};

trait ScalarAccess<E>: Send + Sync {
    fn get(&self, entity: &E) -> Value;
    fn set(&self, entity: &mut E, value: Value) -> OgmResult<()>;
}

struct TypedScalar<E, V> {
    name: &'static str,
    get: fn(&E) -> &V,
    get_mut: fn(&mut E) -> &mut V,
}

impl<E, V> ScalarAccess<E> for TypedScalar<E, V>
where
    E: Send + Sync,
    V: FromValue + IntoValue + Send + Sync,
{
    fn get(&self, entity: &E) -> Value {
        (self.get)(entity).to_value()
    }

    fn set(&self, entity: &mut E, value: Value) -> OgmResult<()> {
        let found = value.type_name();
        let converted = V::from_value(value).ok_or_else(|| OgmError::TypeConversion {
            field: self.name.to_string(),
            expected: V::EXPECTED,
            found,
        })?;
        *(self.get_mut)(entity) = converted;
        Ok(())
    }
}

trait SlotAccess<E>: Send + Sync {
    fn slot<'a>(&self, entity: &'a E) -> &'a dyn RelationshipSlot;
    fn slot_mut<'a>(&self, entity: &'a mut E) -> &'a mut dyn RelationshipSlot;
}

struct TypedSlot<E, T>
where
    T: Send + Sync + 'static,
{
    get: fn(&E) -> &RelationshipValue<T>,
    get_mut: fn(&mut E) -> &mut RelationshipValue<T>,
}

impl<E, T> SlotAccess<E> for TypedSlot<E, T>
where
    E: Send + Sync,
    T: Send + Sync + 'static,
{
    fn slot<'a>(&self, entity: &'a E) -> &'a dyn RelationshipSlot {
        (self.get)(entity)
    }

    fn slot_mut<'a>(&self, entity: &'a mut E) -> &'a mut dyn RelationshipSlot {
        (self.get_mut)(entity)
    }
}

/// Field accessors for one entity type
pub struct FieldTable<E> {
    blank: fn() -> E,
    identity_field: &'static str,
    identity: fn(&mut E) -> &mut Option<NodeId>,
    scalars: HashMap<&'static str, Box<dyn ScalarAccess<E>>>,
    relationships: HashMap<&'static str, Box<dyn SlotAccess<E>>>,
}

impl<E> FieldTable<E>
where
    E: Send + Sync + 'static,
{
    /// Start a table from a blank-instance function and the identity field.
    ///
    /// `blank` must build the struct directly; hydration calls it instead of
    /// any user constructor.
    pub fn builder(
        blank: fn() -> E,
        identity: fn(&mut E) -> &mut Option<NodeId>,
    ) -> FieldTableBuilder<E> {
        FieldTableBuilder {
            table: FieldTable {
                blank,
                identity_field: "id",
                identity,
                scalars: HashMap::new(),
                relationships: HashMap::new(),
            },
        }
    }

    pub fn entity_name(&self) -> &'static str {
        type_name::<E>()
    }

    /// Create an instance with every field at its blank value
    pub fn instantiate(&self) -> E {
        (self.blank)()
    }

    pub fn identity_field(&self) -> &'static str {
        self.identity_field
    }

    pub fn set_identity(&self, entity: &mut E, id: NodeId) {
        *(self.identity)(entity) = Some(id);
    }

    pub fn has_scalar(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    pub fn has_relationship(&self, name: &str) -> bool {
        self.relationships.contains_key(name)
    }

    /// Read a scalar field by name
    pub fn scalar_value(&self, entity: &E, name: &str) -> OgmResult<Value> {
        Ok(self.scalar(name)?.get(entity))
    }

    /// Write a scalar field by name, converting into the field's type
    pub fn set_scalar(&self, entity: &mut E, name: &str, value: Value) -> OgmResult<()> {
        self.scalar(name)?.set(entity, value)
    }

    pub fn relationship_slot<'a>(
        &self,
        entity: &'a E,
        name: &str,
    ) -> OgmResult<&'a dyn RelationshipSlot> {
        Ok(self.relationship(name)?.slot(entity))
    }

    pub fn relationship_slot_mut<'a>(
        &self,
        entity: &'a mut E,
        name: &str,
    ) -> OgmResult<&'a mut dyn RelationshipSlot> {
        Ok(self.relationship(name)?.slot_mut(entity))
    }

    fn scalar(&self, name: &str) -> OgmResult<&dyn ScalarAccess<E>> {
        self.scalars
            .get(name)
            .map(|access| access.as_ref())
            .ok_or_else(|| self.undeclared(name))
    }

    fn relationship(&self, name: &str) -> OgmResult<&dyn SlotAccess<E>> {
        self.relationships
            .get(name)
            .map(|access| access.as_ref())
            .ok_or_else(|| self.undeclared(name))
    }

    fn undeclared(&self, name: &str) -> OgmError {
        OgmError::UndeclaredField {
            entity: self.entity_name().to_string(),
            field: name.to_string(),
        }
    }
}

impl<E> fmt::Debug for FieldTable<E>
where
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scalars: Vec<_> = self.scalars.keys().collect();
        scalars.sort();
        let mut relationships: Vec<_> = self.relationships.keys().collect();
        relationships.sort();

        f.debug_struct("FieldTable")
            .field("entity", &self.entity_name())
            .field("identity_field", &self.identity_field)
            .field("scalars", &scalars)
            .field("relationships", &relationships)
            .finish()
    }
}

/// Builder for [`FieldTable`]
pub struct FieldTableBuilder<E> {
    table: FieldTable<E>,
}

impl<E> FieldTableBuilder<E>
where
    E: Send + Sync + 'static,
{
    /// Rename the identity field (defaults to `id`)
    pub fn identity_field(mut self, name: &'static str) -> Self {
        self.table.identity_field = name;
        self
    }

    /// Register a scalar field
    pub fn scalar<V>(
        mut self,
        name: &'static str,
        get: fn(&E) -> &V,
        get_mut: fn(&mut E) -> &mut V,
    ) -> Self
    where
        V: FromValue + IntoValue + Send + Sync + 'static,
    {
        self.table
            .scalars
            .insert(name, Box::new(TypedScalar { name, get, get_mut }));
        self
    }

    /// Register a relationship field targeting `T`
    pub fn relationship<T>(
        mut self,
        name: &'static str,
        get: fn(&E) -> &RelationshipValue<T>,
        get_mut: fn(&mut E) -> &mut RelationshipValue<T>,
    ) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.table
            .relationships
            .insert(name, Box::new(TypedSlot { get, get_mut }));
        self
    }

    pub fn build(self) -> FieldTable<E> {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::SlotState;

    struct Account {
        id: Option<NodeId>,
        email: Option<String>,
        logins: i64,
        contacts: RelationshipValue<Account>,
    }

    fn table() -> FieldTable<Account> {
        FieldTable::<Account>::builder(
            || Account {
                id: None,
                email: None,
                logins: 0,
                contacts: RelationshipValue::Unset,
            },
            |a| &mut a.id,
        )
        .scalar("email", |a| &a.email, |a| &mut a.email)
        .scalar("logins", |a| &a.logins, |a| &mut a.logins)
        .relationship("contacts", |a| &a.contacts, |a| &mut a.contacts)
        .build()
    }

    #[test]
    fn test_scalar_access_by_name() {
        let table = table();
        let mut account = table.instantiate();

        table
            .set_scalar(&mut account, "email", Value::from("ada@example.com"))
            .unwrap();
        table.set_scalar(&mut account, "logins", Value::Integer(3)).unwrap();
        table.set_identity(&mut account, NodeId(9));

        assert_eq!(account.email.as_deref(), Some("ada@example.com"));
        assert_eq!(account.logins, 3);
        assert_eq!(account.id, Some(NodeId(9)));
        assert_eq!(
            table.scalar_value(&account, "logins").unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_conversion_failure_names_the_field() {
        let table = table();
        let mut account = table.instantiate();

        let err = table
            .set_scalar(&mut account, "logins", Value::from("three"))
            .unwrap_err();
        match err {
            OgmError::TypeConversion {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "logins");
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_fields_are_reported() {
        let table = table();
        let mut account = table.instantiate();

        assert!(matches!(
            table.set_scalar(&mut account, "password", Value::Null),
            Err(OgmError::UndeclaredField { .. })
        ));
        assert!(table.relationship_slot(&account, "email").is_err());
        assert_eq!(
            table.relationship_slot(&account, "contacts").unwrap().state(),
            SlotState::Unset
        );
    }
}
