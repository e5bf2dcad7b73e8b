//! Relationship Tests
//!
//! Collection initialisation and identity-based additions on live entities,
//! plus the lazy collection proxy.

use std::any::type_name;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::fixtures::*;
use crate::error::{OgmError, OgmResult};
use crate::model::NodeEntity;
use crate::relationships::{
    EntityRef, LazyCollection, RelationshipCollection, RelationshipLoader, RelationshipMapping,
    RelationshipMetadata, RelationshipValue,
};

fn movie(title: &str) -> EntityRef<Movie> {
    let mut movie = Movie::field_table().instantiate();
    movie.title = title.to_string();
    EntityRef::new(movie)
}

fn titles(elements: &[EntityRef<Movie>]) -> Vec<String> {
    elements
        .iter()
        .map(|m| m.read().unwrap().title.clone())
        .collect()
}

#[test]
fn test_initialize_then_add_once() {
    let friends = friends_metadata();
    let mut ada = Person::named("Ada");
    let grace = EntityRef::new(Person::named("Grace"));

    friends.initialize_collection(&mut ada).unwrap();
    assert!(friends.add_to_collection(&mut ada, grace.clone()).unwrap());

    let collection = ada.friends.as_collection().unwrap();
    assert_eq!(collection.len(), 1);
    assert!(collection.contains(&grace));
}

#[test]
fn test_initialize_is_idempotent() {
    let friends = friends_metadata();
    let mut ada = Person::named("Ada");
    let grace = EntityRef::new(Person::named("Grace"));

    friends.initialize_collection(&mut ada).unwrap();
    friends.add_to_collection(&mut ada, grace.clone()).unwrap();
    friends.initialize_collection(&mut ada).unwrap();

    let collection = ada.friends.as_collection().unwrap();
    assert_eq!(collection.len(), 1);
    assert!(collection.contains(&grace));
}

#[test]
fn test_existing_sequence_is_kept() {
    let friends = friends_metadata();
    let grace = EntityRef::new(Person::named("Grace"));
    let mut ada = Person::named("Ada");
    ada.friends = vec![grace.clone()].into();

    friends.initialize_collection(&mut ada).unwrap();

    match &ada.friends {
        RelationshipValue::Collection(RelationshipCollection::Sequence(elements)) => {
            assert_eq!(elements.len(), 1);
            assert!(elements[0].ptr_eq(&grace));
        }
        other => panic!("sequence was replaced: {:?}", other),
    }
}

#[test]
fn test_same_instance_is_added_once() {
    let friends = friends_metadata();
    let mut ada = Person::named("Ada");
    let grace = EntityRef::new(Person::named("Grace"));

    friends.initialize_collection(&mut ada).unwrap();
    assert!(friends.add_to_collection(&mut ada, grace.clone()).unwrap());
    assert!(!friends.add_to_collection(&mut ada, grace.clone()).unwrap());

    assert_eq!(ada.friends.as_collection().unwrap().len(), 1);
}

#[test]
fn test_equal_but_distinct_instances_are_both_added() {
    let friends = friends_metadata();
    let mut ada = Person::named("Ada");
    let first = EntityRef::new(Person::named("Grace"));
    let second = EntityRef::new(Person::named("Grace"));

    friends.initialize_collection(&mut ada).unwrap();
    friends.add_to_collection(&mut ada, first.clone()).unwrap();
    friends.add_to_collection(&mut ada, second.clone()).unwrap();

    let elements = ada.friends.as_collection().unwrap().to_vec();
    assert_eq!(elements.len(), 2);
    assert!(elements[0].ptr_eq(&first));
    assert!(elements[1].ptr_eq(&second));
}

#[test]
fn test_single_descriptor_rejects_collection_operations() {
    let mentor = mentor_metadata();
    let mut ada = Person::named("Ada");

    assert!(mentor.initialize_collection(&mut ada).unwrap_err().is_logic());
    let err = mentor
        .add_to_collection(&mut ada, EntityRef::new(Person::named("Grace")))
        .unwrap_err();
    assert!(err.is_logic());
    assert!(ada.mentor.is_unset());
}

#[test]
fn test_add_before_initialize_is_rejected() {
    let friends = friends_metadata();
    let mut ada = Person::named("Ada");

    let err = friends
        .add_to_collection(&mut ada, EntityRef::new(Person::named("Grace")))
        .unwrap_err();
    assert!(err.is_logic());
    assert!(ada.friends.is_unset());
}

#[test]
fn test_single_value_on_collection_field_is_rejected() {
    let friends = friends_metadata();
    let mut ada = Person::named("Ada");
    ada.friends = RelationshipValue::Single(EntityRef::new(Person::named("Grace")));

    assert!(friends.initialize_collection(&mut ada).unwrap_err().is_logic());
    assert!(ada.friends.as_single().is_some());
}

#[test]
fn test_single_value_access() {
    let mentor = mentor_metadata();
    let mut ada = Person::named("Ada");
    let charles = EntityRef::new(Person::named("Charles"));

    mentor
        .set_value(&mut ada, RelationshipValue::Single(charles.clone()))
        .unwrap();

    let value = mentor.value::<Person, Person>(&ada).unwrap();
    assert!(value.as_single().unwrap().ptr_eq(&charles));
}

#[test]
fn test_wrong_target_type_is_a_mapping_error() {
    let friends = friends_metadata();
    let ada = Person::named("Ada");

    let err = friends.value::<Person, Movie>(&ada).unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn test_descriptor_for_unknown_field() {
    let roles = RelationshipMetadata::new(
        type_name::<Person>(),
        "roles",
        RelationshipMapping::new("ACTED_IN", "OUTGOING", "Movie").collection(),
        false,
        None,
    )
    .unwrap();
    let mut ada = Person::named("Ada");

    assert!(matches!(
        roles.initialize_collection(&mut ada),
        Err(OgmError::UndeclaredField { .. })
    ));
}

struct FilmographyLoader {
    movies: Vec<EntityRef<Movie>>,
    calls: AtomicUsize,
}

#[async_trait]
impl RelationshipLoader<Movie> for FilmographyLoader {
    async fn load(&self) -> OgmResult<Vec<EntityRef<Movie>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.movies.clone())
    }
}

#[tokio::test]
async fn test_lazy_collection_loads_once_in_declared_order() {
    init_test_logging();
    let movies = movies_metadata();
    let loader = Arc::new(FilmographyLoader {
        movies: vec![movie("Sneakers"), movie("Alien"), movie("Heat")],
        calls: AtomicUsize::new(0),
    });
    let lazy = LazyCollection::new(loader.clone(), movies.order_by().cloned());

    assert!(!lazy.is_resolved());
    let first = lazy.resolve().await.unwrap();
    let second = lazy.resolve().await.unwrap();

    assert!(lazy.is_resolved());
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    assert_eq!(titles(&first), vec!["Alien", "Heat", "Sneakers"]);
    assert!(first.iter().zip(&second).all(|(a, b)| a.ptr_eq(b)));
}

#[tokio::test]
async fn test_lazy_field_keeps_additions_made_before_loading() {
    init_test_logging();
    let movies = movies_metadata();
    let heat = movie("Heat");
    let loader = Arc::new(FilmographyLoader {
        movies: vec![movie("Sneakers"), heat.clone()],
        calls: AtomicUsize::new(0),
    });

    let mut keanu = Person::named("Keanu");
    keanu.movies = RelationshipValue::Collection(RelationshipCollection::Lazy(LazyCollection::new(
        loader.clone(),
        movies.order_by().cloned(),
    )));

    movies.initialize_collection(&mut keanu).unwrap();
    let matrix = movie("The Matrix");
    assert!(movies.add_to_collection(&mut keanu, matrix.clone()).unwrap());
    assert!(movies.add_to_collection(&mut keanu, heat.clone()).unwrap());
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);

    let resolved = match movies.value::<Person, Movie>(&keanu).unwrap() {
        RelationshipValue::Collection(RelationshipCollection::Lazy(lazy)) => {
            lazy.resolve().await.unwrap()
        }
        other => panic!("lazy collection was replaced: {:?}", other),
    };

    assert_eq!(titles(&resolved), vec!["Heat", "Sneakers", "The Matrix"]);
    assert!(resolved[0].ptr_eq(&heat));
    assert!(resolved[2].ptr_eq(&matrix));
}

#[tokio::test]
async fn test_lazy_collection_without_ordering_keeps_loader_order() {
    let loader = Arc::new(FilmographyLoader {
        movies: vec![movie("Sneakers"), movie("Alien")],
        calls: AtomicUsize::new(0),
    });
    let lazy = LazyCollection::new(loader, None);

    let resolved = lazy.resolve().await.unwrap();
    assert_eq!(titles(&resolved), vec!["Sneakers", "Alien"]);
}

#[tokio::test]
async fn test_instance_added_before_loading_and_fetched_is_held_once() {
    let movies = movies_metadata();
    let heat = movie("Heat");
    let loader = Arc::new(FilmographyLoader {
        movies: vec![heat.clone(), movie("Ronin")],
        calls: AtomicUsize::new(0),
    });

    let mut robert = Person::named("Robert");
    robert.movies = RelationshipValue::Collection(RelationshipCollection::Lazy(LazyCollection::new(
        loader,
        movies.order_by().cloned(),
    )));
    movies.add_to_collection(&mut robert, heat.clone()).unwrap();

    let collection = movies
        .value::<Person, Movie>(&robert)
        .unwrap()
        .as_collection()
        .unwrap();
    let RelationshipCollection::Lazy(lazy) = collection else {
        panic!("lazy collection was replaced");
    };
    let resolved = lazy.resolve().await.unwrap();
    assert_eq!(resolved.len(), 2);

    let elements = collection.to_vec();
    assert_eq!(collection.len(), 2);
    assert_eq!(elements.iter().filter(|m| m.ptr_eq(&heat)).count(), 1);
    assert_eq!(titles(&elements), vec!["Heat", "Ronin"]);

    // Re-adding after loading is still a no-op
    assert!(!movies.add_to_collection(&mut robert, heat.clone()).unwrap());
    assert_eq!(robert.movies.as_collection().unwrap().len(), 2);
}
