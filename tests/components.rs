use strata_ecs::engine::component::StorageType;
use strata_ecs::engine::error::EcsError;
use strata_ecs::engine::registry::Archetypes;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(i32);

#[derive(Debug, Clone, PartialEq)]
struct Label(String);

#[test]
fn add_then_get_round_trips() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let position = StorageType::of::<Position>();

    archetypes
        .add_component(position, entity, Box::new(Position { x: 1.0, y: 2.0 }))
        .unwrap();

    assert!(archetypes.has_component(position, entity));
    let stored = archetypes.get_component::<Position>(position, entity).unwrap();
    assert_eq!(*stored, Position { x: 1.0, y: 2.0 });
}

#[test]
fn add_of_already_present_component_fails() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let health = StorageType::of::<Health>();

    archetypes.add_component(health, entity, Box::new(Health(10))).unwrap();
    let result = archetypes.add_component(health, entity, Box::new(Health(20)));

    assert!(matches!(result, Err(EcsError::DuplicateComponent(_))));
    // The first value stays in place.
    assert_eq!(*archetypes.get_component::<Health>(health, entity).unwrap(), Health(10));
}

#[test]
fn remove_of_absent_component_fails() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let health = StorageType::of::<Health>();

    let result = archetypes.remove_component(health, entity);
    assert!(matches!(result, Err(EcsError::ComponentNotFound(_))));
}

#[test]
fn get_of_absent_component_fails() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let health = StorageType::of::<Health>();

    let result = archetypes.get_component::<Health>(health, entity);
    assert!(matches!(result, Err(EcsError::ComponentNotFound(_))));
}

#[test]
fn operations_on_dead_entity_fail_with_unknown_entity() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let health = StorageType::of::<Health>();
    archetypes.despawn(entity).unwrap();

    assert!(matches!(
        archetypes.add_component(health, entity, Box::new(Health(1))),
        Err(EcsError::UnknownEntity(_))
    ));
    assert!(matches!(
        archetypes.remove_component(health, entity),
        Err(EcsError::UnknownEntity(_))
    ));
    assert!(matches!(
        archetypes.get_component::<Health>(health, entity),
        Err(EcsError::UnknownEntity(_))
    ));
    assert!(!archetypes.has_component(health, entity));
}

#[test]
fn add_add_remove_keeps_the_remaining_component() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let position = StorageType::of::<Position>();
    let velocity = StorageType::of::<Velocity>();

    archetypes
        .add_component(position, entity, Box::new(Position { x: 3.0, y: 4.0 }))
        .unwrap();
    archetypes
        .add_component(velocity, entity, Box::new(Velocity { dx: 0.5, dy: -0.5 }))
        .unwrap();
    archetypes.remove_component(position, entity).unwrap();

    assert!(!archetypes.has_component(position, entity));
    assert!(archetypes.has_component(velocity, entity));
    let stored = archetypes.get_component::<Velocity>(velocity, entity).unwrap();
    assert_eq!(*stored, Velocity { dx: 0.5, dy: -0.5 });
}

#[test]
fn removing_the_last_component_keeps_the_entity_alive() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let health = StorageType::of::<Health>();

    archetypes.add_component(health, entity, Box::new(Health(5))).unwrap();
    archetypes.remove_component(health, entity).unwrap();

    assert!(archetypes.is_alive(entity));
    assert!(!archetypes.has_component(health, entity));
}

#[test]
fn archetype_lookup_is_order_independent() {
    let mut archetypes = Archetypes::new();
    let position = StorageType::of::<Position>();
    let velocity = StorageType::of::<Velocity>();

    let first = archetypes.spawn().identity();
    archetypes
        .add_component(position, first, Box::new(Position { x: 0.0, y: 0.0 }))
        .unwrap();
    archetypes
        .add_component(velocity, first, Box::new(Velocity { dx: 0.0, dy: 0.0 }))
        .unwrap();

    let created = archetypes.archetype_count();

    // Adding in the opposite order must converge on the same archetype.
    let second = archetypes.spawn().identity();
    archetypes
        .add_component(velocity, second, Box::new(Velocity { dx: 1.0, dy: 1.0 }))
        .unwrap();
    archetypes
        .add_component(position, second, Box::new(Position { x: 1.0, y: 1.0 }))
        .unwrap();

    // One new archetype for {Velocity} on the way; {Position, Velocity} is reused.
    assert_eq!(archetypes.archetype_count(), created + 1);
}

#[test]
fn swap_remove_repairs_displaced_entity_rows() {
    let mut archetypes = Archetypes::new();
    let health = StorageType::of::<Health>();

    let entities: Vec<_> = (0..3)
        .map(|value| {
            let entity = archetypes.spawn().identity();
            archetypes.add_component(health, entity, Box::new(Health(value))).unwrap();
            entity
        })
        .collect();

    // Removing the first row swaps the last entity into its place.
    archetypes.despawn(entities[0]).unwrap();

    assert_eq!(*archetypes.get_component::<Health>(health, entities[1]).unwrap(), Health(1));
    assert_eq!(*archetypes.get_component::<Health>(health, entities[2]).unwrap(), Health(2));
}

#[test]
fn get_component_mut_updates_the_stored_value() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let label = StorageType::of::<Label>();

    archetypes
        .add_component(label, entity, Box::new(Label("before".to_string())))
        .unwrap();

    archetypes.get_component_mut::<Label>(label, entity).unwrap().0 = "after".to_string();

    assert_eq!(
        *archetypes.get_component::<Label>(label, entity).unwrap(),
        Label("after".to_string())
    );
}

#[test]
fn mistyped_value_is_rejected_without_mutation() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn().identity();
    let health = StorageType::of::<Health>();

    // Boxed value does not match the storage type's component.
    let result = archetypes.add_component(health, entity, Box::new(Position { x: 0.0, y: 0.0 }));

    assert!(matches!(result, Err(EcsError::Column(_))));
    assert!(!archetypes.has_component(health, entity));
    assert!(archetypes.is_alive(entity));
}

#[test]
fn component_data_survives_meta_table_growth() {
    let mut archetypes = Archetypes::new();
    let health = StorageType::of::<Health>();

    let early = archetypes.spawn().identity();
    archetypes.add_component(health, early, Box::new(Health(77))).unwrap();

    for _ in 0..600 {
        archetypes.spawn();
    }

    assert!(archetypes.is_alive(early));
    assert_eq!(*archetypes.get_component::<Health>(health, early).unwrap(), Health(77));
}
