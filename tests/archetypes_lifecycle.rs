use std::collections::HashSet;

use strata_ecs::engine::entity::Identity;
use strata_ecs::engine::error::EcsError;
use strata_ecs::engine::registry::Archetypes;

#[test]
fn constructor_starts_empty() {
    let archetypes = Archetypes::new();
    assert_eq!(archetypes.entity_count(), 0);
    // Only the root archetype exists up front.
    assert_eq!(archetypes.archetype_count(), 1);
    assert!(archetypes.archetype(Archetypes::ROOT).is_some());
}

#[test]
fn spawn_returns_live_entity() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn();

    assert!(archetypes.is_alive(entity.identity()));
    assert_eq!(archetypes.entity_count(), 1);
}

#[test]
fn despawn_removes_entity() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn();

    archetypes.despawn(entity.identity()).unwrap();

    assert!(!archetypes.is_alive(entity.identity()));
    assert_eq!(archetypes.entity_count(), 0);
}

#[test]
fn despawn_of_stale_identity_is_an_error() {
    let mut archetypes = Archetypes::new();
    let entity = archetypes.spawn();

    archetypes.despawn(entity.identity()).unwrap();
    let result = archetypes.despawn(entity.identity());

    assert!(matches!(result, Err(EcsError::UnknownEntity(_))));
}

#[test]
fn despawn_of_out_of_range_identity_is_an_error() {
    let mut archetypes = Archetypes::new();

    let result = archetypes.despawn(Identity::new(100_000, 0));
    assert!(matches!(result, Err(EcsError::UnknownEntity(_))));
}

#[test]
fn sentinel_identities_are_never_alive() {
    let mut archetypes = Archetypes::new();
    archetypes.spawn();

    assert!(!archetypes.is_alive(Identity::NONE));
    assert!(!archetypes.is_alive(Identity::ANY));
    assert!(matches!(
        archetypes.despawn(Identity::NONE),
        Err(EcsError::UnknownEntity(_))
    ));
    assert!(matches!(
        archetypes.despawn(Identity::ANY),
        Err(EcsError::UnknownEntity(_))
    ));
}

#[test]
fn reused_index_gets_a_new_generation() {
    let mut archetypes = Archetypes::new();

    let first = archetypes.spawn().identity();
    archetypes.despawn(first).unwrap();
    let second = archetypes.spawn().identity();

    assert_eq!(second.index(), first.index());
    assert_eq!(second.generation(), first.generation() + 1);
    assert_ne!(first, second);
    assert!(!archetypes.is_alive(first));
    assert!(archetypes.is_alive(second));
}

#[test]
fn live_identities_are_always_distinct() {
    let mut archetypes = Archetypes::new();

    let mut live: Vec<Identity> = (0..100).map(|_| archetypes.spawn().identity()).collect();

    // Despawn every other entity, then refill from the free list.
    let mut index = 0;
    live.retain(|&identity| {
        index += 1;
        if index % 2 == 0 {
            archetypes.despawn(identity).unwrap();
            false
        } else {
            true
        }
    });
    for _ in 0..50 {
        live.push(archetypes.spawn().identity());
    }

    let unique: HashSet<Identity> = live.iter().copied().collect();
    assert_eq!(unique.len(), live.len());
    assert!(live.iter().all(|&identity| archetypes.is_alive(identity)));
    assert_eq!(archetypes.entity_count(), live.len());
}

#[test]
fn spawn_past_initial_capacity_grows_the_meta_table() {
    let mut archetypes = Archetypes::new();

    let entities: Vec<Identity> = (0..512).map(|_| archetypes.spawn().identity()).collect();
    let overflow = archetypes.spawn().identity();

    assert_eq!(overflow.index(), 512);
    assert!(archetypes.is_alive(overflow));
    assert!(entities.iter().all(|&identity| archetypes.is_alive(identity)));
    assert_eq!(archetypes.entity_count(), 513);
}

#[test]
fn entity_count_tracks_spawns_and_despawns() {
    let mut archetypes = Archetypes::new();

    let a = archetypes.spawn().identity();
    let b = archetypes.spawn().identity();
    assert_eq!(archetypes.entity_count(), 2);

    archetypes.despawn(a).unwrap();
    assert_eq!(archetypes.entity_count(), 1);

    archetypes.despawn(b).unwrap();
    assert_eq!(archetypes.entity_count(), 0);
}
