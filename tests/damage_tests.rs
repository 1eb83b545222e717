//! Damage pipeline tests.
//!
//! These exercise absorption order, piercing, lethal handling, and the
//! invariants the pipeline guarantees after every resolved action.

use proptest::prelude::*;

use deckbattle::combat::damage::apply_damage;
use deckbattle::{CombatState, Entity, EntityId, EnemySpec, Phase};

fn state_with_enemy(health: i32, block: i32, barrier: i32) -> (CombatState, EntityId) {
    let mut state = CombatState::new(Entity::player("Hero", 80, 3, 5), 7);
    let id = state.spawn_enemy(EnemySpec::new("Dummy", health));
    let enemy = state.entity_mut(id).unwrap();
    enemy.block = block;
    enemy.barrier = barrier;
    (state, id)
}

#[test]
fn test_absorption_order_block_then_barrier_then_health() {
    let (mut state, id) = state_with_enemy(30, 4, 3);

    let outcome = apply_damage(&mut state, id, 10, false);

    assert_eq!(outcome.absorbed, 7);
    assert_eq!(outcome.damage, 3);
    let enemy = state.entity(id).unwrap();
    assert_eq!(enemy.block, 0);
    assert_eq!(enemy.barrier, 0);
    assert_eq!(enemy.health, 27);
}

#[test]
fn test_partial_block_absorption() {
    let (mut state, id) = state_with_enemy(30, 10, 5);

    let outcome = apply_damage(&mut state, id, 6, false);

    assert_eq!(outcome.damage, 0);
    let enemy = state.entity(id).unwrap();
    assert_eq!(enemy.block, 4);
    assert_eq!(enemy.barrier, 5);
    assert_eq!(enemy.health, 30);
}

#[test]
fn test_piercing_ignores_all_absorption() {
    let (mut state, id) = state_with_enemy(30, 10, 10);

    let outcome = apply_damage(&mut state, id, 12, true);

    assert_eq!(outcome.damage, 12);
    let enemy = state.entity(id).unwrap();
    assert_eq!(enemy.block, 10);
    assert_eq!(enemy.barrier, 10);
    assert_eq!(enemy.health, 18);
}

#[test]
fn test_lethal_clamps_and_transitions() {
    let (mut state, id) = state_with_enemy(5, 0, 0);

    let outcome = apply_damage(&mut state, id, 99, false);

    assert!(outcome.killed);
    assert!(state.entity(id).is_none());
    assert_eq!(state.phase, Phase::Victory);
}

#[test]
fn test_player_lethal_is_defeat_with_health_clamped() {
    let (mut state, _) = state_with_enemy(30, 0, 0);
    state.player.block = 3;

    apply_damage(&mut state, EntityId::PLAYER, 500, false);

    assert_eq!(state.player.health, 0);
    assert_eq!(state.phase, Phase::Defeat);
}

proptest! {
    /// Damage is conserved: health damage plus absorbed equals the
    /// incoming amount, and absorption never exceeds block + barrier.
    #[test]
    fn prop_damage_conservation(
        health in 1..200i32,
        block in 0..50i32,
        barrier in 0..50i32,
        amount in 0..300i32,
    ) {
        let (mut state, id) = state_with_enemy(health, block, barrier);
        let outcome = apply_damage(&mut state, id, amount, false);

        prop_assert_eq!(outcome.damage + outcome.absorbed, amount);
        prop_assert!(outcome.absorbed <= block + barrier);
    }

    /// Health, block, and barrier never go negative.
    #[test]
    fn prop_no_negative_resources(
        health in 1..200i32,
        block in 0..50i32,
        barrier in 0..50i32,
        amount in 0..300i32,
        piercing: bool,
    ) {
        let (mut state, id) = state_with_enemy(health, block, barrier);
        apply_damage(&mut state, id, amount, piercing);

        if let Some(enemy) = state.entity(id) {
            prop_assert!(enemy.health > 0);
            prop_assert!(enemy.block >= 0);
            prop_assert!(enemy.barrier >= 0);
        } else {
            // Removed means it died; that requires lethal damage
            prop_assert!(amount >= health);
        }
    }
}
