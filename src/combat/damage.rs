//! Damage and resource pipeline.
//!
//! The single entry point for hit points changing. Damage is absorbed
//! by block, then barrier, then health; piercing skips straight to
//! health. Deaths are handled immediately: a dead enemy leaves the
//! enemy list in the same call, and the phase flips to victory or
//! defeat when one side is out of combatants.
//!
//! Power modifiers are the caller's job. By the time a number reaches
//! this module it is final.

use crate::core::entity::EntityId;
use crate::core::state::{CombatState, Phase};
use crate::events::VisualEvent;

/// What one resolved hit did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage that reached health.
    pub damage: i32,
    /// Damage eaten by block and barrier.
    pub absorbed: i32,
    pub killed: bool,
}

impl DamageOutcome {
    /// Whether the hit connected at all (for on-hit riders).
    #[must_use]
    pub fn connected(&self) -> bool {
        self.damage > 0 || self.absorbed > 0
    }
}

/// Apply final damage to an entity.
///
/// Missing targets and non-positive amounts are no-ops.
pub fn apply_damage(
    state: &mut CombatState,
    target: EntityId,
    amount: i32,
    piercing: bool,
) -> DamageOutcome {
    if amount <= 0 {
        return DamageOutcome::default();
    }
    let Some(entity) = state.entity_mut(target) else {
        return DamageOutcome::default();
    };

    let mut remaining = amount;
    let mut absorbed = 0;

    if !piercing {
        let from_block = remaining.min(entity.block);
        entity.block -= from_block;
        remaining -= from_block;
        absorbed += from_block;

        let from_barrier = remaining.min(entity.barrier);
        entity.barrier -= from_barrier;
        remaining -= from_barrier;
        absorbed += from_barrier;
    }

    entity.health -= remaining;
    let killed = entity.health <= 0;
    if killed {
        entity.health = 0;
    }
    let target_is_player = entity.is_player();

    state.push_event(VisualEvent::Damage {
        target,
        amount: remaining,
        absorbed,
    });

    if target_is_player {
        state.stats.damage_taken += remaining;
    } else {
        state.stats.damage_dealt += remaining;
    }

    if killed {
        state.push_event(VisualEvent::EntityDied { entity: target });
        if target_is_player {
            end_combat(state, false);
        } else {
            state.remove_enemy(target);
            state.stats.enemies_killed += 1;
            if state.enemies.is_empty() {
                end_combat(state, true);
            }
        }
    }

    DamageOutcome {
        damage: remaining,
        absorbed,
        killed,
    }
}

/// Heal an entity, clamped to max health unless overheal is allowed.
///
/// Returns health actually restored.
pub fn heal(state: &mut CombatState, target: EntityId, amount: i32, can_overheal: bool) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let Some(entity) = state.entity_mut(target) else {
        return 0;
    };

    let before = entity.health;
    entity.health += amount;
    if !can_overheal && entity.health > entity.max_health {
        entity.health = entity.max_health.max(before);
    }
    let restored = entity.health - before;

    if restored > 0 {
        state.push_event(VisualEvent::Heal {
            target,
            amount: restored,
        });
    }
    restored
}

/// Grant block (already modified by the caller).
pub fn gain_block(state: &mut CombatState, target: EntityId, amount: i32) {
    if amount <= 0 {
        return;
    }
    let Some(entity) = state.entity_mut(target) else {
        return;
    };
    entity.block += amount;
    state.push_event(VisualEvent::BlockGained { target, amount });
}

/// Grant barrier. Barrier never decays on a schedule.
pub fn gain_barrier(state: &mut CombatState, target: EntityId, amount: i32) {
    if amount <= 0 {
        return;
    }
    let Some(entity) = state.entity_mut(target) else {
        return;
    };
    entity.barrier += amount;
    state.push_event(VisualEvent::BarrierGained { target, amount });
}

/// Force the combat into a terminal phase.
pub fn end_combat(state: &mut CombatState, victory: bool) {
    if state.phase.is_terminal() {
        return;
    }
    state.phase = if victory { Phase::Victory } else { Phase::Defeat };
    state.push_event(VisualEvent::CombatEnded { phase: state.phase });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::state_with_enemies;

    #[test]
    fn test_block_absorbs_first() {
        let mut state = state_with_enemies(1);
        let target = state.enemies[0].id;
        state.enemies[0].block = 5;
        state.enemies[0].barrier = 3;

        let outcome = apply_damage(&mut state, target, 6, false);

        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.absorbed, 6);
        let enemy = state.entity(target).unwrap();
        assert_eq!(enemy.block, 0);
        assert_eq!(enemy.barrier, 2);
        assert_eq!(enemy.health, 20);
    }

    #[test]
    fn test_overflow_reaches_health() {
        let mut state = state_with_enemies(1);
        let target = state.enemies[0].id;
        state.enemies[0].block = 2;
        state.enemies[0].barrier = 2;

        let outcome = apply_damage(&mut state, target, 10, false);

        assert_eq!(outcome.absorbed, 4);
        assert_eq!(outcome.damage, 6);
        assert_eq!(state.entity(target).unwrap().health, 14);
    }

    #[test]
    fn test_piercing_skips_block_and_barrier() {
        let mut state = state_with_enemies(1);
        let target = state.enemies[0].id;
        state.enemies[0].block = 10;
        state.enemies[0].barrier = 10;

        let outcome = apply_damage(&mut state, target, 6, true);

        assert_eq!(outcome.damage, 6);
        assert_eq!(outcome.absorbed, 0);
        let enemy = state.entity(target).unwrap();
        assert_eq!(enemy.block, 10);
        assert_eq!(enemy.barrier, 10);
        assert_eq!(enemy.health, 14);
    }

    #[test]
    fn test_lethal_removes_enemy_and_wins() {
        let mut state = state_with_enemies(1);
        let target = state.enemies[0].id;

        let outcome = apply_damage(&mut state, target, 50, false);

        assert!(outcome.killed);
        assert!(state.entity(target).is_none());
        assert_eq!(state.stats.enemies_killed, 1);
        assert_eq!(state.phase, Phase::Victory);
    }

    #[test]
    fn test_player_death_is_defeat() {
        let mut state = state_with_enemies(1);

        apply_damage(&mut state, EntityId::PLAYER, 200, false);

        assert_eq!(state.player.health, 0);
        assert_eq!(state.phase, Phase::Defeat);
    }

    #[test]
    fn test_zero_and_missing_are_noops() {
        let mut state = state_with_enemies(1);
        let target = state.enemies[0].id;

        assert_eq!(apply_damage(&mut state, target, 0, false), DamageOutcome::default());
        assert_eq!(
            apply_damage(&mut state, EntityId::new(99), 10, false),
            DamageOutcome::default()
        );
        assert_eq!(state.entity(target).unwrap().health, 20);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut state = state_with_enemies(1);
        state.player.health = 70;

        assert_eq!(heal(&mut state, EntityId::PLAYER, 20, false), 10);
        assert_eq!(state.player.health, 80);

        assert_eq!(heal(&mut state, EntityId::PLAYER, 5, true), 5);
        assert_eq!(state.player.health, 85);
    }

    #[test]
    fn test_stats_tracking() {
        let mut state = state_with_enemies(1);
        let target = state.enemies[0].id;
        state.enemies[0].block = 3;

        apply_damage(&mut state, target, 8, false);
        apply_damage(&mut state, EntityId::PLAYER, 4, false);

        assert_eq!(state.stats.damage_dealt, 5);
        assert_eq!(state.stats.damage_taken, 4);
    }

    #[test]
    fn test_block_and_barrier_gain() {
        let mut state = state_with_enemies(1);

        gain_block(&mut state, EntityId::PLAYER, 5);
        gain_barrier(&mut state, EntityId::PLAYER, 3);
        gain_block(&mut state, EntityId::PLAYER, -2);

        assert_eq!(state.player.block, 5);
        assert_eq!(state.player.barrier, 3);
    }
}
