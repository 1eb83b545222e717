//! Enemy turn resolution.
//!
//! Each enemy's turn is a single atomic sub-step: boundary bookkeeping
//! (block clear, decay, energy income, cooldown tick), one action
//! chosen by priority, then end-of-turn decay. Priority is ultimate
//! over ability over the basic move pattern:
//!
//! - ultimate: below its health threshold, at most once per combat
//! - ability: cooldown elapsed and energy affordable
//! - basic move: the pattern entry at the current index, advancing it

use tracing::debug;

use crate::content::power::{DecayPhase, PowerEvent};
use crate::content::registry::ContentRegistry;
use crate::core::entity::EntityId;
use crate::core::state::{CombatState, Phase};
use crate::effects::effect::{AtomicEffect, EffectContext};
use crate::effects::interpreter::Interpreter;
use crate::events::VisualEvent;
use crate::powers;

/// Resolve one enemy's action for the current enemy turn.
///
/// No-op outside the enemy phase or for a missing enemy.
pub fn enemy_action(state: &mut CombatState, registry: &ContentRegistry, enemy: EntityId) {
    if state.phase != Phase::EnemyTurn {
        debug!(enemy = %enemy, "Ignoring enemyAction outside the enemy turn");
        return;
    }
    if state.entity(enemy).map_or(true, |e| e.is_player()) {
        return;
    }

    begin_enemy_turn(state, registry, enemy);
    if state.phase.is_terminal() || state.entity(enemy).is_none() {
        return;
    }

    let Some((name, effects)) = choose_action(state, enemy) else {
        return;
    };
    debug!(enemy = %enemy, action = %name, "Enemy acts");
    state.push_event(VisualEvent::EnemyActed {
        enemy,
        name: name.clone(),
    });

    let interpreter = Interpreter::new(registry);
    let ctx = EffectContext::new(enemy);
    interpreter.execute_all(state, &effects, &ctx);

    finish_enemy_turn(state, registry, enemy);
}

fn begin_enemy_turn(state: &mut CombatState, registry: &ContentRegistry, enemy: EntityId) {
    if !state
        .entity(enemy)
        .is_some_and(|e| powers::retains_block(e, registry))
    {
        if let Some(entity) = state.entity_mut(enemy) {
            entity.block = 0;
        }
    }

    // Triggers see full stacks; decay follows
    Interpreter::new(registry).fire_event(state, enemy, PowerEvent::TurnStart);
    powers::decay_powers(state, registry, enemy, DecayPhase::TurnStart);

    if let Some(enemy_state) = state.entity_mut(enemy).and_then(|e| e.as_enemy_mut()) {
        enemy_state.energy += enemy_state.spec.energy_per_turn;
        if enemy_state.ability_cooldown > 0 {
            enemy_state.ability_cooldown -= 1;
        }
    }
}

/// Pick this enemy's action, applying its costs and advancing its
/// pattern as a side effect.
fn choose_action(state: &mut CombatState, enemy: EntityId) -> Option<(String, Vec<AtomicEffect>)> {
    let (health, max_health) = {
        let entity = state.entity(enemy)?;
        (entity.health, entity.max_health)
    };

    let entity = state.entity_mut(enemy)?;
    let enemy_state = entity.as_enemy_mut()?;

    let mut chosen: Option<(String, Vec<AtomicEffect>)> = None;

    if let Some(ultimate) = &enemy_state.spec.ultimate {
        if !enemy_state.ultimate_fired && health * 100 <= max_health * ultimate.threshold_percent {
            chosen = Some((ultimate.name.clone(), ultimate.effects.clone()));
            enemy_state.ultimate_fired = true;
        }
    }

    if chosen.is_none() {
        if let Some(ability) = &enemy_state.spec.ability {
            if enemy_state.ability_cooldown == 0 && enemy_state.energy >= ability.energy_cost {
                chosen = Some((ability.name.clone(), ability.effects.clone()));
                enemy_state.energy -= ability.energy_cost;
                enemy_state.ability_cooldown = ability.cooldown;
            }
        }
    }

    if chosen.is_none() {
        if enemy_state.spec.moves.is_empty() {
            return None;
        }
        let index = enemy_state.pattern_index % enemy_state.spec.moves.len();
        let next = enemy_state.spec.moves[index].clone();
        enemy_state.pattern_index = (index + 1) % enemy_state.spec.moves.len();
        chosen = Some((next.name, next.effects));
    }

    // Whatever was picked, the published intent points at the next
    // basic move in the pattern
    let next_intent = enemy_state
        .spec
        .moves
        .get(enemy_state.pattern_index)
        .map(|m| m.name.clone());
    enemy_state.intent = next_intent.clone();
    if let Some(intent) = next_intent {
        state.push_event(VisualEvent::EnemyIntent { enemy, intent });
    }

    chosen
}

fn finish_enemy_turn(state: &mut CombatState, registry: &ContentRegistry, enemy: EntityId) {
    if state.phase.is_terminal() || state.entity(enemy).is_none() {
        return;
    }
    Interpreter::new(registry).fire_event(state, enemy, PowerEvent::TurnEnd);
    powers::decay_powers(state, registry, enemy, DecayPhase::TurnEnd);
}
