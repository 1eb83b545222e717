//! Power bookkeeping.
//!
//! All stack arithmetic, decay scheduling, silencing, and stat
//! modifiers live here. Trigger *effects* are returned to the
//! interpreter rather than executed in place, so this module never
//! recurses into effect resolution.
//!
//! Unknown power IDs are logged and skipped; content referencing an
//! unregistered power degrades to a no-op instead of corrupting state.

use tracing::warn;

use crate::content::power::{DecayPhase, PowerEvent, PowerId, StackBehavior, ValueModifier};
use crate::content::registry::ContentRegistry;
use crate::core::entity::{Entity, EntityId, PowerRecord};
use crate::core::state::CombatState;
use crate::effects::effect::AtomicEffect;
use crate::events::VisualEvent;

/// Apply stacks of a power to an entity.
///
/// Stacking follows the definition: intensity adds amounts, duration
/// keeps the larger, both does both. A record whose amount ends at or
/// below zero is removed unless the definition keeps it.
pub fn apply_power(
    state: &mut CombatState,
    registry: &ContentRegistry,
    target: EntityId,
    power: &PowerId,
    amount: i32,
    duration: Option<i32>,
) {
    let Some(definition) = registry.get_power(power) else {
        warn!(power = %power, "Ignoring unknown power");
        return;
    };
    let stacking = definition.stacking;
    let remove_at_zero = definition.remove_at_zero;

    let Some(entity) = state.entity_mut(target) else {
        return;
    };

    let (final_amount, changed) = if let Some(record) = entity.power_mut(power) {
        let before = (record.amount, record.duration);
        match stacking {
            StackBehavior::Intensity | StackBehavior::Both => record.amount += amount,
            StackBehavior::Duration => record.amount = record.amount.max(amount),
        }
        if let Some(turns) = duration {
            record.duration = Some(record.duration.map_or(turns, |d| d.max(turns)));
        }
        (record.amount, (record.amount, record.duration) != before)
    } else if amount > 0 || !remove_at_zero {
        let mut record = PowerRecord::new(power.clone(), amount);
        record.duration = duration;
        entity.powers.push(record);
        (amount, true)
    } else {
        return;
    };

    let removed = final_amount <= 0 && remove_at_zero;
    if removed {
        entity.take_power(power);
        state.push_event(VisualEvent::PowerRemoved {
            target,
            power: power.clone(),
        });
    } else if changed {
        // No event when the application left the record untouched
        state.push_event(VisualEvent::PowerApplied {
            target,
            power: power.clone(),
            amount,
        });
    }
}

/// Remove a power from an entity.
///
/// `amount = None` removes the record outright; `Some(n)` subtracts
/// stacks and drops the record when it bottoms out.
pub fn remove_power(
    state: &mut CombatState,
    registry: &ContentRegistry,
    target: EntityId,
    power: &PowerId,
    amount: Option<i32>,
) {
    let remove_at_zero = registry.get_power(power).map_or(true, |d| d.remove_at_zero);

    let Some(entity) = state.entity_mut(target) else {
        return;
    };
    if entity.power(power).is_none() {
        return;
    }

    let fully_removed = match amount {
        None => {
            entity.take_power(power);
            true
        }
        Some(n) => {
            let record = entity.power_mut(power).map(|r| {
                r.amount -= n;
                r.amount
            });
            if record.is_some_and(|remaining| remaining <= 0 && remove_at_zero) {
                entity.take_power(power);
                true
            } else {
                false
            }
        }
    };

    if fully_removed {
        state.push_event(VisualEvent::PowerRemoved {
            target,
            power: power.clone(),
        });
    } else if let Some(n) = amount {
        state.push_event(VisualEvent::PowerApplied {
            target,
            power: power.clone(),
            amount: -n,
        });
    }
}

/// Suppress a power's triggers and modifiers for a number of turns.
///
/// The countdown ticks at the holder's turn end; stacks are untouched
/// and resume working when the silence expires.
pub fn silence_power(state: &mut CombatState, target: EntityId, power: &PowerId, turns: i32) {
    if turns <= 0 {
        return;
    }
    let Some(entity) = state.entity_mut(target) else {
        return;
    };
    let Some(record) = entity.power_mut(power) else {
        return;
    };

    record.silenced = Some(record.silenced.map_or(turns, |t| t.max(turns)));
    state.push_event(VisualEvent::PowerSilenced {
        target,
        power: power.clone(),
        turns,
    });
}

/// Move every power from one entity onto another, merging stacks.
pub fn transfer_powers(
    state: &mut CombatState,
    registry: &ContentRegistry,
    from: EntityId,
    to: EntityId,
) {
    if from == to {
        return;
    }
    let records = match state.entity_mut(from) {
        Some(entity) => std::mem::take(&mut entity.powers),
        None => return,
    };

    for record in records {
        state.push_event(VisualEvent::PowerRemoved {
            target: from,
            power: record.power.clone(),
        });
        apply_power(state, registry, to, &record.power, record.amount, record.duration);
    }
}

/// Move one power from a victim onto a thief, merging stacks.
pub fn steal_power(
    state: &mut CombatState,
    registry: &ContentRegistry,
    from: EntityId,
    to: EntityId,
    power: &PowerId,
) {
    if from == to {
        return;
    }
    let record = match state.entity_mut(from) {
        Some(entity) => match entity.take_power(power) {
            Some(record) => record,
            None => return,
        },
        None => return,
    };

    state.push_event(VisualEvent::PowerRemoved {
        target: from,
        power: power.clone(),
    });
    apply_power(state, registry, to, power, record.amount, record.duration);
}

/// Tick decay for one entity at a turn boundary.
///
/// At the matching boundary, powers with that decay phase lose one
/// stack. Durations and silence countdowns tick only at turn end.
/// Records are removed when stacks bottom out (per the definition) or
/// a duration expires.
pub fn decay_powers(
    state: &mut CombatState,
    registry: &ContentRegistry,
    target: EntityId,
    phase: DecayPhase,
) {
    let mut removals: Vec<PowerId> = Vec::new();

    {
        let Some(entity) = state.entity_mut(target) else {
            return;
        };

        for record in &mut entity.powers {
            let definition = registry.get_power(&record.power);
            let decays_now = definition.is_some_and(|d| d.decay_on == Some(phase));
            let remove_at_zero = definition.map_or(true, |d| d.remove_at_zero);

            if decays_now && record.amount > 0 {
                record.amount -= 1;
            }

            if phase == DecayPhase::TurnEnd {
                if let Some(turns) = record.duration {
                    record.duration = Some(turns - 1);
                }
                if let Some(turns) = record.silenced {
                    let remaining = turns - 1;
                    record.silenced = (remaining > 0).then_some(remaining);
                }
            }

            let expired = record.duration.is_some_and(|d| d <= 0);
            if expired || (record.amount <= 0 && remove_at_zero) {
                removals.push(record.power.clone());
            }
        }

        entity
            .powers
            .retain(|record| !removals.contains(&record.power));
    }

    for power in removals {
        state.push_event(VisualEvent::PowerRemoved { target, power });
    }
}

/// Collect the effect lists every active power on an entity fires for
/// an event, with the stack count each fired at.
///
/// Returned in application order; silenced records are skipped.
#[must_use]
pub fn triggers_for(
    entity: &Entity,
    registry: &ContentRegistry,
    event: PowerEvent,
) -> Vec<(PowerId, i32, Vec<AtomicEffect>)> {
    let mut out = Vec::new();
    for record in &entity.powers {
        if !record.is_active() {
            continue;
        }
        let Some(definition) = registry.get_power(&record.power) else {
            continue;
        };
        for trigger in definition.triggers_for(event) {
            out.push((record.power.clone(), record.amount, trigger.effects.clone()));
        }
    }
    out
}

/// Whether any active power on the entity retains block across the
/// turn-start clear.
#[must_use]
pub fn retains_block(entity: &Entity, registry: &ContentRegistry) -> bool {
    entity.powers.iter().any(|record| {
        record.is_active()
            && registry
                .get_power(&record.power)
                .is_some_and(|d| d.retains_block)
    })
}

/// Fold a base value through a set of power modifiers: additive stack
/// modifiers first, then multiplicative ones with the result floored.
fn fold_modifiers<F>(entity: &Entity, registry: &ContentRegistry, base: i32, pick: F) -> i32
where
    F: Fn(&crate::content::power::PowerModifiers) -> Option<&ValueModifier>,
{
    let mut additive = 0i32;
    let mut multiplier = 1.0f32;

    for record in &entity.powers {
        if !record.is_active() {
            continue;
        }
        let Some(definition) = registry.get_power(&record.power) else {
            continue;
        };
        match pick(&definition.modifiers) {
            Some(ValueModifier::AddStacks) => additive += record.amount,
            Some(ValueModifier::Multiply(factor)) => multiplier *= factor,
            None => {}
        }
    }

    (((base + additive) as f32) * multiplier).floor().max(0.0) as i32
}

/// Outgoing damage after the attacker's powers (strength, weak).
#[must_use]
pub fn modify_outgoing_damage(entity: &Entity, registry: &ContentRegistry, base: i32) -> i32 {
    fold_modifiers(entity, registry, base, |m| m.damage_dealt.as_ref())
}

/// Incoming damage after the defender's powers (vulnerable).
#[must_use]
pub fn modify_incoming_damage(entity: &Entity, registry: &ContentRegistry, base: i32) -> i32 {
    fold_modifiers(entity, registry, base, |m| m.damage_taken.as_ref())
}

/// Block gained after the gainer's powers (dexterity, frail).
#[must_use]
pub fn modify_outgoing_block(entity: &Entity, registry: &ContentRegistry, base: i32) -> i32 {
    fold_modifiers(entity, registry, base, |m| m.block_gained.as_ref())
}
