//! Effect interpreter.
//!
//! Walks an effect list depth-first against a mutable combat state.
//! Leaves delegate to the damage pipeline and power engine; meta
//! effects re-enter `execute_all` with a derived context. Everything
//! here is a best-effort no-op on missing targets: an effect list never
//! aborts partway, it just skips the sites that no longer resolve.
//!
//! ## Attack provenance
//!
//! Damage carries an implicit attack/non-attack distinction: damage
//! executed inside a power or relic trigger is non-attack and fires no
//! further attack triggers. That bound is what keeps Thorns-style
//! powers from triggering each other forever.

use tracing::{debug, warn};

use crate::combat::damage::{self, DamageOutcome};
use crate::combat::turn;
use crate::content::card::CardInstance;
use crate::content::power::PowerEvent;
use crate::content::registry::ContentRegistry;
use crate::core::entity::EntityId;
use crate::core::state::{CombatState, DelayedEffect, PendingSelection, Pile};
use crate::events::VisualEvent;
use crate::powers;

use super::effect::{AtomicEffect, Condition, EffectContext, IterationTarget};
use super::target::{self, CardTarget, EntityTarget};
use super::value;

/// Executes effect lists against a combat state.
pub struct Interpreter<'a> {
    registry: &'a ContentRegistry,
}

impl<'a> Interpreter<'a> {
    #[must_use]
    pub fn new(registry: &'a ContentRegistry) -> Self {
        Self { registry }
    }

    /// Execute a full effect list in order.
    ///
    /// A mid-list lethal does not short-circuit: remaining effects run
    /// and no-op over entities that are gone.
    pub fn execute_all(&self, state: &mut CombatState, effects: &[AtomicEffect], ctx: &EffectContext) {
        for effect in effects {
            self.execute(state, effect, ctx);
        }
    }

    /// Execute a single effect.
    pub fn execute(&self, state: &mut CombatState, effect: &AtomicEffect, ctx: &EffectContext) {
        match effect {
            AtomicEffect::Damage {
                target,
                amount,
                piercing,
                on_hit,
            } => {
                // One resolution per evaluation site, shared by every target
                let base = value::resolve(amount, state, ctx);
                for id in target::resolve_entities(target, state, ctx) {
                    let outcome = self.damage_entity(state, ctx, id, base, *piercing);
                    if outcome.connected() && !on_hit.is_empty() {
                        self.execute_all(state, on_hit, &ctx.iterating(id));
                    }
                }
            }
            AtomicEffect::Lifesteal { target, amount } => {
                let base = value::resolve(amount, state, ctx);
                for id in target::resolve_entities(target, state, ctx) {
                    let outcome = self.damage_entity(state, ctx, id, base, false);
                    if outcome.damage > 0 {
                        damage::heal(state, ctx.source, outcome.damage, false);
                    }
                }
            }
            AtomicEffect::Block { target, amount } => {
                let base = value::resolve(amount, state, ctx);
                for id in target::resolve_entities(target, state, ctx) {
                    let modified = state
                        .entity(id)
                        .map_or(base, |e| powers::modify_outgoing_block(e, self.registry, base));
                    damage::gain_block(state, id, modified);
                }
            }
            AtomicEffect::Barrier { target, amount } => {
                let resolved = value::resolve(amount, state, ctx);
                for id in target::resolve_entities(target, state, ctx) {
                    damage::gain_barrier(state, id, resolved);
                }
            }
            AtomicEffect::Heal {
                target,
                amount,
                can_overheal,
            } => {
                let resolved = value::resolve(amount, state, ctx);
                for id in target::resolve_entities(target, state, ctx) {
                    damage::heal(state, id, resolved, *can_overheal);
                }
            }
            AtomicEffect::GainEnergy(amount) => {
                let delta = value::resolve(amount, state, ctx);
                adjust_energy(state, ctx.source, delta);
            }
            AtomicEffect::LoseEnergy(amount) => {
                let delta = value::resolve(amount, state, ctx);
                adjust_energy(state, ctx.source, -delta);
            }

            AtomicEffect::Draw(amount) => {
                let count = value::resolve(amount, state, ctx).max(0) as usize;
                turn::draw_cards(state, count);
            }
            AtomicEffect::Discard(cards) => {
                for uid in target::resolve_cards(cards, state, ctx, self.registry) {
                    self.move_card(state, uid, Pile::Discard, VisualEvent::CardDiscarded { card: uid });
                }
            }
            AtomicEffect::DiscardHand => {
                let uids: Vec<_> = state.hand.iter().map(|c| c.uid).collect();
                for uid in uids {
                    self.move_card(state, uid, Pile::Discard, VisualEvent::CardDiscarded { card: uid });
                }
            }
            AtomicEffect::Exhaust(cards) => {
                for uid in target::resolve_cards(cards, state, ctx, self.registry) {
                    self.move_card(state, uid, Pile::Exhaust, VisualEvent::CardExhausted { card: uid });
                }
            }
            AtomicEffect::Banish(cards) => {
                for uid in target::resolve_cards(cards, state, ctx, self.registry) {
                    if state.remove_card(uid).is_some() {
                        state.push_event(VisualEvent::CardBanished { card: uid });
                    }
                }
            }
            AtomicEffect::AddCard {
                card,
                pile,
                count,
                upgraded,
            } => {
                if self.registry.get_card(card).is_none() {
                    warn!(card = %card, "Ignoring AddCard for unknown definition");
                    return;
                }
                let copies = value::resolve(count, state, ctx).max(0);
                for _ in 0..copies {
                    let uid = state.alloc_card_uid();
                    let instance = if *upgraded {
                        CardInstance::upgraded(uid, card.clone())
                    } else {
                        CardInstance::new(uid, card.clone())
                    };
                    match pile {
                        // New draw-pile cards land at a random depth
                        Pile::Draw => {
                            let index = state.rng.gen_range_usize(0..state.draw_pile.len() + 1);
                            state.draw_pile.insert(index, instance);
                        }
                        other => state.add_card_to(*other, instance),
                    }
                    state.push_event(VisualEvent::CardAdded { card: uid, pile: *pile });
                }
            }
            AtomicEffect::Transform(cards) => {
                for uid in target::resolve_cards(cards, state, ctx, self.registry) {
                    let Some(current) = state.find_card(uid).map(|c| c.definition.clone()) else {
                        continue;
                    };
                    let candidates: Vec<_> = self
                        .registry
                        .card_ids()
                        .iter()
                        .filter(|id| **id != current)
                        .cloned()
                        .collect();
                    let Some(into) = state.rng.choose(&candidates).cloned() else {
                        continue;
                    };
                    if let Some(card) = state.find_card_mut(uid) {
                        card.definition = into.clone();
                        card.upgraded = false;
                        card.clear_transient_flags();
                    }
                    state.push_event(VisualEvent::CardTransformed { card: uid, into });
                }
            }
            AtomicEffect::Upgrade(cards) => {
                for uid in target::resolve_cards(cards, state, ctx, self.registry) {
                    if let Some(card) = state.find_card_mut(uid) {
                        if !card.upgraded {
                            card.upgraded = true;
                            state.push_event(VisualEvent::CardUpgraded { card: uid });
                        }
                    }
                }
            }
            AtomicEffect::Retain(cards) => {
                for uid in target::resolve_cards(cards, state, ctx, self.registry) {
                    if let Some(card) = state.find_card_mut(uid) {
                        card.retained = true;
                    }
                }
            }
            AtomicEffect::ModifyCost { target, delta } => {
                for uid in target::resolve_cards(target, state, ctx, self.registry) {
                    if let Some(card) = state.find_card_mut(uid) {
                        card.cost_modifier += delta;
                    }
                }
            }
            AtomicEffect::SetEthereal { target, ethereal } => {
                for uid in target::resolve_cards(target, state, ctx, self.registry) {
                    if let Some(card) = state.find_card_mut(uid) {
                        card.ethereal_override = Some(*ethereal);
                    }
                }
            }
            AtomicEffect::SetUnplayable { target, unplayable } => {
                for uid in target::resolve_cards(target, state, ctx, self.registry) {
                    if let Some(card) = state.find_card_mut(uid) {
                        card.unplayable = *unplayable;
                    }
                }
            }

            AtomicEffect::ApplyPower {
                target,
                power,
                amount,
                duration,
            } => {
                let stacks = value::resolve(amount, state, ctx);
                let turns = duration.as_ref().map(|d| value::resolve(d, state, ctx));
                for id in target::resolve_entities(target, state, ctx) {
                    powers::apply_power(state, self.registry, id, power, stacks, turns);
                }
            }
            AtomicEffect::RemovePower {
                target,
                power,
                amount,
            } => {
                let stacks = amount.as_ref().map(|a| value::resolve(a, state, ctx));
                for id in target::resolve_entities(target, state, ctx) {
                    powers::remove_power(state, self.registry, id, power, stacks);
                }
            }
            AtomicEffect::TransferPowers { from, to } => {
                let from_id = target::resolve_entities(from, state, ctx).first().copied();
                let to_id = target::resolve_entities(to, state, ctx).first().copied();
                if let (Some(from_id), Some(to_id)) = (from_id, to_id) {
                    powers::transfer_powers(state, self.registry, from_id, to_id);
                }
            }
            AtomicEffect::StealPower { from, power } => {
                if let Some(&victim) = target::resolve_entities(from, state, ctx).first() {
                    powers::steal_power(state, self.registry, victim, ctx.source, power);
                }
            }
            AtomicEffect::SilencePower {
                target,
                power,
                turns,
            } => {
                let duration = value::resolve(turns, state, ctx);
                for id in target::resolve_entities(target, state, ctx) {
                    powers::silence_power(state, id, power, duration);
                }
            }

            AtomicEffect::Scry(amount) => {
                if state.pending_selection.is_some() {
                    warn!("Ignoring scry while a selection is already pending");
                    return;
                }
                let count = (value::resolve(amount, state, ctx).max(0) as usize)
                    .min(state.draw_pile.len());
                if count == 0 {
                    return;
                }
                let mut cards = Vec::with_capacity(count);
                while cards.len() < count {
                    match state.draw_pile.pop_front() {
                        Some(card) => cards.push(card),
                        None => break,
                    }
                }
                state.pending_selection = Some(PendingSelection::Scry { cards });
                state.push_event(VisualEvent::SelectionRequested);
            }
            AtomicEffect::Tutor { pile, count, theme } => {
                if state.pending_selection.is_some() {
                    warn!("Ignoring tutor while a selection is already pending");
                    return;
                }
                let query = CardTarget::Query {
                    pile: *pile,
                    theme: theme.clone(),
                    min_cost: None,
                    max_cost: None,
                    has_effect: None,
                };
                let cards = target::resolve_cards(&query, state, ctx, self.registry);
                if cards.is_empty() {
                    return;
                }
                state.pending_selection = Some(PendingSelection::Tutor {
                    cards,
                    count: *count,
                    from: *pile,
                });
                state.push_event(VisualEvent::SelectionRequested);
            }
            AtomicEffect::Discover { choices, count } => {
                if state.pending_selection.is_some() {
                    warn!("Ignoring discover while a selection is already pending");
                    return;
                }
                let mut pool: Vec<_> = self.registry.card_ids().to_vec();
                if pool.is_empty() {
                    return;
                }
                state.rng.shuffle(&mut pool);
                pool.truncate(*choices);
                state.pending_selection = Some(PendingSelection::Discover {
                    choices: pool,
                    count: *count,
                });
                state.push_event(VisualEvent::SelectionRequested);
            }
            AtomicEffect::BanishSelect { pile, count } => {
                if state.pending_selection.is_some() {
                    warn!("Ignoring banish selection while one is already pending");
                    return;
                }
                let cards: Vec<_> = state.pile(*pile).iter().map(|c| c.uid).collect();
                if cards.is_empty() {
                    return;
                }
                state.pending_selection = Some(PendingSelection::Banish {
                    cards,
                    count: *count,
                    from: *pile,
                });
                state.push_event(VisualEvent::SelectionRequested);
            }

            AtomicEffect::Delayed {
                turns,
                phase,
                effects,
            } => {
                state.delayed.push_back(DelayedEffect {
                    turns_remaining: (*turns).max(1),
                    phase: *phase,
                    effects: effects.clone(),
                    source: ctx.source,
                });
            }

            AtomicEffect::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate(condition, state, ctx) {
                    self.execute_all(state, then, ctx);
                } else {
                    self.execute_all(state, otherwise, ctx);
                }
            }
            AtomicEffect::Repeat { times, effects } => {
                let iterations = value::resolve(times, state, ctx).max(0);
                for _ in 0..iterations {
                    self.execute_all(state, effects, ctx);
                }
            }
            AtomicEffect::Random { branches, weights } => {
                if branches.is_empty() {
                    return;
                }
                let index = match weights {
                    Some(weights) if weights.len() == branches.len() => {
                        state.rng.choose_weighted(weights)
                    }
                    Some(_) => {
                        warn!("Random branch weights mismatched; falling back to uniform");
                        None
                    }
                    None => None,
                }
                .unwrap_or_else(|| state.rng.gen_range_usize(0..branches.len()));
                self.execute_all(state, &branches[index], ctx);
            }
            AtomicEffect::Sequence(effects) => self.execute_all(state, effects, ctx),
            AtomicEffect::ForEach { over, effects } => match over {
                IterationTarget::Entities(entities) => {
                    // Snapshot: deaths mid-iteration skip naturally
                    let ids = target::resolve_entities(entities, state, ctx);
                    for id in ids {
                        self.execute_all(state, effects, &ctx.iterating(id));
                    }
                }
                IterationTarget::Cards(cards) => {
                    let uids = target::resolve_cards(cards, state, ctx, self.registry);
                    for uid in uids {
                        self.execute_all(state, effects, &ctx.iterating_card(uid));
                    }
                }
            },
        }
    }

    /// Run one hit through the modifier and absorption pipeline, then
    /// fire the damage-related triggers it earned.
    pub fn damage_entity(
        &self,
        state: &mut CombatState,
        ctx: &EffectContext,
        target: EntityId,
        base: i32,
        piercing: bool,
    ) -> DamageOutcome {
        // Trigger-sourced damage is non-attack and fires no triggers.
        let is_attack = ctx.power.is_none();

        let outgoing = state
            .entity(ctx.source)
            .map_or(base, |e| powers::modify_outgoing_damage(e, self.registry, base));
        let incoming = state
            .entity(target)
            .map_or(outgoing, |e| powers::modify_incoming_damage(e, self.registry, outgoing));

        let outcome = damage::apply_damage(state, target, incoming, piercing);

        if is_attack && outcome.connected() {
            self.fire_event(state, ctx.source, PowerEvent::Attack);
            self.fire_event(state, target, PowerEvent::Attacked);
            if outcome.damage > 0 {
                self.fire_event(state, target, PowerEvent::Damaged);
            }
        }
        // Kills fire regardless of provenance; they credit the player,
        // the same way the kill count does.
        if outcome.killed && !target.is_player() {
            self.fire_event(state, EntityId::PLAYER, PowerEvent::Kill);
        }
        outcome
    }

    /// Fire every power trigger (and, for the player, relic trigger)
    /// an entity holds for an event.
    pub fn fire_event(&self, state: &mut CombatState, owner: EntityId, event: PowerEvent) {
        let Some(entity) = state.entity(owner) else {
            return;
        };

        let triggered = powers::triggers_for(entity, self.registry, event);
        let relic_triggers: Vec<_> = entity
            .as_player()
            .map(|p| p.relics.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|relic| {
                self.registry.get_relic(&relic).map(|definition| {
                    let effects: Vec<_> = definition
                        .triggers_for(event)
                        .flat_map(|t| t.effects.clone())
                        .collect();
                    (relic, effects)
                })
            })
            .filter(|(_, effects)| !effects.is_empty())
            .collect();

        for (power, stacks, effects) in triggered {
            debug!(owner = %owner, power = %power, ?event, "Power trigger");
            state.push_event(VisualEvent::PowerTriggered {
                owner,
                power: power.clone(),
            });
            let ctx = EffectContext::for_power(owner, power, stacks);
            self.execute_all(state, &effects, &ctx);
        }

        for (relic, effects) in relic_triggers {
            debug!(owner = %owner, relic = %relic, ?event, "Relic trigger");
            state.push_event(VisualEvent::RelicTriggered { relic: relic.clone() });
            // Relic effects carry power provenance so their damage is
            // non-attack, same as power triggers.
            let ctx = EffectContext {
                power: Some(crate::content::power::PowerId::new(relic.as_str())),
                power_stacks: Some(1),
                ..EffectContext::new(owner)
            };
            self.execute_all(state, &effects, &ctx);
        }
    }

    /// Evaluate a condition tree.
    pub fn evaluate(&self, condition: &Condition, state: &mut CombatState, ctx: &EffectContext) -> bool {
        match condition {
            Condition::HealthBelowPercent { target, percent } => {
                first_entity(target, state, ctx).is_some_and(|(health, max)| {
                    health * 100 < max * percent
                })
            }
            Condition::HealthAtLeastPercent { target, percent } => {
                first_entity(target, state, ctx).is_some_and(|(health, max)| {
                    health * 100 >= max * percent
                })
            }
            Condition::EnergyAtLeast(amount) => state.player_energy() >= *amount,
            Condition::HasPower {
                target,
                power,
                min_stacks,
            } => target::resolve_entities(target, state, ctx)
                .first()
                .and_then(|&id| state.entity(id))
                .is_some_and(|e| e.power_amount(power) >= *min_stacks),
            Condition::CardsInPileAtLeast { pile, count } => state.pile(*pile).len() >= *count,
            Condition::TurnAtLeast(turn) => state.turn >= *turn,
            Condition::CardsPlayedAtLeast(count) => state.cards_played_this_turn >= *count,
            Condition::EnemyCountAtLeast(count) => state.enemies.len() >= *count,
            Condition::PhaseIs(phase) => state.phase == *phase,
            Condition::All(inner) => inner.iter().all(|c| self.evaluate(c, state, ctx)),
            Condition::Any(inner) => inner.iter().any(|c| self.evaluate(c, state, ctx)),
            Condition::Not(inner) => !self.evaluate(inner, state, ctx),
        }
    }

    fn move_card(&self, state: &mut CombatState, uid: crate::content::card::CardUid, to: Pile, event: VisualEvent) {
        if let Some((_, card)) = state.remove_card(uid) {
            state.add_card_to(to, card);
            state.push_event(event);
        }
    }
}

fn first_entity(
    target: &EntityTarget,
    state: &mut CombatState,
    ctx: &EffectContext,
) -> Option<(i32, i32)> {
    target::resolve_entities(target, state, ctx)
        .first()
        .and_then(|&id| state.entity(id))
        .map(|e| (e.health, e.max_health))
}

fn adjust_energy(state: &mut CombatState, source: EntityId, delta: i32) {
    if delta == 0 {
        return;
    }
    let Some(entity) = state.entity_mut(source) else {
        return;
    };
    let applied = if let Some(player) = entity.as_player_mut() {
        let before = player.energy;
        player.energy = (player.energy + delta).max(0);
        player.energy - before
    } else if let Some(enemy) = entity.as_enemy_mut() {
        let before = enemy.energy;
        enemy.energy = (enemy.energy + delta).max(0);
        enemy.energy - before
    } else {
        0
    };

    if applied != 0 && source.is_player() {
        state.push_event(VisualEvent::EnergyChanged { amount: applied });
    }
}
