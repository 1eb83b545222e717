//! Turn state machine and card-play bookkeeping.
//!
//! Owns the player-turn boundary work: energy reset, block clearing,
//! power decay, scheduled-effect ticking, draw/reshuffle, and the
//! end-of-turn hand partition (retained / ethereal / discarded).
//! Card play validation and sequencing live here too; the interpreter
//! only ever sees an already-validated card.

use tracing::{debug, warn};

use crate::content::card::CardUid;
use crate::content::power::{DecayPhase, PowerEvent};
use crate::content::registry::ContentRegistry;
use crate::core::entity::EntityId;
use crate::core::state::{CombatState, Phase, Pile};
use crate::effects::effect::EffectContext;
use crate::effects::interpreter::Interpreter;
use crate::events::VisualEvent;
use crate::powers;

/// Draw cards into hand, reshuffling the discard pile into the draw
/// pile when it runs dry. Stops early without error when both piles
/// are empty.
pub fn draw_cards(state: &mut CombatState, count: usize) {
    for _ in 0..count {
        if state.draw_pile.is_empty() {
            if state.discard_pile.is_empty() {
                break;
            }
            reshuffle_discard(state);
        }
        if let Some(card) = state.draw_pile.pop_front() {
            let uid = card.uid;
            state.hand.push_back(card);
            state.push_event(VisualEvent::CardDrawn { card: uid });
        }
    }
}

fn reshuffle_discard(state: &mut CombatState) {
    let mut cards: Vec<_> = state.discard_pile.iter().cloned().collect();
    state.discard_pile.clear();
    state.rng.shuffle(&mut cards);
    state.draw_pile = cards.into_iter().collect();
    state.push_event(VisualEvent::DeckShuffled);
}

/// Shuffle the draw pile in place.
pub fn shuffle_draw_pile(state: &mut CombatState) {
    let mut cards: Vec<_> = state.draw_pile.iter().cloned().collect();
    state.rng.shuffle(&mut cards);
    state.draw_pile = cards.into_iter().collect();
    state.push_event(VisualEvent::DeckShuffled);
}

/// Run scheduled effects whose countdown expires at this boundary.
pub fn tick_delayed(state: &mut CombatState, registry: &ContentRegistry, phase: DecayPhase) {
    let mut due = Vec::new();
    let mut remaining = im::Vector::new();

    for mut entry in std::mem::take(&mut state.delayed) {
        if entry.phase != phase {
            remaining.push_back(entry);
            continue;
        }
        entry.turns_remaining -= 1;
        if entry.turns_remaining <= 0 {
            due.push(entry);
        } else {
            remaining.push_back(entry);
        }
    }
    state.delayed = remaining;

    let interpreter = Interpreter::new(registry);
    for entry in due {
        let ctx = EffectContext::new(entry.source);
        interpreter.execute_all(state, &entry.effects, &ctx);
    }
}

/// Begin a player turn.
pub fn start_turn(state: &mut CombatState, registry: &ContentRegistry) {
    state.phase = Phase::PlayerTurn;
    state.turn += 1;
    state.cards_played_this_turn = 0;
    state.push_event(VisualEvent::TurnStarted { turn: state.turn });

    // Energy back to max
    let refill = state.player.as_player().map(|p| p.max_energy - p.energy);
    if let (Some(delta), Some(player)) = (refill, state.player.as_player_mut()) {
        player.energy += delta;
        if delta != 0 {
            state.push_event(VisualEvent::EnergyChanged { amount: delta });
        }
    }

    if !powers::retains_block(&state.player, registry) {
        state.player.block = 0;
    }

    // Triggers see full stacks; decay follows
    let interpreter = Interpreter::new(registry);
    interpreter.fire_event(state, EntityId::PLAYER, PowerEvent::TurnStart);
    powers::decay_powers(state, registry, EntityId::PLAYER, DecayPhase::TurnStart);
    tick_delayed(state, registry, DecayPhase::TurnStart);

    let per_turn = state.player.as_player().map_or(0, |p| p.draw_per_turn);
    draw_cards(state, per_turn);
}

/// End the player turn and hand control to the enemies.
pub fn end_turn(state: &mut CombatState, registry: &ContentRegistry) {
    let interpreter = Interpreter::new(registry);
    interpreter.fire_event(state, EntityId::PLAYER, PowerEvent::TurnEnd);
    tick_delayed(state, registry, DecayPhase::TurnEnd);
    powers::decay_powers(state, registry, EntityId::PLAYER, DecayPhase::TurnEnd);

    partition_hand(state, registry);

    if !state.phase.is_terminal() {
        state.phase = Phase::EnemyTurn;
    }
    state.push_event(VisualEvent::TurnEnded);
}

/// Retained cards stay (one-shot retain flags cleared), ethereal cards
/// exhaust, everything else discards.
fn partition_hand(state: &mut CombatState, registry: &ContentRegistry) {
    let uids: Vec<CardUid> = state.hand.iter().map(|c| c.uid).collect();

    for uid in uids {
        let Some(card) = state.hand.iter().find(|c| c.uid == uid).cloned() else {
            continue;
        };
        let Some(definition) = registry.get_card(&card.definition) else {
            continue;
        };

        if card.is_retained(definition) {
            if let Some(card) = state.find_card_mut(uid) {
                card.retained = false;
            }
        } else if card.is_ethereal(definition) {
            if let Some((_, card)) = state.remove_card(uid) {
                state.exhaust_pile.push_back(card);
                state.push_event(VisualEvent::CardExhausted { card: uid });
            }
        } else if let Some((_, card)) = state.remove_card(uid) {
            state.discard_pile.push_back(card);
            state.push_event(VisualEvent::CardDiscarded { card: uid });
        }
    }
}

/// Play a card from hand.
///
/// Validation failures (wrong phase, missing card, unplayable, missing
/// required target, insufficient energy) log and leave state untouched.
/// The card stays in hand while its effects run so self-referential
/// targets see it, then moves to discard unless an effect already
/// relocated it.
pub fn play_card(
    state: &mut CombatState,
    registry: &ContentRegistry,
    uid: CardUid,
    click_target: Option<EntityId>,
) {
    if state.phase != Phase::PlayerTurn {
        warn!(card = %uid, "Ignoring playCard outside the player turn");
        return;
    }
    let Some(card) = state.hand.iter().find(|c| c.uid == uid).cloned() else {
        warn!(card = %uid, "Ignoring playCard for a card not in hand");
        return;
    };
    let Some(definition) = registry.get_card(&card.definition).cloned() else {
        warn!(card = %uid, definition = %card.definition, "Ignoring playCard for unknown definition");
        return;
    };
    if card.unplayable {
        warn!(card = %uid, "Ignoring playCard for an unplayable card");
        return;
    }
    if definition.needs_target
        && !click_target.is_some_and(|id| !id.is_player() && state.entity(id).is_some())
    {
        warn!(card = %uid, "Ignoring playCard without a valid enemy target");
        return;
    }
    let cost = card.effective_cost(&definition);
    if state.player_energy() < cost {
        debug!(card = %uid, cost, energy = state.player_energy(), "Not enough energy");
        return;
    }

    if let Some(player) = state.player.as_player_mut() {
        player.energy -= cost;
    }
    if cost != 0 {
        state.push_event(VisualEvent::EnergyChanged { amount: -cost });
    }
    state.push_event(VisualEvent::CardPlayed { card: uid });

    let interpreter = Interpreter::new(registry);
    let ctx = EffectContext::for_card(EntityId::PLAYER, uid, click_target);
    interpreter.execute_all(state, definition.effects_for(card.upgraded), &ctx);

    // Counted after the effects run, so play-count scaling reads the
    // cards played before this one
    state.cards_played_this_turn += 1;
    state.stats.cards_played += 1;
    state.last_played = Some(uid);
    interpreter.fire_event(state, EntityId::PLAYER, PowerEvent::CardPlayed);

    // Still in hand: normal play, off to the discard pile
    if state.card_pile(uid) == Some(Pile::Hand) {
        if let Some((_, card)) = state.remove_card(uid) {
            state.discard_pile.push_back(card);
            state.push_event(VisualEvent::CardDiscarded { card: uid });
        }
    }
}

/// Discard a single card from hand.
pub fn discard_card(state: &mut CombatState, uid: CardUid) {
    if state.card_pile(uid) != Some(Pile::Hand) {
        return;
    }
    if let Some((_, card)) = state.remove_card(uid) {
        state.discard_pile.push_back(card);
        state.push_event(VisualEvent::CardDiscarded { card: uid });
    }
}
