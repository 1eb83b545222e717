//! Action dispatcher.
//!
//! `CombatEngine::step` is the only public mutation path: it clones the
//! input state, routes the action to a handler, and returns the new
//! snapshot. The input state is never touched. Actions whose
//! preconditions fail are logged no-ops.
//!
//! A pending interactive selection hard-blocks card play and turn
//! progression until the matching resolve action clears it; raw
//! utility actions and queue clearing still pass through.

use tracing::{debug, warn};

use crate::combat::{damage, enemy, turn};
use crate::content::card::{CardInstance, CardUid};
use crate::content::power::PowerEvent;
use crate::content::registry::ContentRegistry;
use crate::core::action::Action;
use crate::core::entity::EntityId;
use crate::core::state::{CombatState, PendingSelection, Phase, Pile};
use crate::effects::effect::EffectContext;
use crate::effects::interpreter::Interpreter;
use crate::events::VisualEvent;
use crate::powers;

/// The rules engine: one registry, stateless across calls.
pub struct CombatEngine<'a> {
    registry: &'a ContentRegistry,
}

impl<'a> CombatEngine<'a> {
    #[must_use]
    pub fn new(registry: &'a ContentRegistry) -> Self {
        Self { registry }
    }

    /// Process one action as an atomic state transition.
    #[must_use]
    pub fn step(&self, state: &CombatState, action: &Action) -> CombatState {
        let mut next = state.clone();
        self.apply(&mut next, action);
        next
    }

    fn apply(&self, state: &mut CombatState, action: &Action) {
        if state.phase.is_terminal() && !matches!(action, Action::ClearVisualQueue) {
            debug!(?action, "Ignoring action in a terminal phase");
            return;
        }
        if state.pending_selection.is_some() && blocked_while_pending(action) {
            warn!(?action, "Ignoring action while a selection is pending");
            return;
        }

        match action {
            Action::StartCombat { enemies } => self.start_combat(state, enemies),
            Action::EndCombat { victory } => damage::end_combat(state, *victory),
            Action::StartTurn => turn::start_turn(state, self.registry),
            Action::EndTurn => {
                if state.phase == Phase::PlayerTurn {
                    turn::end_turn(state, self.registry);
                } else {
                    warn!("Ignoring endTurn outside the player turn");
                }
            }
            Action::DrawCards { amount } => turn::draw_cards(state, *amount as usize),
            Action::PlayCard { card, target } => {
                turn::play_card(state, self.registry, *card, *target);
            }
            Action::DiscardCard { card } => turn::discard_card(state, *card),
            Action::DiscardHand => {
                let interpreter = Interpreter::new(self.registry);
                interpreter.execute(
                    state,
                    &crate::effects::effect::AtomicEffect::DiscardHand,
                    &EffectContext::new(EntityId::PLAYER),
                );
            }
            Action::Damage { target, amount } => {
                damage::apply_damage(state, *target, *amount, false);
            }
            Action::Heal { target, amount } => {
                damage::heal(state, *target, *amount, false);
            }
            Action::AddBlock { target, amount } => damage::gain_block(state, *target, *amount),
            Action::SpendEnergy { amount } => adjust_player_energy(state, -*amount),
            Action::GainEnergy { amount } => adjust_player_energy(state, *amount),
            Action::ApplyPower {
                target,
                power,
                amount,
            } => powers::apply_power(state, self.registry, *target, power, *amount, None),
            Action::EnemyAction { enemy } => enemy::enemy_action(state, self.registry, *enemy),
            Action::SelectRoom { room } => debug!(room, "selectRoom outside combat scope"),
            Action::DealRoomChoices => debug!("dealRoomChoices outside combat scope"),
            Action::ClearVisualQueue => state.visual_queue.clear(),
            Action::ResolveScry { kept, discarded } => self.resolve_scry(state, kept, discarded),
            Action::ResolveTutor { selected } => self.resolve_tutor(state, selected),
            Action::ResolveDiscover { selected } => self.resolve_discover(state, selected),
            Action::ResolveBanish { selected } => self.resolve_banish(state, selected),
        }
    }

    fn start_combat(&self, state: &mut CombatState, enemies: &[crate::content::enemy::EnemySpec]) {
        for spec in enemies {
            let id = state.spawn_enemy(spec.clone());
            if let Some(intent) = state
                .entity(id)
                .and_then(|e| e.as_enemy())
                .and_then(|e| e.intent.clone())
            {
                state.push_event(VisualEvent::EnemyIntent { enemy: id, intent });
            }
        }
        turn::shuffle_draw_pile(state);

        let interpreter = Interpreter::new(self.registry);
        interpreter.fire_event(state, EntityId::PLAYER, PowerEvent::CombatStart);
        for id in state.enemy_ids() {
            interpreter.fire_event(state, id, PowerEvent::CombatStart);
        }
    }

    fn resolve_scry(&self, state: &mut CombatState, kept: &[CardUid], discarded: &[CardUid]) {
        let cards = match state.pending_selection.take() {
            Some(PendingSelection::Scry { cards }) => cards,
            other => {
                warn!("Ignoring resolveScry without a pending scry");
                state.pending_selection = other;
                return;
            }
        };

        let take = |uids: &[CardUid]| -> Vec<CardInstance> {
            uids.iter()
                .filter_map(|uid| cards.iter().find(|c| c.uid == *uid).cloned())
                .collect()
        };
        let kept_cards = take(kept);
        let discarded_cards = take(discarded);

        // Anything unmentioned goes back beneath the kept cards
        let leftovers: Vec<_> = cards
            .iter()
            .filter(|c| !kept.contains(&c.uid) && !discarded.contains(&c.uid))
            .cloned()
            .collect();

        for card in kept_cards.iter().chain(&leftovers).rev() {
            state.draw_pile.push_front(card.clone());
        }
        for card in discarded_cards {
            let uid = card.uid;
            state.discard_pile.push_back(card);
            state.push_event(VisualEvent::CardDiscarded { card: uid });
        }
    }

    fn resolve_tutor(&self, state: &mut CombatState, selected: &[CardUid]) {
        let (cards, count, from) = match state.pending_selection.take() {
            Some(PendingSelection::Tutor { cards, count, from }) => (cards, count, from),
            other => {
                warn!("Ignoring resolveTutor without a pending tutor");
                state.pending_selection = other;
                return;
            }
        };

        for uid in selected.iter().take(count) {
            if !cards.contains(uid) {
                warn!(card = %uid, "Skipping tutor pick outside the offered set");
                continue;
            }
            if state.card_pile(*uid) != Some(from) {
                continue;
            }
            if let Some((_, card)) = state.remove_card(*uid) {
                state.hand.push_back(card);
                state.push_event(VisualEvent::CardDrawn { card: *uid });
            }
        }
        if from == Pile::Draw {
            turn::shuffle_draw_pile(state);
        }
    }

    fn resolve_discover(&self, state: &mut CombatState, selected: &[crate::content::card::CardDefId]) {
        let (choices, count) = match state.pending_selection.take() {
            Some(PendingSelection::Discover { choices, count }) => (choices, count),
            other => {
                warn!("Ignoring resolveDiscover without a pending discover");
                state.pending_selection = other;
                return;
            }
        };

        for id in selected.iter().take(count) {
            if !choices.contains(id) {
                warn!(card = %id, "Skipping discover pick outside the offered set");
                continue;
            }
            if self.registry.get_card(id).is_none() {
                continue;
            }
            let uid = state.alloc_card_uid();
            state.add_card_to(Pile::Hand, CardInstance::new(uid, id.clone()));
            state.push_event(VisualEvent::CardAdded {
                card: uid,
                pile: Pile::Hand,
            });
        }
    }

    fn resolve_banish(&self, state: &mut CombatState, selected: &[CardUid]) {
        let (cards, count, from) = match state.pending_selection.take() {
            Some(PendingSelection::Banish { cards, count, from }) => (cards, count, from),
            other => {
                warn!("Ignoring resolveBanish without a pending banish");
                state.pending_selection = other;
                return;
            }
        };

        for uid in selected.iter().take(count) {
            if !cards.contains(uid) || state.card_pile(*uid) != Some(from) {
                continue;
            }
            if state.remove_card(*uid).is_some() {
                state.push_event(VisualEvent::CardBanished { card: *uid });
            }
        }
    }
}

/// Actions rejected while an interactive selection is pending.
fn blocked_while_pending(action: &Action) -> bool {
    matches!(
        action,
        Action::PlayCard { .. }
            | Action::EndTurn
            | Action::StartTurn
            | Action::DrawCards { .. }
            | Action::EnemyAction { .. }
    )
}

fn adjust_player_energy(state: &mut CombatState, delta: i32) {
    let Some(player) = state.player.as_player_mut() else {
        return;
    };
    let before = player.energy;
    player.energy = (player.energy + delta).max(0);
    let applied = player.energy - before;
    if applied != 0 {
        state.push_event(VisualEvent::EnergyChanged { amount: applied });
    }
}
