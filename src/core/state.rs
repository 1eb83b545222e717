//! Combat state.
//!
//! `CombatState` is the single authoritative snapshot of a fight. The
//! engine never mutates a caller's state: dispatch clones, mutates the
//! clone, and returns it. Collections are `im` persistent structures,
//! so that clone is O(1) and the per-action cost is proportional to
//! what actually changed.
//!
//! Dead enemies are removed from `enemies` immediately; an `EntityId`
//! that no longer resolves is how "dead" reads everywhere else.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::content::card::{CardDefId, CardInstance, CardUid};
use crate::content::enemy::EnemySpec;
use crate::content::power::DecayPhase;
use crate::core::entity::{Entity, EntityId};
use crate::core::rng::CombatRng;
use crate::effects::effect::AtomicEffect;
use crate::events::VisualEvent;

/// Top-level combat phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl Phase {
    /// Victory or Defeat: only `ClearVisualQueue` still acts.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

/// The player's card piles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pile {
    Hand,
    Draw,
    Discard,
    Exhaust,
}

/// An interactive selection blocking normal play.
///
/// While one is pending, card play and turn progression are rejected;
/// only the matching resolve action (or `ClearVisualQueue`) proceeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PendingSelection {
    /// Cards lifted off the top of the draw pile, awaiting a
    /// keep/discard split.
    Scry { cards: Vec<CardInstance> },
    /// Candidate cards still in `from`, up to `count` to move to hand.
    Tutor {
        cards: Vec<CardUid>,
        count: usize,
        from: Pile,
    },
    /// Offered definitions; picked ones are created fresh in hand.
    Discover {
        choices: Vec<CardDefId>,
        count: usize,
    },
    /// Candidate cards still in `from`, up to `count` to destroy.
    Banish {
        cards: Vec<CardUid>,
        count: usize,
        from: Pile,
    },
}

/// An effect list scheduled for a future turn boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayedEffect {
    /// Decremented at each matching boundary; fires at zero.
    pub turns_remaining: i32,
    pub phase: DecayPhase,
    pub effects: Vec<AtomicEffect>,
    pub source: EntityId,
}

/// Running combat totals, for end-of-fight scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub damage_dealt: i32,
    pub damage_taken: i32,
    pub enemies_killed: u32,
    pub cards_played: u32,
}

/// Complete combat snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatState {
    pub phase: Phase,
    /// 1-based; 0 before the first turn starts.
    pub turn: u32,
    pub player: Entity,
    /// Living enemies, in spawn order.
    pub enemies: Vector<Entity>,
    pub hand: Vector<CardInstance>,
    pub draw_pile: Vector<CardInstance>,
    pub discard_pile: Vector<CardInstance>,
    pub exhaust_pile: Vector<CardInstance>,
    pub cards_played_this_turn: u32,
    pub last_played: Option<CardUid>,
    pub pending_selection: Option<PendingSelection>,
    pub delayed: Vector<DelayedEffect>,
    pub visual_queue: Vector<VisualEvent>,
    pub stats: CombatStats,
    pub rng: CombatRng,
    next_card_uid: u32,
    next_entity_id: u32,
}

impl CombatState {
    /// Fresh pre-combat state for a player entity.
    #[must_use]
    pub fn new(player: Entity, seed: u64) -> Self {
        Self {
            phase: Phase::PlayerTurn,
            turn: 0,
            player,
            enemies: Vector::new(),
            hand: Vector::new(),
            draw_pile: Vector::new(),
            discard_pile: Vector::new(),
            exhaust_pile: Vector::new(),
            cards_played_this_turn: 0,
            last_played: None,
            pending_selection: None,
            delayed: Vector::new(),
            visual_queue: Vector::new(),
            stats: CombatStats::default(),
            rng: CombatRng::new(seed),
            next_card_uid: 0,
            next_entity_id: 1,
        }
    }

    // === Entities ===

    /// Look up any living entity by ID.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        if id.is_player() {
            Some(&self.player)
        } else {
            self.enemies.iter().find(|e| e.id == id)
        }
    }

    /// Mutable entity lookup.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id.is_player() {
            Some(&mut self.player)
        } else {
            self.enemies.iter_mut().find(|e| e.id == id)
        }
    }

    /// Living enemy IDs in spawn order.
    #[must_use]
    pub fn enemy_ids(&self) -> Vec<EntityId> {
        self.enemies.iter().map(|e| e.id).collect()
    }

    /// Create an enemy entity from a spec and add it to the fight.
    pub fn spawn_enemy(&mut self, spec: EnemySpec) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.enemies.push_back(Entity::enemy(id, spec));
        id
    }

    /// Remove a dead enemy, returning it for trigger bookkeeping.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(index))
    }

    // === Cards ===

    /// Read a pile.
    #[must_use]
    pub fn pile(&self, pile: Pile) -> &Vector<CardInstance> {
        match pile {
            Pile::Hand => &self.hand,
            Pile::Draw => &self.draw_pile,
            Pile::Discard => &self.discard_pile,
            Pile::Exhaust => &self.exhaust_pile,
        }
    }

    /// Mutable pile access.
    pub fn pile_mut(&mut self, pile: Pile) -> &mut Vector<CardInstance> {
        match pile {
            Pile::Hand => &mut self.hand,
            Pile::Draw => &mut self.draw_pile,
            Pile::Discard => &mut self.discard_pile,
            Pile::Exhaust => &mut self.exhaust_pile,
        }
    }

    /// Allocate a fresh card uid, unique for this combat.
    pub fn alloc_card_uid(&mut self) -> CardUid {
        let uid = CardUid::new(self.next_card_uid);
        self.next_card_uid += 1;
        uid
    }

    /// Append a card to the back of a pile.
    pub fn add_card_to(&mut self, pile: Pile, card: CardInstance) {
        self.pile_mut(pile).push_back(card);
    }

    /// Which pile a card currently sits in.
    #[must_use]
    pub fn card_pile(&self, uid: CardUid) -> Option<Pile> {
        [Pile::Hand, Pile::Draw, Pile::Discard, Pile::Exhaust]
            .into_iter()
            .find(|&p| self.pile(p).iter().any(|c| c.uid == uid))
    }

    /// Find a card in any pile.
    #[must_use]
    pub fn find_card(&self, uid: CardUid) -> Option<&CardInstance> {
        [Pile::Hand, Pile::Draw, Pile::Discard, Pile::Exhaust]
            .into_iter()
            .find_map(|p| self.pile(p).iter().find(|c| c.uid == uid))
    }

    /// Mutable card lookup across piles.
    pub fn find_card_mut(&mut self, uid: CardUid) -> Option<&mut CardInstance> {
        let pile = self.card_pile(uid)?;
        self.pile_mut(pile).iter_mut().find(|c| c.uid == uid)
    }

    /// Remove a card from whatever pile holds it.
    pub fn remove_card(&mut self, uid: CardUid) -> Option<(Pile, CardInstance)> {
        let pile = self.card_pile(uid)?;
        let index = self.pile(pile).iter().position(|c| c.uid == uid)?;
        Some((pile, self.pile_mut(pile).remove(index)))
    }

    // === Convenience reads ===

    /// Current player energy (0 if the player entity is somehow not a
    /// player, which content cannot produce).
    #[must_use]
    pub fn player_energy(&self) -> i32 {
        self.player.as_player().map_or(0, |p| p.energy)
    }

    /// Append a visual event.
    pub fn push_event(&mut self, event: VisualEvent) {
        self.visual_queue.push_back(event);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{simple_state, state_with_enemies};
    use super::*;
    use crate::content::card::CardDefId;

    #[test]
    fn test_entity_lookup() {
        let state = state_with_enemies(2);
        assert!(state.entity(EntityId::PLAYER).is_some());

        let ids = state.enemy_ids();
        assert_eq!(ids.len(), 2);
        assert!(state.entity(ids[0]).is_some());
        assert!(state.entity(EntityId::new(99)).is_none());
    }

    #[test]
    fn test_spawn_ids_are_unique() {
        let mut state = simple_state();
        let a = state.spawn_enemy(EnemySpec::new("A", 10));
        let b = state.spawn_enemy(EnemySpec::new("B", 10));

        assert_ne!(a, b);
        assert!(!a.is_player());
    }

    #[test]
    fn test_remove_enemy() {
        let mut state = state_with_enemies(2);
        let ids = state.enemy_ids();

        let removed = state.remove_enemy(ids[0]);
        assert!(removed.is_some());
        assert_eq!(state.enemies.len(), 1);
        assert!(state.entity(ids[0]).is_none());
        assert!(state.remove_enemy(ids[0]).is_none());
    }

    #[test]
    fn test_card_movement() {
        let mut state = simple_state();
        let uid = state.alloc_card_uid();
        state.add_card_to(Pile::Hand, CardInstance::new(uid, CardDefId::new("strike")));

        assert_eq!(state.card_pile(uid), Some(Pile::Hand));

        let (pile, card) = state.remove_card(uid).unwrap();
        assert_eq!(pile, Pile::Hand);
        assert_eq!(card.uid, uid);
        assert!(state.hand.is_empty());
        assert!(state.card_pile(uid).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = state_with_enemies(1);
        let snapshot = state.clone();

        state.player.health = 1;
        state.enemies[0].block = 10;

        assert_eq!(snapshot.player.health, 80);
        assert_eq!(snapshot.enemies[0].block, 0);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(Phase::Victory.is_terminal());
        assert!(Phase::Defeat.is_terminal());
        assert!(!Phase::PlayerTurn.is_terminal());
        assert!(!Phase::EnemyTurn.is_terminal());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut state = state_with_enemies(2);
        let uid = state.alloc_card_uid();
        state.add_card_to(Pile::Draw, CardInstance::new(uid, CardDefId::new("strike")));

        let json = serde_json::to_string(&state).unwrap();
        let back: CombatState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.enemies.len(), 2);
        assert_eq!(back.draw_pile.len(), 1);
        assert_eq!(back.player.max_health, 80);
    }
}
