//! Inbound actions.
//!
//! The closed set of external messages the dispatcher accepts. Every
//! action whose preconditions fail is a logged no-op: the input state
//! comes back unchanged (modulo the log), never an error.

use serde::{Deserialize, Serialize};

use crate::content::card::{CardDefId, CardUid};
use crate::content::enemy::EnemySpec;
use crate::content::power::PowerId;
use crate::core::entity::EntityId;

/// An external action message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Spawn the given enemies, shuffle the draw pile, and fire
    /// combat-start triggers.
    StartCombat { enemies: Vec<EnemySpec> },
    /// Force the combat to a terminal phase.
    EndCombat { victory: bool },
    StartTurn,
    EndTurn,
    DrawCards { amount: u32 },
    /// `target` is required by cards whose definition demands one.
    PlayCard {
        card: CardUid,
        target: Option<EntityId>,
    },
    DiscardCard { card: CardUid },
    DiscardHand,
    /// Raw damage from outside the card system (traps, hazards).
    Damage { target: EntityId, amount: i32 },
    Heal { target: EntityId, amount: i32 },
    AddBlock { target: EntityId, amount: i32 },
    SpendEnergy { amount: i32 },
    GainEnergy { amount: i32 },
    ApplyPower {
        target: EntityId,
        power: PowerId,
        amount: i32,
    },
    /// Resolve one enemy's move for the current enemy turn.
    EnemyAction { enemy: EntityId },
    /// Out-of-combat navigation; accepted and logged, no combat effect.
    SelectRoom { room: u32 },
    /// Out-of-combat navigation; accepted and logged, no combat effect.
    DealRoomChoices,
    ClearVisualQueue,
    /// Conclude a pending scry: `kept` goes back on top of the draw
    /// pile in the given order, `discarded` to the discard pile.
    ResolveScry {
        kept: Vec<CardUid>,
        discarded: Vec<CardUid>,
    },
    /// Conclude a pending tutor: selected candidates move to hand.
    ResolveTutor { selected: Vec<CardUid> },
    /// Conclude a pending discover: selected definitions are created
    /// fresh in hand.
    ResolveDiscover { selected: Vec<CardDefId> },
    /// Conclude a pending banish: selected candidates are destroyed.
    ResolveBanish { selected: Vec<CardUid> },
}
