//! Visual event queue.
//!
//! Every state mutation worth animating appends a `VisualEvent` to the
//! state's queue. The queue is presentation data only: it never feeds
//! back into rules resolution, and the renderer drains it with
//! `ClearVisualQueue` after playing the events back in order.

use serde::{Deserialize, Serialize};

use crate::content::card::{CardDefId, CardUid};
use crate::content::power::PowerId;
use crate::content::relic::RelicId;
use crate::core::entity::EntityId;
use crate::core::state::{Phase, Pile};

/// One renderable happening, in resolution order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VisualEvent {
    /// Damage landed. `absorbed` is the portion eaten by block and
    /// barrier; `amount` is what reached health.
    Damage {
        target: EntityId,
        amount: i32,
        absorbed: i32,
    },
    Heal {
        target: EntityId,
        amount: i32,
    },
    BlockGained {
        target: EntityId,
        amount: i32,
    },
    BarrierGained {
        target: EntityId,
        amount: i32,
    },
    EnergyChanged {
        amount: i32,
    },
    CardDrawn {
        card: CardUid,
    },
    CardDiscarded {
        card: CardUid,
    },
    CardExhausted {
        card: CardUid,
    },
    CardBanished {
        card: CardUid,
    },
    CardAdded {
        card: CardUid,
        pile: Pile,
    },
    CardTransformed {
        card: CardUid,
        into: CardDefId,
    },
    CardUpgraded {
        card: CardUid,
    },
    CardPlayed {
        card: CardUid,
    },
    DeckShuffled,
    PowerApplied {
        target: EntityId,
        power: PowerId,
        amount: i32,
    },
    PowerRemoved {
        target: EntityId,
        power: PowerId,
    },
    PowerTriggered {
        owner: EntityId,
        power: PowerId,
    },
    PowerSilenced {
        target: EntityId,
        power: PowerId,
        turns: i32,
    },
    RelicTriggered {
        relic: RelicId,
    },
    EntityDied {
        entity: EntityId,
    },
    EnemyIntent {
        enemy: EntityId,
        intent: String,
    },
    EnemyActed {
        enemy: EntityId,
        name: String,
    },
    SelectionRequested,
    TurnStarted {
        turn: u32,
    },
    TurnEnded,
    CombatEnded {
        phase: Phase,
    },
}
