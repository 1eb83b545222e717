//! Value resolution.
//!
//! Effect parameters are declarative `ValueSpec`s rather than bare
//! integers: a fixed number, an inclusive random range, a number scaled
//! by some piece of game state, or "the triggering power's stack count".
//! `resolve` turns a spec into a concrete integer for one evaluation
//! site. Meta effects that re-run their children (repeat) re-resolve
//! ranges on each iteration by re-calling `resolve`; nothing here
//! caches.

use serde::{Deserialize, Serialize};

use crate::content::power::PowerId;
use crate::core::entity::EntityId;
use crate::core::state::CombatState;

use super::effect::EffectContext;

/// Game-state quantity a scaled value reads.
///
/// Entity-relative sources (block, missing health, health percent,
/// power stacks) read from the context's source entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingSource {
    Energy,
    MaxEnergy,
    HandSize,
    CardsPlayedThisTurn,
    CurrentBlock,
    MissingHealth,
    HealthPercent,
    EnemyCount,
    TurnNumber,
    PowerStacks(PowerId),
}

/// A declarative numeric parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueSpec {
    /// A literal integer.
    Fixed(i32),
    /// Uniform draw from `min..=max`, redrawn at each evaluation site.
    Range { min: i32, max: i32 },
    /// `base + per_unit * source`, optionally capped.
    Scaled {
        base: i32,
        per_unit: i32,
        source: ScalingSource,
        cap: Option<i32>,
    },
    /// The triggering power's current stack count (0 outside a power
    /// trigger context).
    PowerAmount,
}

impl ValueSpec {
    /// Shorthand for a scaled value with no base and no cap.
    #[must_use]
    pub fn per(per_unit: i32, source: ScalingSource) -> Self {
        Self::Scaled {
            base: 0,
            per_unit,
            source,
            cap: None,
        }
    }
}

impl From<i32> for ValueSpec {
    fn from(value: i32) -> Self {
        Self::Fixed(value)
    }
}

/// Resolve a spec to a concrete integer.
///
/// Takes `&mut CombatState` only for the RNG; scaling reads never
/// mutate. Missing source entities resolve entity-relative sources
/// to zero.
pub fn resolve(spec: &ValueSpec, state: &mut CombatState, ctx: &EffectContext) -> i32 {
    match spec {
        ValueSpec::Fixed(value) => *value,
        ValueSpec::Range { min, max } => state.rng.gen_range_inclusive(*min, *max),
        ValueSpec::Scaled {
            base,
            per_unit,
            source,
            cap,
        } => {
            let scaled = base + per_unit * scaling_value(source, state, ctx.source);
            cap.map_or(scaled, |c| scaled.min(c))
        }
        ValueSpec::PowerAmount => ctx.power_stacks.unwrap_or(0),
    }
}

fn scaling_value(source: &ScalingSource, state: &CombatState, entity: EntityId) -> i32 {
    match source {
        ScalingSource::Energy => state.player_energy(),
        ScalingSource::MaxEnergy => state
            .player
            .as_player()
            .map_or(0, |p| p.max_energy),
        ScalingSource::HandSize => state.hand.len() as i32,
        ScalingSource::CardsPlayedThisTurn => state.cards_played_this_turn as i32,
        ScalingSource::CurrentBlock => state.entity(entity).map_or(0, |e| e.block),
        ScalingSource::MissingHealth => state
            .entity(entity)
            .map_or(0, |e| (e.max_health - e.health).max(0)),
        ScalingSource::HealthPercent => state.entity(entity).map_or(0, |e| {
            if e.max_health > 0 {
                e.health * 100 / e.max_health
            } else {
                0
            }
        }),
        ScalingSource::EnemyCount => state.enemies.len() as i32,
        ScalingSource::TurnNumber => state.turn as i32,
        ScalingSource::PowerStacks(power) => {
            state.entity(entity).map_or(0, |e| e.power_amount(power))
        }
    }
}
