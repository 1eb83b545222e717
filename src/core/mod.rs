//! Core combat types: entities, state snapshots, actions, and RNG.

pub mod action;
pub mod entity;
pub mod rng;
pub mod state;

pub use action::Action;
pub use entity::{Entity, EntityId, EnemyState, PlayerState, PowerRecord, Role};
pub use rng::{CombatRng, CombatRngState};
pub use state::{CombatState, CombatStats, DelayedEffect, PendingSelection, Phase, Pile};
