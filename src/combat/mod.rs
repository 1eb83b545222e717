//! Combat resolution: damage pipeline, turn machine, enemy turns, and
//! the action dispatcher.

pub mod damage;
pub mod dispatch;
pub mod enemy;
pub mod turn;

pub use damage::{apply_damage, DamageOutcome};
pub use dispatch::CombatEngine;
