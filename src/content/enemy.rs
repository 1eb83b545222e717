//! Enemy behavior specs.
//!
//! Enemies are not registry content: `StartCombat` receives fully
//! described `EnemySpec` values and the state carries them on the enemy
//! entities. A spec is a cyclic move pattern plus an optional ability
//! (energy + cooldown gated) and an optional ultimate (health-threshold
//! gated, fires once).

use serde::{Deserialize, Serialize};

use crate::effects::effect::AtomicEffect;

/// One entry in an enemy's basic move pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyMove {
    /// Published as the enemy's intent.
    pub name: String,
    pub effects: Vec<AtomicEffect>,
}

impl EnemyMove {
    #[must_use]
    pub fn new(name: impl Into<String>, effects: Vec<AtomicEffect>) -> Self {
        Self {
            name: name.into(),
            effects,
        }
    }
}

/// An enemy ability, preferred over basic moves when affordable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyAbility {
    pub name: String,
    /// Energy deducted when used.
    pub energy_cost: i32,
    /// Turns between uses.
    pub cooldown: i32,
    pub effects: Vec<AtomicEffect>,
}

/// An enemy ultimate, fired once when health falls below the threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyUltimate {
    pub name: String,
    /// Fires when `health * 100 <= max_health * threshold_percent`.
    pub threshold_percent: i32,
    pub effects: Vec<AtomicEffect>,
}

/// Full behavioral description of an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub name: String,
    pub max_health: i32,
    /// Basic moves, cycled in order.
    pub moves: Vec<EnemyMove>,
    pub ability: Option<EnemyAbility>,
    pub ultimate: Option<EnemyUltimate>,
    /// Energy gained at the start of each of this enemy's turns.
    #[serde(default)]
    pub energy_per_turn: i32,
}

impl EnemySpec {
    #[must_use]
    pub fn new(name: impl Into<String>, max_health: i32) -> Self {
        Self {
            name: name.into(),
            max_health,
            moves: Vec::new(),
            ability: None,
            ultimate: None,
            energy_per_turn: 0,
        }
    }

    /// Add a basic move (builder pattern).
    #[must_use]
    pub fn with_move(mut self, name: impl Into<String>, effects: Vec<AtomicEffect>) -> Self {
        self.moves.push(EnemyMove::new(name, effects));
        self
    }

    /// Set the ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: EnemyAbility) -> Self {
        self.ability = Some(ability);
        self
    }

    /// Set the ultimate (builder pattern).
    #[must_use]
    pub fn with_ultimate(mut self, ultimate: EnemyUltimate) -> Self {
        self.ultimate = Some(ultimate);
        self
    }

    /// Set per-turn energy income (builder pattern).
    #[must_use]
    pub fn with_energy_per_turn(mut self, energy: i32) -> Self {
        self.energy_per_turn = energy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = EnemySpec::new("Jaw Worm", 42)
            .with_move("Chomp", vec![])
            .with_move("Bellow", vec![])
            .with_energy_per_turn(1);

        assert_eq!(spec.moves.len(), 2);
        assert_eq!(spec.moves[0].name, "Chomp");
        assert_eq!(spec.energy_per_turn, 1);
        assert!(spec.ability.is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let spec = EnemySpec::new("Cultist", 48).with_move("Dark Strike", vec![]);
        let json = serde_json::to_string(&spec).unwrap();
        let back: EnemySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}
