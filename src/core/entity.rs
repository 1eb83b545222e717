//! Combatant model.
//!
//! Every combatant (the player and each enemy) is an `Entity`: health,
//! block, barrier, and a list of power records, plus role-specific fields.
//!
//! ## ID Layout
//!
//! `EntityId(0)` is always the player. Enemy IDs are allocated upward
//! by the combat state, starting at 1.
//!
//! ## Invariants
//!
//! Health, block, and barrier are never negative after a resolved action;
//! the damage pipeline clamps them. Health may transiently go below zero
//! inside a single damage computation.

use serde::{Deserialize, Serialize};

use crate::content::enemy::EnemySpec;
use crate::content::power::PowerId;
use crate::content::relic::RelicId;

/// Unique identifier for a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The player's fixed entity ID.
    pub const PLAYER: EntityId = EntityId(0);

    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this ID refers to the player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A power applied to an entity.
///
/// `amount` means intensity count or turns-remaining depending on the
/// definition's stack behavior. `duration` is an independent countdown
/// that removes the record at zero regardless of stacking rules.
/// `silenced` suppresses the power's triggers and modifiers while > 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRecord {
    pub power: PowerId,
    pub amount: i32,
    pub duration: Option<i32>,
    pub silenced: Option<i32>,
}

impl PowerRecord {
    /// Create a record with no duration or silence.
    #[must_use]
    pub fn new(power: PowerId, amount: i32) -> Self {
        Self {
            power,
            amount,
            duration: None,
            silenced: None,
        }
    }

    /// Check whether the power's triggers and modifiers are active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.silenced, Some(n) if n > 0)
    }
}

/// Player-specific state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub energy: i32,
    pub max_energy: i32,
    /// Cards drawn at the start of each player turn.
    pub draw_per_turn: usize,
    /// Relics held; looked up in the content registry for triggers.
    pub relics: Vec<RelicId>,
}

/// Enemy-specific state.
///
/// The static behavior (`spec`) travels with the entity because enemies
/// arrive fully described in `StartCombat` rather than through a registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub spec: EnemySpec,
    /// Index into the spec's move pattern for the next basic move.
    pub pattern_index: usize,
    pub energy: i32,
    /// Turns until the ability is ready again. 0 = ready.
    pub ability_cooldown: i32,
    /// Ultimates fire at most once per combat.
    pub ultimate_fired: bool,
    /// Published intent for the presentation layer (next move's name).
    pub intent: Option<String>,
}

/// Role discriminator carrying role-specific fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Player(PlayerState),
    Enemy(EnemyState),
}

/// A combatant: the player or an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    /// Absorbs damage first; cleared at the start of each player turn
    /// unless a block-retaining power is present.
    pub block: i32,
    /// Absorbs damage after block; does not decay on a schedule.
    pub barrier: i32,
    /// Applied powers, in application order.
    pub powers: Vec<PowerRecord>,
    pub role: Role,
}

impl Entity {
    /// Create the player entity.
    #[must_use]
    pub fn player(name: impl Into<String>, max_health: i32, max_energy: i32, draw_per_turn: usize) -> Self {
        Self {
            id: EntityId::PLAYER,
            name: name.into(),
            health: max_health,
            max_health,
            block: 0,
            barrier: 0,
            powers: Vec::new(),
            role: Role::Player(PlayerState {
                energy: max_energy,
                max_energy,
                draw_per_turn,
                relics: Vec::new(),
            }),
        }
    }

    /// Create an enemy entity from its spec.
    #[must_use]
    pub fn enemy(id: EntityId, spec: EnemySpec) -> Self {
        let intent = spec.moves.first().map(|m| m.name.clone());
        Self {
            id,
            name: spec.name.clone(),
            health: spec.max_health,
            max_health: spec.max_health,
            block: 0,
            barrier: 0,
            powers: Vec::new(),
            role: Role::Enemy(EnemyState {
                spec,
                pattern_index: 0,
                energy: 0,
                ability_cooldown: 0,
                ultimate_fired: false,
                intent,
            }),
        }
    }

    #[must_use]
    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Player state, if this is the player.
    #[must_use]
    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.role {
            Role::Player(p) => Some(p),
            Role::Enemy(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.role {
            Role::Player(p) => Some(p),
            Role::Enemy(_) => None,
        }
    }

    /// Enemy state, if this is an enemy.
    #[must_use]
    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.role {
            Role::Enemy(e) => Some(e),
            Role::Player(_) => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.role {
            Role::Enemy(e) => Some(e),
            Role::Player(_) => None,
        }
    }

    // === Powers ===

    /// Find a power record by ID.
    #[must_use]
    pub fn power(&self, power: &PowerId) -> Option<&PowerRecord> {
        self.powers.iter().find(|r| &r.power == power)
    }

    pub fn power_mut(&mut self, power: &PowerId) -> Option<&mut PowerRecord> {
        self.powers.iter_mut().find(|r| &r.power == power)
    }

    /// Current stack count for a power (0 if absent).
    #[must_use]
    pub fn power_amount(&self, power: &PowerId) -> i32 {
        self.power(power).map_or(0, |r| r.amount)
    }

    /// Check for an active (non-silenced) power.
    #[must_use]
    pub fn has_active_power(&self, power: &PowerId) -> bool {
        self.power(power).is_some_and(|r| r.is_active())
    }

    /// Remove a power record entirely. Returns it if present.
    pub fn take_power(&mut self, power: &PowerId) -> Option<PowerRecord> {
        let idx = self.powers.iter().position(|r| &r.power == power)?;
        Some(self.powers.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_entity() {
        let player = Entity::player("Hero", 80, 3, 5);

        assert_eq!(player.id, EntityId::PLAYER);
        assert!(player.is_player());
        assert!(player.is_alive());
        assert_eq!(player.health, 80);
        assert_eq!(player.as_player().unwrap().energy, 3);
        assert!(player.as_enemy().is_none());
    }

    #[test]
    fn test_enemy_entity() {
        let spec = EnemySpec::new("Cultist", 48);
        let enemy = Entity::enemy(EntityId::new(1), spec);

        assert!(!enemy.is_player());
        assert_eq!(enemy.health, 48);
        assert_eq!(enemy.as_enemy().unwrap().pattern_index, 0);
        assert!(!enemy.as_enemy().unwrap().ultimate_fired);
    }

    #[test]
    fn test_power_lookup() {
        let mut entity = Entity::player("Hero", 80, 3, 5);
        let strength = PowerId::new("strength");

        assert_eq!(entity.power_amount(&strength), 0);

        entity.powers.push(PowerRecord::new(strength.clone(), 3));
        assert_eq!(entity.power_amount(&strength), 3);
        assert!(entity.has_active_power(&strength));

        let taken = entity.take_power(&strength);
        assert_eq!(taken.unwrap().amount, 3);
        assert_eq!(entity.power_amount(&strength), 0);
    }

    #[test]
    fn test_silenced_power_inactive() {
        let mut record = PowerRecord::new(PowerId::new("thorns"), 2);
        assert!(record.is_active());

        record.silenced = Some(2);
        assert!(!record.is_active());

        record.silenced = Some(0);
        assert!(record.is_active());
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(format!("{}", EntityId::new(3)), "Entity(3)");
        assert!(EntityId::PLAYER.is_player());
        assert!(!EntityId::new(1).is_player());
    }
}
