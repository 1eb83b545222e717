//! Card definitions and instances.
//!
//! `CardDefinition` is static content looked up by ID. `CardInstance` is
//! one physical copy in a combat: it has a unique uid, moves between
//! piles, and carries the transient flags effects can set on it.

use serde::{Deserialize, Serialize};

use crate::effects::effect::AtomicEffect;

/// Identifier for a card definition.
///
/// Cards are authored externally as data, so IDs are strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardDefId(String);

impl CardDefId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardDefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a physical card copy within a combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardUid(pub u32);

impl CardUid {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static definition of a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardDefId,
    pub name: String,
    /// Energy cost of the base printing.
    pub cost: i32,
    /// Authoring theme tag, used by filtered card queries.
    pub theme: Option<String>,
    pub effects: Vec<AtomicEffect>,
    /// Cost of the upgraded printing; falls back to `cost`.
    pub upgraded_cost: Option<i32>,
    /// Effects of the upgraded printing; falls back to `effects`.
    pub upgraded_effects: Option<Vec<AtomicEffect>>,
    /// Ethereal cards exhaust instead of discarding at end of turn.
    #[serde(default)]
    pub ethereal: bool,
    /// Innately retained cards stay in hand at end of turn.
    #[serde(default)]
    pub innate_retain: bool,
    /// Playing this card requires an enemy click target.
    #[serde(default)]
    pub needs_target: bool,
}

impl CardDefinition {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: i32) -> Self {
        Self {
            id: CardDefId::new(id),
            name: name.into(),
            cost,
            theme: None,
            effects: Vec::new(),
            upgraded_cost: None,
            upgraded_effects: None,
            ethereal: false,
            innate_retain: false,
            needs_target: false,
        }
    }

    /// Set the theme tag (builder pattern).
    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Add an effect to the base printing (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: AtomicEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the upgraded printing (builder pattern).
    #[must_use]
    pub fn with_upgrade(mut self, cost: i32, effects: Vec<AtomicEffect>) -> Self {
        self.upgraded_cost = Some(cost);
        self.upgraded_effects = Some(effects);
        self
    }

    /// Mark as ethereal (builder pattern).
    #[must_use]
    pub fn ethereal(mut self) -> Self {
        self.ethereal = true;
        self
    }

    /// Mark as always retained at turn end (builder pattern).
    #[must_use]
    pub fn innate_retain(mut self) -> Self {
        self.innate_retain = true;
        self
    }

    /// Mark as requiring an enemy target (builder pattern).
    #[must_use]
    pub fn targeted(mut self) -> Self {
        self.needs_target = true;
        self
    }

    /// Effect list for the given upgrade state.
    #[must_use]
    pub fn effects_for(&self, upgraded: bool) -> &[AtomicEffect] {
        if upgraded {
            self.upgraded_effects.as_deref().unwrap_or(&self.effects)
        } else {
            &self.effects
        }
    }

    /// Printed cost for the given upgrade state.
    #[must_use]
    pub fn cost_for(&self, upgraded: bool) -> i32 {
        if upgraded {
            self.upgraded_cost.unwrap_or(self.cost)
        } else {
            self.cost
        }
    }
}

/// One physical card copy in a combat.
///
/// Created at deck-build time or by a create-card effect; destroyed only
/// by banishing. Otherwise it only moves between piles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub uid: CardUid,
    pub definition: CardDefId,
    pub upgraded: bool,
    /// Set by retain effects; cleared when it keeps the card at turn end.
    #[serde(default)]
    pub retained: bool,
    /// Overrides the definition's ethereal flag when set.
    #[serde(default)]
    pub ethereal_override: Option<bool>,
    #[serde(default)]
    pub unplayable: bool,
    /// Added to the printed cost; effective cost is clamped at zero.
    #[serde(default)]
    pub cost_modifier: i32,
}

impl CardInstance {
    #[must_use]
    pub fn new(uid: CardUid, definition: CardDefId) -> Self {
        Self {
            uid,
            definition,
            upgraded: false,
            retained: false,
            ethereal_override: None,
            unplayable: false,
            cost_modifier: 0,
        }
    }

    /// Create an upgraded copy.
    #[must_use]
    pub fn upgraded(uid: CardUid, definition: CardDefId) -> Self {
        let mut card = Self::new(uid, definition);
        card.upgraded = true;
        card
    }

    /// Effective energy cost against a definition, never negative.
    #[must_use]
    pub fn effective_cost(&self, def: &CardDefinition) -> i32 {
        (def.cost_for(self.upgraded) + self.cost_modifier).max(0)
    }

    /// Whether this copy behaves as ethereal.
    #[must_use]
    pub fn is_ethereal(&self, def: &CardDefinition) -> bool {
        self.ethereal_override.unwrap_or(def.ethereal)
    }

    /// Whether this copy stays in hand at end of turn.
    #[must_use]
    pub fn is_retained(&self, def: &CardDefinition) -> bool {
        self.retained || def.innate_retain
    }

    /// Reset transient flags, e.g. after a transform.
    pub fn clear_transient_flags(&mut self) {
        self.retained = false;
        self.ethereal_override = None;
        self.unplayable = false;
        self.cost_modifier = 0;
    }
}
