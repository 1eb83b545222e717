//! Power (status effect) definitions.
//!
//! A power is a named, stacking status effect with optional passive
//! modifiers (Strength, Weak, Vulnerable, ...) and optional reactive
//! triggers (Thorns, Poison, ...). Definitions are static content; the
//! power engine interprets them against per-entity `PowerRecord`s.

use serde::{Deserialize, Serialize};

use crate::effects::effect::AtomicEffect;

/// Identifier for a power definition.
///
/// Powers are authored externally as data, so IDs are strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerId(String);

impl PowerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How repeated applications combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackBehavior {
    /// Amounts add (Strength 2 + Strength 3 = Strength 5).
    Intensity,
    /// Amount is turns remaining; new applications keep the max.
    Duration,
    /// Amounts add and duration is raised to the max.
    Both,
}

/// A passive value modifier contributed by a power.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueModifier {
    /// Add the power's current stack count (Strength, Dexterity).
    AddStacks,
    /// Multiply and floor (Weak 0.75, Vulnerable 1.5, Frail 0.75).
    Multiply(f32),
}

/// Passive modifier hooks. Additive modifiers apply before multiplicative.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerModifiers {
    /// Applied to damage this entity deals.
    pub damage_dealt: Option<ValueModifier>,
    /// Applied to damage this entity takes.
    pub damage_taken: Option<ValueModifier>,
    /// Applied to block this entity gains from effects.
    pub block_gained: Option<ValueModifier>,
}

/// Phase at which a power's amount decays by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayPhase {
    TurnStart,
    TurnEnd,
}

/// Named combat events that powers and relics can react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerEvent {
    CombatStart,
    TurnStart,
    TurnEnd,
    /// The holder dealt attack damage.
    Attack,
    /// The holder was hit by an attack.
    Attacked,
    /// The holder took health/barrier/block damage from any source.
    Damaged,
    /// The holder killed an enemy.
    Kill,
    /// The holder played a card.
    CardPlayed,
}

/// An effect list bound to a combat event.
///
/// When the event occurs on an entity holding the power, the effects run
/// with the power's current stack count bound into the context. This is
/// how "Thorns: deal N when attacked" is expressed without the
/// interpreter special-casing it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerTrigger {
    pub event: PowerEvent,
    pub effects: Vec<AtomicEffect>,
}

/// Static definition of a power, looked up by ID in the content registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerDefinition {
    pub id: PowerId,
    pub name: String,
    pub stacking: StackBehavior,
    #[serde(default)]
    pub modifiers: PowerModifiers,
    /// Phase at which the amount decrements by one, if any.
    pub decay_on: Option<DecayPhase>,
    /// Drop the record when the amount reaches zero.
    pub remove_at_zero: bool,
    /// Block is not cleared at turn start while this power is held.
    #[serde(default)]
    pub retains_block: bool,
    #[serde(default)]
    pub triggers: Vec<PowerTrigger>,
}

impl PowerDefinition {
    /// Create a definition with no modifiers, decay, or triggers.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, stacking: StackBehavior) -> Self {
        Self {
            id: PowerId::new(id),
            name: name.into(),
            stacking,
            modifiers: PowerModifiers::default(),
            decay_on: None,
            remove_at_zero: true,
            retains_block: false,
            triggers: Vec::new(),
        }
    }

    /// Set the outgoing-damage modifier (builder pattern).
    #[must_use]
    pub fn with_damage_dealt(mut self, modifier: ValueModifier) -> Self {
        self.modifiers.damage_dealt = Some(modifier);
        self
    }

    /// Set the incoming-damage modifier (builder pattern).
    #[must_use]
    pub fn with_damage_taken(mut self, modifier: ValueModifier) -> Self {
        self.modifiers.damage_taken = Some(modifier);
        self
    }

    /// Set the block-gained modifier (builder pattern).
    #[must_use]
    pub fn with_block_gained(mut self, modifier: ValueModifier) -> Self {
        self.modifiers.block_gained = Some(modifier);
        self
    }

    /// Set the decay phase (builder pattern).
    #[must_use]
    pub fn with_decay(mut self, phase: DecayPhase) -> Self {
        self.decay_on = Some(phase);
        self
    }

    /// Keep the record alive at zero stacks (builder pattern).
    #[must_use]
    pub fn keep_at_zero(mut self) -> Self {
        self.remove_at_zero = false;
        self
    }

    /// Mark this power as retaining block across turn starts.
    #[must_use]
    pub fn with_block_retention(mut self) -> Self {
        self.retains_block = true;
        self
    }

    /// Add a trigger (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, event: PowerEvent, effects: Vec<AtomicEffect>) -> Self {
        self.triggers.push(PowerTrigger { event, effects });
        self
    }

    /// Triggers declared for an event.
    pub fn triggers_for(&self, event: PowerEvent) -> impl Iterator<Item = &PowerTrigger> {
        self.triggers.iter().filter(move |t| t.event == event)
    }
}
