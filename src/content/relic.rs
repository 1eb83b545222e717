//! Relic definitions.
//!
//! Relics are stackless, player-held triggers: the power trigger
//! vocabulary without stacks or decay. The player entity carries relic
//! IDs; the dispatcher fires their triggers alongside power triggers.

use serde::{Deserialize, Serialize};

use super::power::{PowerEvent, PowerTrigger};
use crate::effects::effect::AtomicEffect;

/// Identifier for a relic definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelicId(String);

impl RelicId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RelicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static definition of a relic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelicDefinition {
    pub id: RelicId,
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<PowerTrigger>,
}

impl RelicDefinition {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RelicId::new(id),
            name: name.into(),
            triggers: Vec::new(),
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relic_triggers() {
        let relic = RelicDefinition::new("burning_blood", "Burning Blood")
            .with_trigger(PowerEvent::TurnEnd, vec![]);

        assert_eq!(relic.triggers_for(PowerEvent::TurnEnd).count(), 1);
        assert_eq!(relic.triggers_for(PowerEvent::Kill).count(), 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let relic = RelicDefinition::new("anchor", "Anchor");
        let json = serde_json::to_string(&relic).unwrap();
        let back: RelicDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(relic, back);
    }
}
