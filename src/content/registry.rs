//! Content registry: static definition lookup.
//!
//! The registry is an explicit value passed into every interpreter and
//! dispatcher call, never a process-wide singleton. It is populated by
//! the external content-authoring layer and treated as a pure lookup
//! table by the core: unknown IDs resolve to `None` and the caller
//! no-ops.

use rustc_hash::FxHashMap;

use super::card::{CardDefId, CardDefinition};
use super::power::{PowerDefinition, PowerId};
use super::relic::{RelicDefinition, RelicId};

/// Immutable lookup tables for cards, powers, and relics.
#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    cards: FxHashMap<CardDefId, CardDefinition>,
    powers: FxHashMap<PowerId, PowerDefinition>,
    relics: FxHashMap<RelicId, RelicDefinition>,
    /// Card IDs in registration order, for deterministic random picks.
    card_order: Vec<CardDefId>,
}

impl ContentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register_card(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card {:?} already registered", card.id);
        }
        self.card_order.push(card.id.clone());
        self.cards.insert(card.id.clone(), card);
    }

    /// Register a power definition.
    ///
    /// Panics if a power with the same ID already exists.
    pub fn register_power(&mut self, power: PowerDefinition) {
        if self.powers.contains_key(&power.id) {
            panic!("Power {:?} already registered", power.id);
        }
        self.powers.insert(power.id.clone(), power);
    }

    /// Register a relic definition.
    ///
    /// Panics if a relic with the same ID already exists.
    pub fn register_relic(&mut self, relic: RelicDefinition) {
        if self.relics.contains_key(&relic.id) {
            panic!("Relic {:?} already registered", relic.id);
        }
        self.relics.insert(relic.id.clone(), relic);
    }

    /// Look up a card definition.
    #[must_use]
    pub fn get_card(&self, id: &CardDefId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    /// Look up a power definition.
    #[must_use]
    pub fn get_power(&self, id: &PowerId) -> Option<&PowerDefinition> {
        self.powers.get(id)
    }

    /// Look up a relic definition.
    #[must_use]
    pub fn get_relic(&self, id: &RelicId) -> Option<&RelicDefinition> {
        self.relics.get(id)
    }

    /// Card IDs in registration order.
    ///
    /// Random picks (transform, discover) index into this list so the
    /// same seed always picks the same card.
    #[must_use]
    pub fn card_ids(&self) -> &[CardDefId] {
        &self.card_order
    }

    /// Iterate over all card definitions in registration order.
    pub fn cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.card_order.iter().filter_map(|id| self.cards.get(id))
    }

    /// Find cards matching a predicate, in registration order.
    pub fn find_cards<F>(&self, predicate: F) -> impl Iterator<Item = &CardDefinition>
    where
        F: Fn(&CardDefinition) -> bool,
    {
        self.cards().filter(move |c| predicate(c))
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::power::StackBehavior;

    #[test]
    fn test_register_and_get() {
        let mut registry = ContentRegistry::new();
        registry.register_card(CardDefinition::new("strike", "Strike", 1));

        assert!(registry.get_card(&CardDefId::new("strike")).is_some());
        assert!(registry.get_card(&CardDefId::new("missing")).is_none());
        assert_eq!(registry.card_count(), 1);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_card_panics() {
        let mut registry = ContentRegistry::new();
        registry.register_card(CardDefinition::new("strike", "Strike", 1));
        registry.register_card(CardDefinition::new("strike", "Strike II", 2));
    }

    #[test]
    fn test_card_order_is_registration_order() {
        let mut registry = ContentRegistry::new();
        registry.register_card(CardDefinition::new("c", "C", 0));
        registry.register_card(CardDefinition::new("a", "A", 0));
        registry.register_card(CardDefinition::new("b", "B", 0));

        let ids: Vec<_> = registry.card_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_find_cards() {
        let mut registry = ContentRegistry::new();
        registry.register_card(CardDefinition::new("cheap", "Cheap", 0));
        registry.register_card(CardDefinition::new("pricey", "Pricey", 3));

        let cheap: Vec<_> = registry.find_cards(|c| c.cost <= 1).collect();
        assert_eq!(cheap.len(), 1);
        assert_eq!(cheap[0].name, "Cheap");
    }

    #[test]
    fn test_power_and_relic_lookup() {
        let mut registry = ContentRegistry::new();
        registry.register_power(PowerDefinition::new(
            "strength",
            "Strength",
            StackBehavior::Intensity,
        ));
        registry.register_relic(RelicDefinition::new("anchor", "Anchor"));

        assert!(registry.get_power(&PowerId::new("strength")).is_some());
        assert!(registry.get_power(&PowerId::new("missing")).is_none());
        assert!(registry.get_relic(&RelicId::new("anchor")).is_some());
    }
}
