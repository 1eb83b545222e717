//! Target resolution.
//!
//! Two symbol spaces: entity targets (combatants) and card targets
//! (pile positions or filtered queries). Resolution never fails — an
//! empty result set is valid and effects silently no-op over it.
//! Card queries are pure reads; removal is the effect's job.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::content::card::CardUid;
use crate::content::registry::ContentRegistry;
use crate::core::entity::EntityId;
use crate::core::state::{CombatState, Pile};

use super::effect::{contains_kind, EffectContext, EffectKind};

/// Symbolic entity target, resolved against state + context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityTarget {
    /// The entity executing the effect.
    Self_,
    Player,
    /// Alias for `Self_` kept for authored content that distinguishes
    /// provenance wording; resolves identically.
    Source,
    /// The externally supplied click target.
    Enemy,
    RandomEnemy,
    /// Lowest current health.
    WeakestEnemy,
    /// Highest current health.
    StrongestEnemy,
    /// First in the enemy list.
    FrontEnemy,
    /// Last in the enemy list.
    BackEnemy,
    AllEnemies,
    AllEntities,
    /// Every enemy except the contextual one.
    OtherEnemies,
    /// The current forEach/onHit iteration subject.
    Iterated,
}

/// Symbolic card target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardTarget {
    /// Every card in a pile.
    Pile(Pile),
    Leftmost(Pile),
    Rightmost(Pile),
    RandomFrom(Pile),
    /// The card whose effect list is executing.
    ThisCard,
    LastPlayed,
    /// The current forEach iteration subject.
    Iterated,
    /// Filtered query against a pile. All filters are conjunctive.
    Query {
        pile: Pile,
        theme: Option<String>,
        min_cost: Option<i32>,
        max_cost: Option<i32>,
        has_effect: Option<EffectKind>,
    },
}

impl CardTarget {
    /// Query matching every card in a pile.
    #[must_use]
    pub fn query(pile: Pile) -> Self {
        Self::Query {
            pile,
            theme: None,
            min_cost: None,
            max_cost: None,
            has_effect: None,
        }
    }
}

/// Resolve an entity target to concrete IDs.
///
/// Dead enemies are never returned; missing contextual targets resolve
/// to an empty set.
pub fn resolve_entities(
    target: &EntityTarget,
    state: &mut CombatState,
    ctx: &EffectContext,
) -> SmallVec<[EntityId; 4]> {
    let mut out = SmallVec::new();

    match target {
        EntityTarget::Self_ | EntityTarget::Source => {
            if state.entity(ctx.source).is_some() {
                out.push(ctx.source);
            }
        }
        EntityTarget::Player => out.push(EntityId::PLAYER),
        EntityTarget::Enemy => {
            if let Some(id) = ctx.click_target {
                if state.entity(id).is_some() {
                    out.push(id);
                }
            }
        }
        EntityTarget::RandomEnemy => {
            let ids = state.enemy_ids();
            if let Some(&id) = state.rng.choose(&ids) {
                out.push(id);
            }
        }
        EntityTarget::WeakestEnemy => {
            if let Some(id) = state
                .enemies
                .iter()
                .min_by_key(|e| e.health)
                .map(|e| e.id)
            {
                out.push(id);
            }
        }
        EntityTarget::StrongestEnemy => {
            if let Some(id) = state
                .enemies
                .iter()
                .max_by_key(|e| e.health)
                .map(|e| e.id)
            {
                out.push(id);
            }
        }
        EntityTarget::FrontEnemy => {
            if let Some(e) = state.enemies.front() {
                out.push(e.id);
            }
        }
        EntityTarget::BackEnemy => {
            if let Some(e) = state.enemies.back() {
                out.push(e.id);
            }
        }
        EntityTarget::AllEnemies => out.extend(state.enemy_ids()),
        EntityTarget::AllEntities => {
            out.push(EntityId::PLAYER);
            out.extend(state.enemy_ids());
        }
        EntityTarget::OtherEnemies => {
            let excluded = ctx.current_target.or(ctx.click_target).unwrap_or(ctx.source);
            out.extend(state.enemy_ids().into_iter().filter(|&id| id != excluded));
        }
        EntityTarget::Iterated => {
            if let Some(id) = ctx.current_target {
                if state.entity(id).is_some() {
                    out.push(id);
                }
            }
        }
    }

    out
}

/// Resolve a card target to concrete uids.
///
/// Pure read: cards stay in their piles.
pub fn resolve_cards(
    target: &CardTarget,
    state: &mut CombatState,
    ctx: &EffectContext,
    registry: &ContentRegistry,
) -> Vec<CardUid> {
    match target {
        CardTarget::Pile(pile) => state.pile(*pile).iter().map(|c| c.uid).collect(),
        CardTarget::Leftmost(pile) => {
            state.pile(*pile).front().map(|c| c.uid).into_iter().collect()
        }
        CardTarget::Rightmost(pile) => {
            state.pile(*pile).back().map(|c| c.uid).into_iter().collect()
        }
        CardTarget::RandomFrom(pile) => {
            let uids: Vec<CardUid> = state.pile(*pile).iter().map(|c| c.uid).collect();
            state.rng.choose(&uids).copied().into_iter().collect()
        }
        CardTarget::ThisCard => ctx.card.into_iter().collect(),
        CardTarget::LastPlayed => state.last_played.into_iter().collect(),
        CardTarget::Iterated => ctx.current_card.into_iter().collect(),
        CardTarget::Query {
            pile,
            theme,
            min_cost,
            max_cost,
            has_effect,
        } => state
            .pile(*pile)
            .iter()
            .filter(|card| {
                let Some(def) = registry.get_card(&card.definition) else {
                    return false;
                };
                if let Some(theme) = theme {
                    if def.theme.as_deref() != Some(theme.as_str()) {
                        return false;
                    }
                }
                let cost = def.cost_for(card.upgraded);
                if min_cost.is_some_and(|m| cost < m) || max_cost.is_some_and(|m| cost > m) {
                    return false;
                }
                if let Some(kind) = has_effect {
                    if !contains_kind(def.effects_for(card.upgraded), *kind) {
                        return false;
                    }
                }
                true
            })
            .map(|c| c.uid)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::card::{CardDefinition, CardInstance};
    use crate::core::state::test_support::{simple_state, state_with_enemies};
    use crate::effects::effect::AtomicEffect;
    use crate::effects::value::ValueSpec;

    #[test]
    fn test_self_and_player() {
        let mut state = state_with_enemies(2);
        let enemy = state.enemies[0].id;
        let ctx = EffectContext::new(enemy);

        assert_eq!(
            resolve_entities(&EntityTarget::Self_, &mut state, &ctx).as_slice(),
            &[enemy]
        );
        assert_eq!(
            resolve_entities(&EntityTarget::Player, &mut state, &ctx).as_slice(),
            &[EntityId::PLAYER]
        );
    }

    #[test]
    fn test_click_target() {
        let mut state = state_with_enemies(2);
        let enemy = state.enemies[1].id;

        let ctx = EffectContext::new(EntityId::PLAYER).with_click_target(enemy);
        assert_eq!(
            resolve_entities(&EntityTarget::Enemy, &mut state, &ctx).as_slice(),
            &[enemy]
        );

        // No click target: empty, not an error
        let bare = EffectContext::new(EntityId::PLAYER);
        assert!(resolve_entities(&EntityTarget::Enemy, &mut state, &bare).is_empty());
    }

    #[test]
    fn test_weakest_and_strongest() {
        let mut state = state_with_enemies(3);
        state.enemies[0].health = 30;
        state.enemies[1].health = 5;
        state.enemies[2].health = 20;

        let ctx = EffectContext::new(EntityId::PLAYER);
        let weakest = resolve_entities(&EntityTarget::WeakestEnemy, &mut state, &ctx);
        let strongest = resolve_entities(&EntityTarget::StrongestEnemy, &mut state, &ctx);

        assert_eq!(weakest.as_slice(), &[state.enemies[1].id]);
        assert_eq!(strongest.as_slice(), &[state.enemies[0].id]);
    }

    #[test]
    fn test_front_back_all() {
        let mut state = state_with_enemies(3);
        let ids = state.enemy_ids();
        let ctx = EffectContext::new(EntityId::PLAYER);

        assert_eq!(
            resolve_entities(&EntityTarget::FrontEnemy, &mut state, &ctx).as_slice(),
            &[ids[0]]
        );
        assert_eq!(
            resolve_entities(&EntityTarget::BackEnemy, &mut state, &ctx).as_slice(),
            &[ids[2]]
        );
        assert_eq!(
            resolve_entities(&EntityTarget::AllEnemies, &mut state, &ctx).as_slice(),
            ids.as_slice()
        );
        assert_eq!(
            resolve_entities(&EntityTarget::AllEntities, &mut state, &ctx).len(),
            4
        );
    }

    #[test]
    fn test_other_enemies() {
        let mut state = state_with_enemies(3);
        let ids = state.enemy_ids();
        let ctx = EffectContext::new(EntityId::PLAYER).with_click_target(ids[1]);

        let others = resolve_entities(&EntityTarget::OtherEnemies, &mut state, &ctx);
        assert_eq!(others.as_slice(), &[ids[0], ids[2]]);
    }

    #[test]
    fn test_empty_when_no_enemies() {
        let mut state = simple_state();
        let ctx = EffectContext::new(EntityId::PLAYER);

        assert!(resolve_entities(&EntityTarget::RandomEnemy, &mut state, &ctx).is_empty());
        assert!(resolve_entities(&EntityTarget::AllEnemies, &mut state, &ctx).is_empty());
        assert!(resolve_entities(&EntityTarget::WeakestEnemy, &mut state, &ctx).is_empty());
    }

    fn registry_with(defs: Vec<CardDefinition>) -> ContentRegistry {
        let mut registry = ContentRegistry::new();
        for def in defs {
            registry.register_card(def);
        }
        registry
    }

    #[test]
    fn test_pile_positions() {
        let mut state = simple_state();
        let registry = registry_with(vec![CardDefinition::new("strike", "Strike", 1)]);

        for _ in 0..3 {
            let uid = state.alloc_card_uid();
            state.add_card_to(
                Pile::Hand,
                CardInstance::new(uid, crate::content::card::CardDefId::new("strike")),
            );
        }

        let ctx = EffectContext::new(EntityId::PLAYER);
        let all = resolve_cards(&CardTarget::Pile(Pile::Hand), &mut state, &ctx, &registry);
        assert_eq!(all.len(), 3);

        let left = resolve_cards(&CardTarget::Leftmost(Pile::Hand), &mut state, &ctx, &registry);
        assert_eq!(left, vec![all[0]]);

        let right =
            resolve_cards(&CardTarget::Rightmost(Pile::Hand), &mut state, &ctx, &registry);
        assert_eq!(right, vec![all[2]]);

        // Resolution is a pure read
        assert_eq!(state.hand.len(), 3);
    }

    #[test]
    fn test_query_filters() {
        let mut state = simple_state();
        let registry = registry_with(vec![
            CardDefinition::new("strike", "Strike", 1)
                .with_theme("attack")
                .with_effect(AtomicEffect::Damage {
                    target: EntityTarget::Enemy,
                    amount: ValueSpec::Fixed(6),
                    piercing: false,
                    on_hit: vec![],
                }),
            CardDefinition::new("defend", "Defend", 1).with_theme("skill"),
            CardDefinition::new("bash", "Bash", 2).with_theme("attack"),
        ]);

        for id in ["strike", "defend", "bash"] {
            let uid = state.alloc_card_uid();
            state.add_card_to(
                Pile::Hand,
                CardInstance::new(uid, crate::content::card::CardDefId::new(id)),
            );
        }

        let ctx = EffectContext::new(EntityId::PLAYER);

        let attacks = resolve_cards(
            &CardTarget::Query {
                pile: Pile::Hand,
                theme: Some("attack".into()),
                min_cost: None,
                max_cost: None,
                has_effect: None,
            },
            &mut state,
            &ctx,
            &registry,
        );
        assert_eq!(attacks.len(), 2);

        let cheap_damage = resolve_cards(
            &CardTarget::Query {
                pile: Pile::Hand,
                theme: None,
                min_cost: None,
                max_cost: Some(1),
                has_effect: Some(EffectKind::Damage),
            },
            &mut state,
            &ctx,
            &registry,
        );
        assert_eq!(cheap_damage.len(), 1);
    }
}
