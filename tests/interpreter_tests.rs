//! Effect interpreter integration tests: meta effects, value scaling,
//! and the interactive-selection protocol driven card-first.

use deckbattle::{
    Action, AtomicEffect, CardDefId, CardDefinition, CardInstance, CardTarget, CombatEngine,
    CombatState, Condition, ContentRegistry, EffectContext, Entity, EntityId, EntityTarget,
    EnemySpec, Interpreter, IterationTarget, PendingSelection, Pile, ScalingSource, ValueSpec,
};

fn registry() -> ContentRegistry {
    let mut registry = ContentRegistry::new();
    registry.register_card(
        CardDefinition::new("finisher", "Finisher", 1)
            .targeted()
            .with_effect(AtomicEffect::Damage {
                target: EntityTarget::Enemy,
                amount: ValueSpec::Scaled {
                    base: 2,
                    per_unit: 4,
                    source: ScalingSource::CardsPlayedThisTurn,
                    cap: None,
                },
                piercing: false,
                on_hit: vec![],
            }),
    );
    registry.register_card(
        CardDefinition::new("cleave_weak", "Cleaving Weakness", 1).with_effect(
            AtomicEffect::ForEach {
                over: IterationTarget::Entities(EntityTarget::AllEnemies),
                effects: vec![AtomicEffect::damage(EntityTarget::Iterated, 4)],
            },
        ),
    );
    registry.register_card(
        CardDefinition::new("gamble", "Gamble", 0).with_effect(AtomicEffect::Scry(
            ValueSpec::Fixed(2),
        )),
    );
    registry.register_card(
        CardDefinition::new("desperation", "Desperation", 0).with_effect(
            AtomicEffect::Conditional {
                condition: Condition::HealthBelowPercent {
                    target: EntityTarget::Player,
                    percent: 50,
                },
                then: vec![AtomicEffect::heal(EntityTarget::Player, 10)],
                otherwise: vec![AtomicEffect::block(EntityTarget::Player, 4)],
            },
        ),
    );
    registry.register_card(CardDefinition::new("filler_a", "Filler A", 0));
    registry.register_card(CardDefinition::new("filler_b", "Filler B", 0));
    registry
}

fn combat(seed: u64, enemies: usize) -> CombatState {
    let mut state = CombatState::new(Entity::player("Hero", 60, 3, 5), seed);
    for _ in 0..enemies {
        state.spawn_enemy(EnemySpec::new("Slime", 18));
    }
    state
}

fn add_to_hand(state: &mut CombatState, id: &str) -> deckbattle::CardUid {
    let uid = state.alloc_card_uid();
    state.add_card_to(Pile::Hand, CardInstance::new(uid, CardDefId::new(id)));
    uid
}

#[test]
fn test_scaled_damage_grows_with_cards_played() {
    let registry = registry();
    let engine = CombatEngine::new(&registry);
    let mut state = combat(2, 1);
    let enemy = state.enemy_ids()[0];

    let first = add_to_hand(&mut state, "finisher");
    let second = add_to_hand(&mut state, "finisher");

    let state = engine.step(
        &state,
        &Action::PlayCard {
            card: first,
            target: Some(enemy),
        },
    );
    // First play: 2 + 4 * 0 = 2
    assert_eq!(state.entity(enemy).unwrap().health, 16);

    let state = engine.step(
        &state,
        &Action::PlayCard {
            card: second,
            target: Some(enemy),
        },
    );
    // Second play: 2 + 4 * 1 = 6
    assert_eq!(state.entity(enemy).unwrap().health, 10);
}

#[test]
fn test_for_each_hits_every_enemy() {
    let registry = registry();
    let engine = CombatEngine::new(&registry);
    let mut state = combat(2, 3);
    let uid = add_to_hand(&mut state, "cleave_weak");

    let state = engine.step(
        &state,
        &Action::PlayCard {
            card: uid,
            target: None,
        },
    );

    assert_eq!(state.enemies.len(), 3);
    for enemy in state.enemies.iter() {
        assert_eq!(enemy.health, 14);
    }
}

#[test]
fn test_conditional_takes_the_live_branch() {
    let registry = registry();
    let engine = CombatEngine::new(&registry);
    let mut state = combat(2, 1);
    let healthy = add_to_hand(&mut state, "desperation");

    let after = engine.step(
        &state,
        &Action::PlayCard {
            card: healthy,
            target: None,
        },
    );
    assert_eq!(after.player.block, 4);
    assert_eq!(after.player.health, 60);

    state.player.health = 20;
    let hurt = add_to_hand(&mut state, "desperation");
    let after = engine.step(
        &state,
        &Action::PlayCard {
            card: hurt,
            target: None,
        },
    );
    assert_eq!(after.player.health, 30);
}

#[test]
fn test_scry_card_suspends_then_resolves() {
    let registry = registry();
    let engine = CombatEngine::new(&registry);
    let mut state = combat(8, 1);
    for id in ["filler_a", "filler_b", "filler_a"] {
        let uid = state.alloc_card_uid();
        state.add_card_to(Pile::Draw, CardInstance::new(uid, CardDefId::new(id)));
    }
    let gamble = add_to_hand(&mut state, "gamble");

    let state = engine.step(
        &state,
        &Action::PlayCard {
            card: gamble,
            target: None,
        },
    );

    let (top, second) = match &state.pending_selection {
        Some(PendingSelection::Scry { cards }) => (cards[0].uid, cards[1].uid),
        other => panic!("Expected pending scry, got {other:?}"),
    };
    assert_eq!(state.draw_pile.len(), 1);

    // Keep the second card, toss the top one
    let state = engine.step(
        &state,
        &Action::ResolveScry {
            kept: vec![second],
            discarded: vec![top],
        },
    );

    assert!(state.pending_selection.is_none());
    assert_eq!(state.draw_pile.len(), 2);
    assert_eq!(state.draw_pile[0].uid, second);
    assert!(state.discard_pile.iter().any(|c| c.uid == top));
}

#[test]
fn test_lethal_damage_does_not_stop_sibling_effects() {
    let registry = registry();
    let interpreter = Interpreter::new(&registry);
    let mut state = combat(6, 1);
    let enemy = state.enemy_ids()[0];

    let effect = AtomicEffect::Sequence(vec![
        AtomicEffect::damage(EntityTarget::Enemy, 99),
        AtomicEffect::block(EntityTarget::Player, 5),
        // Targets nothing once the last enemy is gone; must be a no-op
        AtomicEffect::damage(EntityTarget::Enemy, 3),
    ]);
    let ctx = EffectContext::new(EntityId::PLAYER).with_click_target(enemy);
    interpreter.execute(&mut state, &effect, &ctx);

    assert!(state.enemies.is_empty());
    assert_eq!(state.phase, deckbattle::Phase::Victory);
    assert_eq!(state.player.block, 5);
}

#[test]
fn test_random_branch_is_seed_deterministic() {
    let registry = registry();
    let interpreter = Interpreter::new(&registry);

    let effect = AtomicEffect::Random {
        branches: vec![
            vec![AtomicEffect::block(EntityTarget::Player, 1)],
            vec![AtomicEffect::block(EntityTarget::Player, 100)],
        ],
        weights: None,
    };

    let run = |seed: u64| {
        let mut state = combat(seed, 1);
        interpreter.execute(&mut state, &effect, &EffectContext::new(EntityId::PLAYER));
        state.player.block
    };

    assert_eq!(run(77), run(77));
}

#[test]
fn test_range_rolls_once_for_all_targets() {
    let registry = registry();
    let interpreter = Interpreter::new(&registry);
    let mut state = combat(13, 4);

    interpreter.execute(
        &mut state,
        &AtomicEffect::Damage {
            target: EntityTarget::AllEnemies,
            amount: ValueSpec::Range { min: 1, max: 12 },
            piercing: false,
            on_hit: vec![],
        },
        &EffectContext::new(EntityId::PLAYER),
    );

    // One roll, shared by every target of the evaluation
    let healths: Vec<i32> = state.enemies.iter().map(|e| e.health).collect();
    assert!(healths.iter().all(|&h| h == healths[0] && h < 18));
}

#[test]
fn test_exhaust_from_discard_query() {
    let registry = registry();
    let interpreter = Interpreter::new(&registry);
    let mut state = combat(4, 1);

    let uid = state.alloc_card_uid();
    state.add_card_to(
        Pile::Discard,
        CardInstance::new(uid, CardDefId::new("filler_a")),
    );

    interpreter.execute(
        &mut state,
        &AtomicEffect::Exhaust(CardTarget::Pile(Pile::Discard)),
        &EffectContext::new(EntityId::PLAYER),
    );

    assert!(state.discard_pile.is_empty());
    assert_eq!(state.card_pile(uid), Some(Pile::Exhaust));
}
