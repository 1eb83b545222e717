//! # deckbattle
//!
//! The rules core of a turn-based, card-driven combat simulator.
//! Given a combat state and a discrete action, it deterministically
//! produces the next state, including every secondary consequence:
//! damage resolution, power triggers, card movement, and phase
//! transitions.
//!
//! ## Design Principles
//!
//! 1. **Immutable Transitions**: `CombatEngine::step` never mutates its
//!    input. Collections are `im` persistent structures, so the clone
//!    behind each transition is O(1).
//!
//! 2. **Content as Data**: Cards, powers, relics, and enemy moves are
//!    declarative effect lists interpreted at runtime. The core never
//!    special-cases a card.
//!
//! 3. **Seeded Determinism**: All randomness flows through one
//!    serializable RNG on the state. Same seed, same actions, same
//!    outcome.
//!
//! 4. **No-op Over Error**: Actions and effects whose preconditions
//!    fail log and skip rather than abort; an effect list never
//!    partially rolls back.
//!
//! ## Modules
//!
//! - `core`: entities, combat state, actions, RNG
//! - `content`: card/power/relic/enemy definitions and the registry
//! - `effects`: the effect DSL, value/target resolution, interpreter
//! - `powers`: stacking, decay, silence, triggers, stat modifiers
//! - `combat`: damage pipeline, turn machine, enemy turns, dispatcher
//! - `events`: the visual event queue drained by the presentation layer

pub mod combat;
pub mod content;
pub mod core;
pub mod effects;
pub mod events;
pub mod powers;

// Re-export commonly used types
pub use crate::core::{
    Action, CombatRng, CombatRngState, CombatState, CombatStats, DelayedEffect, Entity, EntityId,
    PendingSelection, Phase, Pile,
};

pub use crate::content::{
    CardDefId, CardDefinition, CardInstance, CardUid, ContentRegistry, DecayPhase, EnemyAbility,
    EnemyMove, EnemySpec, EnemyUltimate, PowerDefinition, PowerEvent, PowerId, PowerModifiers,
    PowerTrigger, RelicDefinition, RelicId, StackBehavior, ValueModifier,
};

pub use crate::combat::{CombatEngine, DamageOutcome};
pub use crate::effects::{
    AtomicEffect, CardTarget, Condition, EffectContext, EntityTarget, Interpreter,
    IterationTarget, ScalingSource, ValueSpec,
};
pub use crate::events::VisualEvent;
