//! Static content definitions: cards, powers, relics, enemy specs.
//!
//! Everything here is produced by the external authoring layer and
//! consumed read-only by the core through `ContentRegistry`.

pub mod card;
pub mod enemy;
pub mod power;
pub mod registry;
pub mod relic;

pub use card::{CardDefId, CardDefinition, CardInstance, CardUid};
pub use enemy::{EnemyAbility, EnemyMove, EnemySpec, EnemyUltimate};
pub use power::{
    DecayPhase, PowerDefinition, PowerEvent, PowerId, PowerModifiers, PowerTrigger, StackBehavior,
    ValueModifier,
};
pub use registry::ContentRegistry;
pub use relic::{RelicDefinition, RelicId};
