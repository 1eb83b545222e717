//! The effect DSL.
//!
//! `AtomicEffect` is a closed, recursive, tagged-variant family: leaf
//! effects mutate state through the damage pipeline and power engine,
//! and meta effects (conditional, repeat, random, sequence, forEach)
//! nest effect lists. Cards, powers, relics, and enemy moves are all
//! authored as effect lists; the interpreter gives them meaning.
//!
//! Content is assumed structurally well-formed. Validation belongs to
//! the external authoring layer, not this core.

use serde::{Deserialize, Serialize};

use crate::content::card::{CardDefId, CardUid};
use crate::content::power::{DecayPhase, PowerId};
use crate::core::entity::EntityId;
use crate::core::state::{Phase, Pile};

use super::target::{CardTarget, EntityTarget};
use super::value::ValueSpec;

/// Execution context threaded through effect resolution.
///
/// Carries who is acting, the externally supplied click target, the
/// current iteration subject, and power-trigger provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectContext {
    /// The entity executing the effect.
    pub source: EntityId,
    /// The user's click target, when the played card required one.
    pub click_target: Option<EntityId>,
    /// Set during forEach / on-hit iteration over entities.
    pub current_target: Option<EntityId>,
    /// Set during forEach iteration over cards.
    pub current_card: Option<CardUid>,
    /// The card whose effect list is executing.
    pub card: Option<CardUid>,
    /// Power-trigger provenance: which power fired, at how many stacks.
    pub power: Option<PowerId>,
    pub power_stacks: Option<i32>,
}

impl EffectContext {
    /// Context with only a source entity.
    #[must_use]
    pub fn new(source: EntityId) -> Self {
        Self {
            source,
            click_target: None,
            current_target: None,
            current_card: None,
            card: None,
            power: None,
            power_stacks: None,
        }
    }

    /// Context for playing a card.
    #[must_use]
    pub fn for_card(source: EntityId, card: CardUid, click_target: Option<EntityId>) -> Self {
        Self {
            card: Some(card),
            click_target,
            ..Self::new(source)
        }
    }

    /// Context for a power trigger firing on its holder.
    #[must_use]
    pub fn for_power(owner: EntityId, power: PowerId, stacks: i32) -> Self {
        Self {
            power: Some(power),
            power_stacks: Some(stacks),
            ..Self::new(owner)
        }
    }

    /// Set the click target (builder pattern).
    #[must_use]
    pub fn with_click_target(mut self, target: EntityId) -> Self {
        self.click_target = Some(target);
        self
    }

    /// Derive a context with an entity iteration subject bound.
    #[must_use]
    pub fn iterating(&self, target: EntityId) -> Self {
        Self {
            current_target: Some(target),
            ..self.clone()
        }
    }

    /// Derive a context with a card iteration subject bound.
    #[must_use]
    pub fn iterating_card(&self, card: CardUid) -> Self {
        Self {
            current_card: Some(card),
            ..self.clone()
        }
    }
}

/// Iteration domain for `ForEach`: which variant is present decides
/// whether iteration binds `current_target` or `current_card`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IterationTarget {
    Entities(EntityTarget),
    Cards(CardTarget),
}

/// A predicate over combat state, with All/Any/Not combinators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// First resolved entity's health strictly below a percent of max.
    HealthBelowPercent { target: EntityTarget, percent: i32 },
    /// First resolved entity's health at or above a percent of max.
    HealthAtLeastPercent { target: EntityTarget, percent: i32 },
    EnergyAtLeast(i32),
    HasPower {
        target: EntityTarget,
        power: PowerId,
        min_stacks: i32,
    },
    CardsInPileAtLeast { pile: Pile, count: usize },
    TurnAtLeast(u32),
    CardsPlayedAtLeast(u32),
    EnemyCountAtLeast(usize),
    PhaseIs(Phase),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Create an AND combinator.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR combinator.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Coarse effect taxonomy, used by card queries ("a card that deals
/// damage") and telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Damage,
    Block,
    Barrier,
    Heal,
    Energy,
    Draw,
    Discard,
    Exhaust,
    Banish,
    AddCard,
    Transform,
    Upgrade,
    Retain,
    CardFlag,
    Power,
    Selection,
    Delayed,
    Meta,
}

/// An atomic game effect.
///
/// Meta variants (`Conditional`, `Repeat`, `Random`, `Sequence`,
/// `ForEach`) nest effect lists; everything else is a leaf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AtomicEffect {
    /// Deal damage. `on_hit` runs once per target that actually took
    /// damage, with the iteration subject bound to that target.
    Damage {
        target: EntityTarget,
        amount: ValueSpec,
        #[serde(default)]
        piercing: bool,
        #[serde(default)]
        on_hit: Vec<AtomicEffect>,
    },
    /// Deal damage and heal the source for the damage actually dealt.
    Lifesteal {
        target: EntityTarget,
        amount: ValueSpec,
    },
    Block {
        target: EntityTarget,
        amount: ValueSpec,
    },
    Barrier {
        target: EntityTarget,
        amount: ValueSpec,
    },
    Heal {
        target: EntityTarget,
        amount: ValueSpec,
        #[serde(default)]
        can_overheal: bool,
    },
    GainEnergy(ValueSpec),
    LoseEnergy(ValueSpec),

    Draw(ValueSpec),
    Discard(CardTarget),
    DiscardHand,
    Exhaust(CardTarget),
    /// Destroy the card instances entirely.
    Banish(CardTarget),
    /// Create new copies of a definition in a pile.
    AddCard {
        card: CardDefId,
        pile: Pile,
        count: ValueSpec,
        #[serde(default)]
        upgraded: bool,
    },
    /// Replace each resolved card with a random different definition.
    Transform(CardTarget),
    Upgrade(CardTarget),
    Retain(CardTarget),
    ModifyCost { target: CardTarget, delta: i32 },
    SetEthereal { target: CardTarget, ethereal: bool },
    SetUnplayable { target: CardTarget, unplayable: bool },

    ApplyPower {
        target: EntityTarget,
        power: PowerId,
        amount: ValueSpec,
        duration: Option<ValueSpec>,
    },
    /// Omitted amount removes the power entirely.
    RemovePower {
        target: EntityTarget,
        power: PowerId,
        amount: Option<ValueSpec>,
    },
    /// Move every power from one entity to another.
    TransferPowers { from: EntityTarget, to: EntityTarget },
    /// Move one power from the target onto the source.
    StealPower { from: EntityTarget, power: PowerId },
    SilencePower {
        target: EntityTarget,
        power: PowerId,
        turns: ValueSpec,
    },

    /// Look at the top N of the draw pile; a resolve action decides
    /// keep/discard.
    Scry(ValueSpec),
    /// Search a pile (optionally by theme) and pick up to `count` into hand.
    Tutor {
        pile: Pile,
        count: usize,
        theme: Option<String>,
    },
    /// Offer `choices` random definitions; picked copies are created in hand.
    Discover { choices: usize, count: usize },
    /// Pick up to `count` cards from a pile to destroy.
    BanishSelect { pile: Pile, count: usize },

    /// Run the nested effects after `turns` matching phase boundaries.
    Delayed {
        turns: i32,
        phase: DecayPhase,
        effects: Vec<AtomicEffect>,
    },

    Conditional {
        condition: Condition,
        then: Vec<AtomicEffect>,
        #[serde(default)]
        otherwise: Vec<AtomicEffect>,
    },
    /// `times` resolves once; nested values re-resolve each iteration.
    Repeat {
        times: ValueSpec,
        effects: Vec<AtomicEffect>,
    },
    /// Execute exactly one branch: uniform by default, weighted when
    /// `weights` aligns with `branches`.
    Random {
        branches: Vec<Vec<AtomicEffect>>,
        #[serde(default)]
        weights: Option<Vec<f32>>,
    },
    /// Ordered execution as a unit.
    Sequence(Vec<AtomicEffect>),
    ForEach {
        over: IterationTarget,
        effects: Vec<AtomicEffect>,
    },
}

impl AtomicEffect {
    /// Shorthand for a plain damage effect.
    #[must_use]
    pub fn damage(target: EntityTarget, amount: impl Into<ValueSpec>) -> Self {
        Self::Damage {
            target,
            amount: amount.into(),
            piercing: false,
            on_hit: Vec::new(),
        }
    }

    /// Shorthand for a block effect.
    #[must_use]
    pub fn block(target: EntityTarget, amount: impl Into<ValueSpec>) -> Self {
        Self::Block {
            target,
            amount: amount.into(),
        }
    }

    /// Shorthand for a capped heal.
    #[must_use]
    pub fn heal(target: EntityTarget, amount: impl Into<ValueSpec>) -> Self {
        Self::Heal {
            target,
            amount: amount.into(),
            can_overheal: false,
        }
    }

    /// Shorthand for applying a power with no separate duration.
    #[must_use]
    pub fn apply_power(
        target: EntityTarget,
        power: impl Into<String>,
        amount: impl Into<ValueSpec>,
    ) -> Self {
        Self::ApplyPower {
            target,
            power: PowerId::new(power),
            amount: amount.into(),
            duration: None,
        }
    }

    /// The coarse kind of this effect.
    #[must_use]
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Damage { .. } | Self::Lifesteal { .. } => EffectKind::Damage,
            Self::Block { .. } => EffectKind::Block,
            Self::Barrier { .. } => EffectKind::Barrier,
            Self::Heal { .. } => EffectKind::Heal,
            Self::GainEnergy(_) | Self::LoseEnergy(_) => EffectKind::Energy,
            Self::Draw(_) => EffectKind::Draw,
            Self::Discard(_) | Self::DiscardHand => EffectKind::Discard,
            Self::Exhaust(_) => EffectKind::Exhaust,
            Self::Banish(_) | Self::BanishSelect { .. } => EffectKind::Banish,
            Self::AddCard { .. } => EffectKind::AddCard,
            Self::Transform(_) => EffectKind::Transform,
            Self::Upgrade(_) => EffectKind::Upgrade,
            Self::Retain(_) => EffectKind::Retain,
            Self::ModifyCost { .. } | Self::SetEthereal { .. } | Self::SetUnplayable { .. } => {
                EffectKind::CardFlag
            }
            Self::ApplyPower { .. }
            | Self::RemovePower { .. }
            | Self::TransferPowers { .. }
            | Self::StealPower { .. }
            | Self::SilencePower { .. } => EffectKind::Power,
            Self::Scry(_) | Self::Tutor { .. } | Self::Discover { .. } => EffectKind::Selection,
            Self::Delayed { .. } => EffectKind::Delayed,
            Self::Conditional { .. }
            | Self::Repeat { .. }
            | Self::Random { .. }
            | Self::Sequence(_)
            | Self::ForEach { .. } => EffectKind::Meta,
        }
    }
}

/// Whether an effect list contains an effect of the given kind,
/// searching nested meta effects.
#[must_use]
pub fn contains_kind(effects: &[AtomicEffect], kind: EffectKind) -> bool {
    effects.iter().any(|effect| {
        if effect.kind() == kind {
            return true;
        }
        match effect {
            AtomicEffect::Damage { on_hit, .. } => contains_kind(on_hit, kind),
            AtomicEffect::Conditional {
                then, otherwise, ..
            } => contains_kind(then, kind) || contains_kind(otherwise, kind),
            AtomicEffect::Repeat { effects, .. }
            | AtomicEffect::Sequence(effects)
            | AtomicEffect::ForEach { effects, .. }
            | AtomicEffect::Delayed { effects, .. } => contains_kind(effects, kind),
            AtomicEffect::Random { branches, .. } => {
                branches.iter().any(|b| contains_kind(b, kind))
            }
            _ => false,
        }
    })
}
