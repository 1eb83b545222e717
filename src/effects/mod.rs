//! The effect system: declarative effect trees plus the interpreter
//! that executes them against combat state.

pub mod effect;
pub mod interpreter;
pub mod target;
pub mod value;

pub use effect::{AtomicEffect, Condition, EffectContext, EffectKind, IterationTarget};
pub use interpreter::Interpreter;
pub use target::{CardTarget, EntityTarget};
pub use value::{ScalingSource, ValueSpec};
