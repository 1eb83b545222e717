//! Power engine: stacking, decay, silence, triggers, and modifiers.

pub mod engine;

pub use engine::{
    apply_power, decay_powers, modify_incoming_damage, modify_outgoing_block,
    modify_outgoing_damage, remove_power, retains_block, silence_power, steal_power,
    transfer_powers, triggers_for,
};
