//! # LIMINAL Shared
//!
//! Common types used by the generator, the progression core and the hosts
//! that embed them.
//!
//! ## CRITICAL RULE
//!
//! This crate carries data, not decisions:
//! - no terrain generation (see `liminal_procedural`)
//! - no progression rules (see `liminal`)

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod events;
pub mod math;

pub use config::{ConfigError, ConfigResult, FacilityConfig};
pub use events::{
    Cue, Destination, EffectKind, Intent, MovementEvent, PlayerId, Realm, StatusEffect, Tone,
};
pub use math::{BlockPos, Position};

/// Host simulation rate. Effect durations and task periods are in ticks.
pub const TICKS_PER_SECOND: u32 = 20;
