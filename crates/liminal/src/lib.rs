//! # LIMINAL
//!
//! Progression core of the facility: who is where, and what happens when
//! they move.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              Facility                               │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  MovementEvent ──> SessionRegistry ──> NavigationController ──┐     │
//! │                                              │                │     │
//! │  enter / force_exit ──> commands ────────────┤                │     │
//! │                                              v                v     │
//! │  tick ──> AmbientScheduler ──────────> LevelRegistry     EffectSink │
//! │                 │                       (procedural)          ^     │
//! │                 └─────────────────────────────────────────────┘     │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `session`: per-player progression state
//! - `navigation`: the Outside / `InFacility(level)` state machine
//! - `commands`: `enter` and `force_exit`
//! - `ambient`: flicker, sound and fog schedules
//! - `protection`: fall damage and block breaking
//! - `effects`: intent delivery to the host
//! - `rng`: gameplay randomness, separate from terrain streams
//! - `facility`: everything above behind one handle

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod ambient;
pub mod commands;
pub mod effects;
pub mod error;
pub mod facility;
pub mod navigation;
pub mod protection;
pub mod rng;
pub mod session;

// Re-export the layers below
pub use liminal_procedural as procedural;
pub use liminal_shared as shared;

pub use ambient::{AmbientScheduler, AmbientStats, DeferredTask, Schedule};
pub use commands::{parse_level_arg, CommandContext};
pub use effects::{Directive, EffectSink, IntentBus, IntentReceiver, IntentSender};
pub use error::{CommandError, CommandResult};
pub use facility::Facility;
pub use navigation::{NavigationController, Transition};
pub use protection::{DamageCause, Verdict};
pub use rng::{EventRng, ScriptedRng, SeededEventRng};
pub use session::{Location, PlayerSession, SessionHandle, SessionRegistry, SessionView};
