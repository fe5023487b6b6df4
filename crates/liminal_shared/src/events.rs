//! Event and intent types exchanged with the host environment.
//!
//! The host feeds [`MovementEvent`]s in. The core answers with [`Intent`]s,
//! which the host executes (teleports, status effects, chat lines, sounds).
//! The core never performs I/O itself.

use crate::math::{BlockPos, Position};

/// Stable player identity, assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Which environment a player currently occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Realm {
    /// The ordinary world outside the facility.
    #[default]
    Normal,
    /// One level of the facility (0 = shallowest).
    Facility(u32),
}

impl Realm {
    /// Returns the facility level, if inside the facility.
    #[must_use]
    pub const fn level(self) -> Option<u32> {
        match self {
            Self::Normal => None,
            Self::Facility(level) => Some(level),
        }
    }
}

/// One movement sample reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementEvent {
    /// Who moved.
    pub player: PlayerId,
    /// Position before the move.
    pub from: Position,
    /// Position after the move.
    pub to: Position,
    /// Realm the host believes the player is in.
    pub realm: Realm,
}

/// Timed status effects the core may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Screen goes dark.
    Blindness,
    /// Screen warps.
    Nausea,
}

/// A timed status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusEffect {
    /// Effect type.
    pub kind: EffectKind,
    /// Duration in host ticks (20 per second).
    pub duration_ticks: u32,
    /// Amplifier (0 = level I).
    pub amplifier: u8,
    /// Suppress particles and HUD icon.
    pub subtle: bool,
}

impl StatusEffect {
    /// Blindness for `ticks`.
    #[must_use]
    pub const fn blindness(ticks: u32) -> Self {
        Self { kind: EffectKind::Blindness, duration_ticks: ticks, amplifier: 0, subtle: false }
    }

    /// Nausea for `ticks`.
    #[must_use]
    pub const fn nausea(ticks: u32) -> Self {
        Self { kind: EffectKind::Nausea, duration_ticks: ticks, amplifier: 0, subtle: false }
    }

    /// Same effect without particles or icon.
    #[must_use]
    pub const fn subtle(mut self) -> Self {
        self.subtle = true;
        self
    }
}

/// Sound cues. The host maps these onto its own sound registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Fluorescent hum.
    Hum,
    /// Distant machinery clank.
    Machinery,
    /// Creaking ladder rung.
    Creak,
    /// Dripping cave ambience.
    CaveDrip,
    /// Lights bursting during a flicker.
    LightBurst,
    /// Lights coming back after a flicker.
    LightRestore,
    /// Slipping out of reality into level 0.
    Noclip,
    /// Falling to a deeper level.
    Descent,
    /// Climbing to a shallower level.
    Ascent,
    /// Escaping the facility.
    Escape,
}

/// Visual weight of a notice line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Greyed-out hint.
    Muted,
    /// Neutral information.
    Info,
    /// Guidance.
    Hint,
    /// Something is wrong.
    Alert,
    /// Something is very wrong.
    Danger,
    /// Good news.
    Success,
}

/// Where a teleport should land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Destination {
    /// The spawn point of the normal world (host decides where that is).
    NormalSpawn,
    /// An absolute position in a facility level.
    Facility {
        /// Target level.
        level: u32,
        /// Target position.
        position: Position,
    },
}

/// Something the host should do on behalf of the core.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Move the player.
    Teleport(Destination),
    /// Apply a tuple of timed status effects.
    ApplyEffects(Vec<StatusEffect>),
    /// Remove every active status effect.
    ClearEffects,
    /// Send a text line.
    Notify {
        /// Visual weight.
        tone: Tone,
        /// Message body.
        text: String,
    },
    /// Play a sound at the player's location.
    PlayCue {
        /// Which sound.
        cue: Cue,
        /// Volume (0.0 - 1.0).
        volume: f32,
        /// Pitch (0.5 - 2.0).
        pitch: f32,
    },
    /// Show air at these voxels to this player only (world is untouched).
    MaskBlocks(Vec<BlockPos>),
    /// Undo a previous [`Intent::MaskBlocks`].
    RestoreBlocks(Vec<BlockPos>),
}

impl Intent {
    /// Shorthand for a notice.
    #[must_use]
    pub fn notify(tone: Tone, text: impl Into<String>) -> Self {
        Self::Notify { tone, text: text.into() }
    }

    /// Shorthand for a sound cue.
    #[must_use]
    pub const fn cue(cue: Cue, volume: f32, pitch: f32) -> Self {
        Self::PlayCue { cue, volume, pitch }
    }
}
