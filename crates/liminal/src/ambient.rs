//! # Ambient Scheduler
//!
//! Atmosphere for players inside the facility, on fixed tick schedules:
//!
//! | task    | first | every | effect                                          |
//! |---------|-------|-------|-------------------------------------------------|
//! | flicker | 100   | 100   | nearby lights go dark for a moment              |
//! | sound   | 60    | 160   | level-specific hum, machinery, creaks, drips    |
//! | fog     | 100   | 400   | brief blindness, nausea on deeper levels        |
//!
//! The scheduler reads session snapshots and never touches progression
//! state. A flicker is two deferred tasks (mask, then restore) kept in a
//! due-ordered queue and run by later ticks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use liminal_procedural::{LevelRegistry, Stratum};
use liminal_shared::{BlockPos, Cue, FacilityConfig, Intent, PlayerId, StatusEffect, Tone};

use crate::effects::EffectSink;
use crate::rng::EventRng;
use crate::session::{Location, SessionView};

/// Minimum ticks between two flickers for one player.
pub const FLICKER_COOLDOWN: u64 = 600;
/// Chance an eligible player gets a flicker on a flicker tick.
pub const FLICKER_CHANCE: f64 = 0.2;
/// Half-size of the cube searched for light fixtures.
pub const FLICKER_RADIUS: i32 = 20;
/// Ticks from the flicker notice until the lights go out.
pub const MASK_DELAY: u64 = 5;
/// Ticks the lights stay out.
pub const RESTORE_DELAY: u64 = 15;

/// A periodic task's timing, in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Tick of the first run.
    pub first: u64,
    /// Ticks between runs.
    pub period: u64,
}

impl Schedule {
    /// Light flicker timing.
    pub const FLICKER: Self = Self { first: 100, period: 100 };
    /// Ambient sound timing.
    pub const SOUND: Self = Self { first: 60, period: 160 };
    /// Fog timing.
    pub const FOG: Self = Self { first: 100, period: 400 };

    /// Whether the task runs on tick `now`.
    #[must_use]
    pub const fn is_due(self, now: u64) -> bool {
        now >= self.first && (now - self.first) % self.period == 0
    }
}

/// Work scheduled for a later tick.
#[derive(Clone, Debug, PartialEq)]
pub enum DeferredTask {
    /// Hide the player's nearby lights.
    MaskLights {
        /// Whose view.
        player: PlayerId,
        /// Fixtures to hide.
        blocks: Vec<BlockPos>,
    },
    /// Show them again.
    RestoreLights {
        /// Whose view.
        player: PlayerId,
        /// Fixtures to show.
        blocks: Vec<BlockPos>,
    },
}

impl DeferredTask {
    const fn player(&self) -> PlayerId {
        match self {
            Self::MaskLights { player, .. } | Self::RestoreLights { player, .. } => *player,
        }
    }
}

/// Running totals, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AmbientStats {
    /// Flickers started.
    pub flickers: u64,
    /// Sound cues played.
    pub sounds: u64,
    /// Fog effects applied.
    pub fog_effects: u64,
    /// Deferred tasks run.
    pub deferred_run: u64,
}

/// Runs the ambient tasks. Call [`AmbientScheduler::tick`] once per tick.
pub struct AmbientScheduler {
    config: Arc<FacilityConfig>,
    registry: Arc<LevelRegistry>,
    rng: Box<dyn EventRng>,
    last_flicker: HashMap<PlayerId, u64>,
    deferred: BTreeMap<(u64, u64), DeferredTask>,
    next_seq: u64,
    stats: AmbientStats,
}

impl AmbientScheduler {
    /// Creates a scheduler with its own draw stream.
    #[must_use]
    pub fn new(config: Arc<FacilityConfig>, registry: Arc<LevelRegistry>, rng: Box<dyn EventRng>) -> Self {
        Self {
            config,
            registry,
            rng,
            last_flicker: HashMap::new(),
            deferred: BTreeMap::new(),
            next_seq: 0,
            stats: AmbientStats::default(),
        }
    }

    /// Runs everything due on tick `now`.
    ///
    /// `players` is a snapshot of the connected sessions; ticks must be
    /// passed in increasing order.
    pub fn tick(&mut self, now: u64, players: &[SessionView], sink: &dyn EffectSink) {
        let present: HashSet<PlayerId> = players.iter().map(|v| v.id).collect();
        self.last_flicker.retain(|id, _| present.contains(id));
        self.run_deferred(now, &present, sink);

        let inside = || {
            players
                .iter()
                .filter_map(|v| match v.location {
                    Location::InFacility(level) => Some((v, level)),
                    Location::Outside => None,
                })
        };

        if self.config.enable_light_flicker && Schedule::FLICKER.is_due(now) {
            for (view, level) in inside() {
                self.maybe_flicker(now, view, level, sink);
            }
        }
        if self.config.enable_ambient_sounds && Schedule::SOUND.is_due(now) {
            for (view, level) in inside() {
                self.play_ambience(view.id, level, sink);
            }
        }
        if self.config.enable_fog_effect && Schedule::FOG.is_due(now) {
            for (view, level) in inside() {
                self.roll_fog(view.id, level, sink);
            }
        }
    }

    /// Queues `task` to run on tick `due`.
    pub fn defer(&mut self, due: u64, task: DeferredTask) {
        self.deferred.insert((due, self.next_seq), task);
        self.next_seq += 1;
    }

    /// Number of queued deferred tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Running totals.
    #[must_use]
    pub const fn stats(&self) -> AmbientStats {
        self.stats
    }

    fn run_deferred(&mut self, now: u64, present: &HashSet<PlayerId>, sink: &dyn EffectSink) {
        while let Some(entry) = self.deferred.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let task = entry.remove();
            // Players who left in the meantime are skipped
            if !present.contains(&task.player()) {
                continue;
            }
            self.stats.deferred_run += 1;
            match task {
                DeferredTask::MaskLights { player, blocks } => sink.emit_all(
                    player,
                    vec![
                        Intent::MaskBlocks(blocks),
                        Intent::cue(Cue::LightBurst, 0.3, 1.5),
                        Intent::ApplyEffects(vec![StatusEffect::blindness(40).subtle()]),
                    ],
                ),
                DeferredTask::RestoreLights { player, blocks } => sink.emit_all(
                    player,
                    vec![Intent::RestoreBlocks(blocks), Intent::cue(Cue::LightRestore, 0.2, 1.2)],
                ),
            }
        }
    }

    fn maybe_flicker(&mut self, now: u64, view: &SessionView, level: u32, sink: &dyn EffectSink) {
        let eligible = self
            .last_flicker
            .get(&view.id)
            .map_or(true, |&last| now.saturating_sub(last) > FLICKER_COOLDOWN);
        if !eligible || !self.rng.chance(FLICKER_CHANCE) {
            return;
        }
        self.last_flicker.insert(view.id, now);

        let lights = self.lights_near(level, view.position.block());
        if lights.is_empty() {
            return;
        }

        tracing::debug!("Flickering {} lights around {}", lights.len(), view.id);
        self.stats.flickers += 1;
        sink.emit(
            view.id,
            Intent::notify(Tone::Danger, "[WARNING] Temporary lighting system failure."),
        );
        self.defer(
            now + MASK_DELAY,
            DeferredTask::MaskLights { player: view.id, blocks: lights.clone() },
        );
        self.defer(
            now + MASK_DELAY + RESTORE_DELAY,
            DeferredTask::RestoreLights { player: view.id, blocks: lights },
        );
    }

    /// Light fixtures of `level` within [`FLICKER_RADIUS`] of `center`.
    #[must_use]
    pub fn lights_near(&self, level: u32, center: BlockPos) -> Vec<BlockPos> {
        let ctx = self.registry.level(level);
        let profile = ctx.profile();
        let light = profile.palette.light;

        // Nothing but air outside the level's band
        let y_min = (center.y - FLICKER_RADIUS).max(profile.base_y);
        let y_max = (center.y + FLICKER_RADIUS).min(profile.ceiling_y());

        let mut lights = Vec::new();
        for x in -FLICKER_RADIUS..=FLICKER_RADIUS {
            for z in -FLICKER_RADIUS..=FLICKER_RADIUS {
                for y in y_min..=y_max {
                    let pos = BlockPos::new(center.x + x, y, center.z + z);
                    if ctx.material_at(pos) == light {
                        lights.push(pos);
                    }
                }
            }
        }
        lights
    }

    fn play_ambience(&mut self, player: PlayerId, level: u32, sink: &dyn EffectSink) {
        let cue = match Stratum::of(level) {
            Stratum::Lobby => Intent::cue(Cue::Hum, 0.2, 1.0),
            Stratum::Decay => {
                if self.rng.next_bool() {
                    Intent::cue(Cue::Hum, 0.2, 0.8)
                } else {
                    Intent::cue(Cue::Machinery, 0.1, 0.5)
                }
            }
            Stratum::Overgrowth => {
                if self.rng.next_bool() {
                    Intent::cue(Cue::Creak, 0.1, 0.5)
                } else {
                    Intent::cue(Cue::CaveDrip, 0.2, 0.7)
                }
            }
        };
        self.stats.sounds += 1;
        sink.emit(player, cue);
    }

    fn roll_fog(&mut self, player: PlayerId, level: u32, sink: &dyn EffectSink) {
        let scaling = self.config.difficulty_scaling;

        if self.rng.chance(0.1 * f64::from(level + 1) * scaling) {
            self.stats.fog_effects += 1;
            sink.emit(player, Intent::ApplyEffects(vec![StatusEffect::blindness(40).subtle()]));
        }
        if level > 0 && self.rng.chance(0.05 * f64::from(level) * scaling) {
            self.stats.fog_effects += 1;
            sink.emit(player, Intent::ApplyEffects(vec![StatusEffect::nausea(100).subtle()]));
        }
    }
}
