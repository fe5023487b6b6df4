//! # Navigation Controller
//!
//! The per-player progression state machine, evaluated on every movement
//! event.
//!
//! ## States
//!
//! - **Outside**: planar distance accumulates. A warning fires when the
//!   counter first enters `[10, 11)`; at 15 the counter resets and a
//!   non-privileged player noclips into level 0 with probability 0.88.
//! - **`InFacility(level)`**, checked in this order:
//!   1. containment: leaving `[room_min, room_max]` on X or Z teleports the
//!      player back inside and ends the update
//!   2. exit underfoot: level 0 escapes to the normal world, deeper levels
//!      ascend one level
//!   3. stairs underfoot: descend one level, unless already deepest
//!
//! The voxel "underfoot" is the one directly below the player's new block
//! position.

use std::collections::HashSet;
use std::sync::Arc;

use liminal_procedural::{LevelRegistry, Material};
use liminal_shared::{
    BlockPos, Cue, Destination, FacilityConfig, Intent, MovementEvent, Position, StatusEffect,
    Tone,
};
use parking_lot::{Mutex, RwLock};

use crate::effects::EffectSink;
use crate::rng::EventRng;
use crate::session::{Location, PlayerSession};

/// Counter value at which the instability warning fires.
pub const WARNING_DISTANCE: f64 = 10.0;
/// End of the warning band.
pub const WARNING_BAND_END: f64 = 11.0;
/// Counter value that triggers the noclip roll.
pub const NOCLIP_DISTANCE: f64 = 15.0;
/// Probability a non-privileged player noclips at the threshold.
pub const NOCLIP_CHANCE: f64 = 0.88;
/// Half-width of the landing area when entering or descending.
pub const ENTRY_SPREAD: i32 = 50;
/// Half-width of the landing area when ascending.
pub const ASCENT_SPREAD: i32 = 100;

/// What a movement update did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// Nothing happened.
    Idle,
    /// The outside counter entered the warning band.
    Warned {
        /// Counter after this update.
        distance: f64,
    },
    /// The counter reached the threshold but the player stayed outside.
    Spared,
    /// Slipped out of the normal world into level 0.
    Noclipped {
        /// Landing position.
        position: Position,
    },
    /// Moved out of bounds and was pulled back.
    Contained {
        /// Corrected position.
        position: Position,
    },
    /// Took the stairs one level down.
    Descended {
        /// New level.
        level: u32,
        /// Landing position.
        position: Position,
    },
    /// Took an exit one level up.
    Ascended {
        /// New level.
        level: u32,
        /// Landing position.
        position: Position,
    },
    /// Took a level 0 exit back to the normal world.
    Escaped,
}

/// Drives player sessions through the facility.
pub struct NavigationController {
    config: Arc<FacilityConfig>,
    registry: Arc<LevelRegistry>,
    rng: Mutex<Box<dyn EventRng>>,
    exits: RwLock<HashSet<(u32, BlockPos)>>,
}

impl NavigationController {
    /// Creates a controller drawing gameplay randomness from `rng`.
    #[must_use]
    pub fn new(
        config: Arc<FacilityConfig>,
        registry: Arc<LevelRegistry>,
        rng: Box<dyn EventRng>,
    ) -> Self {
        Self {
            config,
            registry,
            rng: Mutex::new(rng),
            exits: RwLock::new(HashSet::new()),
        }
    }

    /// Processes one movement event for `session`.
    ///
    /// The realm reported by the host is authoritative: the session is
    /// resynchronised from it before any rule runs.
    pub fn handle_move(
        &self,
        session: &mut PlayerSession,
        event: &MovementEvent,
        sink: &dyn EffectSink,
    ) -> Transition {
        session.position = event.to;
        self.resync(session, event);

        match session.location {
            Location::Outside => self.track_outside(session, event, sink),
            Location::InFacility(level) => self.track_inside(session, level, event, sink),
        }
    }

    fn resync(&self, session: &mut PlayerSession, event: &MovementEvent) {
        let reported = Location::from(event.realm);
        if reported == session.location {
            return;
        }
        if let Location::InFacility(level) = reported {
            if level >= self.config.max_levels {
                tracing::warn!(
                    "{} reported on level {} (max_levels = {}), keeping {:?}",
                    session.id,
                    level,
                    self.config.max_levels,
                    session.location
                );
                return;
            }
        }
        tracing::debug!("{} resynced {:?} -> {:?}", session.id, session.location, reported);
        if reported.in_facility() != session.location.in_facility() {
            session.distance = 0.0;
        }
        session.location = reported;
    }

    fn track_outside(
        &self,
        session: &mut PlayerSession,
        event: &MovementEvent,
        sink: &dyn EffectSink,
    ) -> Transition {
        let previous = session.distance;
        session.distance += event.from.planar_distance(event.to);
        tracing::trace!("{} outside distance {:.2}", session.id, session.distance);

        if session.distance >= NOCLIP_DISTANCE {
            session.distance = 0.0;
            if session.privileged || !self.rng.lock().chance(NOCLIP_CHANCE) {
                return Transition::Spared;
            }
            sink.emit(
                session.id,
                Intent::notify(
                    Tone::Danger,
                    "[ANOMALY] Spatial distortion detected. You have noclipped out of reality.",
                ),
            );
            let position = self.enter_level(session, 0, sink);
            return Transition::Noclipped { position };
        }

        if previous < WARNING_DISTANCE
            && (WARNING_DISTANCE..WARNING_BAND_END).contains(&session.distance)
        {
            sink.emit(
                session.id,
                Intent::notify(
                    Tone::Muted,
                    format!(
                        "[CAUTION] Reality is growing unstable... ({:.1}/{:.1})",
                        session.distance, NOCLIP_DISTANCE
                    ),
                ),
            );
            return Transition::Warned { distance: session.distance };
        }

        Transition::Idle
    }

    fn track_inside(
        &self,
        session: &mut PlayerSession,
        level: u32,
        event: &MovementEvent,
        sink: &dyn EffectSink,
    ) -> Transition {
        let block = event.to.block();

        if !self.config.contains(block.x, block.z) {
            return self.contain(session, level, block, sink);
        }

        let below = block.below();
        if self.is_known_exit(level, below) {
            return self.take_exit(session, level, sink);
        }

        let material = self.registry.material_at(level, below);
        if material == Material::EXIT {
            if self.exits.write().insert((level, below)) {
                tracing::debug!("Exit at {} on level {} cached", below, level);
            }
            return self.take_exit(session, level, sink);
        }

        if material == Material::STAIRS_DOWN && level < self.config.deepest_level() {
            return self.descend(session, level, sink);
        }

        Transition::Idle
    }

    fn contain(
        &self,
        session: &mut PlayerSession,
        level: u32,
        block: BlockPos,
        sink: &dyn EffectSink,
    ) -> Transition {
        let (x, z) = {
            let mut rng = self.rng.lock();
            let x = rng.between(self.config.room_min, self.config.room_max);
            let z = rng.between(self.config.room_min, self.config.room_max);
            (x, z)
        };
        let position = Position::centered(x, self.registry.profile(level).standing_y(), z);
        session.position = position;

        tracing::warn!(
            "{} left the containment region at ({}, {}) on level {}, moved to ({:.1}, {:.1})",
            session.id,
            block.x,
            block.z,
            level,
            position.x,
            position.z
        );
        sink.emit_all(
            session.id,
            vec![
                Intent::Teleport(Destination::Facility { level, position }),
                Intent::notify(
                    Tone::Alert,
                    "[ERROR] Out-of-bounds movement detected. Returning you to the central area.",
                ),
            ],
        );
        Transition::Contained { position }
    }

    fn take_exit(&self, session: &mut PlayerSession, level: u32, sink: &dyn EffectSink) -> Transition {
        if level == 0 {
            self.escape(session, sink);
            return Transition::Escaped;
        }

        let target = level - 1;
        let position = self.landing(target, ASCENT_SPREAD);
        session.location = Location::InFacility(target);
        session.position = position;

        tracing::info!("{} ascended from level {} to level {}", session.id, level, target);
        sink.emit_all(
            session.id,
            vec![
                Intent::notify(Tone::Hint, "[DISCOVERY] You found a way upward..."),
                Intent::Teleport(Destination::Facility { level: target, position }),
                Intent::ApplyEffects(vec![StatusEffect::blindness(30)]),
                Intent::cue(Cue::Ascent, 0.5, 1.0),
                Intent::notify(Tone::Hint, format!("[LOCATION] Ascended to level {target}")),
            ],
        );
        Transition::Ascended { level: target, position }
    }

    fn escape(&self, session: &mut PlayerSession, sink: &dyn EffectSink) {
        session.reset_outside();

        tracing::info!("{} escaped the facility", session.id);
        sink.emit_all(
            session.id,
            vec![
                Intent::notify(
                    Tone::Success,
                    "[ANOMALY] The boundary cracks open. Re-establishing a link to reality...",
                ),
                Intent::Teleport(Destination::NormalSpawn),
                Intent::ClearEffects,
                Intent::cue(Cue::Escape, 1.0, 1.0),
                Intent::notify(
                    Tone::Success,
                    "[TRANSFER COMPLETE] Connection to the facility severed. Reality resynchronised.",
                ),
            ],
        );
    }

    fn descend(&self, session: &mut PlayerSession, level: u32, sink: &dyn EffectSink) -> Transition {
        let target = level + 1;
        // Materializes the next level on first descent
        let position = self.landing(target, ENTRY_SPREAD);
        session.location = Location::InFacility(target);
        session.position = position;

        tracing::info!("{} descended from level {} to level {}", session.id, level, target);
        sink.emit_all(
            session.id,
            vec![
                Intent::notify(Tone::Danger, "[WARNING] Abnormal gravity detected."),
                Intent::notify(Tone::Alert, "[SYSTEM] Going any deeper is not recommended."),
                Intent::Teleport(Destination::Facility { level: target, position }),
                Intent::ApplyEffects(vec![StatusEffect::blindness(60), StatusEffect::nausea(100)]),
                Intent::cue(Cue::Descent, 1.0, 0.5),
                Intent::notify(Tone::Danger, format!("[LOCATION] Descended to level {target}")),
                Intent::notify(Tone::Alert, "[SENSORS] Air density is increasing..."),
            ],
        );
        Transition::Descended { level: target, position }
    }

    /// Teleports `session` onto `level` near the spawn anchor.
    ///
    /// Used by the noclip roll and the `enter` command.
    ///
    /// # Panics
    ///
    /// Panics if `level >= max_levels`.
    pub fn enter_level(&self, session: &mut PlayerSession, level: u32, sink: &dyn EffectSink) -> Position {
        let position = self.landing(level, ENTRY_SPREAD);
        session.location = Location::InFacility(level);
        session.position = position;
        session.distance = 0.0;

        tracing::info!("{} entered level {}", session.id, level);
        let mut intents = vec![
            Intent::Teleport(Destination::Facility { level, position }),
            Intent::ApplyEffects(vec![StatusEffect::blindness(60), StatusEffect::nausea(80)]),
            Intent::cue(Cue::Noclip, 0.5, 0.5),
            Intent::notify(Tone::Hint, "[TRANSFER COMPLETE] You have noclipped out of reality..."),
        ];
        if level == 0 {
            intents.push(Intent::notify(
                Tone::Info,
                "[SYSTEM] Find an emerald block to escape.",
            ));
        } else {
            intents.push(Intent::notify(
                Tone::Info,
                "[SYSTEM] Find a path to the level above or below.",
            ));
            intents.push(Intent::notify(Tone::Alert, format!("[LOCATION] Currently on level {level}.")));
        }
        sink.emit_all(session.id, intents);
        position
    }

    /// Sends `session` to the normal world's spawn and clears its state.
    pub fn force_outside(&self, session: &mut PlayerSession, sink: &dyn EffectSink) {
        tracing::info!("{} forced out of {:?}", session.id, session.location);
        session.reset_outside();
        sink.emit_all(
            session.id,
            vec![Intent::Teleport(Destination::NormalSpawn), Intent::ClearEffects],
        );
    }

    /// Random standing position within `spread` of the anchor of `level`,
    /// clipped to the containment square.
    fn landing(&self, level: u32, spread: i32) -> Position {
        let y = self.registry.profile(level).standing_y();
        let (x, z) = {
            let mut rng = self.rng.lock();
            (rng.spread(spread), rng.spread(spread))
        };
        let (min, max) = (self.config.room_min, self.config.room_max);
        Position::centered(x.clamp(min, max), y, z.clamp(min, max))
    }

    /// Whether `pos` on `level` is a cached exit.
    #[must_use]
    pub fn is_known_exit(&self, level: u32, pos: BlockPos) -> bool {
        self.exits.read().contains(&(level, pos))
    }

    /// Number of cached exits.
    #[must_use]
    pub fn known_exits(&self) -> usize {
        self.exits.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::IntentBus;
    use crate::rng::ScriptedRng;
    use liminal_shared::{PlayerId, Realm};

    const P: PlayerId = PlayerId(1);

    fn controller(roll: f64) -> NavigationController {
        let config = Arc::new(FacilityConfig::default());
        let registry = Arc::new(LevelRegistry::new(Arc::clone(&config)));
        NavigationController::new(config, registry, Box::new(ScriptedRng::constant(roll)))
    }

    fn walk(player: PlayerId, from: (f64, f64), to: (f64, f64), realm: Realm) -> MovementEvent {
        MovementEvent {
            player,
            from: Position::new(from.0, 64.0, from.1),
            to: Position::new(to.0, 64.0, to.1),
            realm,
        }
    }

    #[test]
    fn test_distance_accumulates_planar_only() {
        let nav = controller(0.99);
        let (tx, _rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        let mut event = walk(P, (0.0, 0.0), (3.0, 4.0), Realm::Normal);
        event.to.y = 200.0;
        assert_eq!(nav.handle_move(&mut s, &event, &tx), Transition::Idle);
        assert!((s.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_warning_is_edge_triggered() {
        let nav = controller(0.99);
        let (tx, rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        let step = |s: &mut PlayerSession, d: f64| {
            nav.handle_move(s, &walk(P, (0.0, 0.0), (d, 0.0), Realm::Normal), &tx)
        };

        assert_eq!(step(&mut s, 9.9), Transition::Idle);
        assert!(matches!(step(&mut s, 0.2), Transition::Warned { .. }));
        assert_eq!(step(&mut s, 0.2), Transition::Idle);
        assert_eq!(step(&mut s, 0.2), Transition::Idle);
        assert_eq!(rx.pending_count(), 1);
    }

    #[test]
    fn test_threshold_resets_even_when_spared() {
        let nav = controller(0.95);
        let (tx, rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        let t = nav.handle_move(&mut s, &walk(P, (0.0, 0.0), (16.0, 0.0), Realm::Normal), &tx);
        assert_eq!(t, Transition::Spared);
        assert!(s.distance.abs() < f64::EPSILON);
        assert_eq!(s.location, Location::Outside);
        assert!(!rx.has_intents());
    }

    #[test]
    fn test_privileged_never_noclips() {
        let nav = controller(0.0);
        let (tx, _rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "op", true);

        let t = nav.handle_move(&mut s, &walk(P, (0.0, 0.0), (20.0, 0.0), Realm::Normal), &tx);
        assert_eq!(t, Transition::Spared);
        assert_eq!(s.location, Location::Outside);
    }

    #[test]
    fn test_containment_runs_before_voxel_checks() {
        let nav = controller(0.5);
        let (tx, rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);
        s.location = Location::InFacility(1);

        let t = nav.handle_move(
            &mut s,
            &walk(P, (4999.0, 0.0), (5001.2, 0.0), Realm::Facility(1)),
            &tx,
        );
        let Transition::Contained { position } = t else {
            panic!("expected containment, got {t:?}");
        };
        // roll 0.5 lands in the middle of [room_min, room_max)
        assert!((position.x - 0.5).abs() < 1e-9);
        assert!((position.z - 0.5).abs() < 1e-9);
        assert!((position.y - 66.0).abs() < 1e-9);
        assert_eq!(s.location, Location::InFacility(1));
        assert_eq!(rx.pending_count(), 2);
    }

    #[test]
    fn test_block_coordinates_decide_containment() {
        let nav = controller(0.5);
        let (tx, _rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        // x = 5000.9 is block 5000: still inside
        let t = nav.handle_move(
            &mut s,
            &walk(P, (5000.0, 3.0), (5000.9, 3.0), Realm::Facility(0)),
            &tx,
        );
        assert!(!matches!(t, Transition::Contained { .. }));
    }

    #[test]
    fn test_realm_resync() {
        let nav = controller(0.99);
        let (tx, _rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        nav.handle_move(&mut s, &walk(P, (0.5, 0.5), (0.6, 0.5), Realm::Facility(2)), &tx);
        assert_eq!(s.location, Location::InFacility(2));

        // Out-of-range realms are ignored
        nav.handle_move(&mut s, &walk(P, (0.5, 0.5), (0.6, 0.5), Realm::Facility(7)), &tx);
        assert_eq!(s.location, Location::InFacility(2));
    }

    #[test]
    fn test_crossing_into_or_out_of_facility_clears_distance() {
        let nav = controller(0.99);
        let (tx, _rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        nav.handle_move(&mut s, &walk(P, (0.0, 0.0), (12.0, 0.0), Realm::Normal), &tx);
        assert!((s.distance - 12.0).abs() < 1e-9);

        // Host moved the player in without a noclip roll
        nav.handle_move(&mut s, &walk(P, (0.5, 0.5), (0.6, 0.5), Realm::Facility(0)), &tx);
        assert_eq!(s.location, Location::InFacility(0));
        assert!(s.distance.abs() < f64::EPSILON);

        // And back out: counting restarts from zero
        nav.handle_move(&mut s, &walk(P, (0.5, 0.5), (1.5, 0.5), Realm::Normal), &tx);
        assert_eq!(s.location, Location::Outside);
        assert!((s.distance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_enter_level_clears_distance() {
        let nav = controller(0.5);
        let (tx, _rx) = IntentBus::create_pair(64);
        let mut s = PlayerSession::new(P, "a", false);

        nav.handle_move(&mut s, &walk(P, (0.0, 0.0), (12.0, 0.0), Realm::Normal), &tx);
        assert!((s.distance - 12.0).abs() < 1e-9);

        nav.enter_level(&mut s, 1, &tx);
        assert_eq!(s.location, Location::InFacility(1));
        assert!(s.distance.abs() < f64::EPSILON);
    }
}
