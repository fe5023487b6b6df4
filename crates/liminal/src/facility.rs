//! # Facility Service
//!
//! The single entry point a host talks to. Owns the level registry, the
//! sessions, the navigation rules and the ambient scheduler, and routes
//! every intent to one [`EffectSink`].
//!
//! ## Host contract
//!
//! - call [`Facility::join`] / [`Facility::quit`] on connect/disconnect
//! - feed every movement through [`Facility::handle_move`]
//! - call [`Facility::tick`] once per host tick
//! - ask [`Facility::on_damage`] / [`Facility::on_block_break`] before
//!   applying those actions
//!
//! Movement events of different players may be handled concurrently.

use std::sync::Arc;

use liminal_procedural::LevelRegistry;
use liminal_shared::{ConfigResult, FacilityConfig, MovementEvent, PlayerId};
use parking_lot::Mutex;

use crate::ambient::{AmbientScheduler, AmbientStats};
use crate::commands::{self, CommandContext};
use crate::effects::EffectSink;
use crate::error::CommandResult;
use crate::navigation::{NavigationController, Transition};
use crate::protection::{self, DamageCause, Verdict};
use crate::rng::{EventRng, SeededEventRng};
use crate::session::{Location, SessionRegistry};

/// Mixed into the configured seed so ambient draws get their own stream.
const AMBIENT_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// The facility as seen by a host.
pub struct Facility {
    config: Arc<FacilityConfig>,
    registry: Arc<LevelRegistry>,
    sessions: SessionRegistry,
    navigation: NavigationController,
    ambient: Mutex<AmbientScheduler>,
    sink: Arc<dyn EffectSink>,
}

impl Facility {
    /// Builds the facility, seeding gameplay draws from `event_seed` (or
    /// the clock when unset).
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is inconsistent.
    pub fn new(config: FacilityConfig, sink: Arc<dyn EffectSink>) -> ConfigResult<Self> {
        let seed = config.event_seed;
        Self::with_rngs(
            config,
            sink,
            Box::new(SeededEventRng::from_config(seed)),
            Box::new(SeededEventRng::from_config(seed.map(|s| s ^ AMBIENT_STREAM))),
        )
    }

    /// Builds the facility with explicit draw streams for navigation and
    /// ambience.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is inconsistent.
    pub fn with_rngs(
        config: FacilityConfig,
        sink: Arc<dyn EffectSink>,
        navigation_rng: Box<dyn EventRng>,
        ambient_rng: Box<dyn EventRng>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let registry = Arc::new(LevelRegistry::new(Arc::clone(&config)));

        tracing::info!(
            "Facility ready: {} levels, containment [{}, {}]",
            config.max_levels,
            config.room_min,
            config.room_max
        );

        Ok(Self {
            navigation: NavigationController::new(
                Arc::clone(&config),
                Arc::clone(&registry),
                navigation_rng,
            ),
            ambient: Mutex::new(AmbientScheduler::new(
                Arc::clone(&config),
                Arc::clone(&registry),
                ambient_rng,
            )),
            sessions: SessionRegistry::new(),
            config,
            registry,
            sink,
        })
    }

    /// A player connected.
    pub fn join(&self, id: PlayerId, name: impl Into<String>, privileged: bool) {
        self.sessions.join(id, name, privileged);
    }

    /// A player disconnected. Their progression state is discarded.
    pub fn quit(&self, id: PlayerId) -> bool {
        self.sessions.quit(id).is_some()
    }

    /// Processes one movement event.
    ///
    /// Players never seen before get a fresh, unprivileged session.
    pub fn handle_move(&self, event: &MovementEvent) -> Transition {
        let handle = self.sessions.get(event.player).unwrap_or_else(|| {
            tracing::debug!("First movement from unknown {}, opening a session", event.player);
            self.sessions.join(event.player, event.player.to_string(), false)
        });
        let mut session = handle.lock();
        self.navigation.handle_move(&mut session, event, self.sink.as_ref())
    }

    /// `enter [level]` issued by `issuer`.
    ///
    /// # Errors
    ///
    /// See [`commands::enter`].
    pub fn enter(&self, issuer: PlayerId, arg: Option<&str>) -> CommandResult<u32> {
        commands::enter(&self.command_context(), issuer, arg)
    }

    /// `force_exit [target]` issued by `issuer`.
    ///
    /// # Errors
    ///
    /// See [`commands::force_exit`].
    pub fn force_exit(&self, issuer: PlayerId, target: Option<&str>) -> CommandResult<PlayerId> {
        commands::force_exit(&self.command_context(), issuer, target)
    }

    fn command_context(&self) -> CommandContext<'_> {
        CommandContext {
            config: &self.config,
            sessions: &self.sessions,
            navigation: &self.navigation,
            sink: self.sink.as_ref(),
        }
    }

    /// Runs the ambient tasks due on tick `now`.
    pub fn tick(&self, now: u64) {
        let views = self.sessions.views();
        self.ambient.lock().tick(now, &views, self.sink.as_ref());
    }

    /// Whether damage of `cause` should hit `player`.
    #[must_use]
    pub fn on_damage(&self, player: PlayerId, cause: DamageCause) -> Verdict {
        protection::damage_verdict(self.location(player).unwrap_or_default(), cause)
    }

    /// Whether `player` may break a block. Sends the refusal notice itself.
    pub fn on_block_break(&self, player: PlayerId, creative: bool) -> Verdict {
        let location = self.location(player).unwrap_or_default();
        let (verdict, notice) = protection::block_break_verdict(location, creative);
        if let Some(intent) = notice {
            self.sink.emit(player, intent);
        }
        verdict
    }

    /// Current progression state of a player.
    #[must_use]
    pub fn location(&self, player: PlayerId) -> Option<Location> {
        self.sessions.get(player).map(|h| h.lock().location)
    }

    /// Outside distance counter of a player.
    #[must_use]
    pub fn distance(&self, player: PlayerId) -> Option<f64> {
        self.sessions.get(player).map(|h| h.lock().distance)
    }

    /// Startup configuration.
    #[must_use]
    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// Level registry.
    #[must_use]
    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    /// Connected players.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Progression rules, including the exit cache.
    #[must_use]
    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Ambient totals so far.
    #[must_use]
    pub fn ambient_stats(&self) -> AmbientStats {
        self.ambient.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::IntentBus;
    use liminal_shared::{Intent, Position, Realm};

    fn facility() -> (Facility, crate::effects::IntentReceiver) {
        let (tx, rx) = IntentBus::create_pair(256);
        let config = FacilityConfig { event_seed: Some(7), ..FacilityConfig::default() };
        (Facility::new(config, Arc::new(tx)).expect("valid config"), rx)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (tx, _rx) = IntentBus::create_pair(1);
        let config = FacilityConfig { max_levels: 0, ..FacilityConfig::default() };
        assert!(Facility::new(config, Arc::new(tx)).is_err());
    }

    #[test]
    fn test_unknown_player_gets_session() {
        let (facility, _rx) = facility();
        let event = MovementEvent {
            player: PlayerId(9),
            from: Position::ZERO,
            to: Position::new(2.0, 0.0, 0.0),
            realm: Realm::Normal,
        };
        assert_eq!(facility.handle_move(&event), Transition::Idle);
        assert_eq!(facility.location(PlayerId(9)), Some(Location::Outside));
        assert!((facility.distance(PlayerId(9)).unwrap_or_default() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_protection_routing() {
        let (facility, rx) = facility();
        facility.join(PlayerId(1), "a", false);

        assert_eq!(facility.on_damage(PlayerId(1), DamageCause::Fall), Verdict::Allow);
        facility.enter(PlayerId(1), None).expect("enter");
        rx.drain();

        assert_eq!(facility.on_damage(PlayerId(1), DamageCause::Fall), Verdict::Deny);
        assert_eq!(facility.on_block_break(PlayerId(1), false), Verdict::Deny);
        assert!(matches!(rx.try_recv().map(|d| d.intent), Some(Intent::Notify { .. })));
        assert_eq!(facility.on_block_break(PlayerId(1), true), Verdict::Allow);
    }

    #[test]
    fn test_quit_discards_state() {
        let (facility, _rx) = facility();
        facility.join(PlayerId(1), "a", false);
        facility.enter(PlayerId(1), Some("1")).expect("enter");

        assert!(facility.quit(PlayerId(1)));
        assert_eq!(facility.location(PlayerId(1)), None);
        assert!(!facility.quit(PlayerId(1)));
    }
}
