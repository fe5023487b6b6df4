//! # Player Sessions
//!
//! One [`PlayerSession`] per connected player, created on join and dropped
//! on quit. The session is the whole of a player's progression state: where
//! they are, how far they have wandered outside, and their last known
//! position.

use std::collections::HashMap;
use std::sync::Arc;

use liminal_shared::{PlayerId, Position, Realm};
use parking_lot::{Mutex, RwLock};

/// Where a player is, as far as progression is concerned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Location {
    /// In the normal world. Distance is being tracked.
    #[default]
    Outside,
    /// On a facility level.
    InFacility(u32),
}

impl Location {
    /// Facility level, if inside.
    #[must_use]
    pub const fn level(self) -> Option<u32> {
        match self {
            Self::Outside => None,
            Self::InFacility(level) => Some(level),
        }
    }

    /// Whether the player is anywhere in the facility.
    #[must_use]
    pub const fn in_facility(self) -> bool {
        matches!(self, Self::InFacility(_))
    }
}

impl From<Realm> for Location {
    fn from(realm: Realm) -> Self {
        match realm {
            Realm::Normal => Self::Outside,
            Realm::Facility(level) => Self::InFacility(level),
        }
    }
}

/// Progression state of one connected player.
#[derive(Clone, Debug)]
pub struct PlayerSession {
    /// Player identity.
    pub id: PlayerId,
    /// Display name, used by commands that target players by name.
    pub name: String,
    /// Elevated privilege: immune to noclip, may use `force_exit`.
    pub privileged: bool,
    /// Current progression state.
    pub location: Location,
    /// Planar distance walked outside since the last reset.
    pub distance: f64,
    /// Last reported position.
    pub position: Position,
}

impl PlayerSession {
    /// Fresh session: outside, counter at zero.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, privileged: bool) -> Self {
        Self {
            id,
            name: name.into(),
            privileged,
            location: Location::Outside,
            distance: 0.0,
            position: Position::ZERO,
        }
    }

    /// Sends the player back to the normal world and zeroes the counter.
    pub fn reset_outside(&mut self) {
        self.location = Location::Outside;
        self.distance = 0.0;
    }
}

/// Read-only copy of a session, handed to the ambient scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionView {
    /// Player identity.
    pub id: PlayerId,
    /// Current progression state.
    pub location: Location,
    /// Last reported position.
    pub position: Position,
}

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<PlayerSession>>;

/// All connected players.
///
/// The map lock is only held to look up, insert or remove a handle; work on
/// a session happens under that session's own lock.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<PlayerId, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player. A rejoin replaces the old session.
    pub fn join(&self, id: PlayerId, name: impl Into<String>, privileged: bool) -> SessionHandle {
        let session = Arc::new(Mutex::new(PlayerSession::new(id, name, privileged)));
        self.sessions.write().insert(id, Arc::clone(&session));
        tracing::debug!("{} joined", id);
        session
    }

    /// Drops a player's session, returning its final state.
    pub fn quit(&self, id: PlayerId) -> Option<PlayerSession> {
        let handle = self.sessions.write().remove(&id)?;
        tracing::debug!("{} left", id);
        let session = handle.lock().clone();
        Some(session)
    }

    /// Handle to a player's session.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<SessionHandle> {
        self.sessions.read().get(&id).cloned()
    }

    /// Finds a connected player by display name (case-insensitive).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.sessions
            .read()
            .iter()
            .find(|(_, s)| s.lock().name.eq_ignore_ascii_case(name))
            .map(|(&id, _)| id)
    }

    /// Whether a player is connected.
    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Number of connected players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether nobody is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Snapshot of every session, ordered by player id.
    #[must_use]
    pub fn views(&self) -> Vec<SessionView> {
        let mut views: Vec<SessionView> = self
            .sessions
            .read()
            .values()
            .map(|handle| {
                let s = handle.lock();
                SessionView { id: s.id, location: s.location, position: s.position }
            })
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_starts_outside() {
        let registry = SessionRegistry::new();
        let handle = registry.join(PlayerId(1), "Alice", false);

        let s = handle.lock();
        assert_eq!(s.location, Location::Outside);
        assert!(s.distance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_quit_destroys_state() {
        let registry = SessionRegistry::new();
        registry.join(PlayerId(1), "Alice", false).lock().distance = 12.0;

        let last = registry.quit(PlayerId(1)).expect("session");
        assert!((last.distance - 12.0).abs() < f64::EPSILON);
        assert!(!registry.contains(PlayerId(1)));
        assert!(registry.quit(PlayerId(1)).is_none());

        // Rejoin starts over
        let handle = registry.join(PlayerId(1), "Alice", false);
        assert!(handle.lock().distance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_by_name() {
        let registry = SessionRegistry::new();
        registry.join(PlayerId(1), "Alice", false);
        registry.join(PlayerId(2), "Bob", true);

        assert_eq!(registry.find_by_name("bob"), Some(PlayerId(2)));
        assert_eq!(registry.find_by_name("carol"), None);
    }

    #[test]
    fn test_views_sorted() {
        let registry = SessionRegistry::new();
        registry.join(PlayerId(3), "c", false);
        registry.join(PlayerId(1), "a", false);
        registry.get(PlayerId(3)).expect("session").lock().location = Location::InFacility(2);

        let views = registry.views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, PlayerId(1));
        assert_eq!(views[1].location, Location::InFacility(2));
    }

    #[test]
    fn test_location_from_realm() {
        assert_eq!(Location::from(Realm::Normal), Location::Outside);
        assert_eq!(Location::from(Realm::Facility(1)).level(), Some(1));
    }
}
