//! # Protection Rules
//!
//! The facility is indestructible and nobody gets hurt falling in it.

use liminal_shared::{Intent, Tone};

use crate::session::Location;

/// Source of incoming damage, as far as these rules care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageCause {
    /// Landing from a height.
    Fall,
    /// Anything else.
    Other,
}

/// Whether the host should let an action through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Proceed as normal.
    Allow,
    /// Cancel the action.
    Deny,
}

/// Decides whether damage applies.
#[must_use]
pub fn damage_verdict(location: Location, cause: DamageCause) -> Verdict {
    if location.in_facility() && cause == DamageCause::Fall {
        Verdict::Deny
    } else {
        Verdict::Allow
    }
}

/// Decides whether a block may be broken, with the notice to send if not.
///
/// Creative-mode players may edit the facility.
#[must_use]
pub fn block_break_verdict(location: Location, creative: bool) -> (Verdict, Option<Intent>) {
    if !location.in_facility() || creative {
        return (Verdict::Allow, None);
    }
    (
        Verdict::Deny,
        Some(Intent::notify(
            Tone::Alert,
            "[ERROR] Altering the facility is not permitted.",
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fall_damage_cancelled_inside_only() {
        assert_eq!(damage_verdict(Location::InFacility(1), DamageCause::Fall), Verdict::Deny);
        assert_eq!(damage_verdict(Location::InFacility(1), DamageCause::Other), Verdict::Allow);
        assert_eq!(damage_verdict(Location::Outside, DamageCause::Fall), Verdict::Allow);
    }

    #[test]
    fn test_block_break() {
        let (verdict, notice) = block_break_verdict(Location::InFacility(0), false);
        assert_eq!(verdict, Verdict::Deny);
        assert!(notice.is_some());

        assert_eq!(block_break_verdict(Location::InFacility(0), true), (Verdict::Allow, None));
        assert_eq!(block_break_verdict(Location::Outside, false), (Verdict::Allow, None));
    }
}
