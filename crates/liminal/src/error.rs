//! # Command Error Types
//!
//! Everything a player can get wrong when typing a facility command.
//! These are reported back to the issuer; state is left unchanged.

use thiserror::Error;

/// Errors raised by facility commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The level argument is not an integer.
    #[error("invalid level number: {0:?}")]
    InvalidLevel(String),

    /// The level argument is outside `[0, max_levels - 1]`.
    #[error("invalid level {level}: must be between 0 and {deepest}")]
    LevelOutOfRange {
        /// Level that was requested.
        level: i64,
        /// Deepest valid level.
        deepest: u32,
    },

    /// The issuer lacks the privilege the command needs.
    #[error("you do not have permission to use this command")]
    PermissionDenied,

    /// The named or referenced player has no session.
    #[error("player not found or not online: {0}")]
    UnknownPlayer(String),
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;
