//! # Facility Commands
//!
//! - `enter [level]`: noclip into a level on purpose (default level 0)
//! - `force_exit [target]`: privileged; pulls a player out of the facility
//!
//! A failed command changes nothing and tells the issuer why.

use liminal_shared::{FacilityConfig, Intent, PlayerId, Tone};

use crate::effects::EffectSink;
use crate::error::{CommandError, CommandResult};
use crate::navigation::NavigationController;
use crate::session::SessionRegistry;

/// Everything a command needs to run.
pub struct CommandContext<'a> {
    /// Startup configuration.
    pub config: &'a FacilityConfig,
    /// Connected players.
    pub sessions: &'a SessionRegistry,
    /// Progression rules.
    pub navigation: &'a NavigationController,
    /// Where intents go.
    pub sink: &'a dyn EffectSink,
}

/// Parses the optional level argument of `enter`.
///
/// Missing means level 0. Anything else must be an integer in
/// `[0, max_levels - 1]`.
///
/// # Errors
///
/// [`CommandError::InvalidLevel`] if the argument is not an integer,
/// [`CommandError::LevelOutOfRange`] if it names no level.
pub fn parse_level_arg(arg: Option<&str>, config: &FacilityConfig) -> CommandResult<u32> {
    let Some(raw) = arg else {
        return Ok(0);
    };
    let level: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CommandError::InvalidLevel(raw.to_string()))?;

    let deepest = config.deepest_level();
    if level < 0 || level > i64::from(deepest) {
        return Err(CommandError::LevelOutOfRange { level, deepest });
    }
    // In range of u32 by the check above
    Ok(level as u32)
}

/// `enter [level]`: teleports the issuer onto a level.
///
/// Returns the level entered.
///
/// # Errors
///
/// Level parse errors, or [`CommandError::UnknownPlayer`] if the issuer
/// has no session.
pub fn enter(ctx: &CommandContext<'_>, issuer: PlayerId, arg: Option<&str>) -> CommandResult<u32> {
    reported(ctx, issuer, try_enter(ctx, issuer, arg))
}

fn try_enter(ctx: &CommandContext<'_>, issuer: PlayerId, arg: Option<&str>) -> CommandResult<u32> {
    let handle = ctx
        .sessions
        .get(issuer)
        .ok_or_else(|| CommandError::UnknownPlayer(issuer.to_string()))?;
    let level = parse_level_arg(arg, ctx.config)?;

    let mut session = handle.lock();
    ctx.navigation.enter_level(&mut session, level, ctx.sink);
    Ok(level)
}

/// `force_exit [target]`: sends a player back to the normal world.
///
/// The target defaults to the issuer. Returns the player who was removed.
///
/// # Errors
///
/// [`CommandError::PermissionDenied`] for unprivileged issuers,
/// [`CommandError::UnknownPlayer`] for an unknown issuer or target.
pub fn force_exit(
    ctx: &CommandContext<'_>,
    issuer: PlayerId,
    target: Option<&str>,
) -> CommandResult<PlayerId> {
    reported(ctx, issuer, try_force_exit(ctx, issuer, target))
}

fn try_force_exit(
    ctx: &CommandContext<'_>,
    issuer: PlayerId,
    target: Option<&str>,
) -> CommandResult<PlayerId> {
    let issuer_handle = ctx
        .sessions
        .get(issuer)
        .ok_or_else(|| CommandError::UnknownPlayer(issuer.to_string()))?;
    if !issuer_handle.lock().privileged {
        return Err(CommandError::PermissionDenied);
    }

    let target_id = match target {
        None => issuer,
        Some(name) => ctx
            .sessions
            .find_by_name(name)
            .ok_or_else(|| CommandError::UnknownPlayer(name.to_string()))?,
    };
    let target_handle = ctx
        .sessions
        .get(target_id)
        .ok_or_else(|| CommandError::UnknownPlayer(target_id.to_string()))?;

    let target_name = {
        let mut session = target_handle.lock();
        ctx.navigation.force_outside(&mut session, ctx.sink);
        session.name.clone()
    };

    if target_id == issuer {
        ctx.sink.emit(
            issuer,
            Intent::notify(Tone::Success, "[NOTICE] You were forcibly removed from the facility."),
        );
    } else {
        ctx.sink.emit(
            issuer,
            Intent::notify(Tone::Success, format!("[NOTICE] Removed {target_name} from the facility.")),
        );
        ctx.sink.emit(
            target_id,
            Intent::notify(
                Tone::Success,
                "[NOTICE] An administrator forcibly removed you from the facility.",
            ),
        );
    }
    Ok(target_id)
}

fn reported<T>(ctx: &CommandContext<'_>, issuer: PlayerId, result: CommandResult<T>) -> CommandResult<T> {
    if let Err(err) = &result {
        tracing::debug!("Command from {} rejected: {}", issuer, err);
        if ctx.sessions.contains(issuer) {
            ctx.sink.emit(issuer, Intent::notify(Tone::Alert, format!("[ERROR] {err}")));
        }
    }
    result
}
