//! Acting-user resolution for CLI commands.
//!
//! The resolution chain: `--as` flag > `TRELLIS_ACTOR` env > user config
//! `actor`. Every mutating command needs an actor; reads do not.

use std::env;
use trellis_core::config;
use trellis_core::model::UserId;

/// Errors from actor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorResolutionError {
    pub message: String,
    /// Machine error code.
    pub code: &'static str,
}

impl std::fmt::Display for ActorResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ActorResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

fn resolve_actor_with(
    cli_flag: Option<UserId>,
    env: &dyn EnvReader,
    config_actor: Option<UserId>,
) -> Result<Option<UserId>, ActorResolutionError> {
    if let Some(actor) = cli_flag {
        return Ok(Some(actor));
    }

    if let Some(raw) = env.get("TRELLIS_ACTOR") {
        return raw
            .trim()
            .parse::<UserId>()
            .map(Some)
            .map_err(|_| ActorResolutionError {
                message: format!("TRELLIS_ACTOR must be a numeric user id, got '{raw}'"),
                code: "invalid_actor",
            });
    }

    Ok(config_actor)
}

/// Resolve the acting user id, or fail if none is configured.
///
/// A malformed user config is treated as having no default actor.
pub fn require_actor(cli_flag: Option<UserId>) -> Result<UserId, ActorResolutionError> {
    let config_actor = config::load_user_config().ok().and_then(|c| c.actor);
    resolve_actor_with(cli_flag, &RealEnv, config_actor)?.ok_or_else(|| ActorResolutionError {
        message: "Acting user required for this command. \
                  Set --as, TRELLIS_ACTOR, or `actor` in the user config."
            .to_string(),
        code: "missing_actor",
    })
}
