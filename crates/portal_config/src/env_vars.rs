//! Environment variable naming for the portal.
//!
//! Two spellings are recognised for every secret: the prefixed form
//! (`PORTAL_SECRET_ACUITY_USER_ID`) and the bare legacy form
//! (`ACUITY_USER_ID`) that deployments already set. Lookups go through a
//! caller-supplied function so the resolution rules can be exercised
//! without touching the process environment.

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "PORTAL";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "PORTAL_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Config value telling the loader to take the real value from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Prefix for layered configuration, overridable through `PREFIX`.
pub fn config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// `server.port` -> `PORTAL__SERVER__PORT`
pub fn config_path_to_env_var(prefix: &str, path: &str) -> String {
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// `acuity.user_id` -> `PORTAL_SECRET_ACUITY_USER_ID`
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// `acuity.user_id` -> `ACUITY_USER_ID`
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Reads a variable from the process environment; empty values count as unset.
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Looks up a secret under its prefixed name first, then its legacy name.
pub fn resolve_secret<F>(path: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(&secret_path_to_env_var(path)).or_else(|| lookup(&legacy_secret_path_to_env_var(path)))
}

/// Fills a config slot from the environment.
///
/// A slot holding the marker, or holding nothing, takes the environment value.
/// A literal value from the config files stays as it is. An unresolved marker
/// leaves the slot empty.
pub fn fill_from_env<F>(slot: &mut Option<String>, path: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let is_marker = slot.as_deref().map(str::trim) == Some(SECRET_MARKER);
    let is_empty = slot.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true);

    if !is_marker && !is_empty {
        return;
    }

    match resolve_secret(path, lookup) {
        Some(value) => *slot = Some(value),
        None => {
            if is_marker {
                warn!(
                    "{} is marked {} but neither {} nor {} is set",
                    path,
                    SECRET_MARKER,
                    secret_path_to_env_var(path),
                    legacy_secret_path_to_env_var(path)
                );
            }
            *slot = None;
        }
    }
}
