// --- File: crates/portal_config/src/lib.rs ---
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod env_vars;
pub mod models;
pub use models::*;

use env_vars::{config_prefix, fill_from_env, process_env};

/// Loads the configuration the server runs with.
///
/// Layers, lowest first: `config/default`, `config/{RUN_ENV}`, then
/// `PORTAL__SECTION__KEY` variables. Secrets and the Acuity settings are
/// filled afterwards from `PORTAL_SECRET_*` or their bare names
/// (`ACUITY_USER_ID`, `SUPABASE_SERVICE_KEY`, ...).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    load_config_from(&config_dir, &run_env, &config_prefix(), &process_env)
}

/// Same as [`load_config`] with every input passed in.
pub fn load_config_from<F>(
    config_dir: &Path,
    run_env: &str,
    prefix: &str,
    lookup: &F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    debug!("config: default_path: {}", default_path.display());
    debug!("config: env_path: {}", env_path.display());

    let builder = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(prefix).separator("__"));

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_secrets(&mut cfg, lookup);
    Ok(cfg)
}

/// Resolves `secret_from_env` markers and fills unset values from the environment.
pub fn apply_env_secrets<F>(cfg: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    fill_from_env(&mut cfg.acuity.user_id, "acuity.user_id", lookup);
    fill_from_env(&mut cfg.acuity.api_key, "acuity.api_key", lookup);
    fill_from_env(
        &mut cfg.acuity.appointment_type_id,
        "acuity.appointment_type_id",
        lookup,
    );
    fill_from_env(&mut cfg.acuity.calendar_id, "acuity.calendar_id", lookup);
    fill_from_env(&mut cfg.acuity.timezone, "acuity.timezone", lookup);
    fill_from_env(&mut cfg.ping_message, "ping_message", lookup);

    if let Some(supabase) = cfg.supabase.as_mut() {
        fill_from_env(&mut supabase.service_key, "supabase.service_key", lookup);
    }
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads `.env` (or `DOTENV_OVERRIDE`, or a `.env*` first argument) once per process.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
