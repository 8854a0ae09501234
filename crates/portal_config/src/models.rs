// --- File: crates/portal_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ACUITY_BASE_URL: &str = "https://acuityscheduling.com/api/v1";
pub const DEFAULT_RECORDS_USER_ID: &str = "demo@astrobot.design";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

fn default_acuity_base_url() -> String {
    DEFAULT_ACUITY_BASE_URL.to_string()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// --- Acuity Config ---
// Credentials are never serialized and never printed.
#[derive(Deserialize, Serialize, Clone)]
pub struct AcuityConfig {
    #[serde(default = "default_acuity_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub user_id: Option<String>, // ACUITY_USER_ID
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>, // ACUITY_API_KEY
    #[serde(default)]
    pub appointment_type_id: Option<String>,
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Default for AcuityConfig {
    fn default() -> Self {
        Self {
            base_url: default_acuity_base_url(),
            user_id: None,
            api_key: None,
            appointment_type_id: None,
            calendar_id: None,
            timezone: None,
        }
    }
}

impl fmt::Debug for AcuityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcuityConfig")
            .field("base_url", &self.base_url)
            .field("user_id", &present(&self.user_id).map(|_| "<redacted>"))
            .field("api_key", &present(&self.api_key).map(|_| "<redacted>"))
            .field("appointment_type_id", &self.appointment_type_id)
            .field("calendar_id", &self.calendar_id)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl AcuityConfig {
    /// Both halves of the Basic credential, or `None` if either is absent or blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((present(&self.user_id)?, present(&self.api_key)?))
    }

    pub fn appointment_type_id(&self) -> Option<&str> {
        present(&self.appointment_type_id)
    }

    pub fn calendar_id(&self) -> Option<&str> {
        present(&self.calendar_id)
    }

    pub fn timezone(&self) -> Option<&str> {
        present(&self.timezone)
    }

    /// The appointment type, calendar and timezone all present.
    pub fn booking_settings(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.appointment_type_id()?,
            self.calendar_id()?,
            self.timezone()?,
        ))
    }

    /// Names of the environment variables whose values are missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if present(&self.user_id).is_none() {
            missing.push("ACUITY_USER_ID");
        }
        if present(&self.api_key).is_none() {
            missing.push("ACUITY_API_KEY");
        }
        if self.appointment_type_id().is_none() {
            missing.push("ACUITY_APPOINTMENT_TYPE_ID");
        }
        if self.calendar_id().is_none() {
            missing.push("ACUITY_CALENDAR_ID");
        }
        if self.timezone().is_none() {
            missing.push("ACUITY_TIMEZONE");
        }
        missing
    }
}

// --- Supabase Config ---
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing)]
    pub service_key: Option<String>, // SUPABASE_SERVICE_KEY
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &present(&self.service_key).map(|_| "<redacted>"))
            .finish()
    }
}

impl SupabaseConfig {
    pub fn service_key(&self) -> Option<&str> {
        present(&self.service_key)
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, a daily rolling file is written into this directory.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub journald: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            journald: false,
        }
    }
}

// --- Records Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecordsConfig {
    /// Account whose profile and subscription the portal shows.
    #[serde(default = "default_records_user")]
    pub default_user_id: String,
}

fn default_records_user() -> String {
    DEFAULT_RECORDS_USER_ID.to_string()
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            default_user_id: default_records_user(),
        }
    }
}

// --- Main Application Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub acuity: AcuityConfig,
    #[serde(default)]
    pub use_supabase: bool,
    pub supabase: Option<SupabaseConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    /// Reply of `GET /api/ping`; `PING_MESSAGE` in the environment.
    #[serde(default)]
    pub ping_message: Option<String>,
}

impl AppConfig {
    /// Problems worth a warning at startup. None of them stop the server.
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let missing = self.acuity.missing_fields();
        if !missing.is_empty() {
            warnings.push(format!(
                "Acuity configuration incomplete, booking endpoints will fail. Missing: {}",
                missing.join(", ")
            ));
        }

        if let Some(tz) = self.acuity.timezone() {
            if chrono_tz::Tz::from_str(tz).is_err() {
                warnings.push(format!("ACUITY_TIMEZONE '{}' is not a known IANA zone", tz));
            }
        }

        if self.use_supabase {
            match &self.supabase {
                Some(cfg) if !cfg.url.trim().is_empty() && cfg.service_key().is_some() => {}
                _ => warnings.push(
                    "use_supabase is set but supabase.url or SUPABASE_SERVICE_KEY is missing; using in-memory records"
                        .to_string(),
                ),
            }
        }

        warnings
    }

    /// Supabase settings, only when enabled and complete.
    pub fn supabase_settings(&self) -> Option<&SupabaseConfig> {
        if !self.use_supabase {
            return None;
        }
        self.supabase
            .as_ref()
            .filter(|cfg| !cfg.url.trim().is_empty() && cfg.service_key().is_some())
    }
}
