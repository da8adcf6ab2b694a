use std::env;

use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_HORIZON_WEEKS: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub clinic_timezone: String,
    pub horizon_weeks: u32,
    pub busy_timeout_ms: u64,
    pub jwt_secret: String,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "clinic_agenda.db".to_string(),
            clinic_timezone: "UTC".to_string(),
            horizon_weeks: DEFAULT_HORIZON_WEEKS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            jwt_secret: String::new(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_PATH not set, using {}", defaults.database_path);
                    defaults.database_path.clone()
                }),
            clinic_timezone: env::var("CLINIC_TIMEZONE")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_TIMEZONE not set, using UTC");
                    defaults.clinic_timezone.clone()
                }),
            horizon_weeks: parse_or_default("AGENDA_HORIZON_WEEKS", defaults.horizon_weeks),
            busy_timeout_ms: parse_or_default("DATABASE_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            bind_addr: env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| defaults.bind_addr.clone()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    /// Clinic-local timezone used to expand templates. Unknown zone names fall back to UTC.
    pub fn clinic_timezone(&self) -> Tz {
        self.clinic_timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!("Unknown CLINIC_TIMEZONE '{}', falling back to UTC", self.clinic_timezone);
            Tz::UTC
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
