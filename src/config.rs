use std::env;

use chrono_tz::Tz;

/// Upper bound on `BLOCKING_WINDOW_HOURS`; one leap year.
pub const MAX_BLOCKING_WINDOW_HOURS: i64 = 24 * 366;

/// Whether cancelled bookings still occupy rooms when resolving availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledBookingPolicy {
    Exclude,
    Include,
}

impl CancelledBookingPolicy {
    fn from_flag(count_cancelled: bool) -> Self {
        if count_cancelled {
            Self::Include
        } else {
            Self::Exclude
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exclude => "exclude",
            Self::Include => "include",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub environment: String,
    pub api_prefix: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub trusted_hosts: Vec<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst_size: u32,
    pub database_url: Option<String>,
    pub db_pool_max_connections: u32,
    pub db_pool_min_connections: u32,
    pub db_pool_acquire_timeout_seconds: u64,
    pub db_pool_idle_timeout_seconds: u64,
    pub run_migrations: bool,
    pub property_timezone: Tz,
    pub default_tax_percent: f64,
    pub blocking_window_hours: i64,
    pub cancelled_booking_policy: CancelledBookingPolicy,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub idempotency_ttl_seconds: u64,
    pub idempotency_max_entries: u64,
    pub invoice_render_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            app_name: env_or("APP_NAME", "Front Desk API"),
            environment: env_or("ENVIRONMENT", "development"),
            api_prefix: normalize_prefix(&env_or("API_PREFIX", "/api")),
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse_or("PORT", 8000),
            cors_origins: parse_csv(&env_or("CORS_ORIGINS", "http://localhost:3000")),
            trusted_hosts: parse_csv(&env_or("TRUSTED_HOSTS", "localhost,127.0.0.1")),
            rate_limit_enabled: env_parse_bool_or("RATE_LIMIT_ENABLED", true),
            rate_limit_per_second: env_parse_or("RATE_LIMIT_PER_SECOND", 10),
            rate_limit_burst_size: env_parse_or("RATE_LIMIT_BURST_SIZE", 100),
            database_url: env_opt("DATABASE_URL"),
            db_pool_max_connections: env_parse_or("DB_POOL_MAX_CONNECTIONS", 5),
            db_pool_min_connections: env_parse_or("DB_POOL_MIN_CONNECTIONS", 1),
            db_pool_acquire_timeout_seconds: env_parse_or("DB_POOL_ACQUIRE_TIMEOUT_SECONDS", 5),
            db_pool_idle_timeout_seconds: env_parse_or("DB_POOL_IDLE_TIMEOUT_SECONDS", 600),
            run_migrations: env_parse_bool_or("RUN_MIGRATIONS", false),
            property_timezone: parse_timezone(&env_or("PROPERTY_TIMEZONE", "Asia/Kolkata")),
            default_tax_percent: env_parse_or("DEFAULT_TAX_PERCENT", 12.0),
            blocking_window_hours: clamp_blocking_window(env_parse_or(
                "BLOCKING_WINDOW_HOURS",
                24_i64,
            )),
            cancelled_booking_policy: CancelledBookingPolicy::from_flag(env_parse_bool_or(
                "AVAILABILITY_COUNT_CANCELLED",
                false,
            )),
            upload_dir: env_or("UPLOAD_DIR", "uploads"),
            max_upload_bytes: env_parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            idempotency_ttl_seconds: env_parse_or("IDEMPOTENCY_TTL_SECONDS", 86_400),
            idempotency_max_entries: env_parse_or("IDEMPOTENCY_MAX_ENTRIES", 10_000),
            invoice_render_timeout_seconds: env_parse_or("INVOICE_RENDER_TIMEOUT_SECONDS", 30),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("production")
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

fn clamp_blocking_window(hours: i64) -> i64 {
    hours.clamp(1, MAX_BLOCKING_WINDOW_HOURS)
}

fn env_parse_bool_or(key: &str, default: bool) -> bool {
    parse_bool(env_opt(key).as_deref()).unwrap_or(default)
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => Some(true),
        Some("0" | "false" | "no" | "off") => Some(false),
        _ => None,
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_timezone(raw: &str) -> Tz {
    raw.trim().parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!(timezone = raw, "Unknown PROPERTY_TIMEZONE, falling back to UTC");
        chrono_tz::UTC
    })
}

fn normalize_prefix(raw: &str) -> String {
    let mut prefix = raw.trim().to_string();
    if prefix.is_empty() {
        return "/api".to_string();
    }
    if !prefix.starts_with('/') {
        prefix.insert(0, '/');
    }
    while prefix.ends_with('/') && prefix.len() > 1 {
        prefix.pop();
    }
    prefix
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        app_name: "Front Desk API".to_string(),
        environment: "test".to_string(),
        api_prefix: "/api".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        trusted_hosts: Vec::new(),
        rate_limit_enabled: false,
        rate_limit_per_second: 10,
        rate_limit_burst_size: 100,
        database_url: None,
        db_pool_max_connections: 1,
        db_pool_min_connections: 0,
        db_pool_acquire_timeout_seconds: 1,
        db_pool_idle_timeout_seconds: 60,
        run_migrations: false,
        property_timezone: chrono_tz::Asia::Kolkata,
        default_tax_percent: 12.0,
        blocking_window_hours: 24,
        cancelled_booking_policy: CancelledBookingPolicy::Exclude,
        upload_dir: std::env::temp_dir()
            .join("frontdesk-uploads")
            .to_string_lossy()
            .into_owned(),
        max_upload_bytes: 1024 * 1024,
        idempotency_ttl_seconds: 60,
        idempotency_max_entries: 100,
        invoice_render_timeout_seconds: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_blocking_window, normalize_prefix, parse_bool, parse_csv, parse_timezone,
        CancelledBookingPolicy, MAX_BLOCKING_WINDOW_HOURS,
    };

    #[test]
    fn blocking_window_is_clamped_to_a_sane_range() {
        assert_eq!(clamp_blocking_window(0), 1);
        assert_eq!(clamp_blocking_window(24), 24);
        assert_eq!(clamp_blocking_window(i64::MAX), MAX_BLOCKING_WINDOW_HOURS);
    }

    #[test]
    fn normalizes_prefix() {
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/"), "/api");
        assert_eq!(normalize_prefix(""), "/api");
    }

    #[test]
    fn parses_boolean_flags() {
        assert_eq!(parse_bool(Some("TRUE")), Some(true));
        assert_eq!(parse_bool(Some("off")), Some(false));
        assert_eq!(parse_bool(Some("maybe")), None);
        assert_eq!(parse_bool(None), None);
    }

    #[test]
    fn splits_csv_and_drops_blanks() {
        assert_eq!(
            parse_csv(" a.example , ,b.example"),
            vec!["a.example".to_string(), "b.example".to_string()]
        );
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        assert_eq!(parse_timezone("Mars/Olympus"), chrono_tz::UTC);
        assert_eq!(parse_timezone("Asia/Kolkata"), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn cancelled_policy_defaults_to_exclude() {
        assert_eq!(
            CancelledBookingPolicy::from_flag(false),
            CancelledBookingPolicy::Exclude
        );
        assert_eq!(CancelledBookingPolicy::from_flag(true).as_str(), "include");
    }
}
