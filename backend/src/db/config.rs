//! Database configuration and environment variable handling.

use std::env;

use crate::services::UnmatchedPolicy;

/// Partition of `realflow5m` served by default.
pub const DEFAULT_COMID: i32 = 98;

const REQUIRED_VARS: &[&str] = &["DB_SERVER", "DB_DATABASE", "DB_USER", "DB_PASSWORD"];

/// SQL Server connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    /// SQL Server hostname
    pub server: String,
    /// Database name
    pub database: String,
    /// SQL login
    pub username: String,
    /// SQL password
    pub password: String,
    /// SQL Server port (default: 1433)
    pub port: u16,
    /// Require an encrypted connection
    pub encrypt: bool,
    /// Whether to trust the server certificate
    pub trust_cert: bool,
    /// Maximum pooled connections
    pub pool_max: u32,
    /// Idle connections kept open
    pub pool_min: u32,
    /// Idle connection lifetime in milliseconds
    pub idle_timeout_ms: u64,
    /// Seconds to wait for a pooled connection
    pub connect_timeout_sec: u64,
    /// `COMID` partition filter
    pub comid: i32,
}

impl DbConfig {
    /// Create a configuration with defaults for everything but the credentials.
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
            port: 1433,
            encrypt: false,
            trust_cert: true,
            pool_max: 10,
            pool_min: 0,
            idle_timeout_ms: 30_000,
            connect_timeout_sec: 30,
            comid: DEFAULT_COMID,
        }
    }

    /// Create a new database configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DB_SERVER` (required): SQL Server hostname
    /// - `DB_DATABASE` (required): Database name
    /// - `DB_USER` (required, `DB_USERNAME` accepted): SQL login
    /// - `DB_PASSWORD` (required): SQL password
    /// - `DB_PORT` (optional, default: 1433)
    /// - `DB_ENCRYPT` (optional, default: false)
    /// - `DB_TRUST_CERT` (optional, default: true)
    /// - `DB_POOL_MAX` (optional, default: 10)
    /// - `DB_POOL_MIN` (optional, default: 0)
    /// - `DB_IDLE_TIMEOUT` (optional, milliseconds, default: 30000)
    /// - `DB_CONNECT_TIMEOUT` (optional, seconds, default: 30)
    /// - `REALFLOW_COMID` (optional, default: 98)
    ///
    /// # Errors
    /// Returns an error naming every missing required variable, or the first
    /// variable that fails to parse.
    pub fn from_env() -> Result<Self, String> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| lookup(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let defaults = Self::new(
            lookup("DB_SERVER").unwrap_or_default(),
            lookup("DB_DATABASE").unwrap_or_default(),
            lookup("DB_USER").unwrap_or_default(),
            lookup("DB_PASSWORD").unwrap_or_default(),
        );

        Ok(Self {
            port: parse_var("DB_PORT", defaults.port)?,
            encrypt: parse_flag("DB_ENCRYPT", defaults.encrypt),
            trust_cert: parse_flag("DB_TRUST_CERT", defaults.trust_cert),
            pool_max: parse_var("DB_POOL_MAX", defaults.pool_max)?,
            pool_min: parse_var("DB_POOL_MIN", defaults.pool_min)?,
            idle_timeout_ms: parse_var("DB_IDLE_TIMEOUT", defaults.idle_timeout_ms)?,
            connect_timeout_sec: parse_var("DB_CONNECT_TIMEOUT", defaults.connect_timeout_sec)?,
            comid: parse_var("REALFLOW_COMID", defaults.comid)?,
            ..defaults
        })
    }

    /// Connection string with the password masked, for logs.
    pub fn connection_string(&self) -> String {
        format!(
            "mssql://{}:***@{}:{}/{}",
            self.username, self.server, self.port, self.database
        )
    }
}

/// Unmatched-opener policy from `RECONCILE_UNMATCHED` (default: drop).
pub fn unmatched_policy_from_env() -> Result<UnmatchedPolicy, String> {
    match env::var("RECONCILE_UNMATCHED") {
        Ok(value) if !value.trim().is_empty() => value.parse(),
        _ => Ok(UnmatchedPolicy::default()),
    }
}

/// Read a variable, treating blank values as unset. `DB_USER` falls back to `DB_USERNAME`.
fn lookup(key: &str) -> Option<String> {
    let read = |k: &str| env::var(k).ok().filter(|v| !v.trim().is_empty());
    match key {
        "DB_USER" => read("DB_USER").or_else(|| read("DB_USERNAME")),
        _ => read(key),
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, default: bool) -> bool {
    lookup(key)
        .and_then(|v| v.trim().to_lowercase().parse().ok())
        .unwrap_or(default)
}
