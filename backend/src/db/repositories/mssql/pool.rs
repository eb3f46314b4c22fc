//! Database connection pool management.

use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use std::time::Duration;
use tiberius::{AuthMethod, Config, EncryptionLevel};

use crate::db::config::DbConfig;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Type alias for the database connection pool.
pub type DbPool = Pool<ConnectionManager>;

/// Build a tiberius config using SQL Server authentication.
pub fn build_tiberius_config(config: &DbConfig) -> Config {
    let mut sql_config = Config::new();
    sql_config.host(&config.server);
    sql_config.port(config.port);
    sql_config.database(&config.database);
    sql_config.authentication(AuthMethod::sql_server(
        &config.username,
        &config.password,
    ));

    // `Off` still encrypts the login packet.
    sql_config.encryption(if config.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });

    if config.trust_cert {
        sql_config.trust_cert();
    }

    sql_config
}

/// Build a connection pool.
///
/// Connections are opened lazily unless `pool_min` asks for idle ones.
///
/// # Errors
/// Common failures:
/// - "Timed out in bb8": Firewall blocking connection or server unreachable
/// - "Login failed": Invalid credentials
pub async fn build_pool(config: &DbConfig) -> RepositoryResult<DbPool> {
    let manager = ConnectionManager::new(build_tiberius_config(config));
    let min_idle = (config.pool_min > 0).then_some(config.pool_min);

    Pool::builder()
        .max_size(config.pool_max.max(1))
        .min_idle(min_idle)
        .idle_timeout(Some(Duration::from_millis(config.idle_timeout_ms)))
        .connection_timeout(Duration::from_secs(config.connect_timeout_sec))
        .build(manager)
        .await
        .map_err(|e| {
            let mut message = format!("Failed to create connection pool: {}", e);
            if message.to_lowercase().contains("timeout") {
                message.push_str(" (check firewall on port 1433 and the server hostname)");
            }
            RepositoryError::connection_with_context(
                message,
                ErrorContext::new("build_pool").with_details(config.connection_string()),
            )
        })
}
