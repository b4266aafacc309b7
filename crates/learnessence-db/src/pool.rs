//! PostgreSQL pool setup.
//!
//! Timeouts and connection lifetime come from `learnessence_core::defaults`;
//! only the pool size is configurable (`DATABASE_MAX_CONNECTIONS`).

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use learnessence_core::defaults::{
    DB_ACQUIRE_TIMEOUT_SECS, DB_IDLE_TIMEOUT_SECS, DB_MAX_CONNECTIONS, DB_MAX_LIFETIME_SECS,
    ENV_DATABASE_MAX_CONNECTIONS,
};
use learnessence_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DB_MAX_CONNECTIONS,
        }
    }
}

impl PoolConfig {
    /// Size the pool from an optional configured maximum.
    pub fn from_max_connections(max: Option<u32>) -> Result<Self> {
        match max {
            Some(0) => Err(Error::Config(format!(
                "{} must be at least 1",
                ENV_DATABASE_MAX_CONNECTIONS
            ))),
            Some(n) => Ok(Self { max_connections: n }),
            None => Ok(Self::default()),
        }
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(DB_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(DB_IDLE_TIMEOUT_SECS))
            .max_lifetime(Duration::from_secs(DB_MAX_LIFETIME_SECS))
    }
}

/// The `host[:port]/dbname` part of a connection URL, safe to log.
pub fn connection_target(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let rest = rest.split('?').next().unwrap_or(rest);
    rest.rsplit_once('@').map_or(rest, |(_, host)| host)
}

/// Connect a pool. Connection errors surface as `Error::Database`.
pub async fn create_pool(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    let database = connection_target(database_url);

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        database,
        max_connections = config.max_connections,
        "Connecting to database"
    );

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        database,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Log pool usage, warning when every allowed connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();
    let max = pool.options().get_max_connections();

    debug!(
        subsystem = "db",
        component = "pool",
        op = "metrics",
        pool_size = size,
        pool_idle = idle,
        max_connections = max,
        "Pool usage"
    );

    if idle == 0 && size >= max {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "Pool saturated; requests are waiting for connections"
        );
    }
}
