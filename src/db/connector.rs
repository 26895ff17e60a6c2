//! Opening the process-wide MySQL pool.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{Executor, MySqlPool};

use crate::config::DbConfig;

/// Statement clearing the server SQL mode on every new connection.
pub const CLEAR_SQL_MODE: &str = "SET @@sql_mode = ''";

/// How long a non-persistent connection may sit idle in the pool.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// `SET NAMES` statement for the configured encoding.
pub fn set_names(encoding: &str) -> String {
    format!("SET NAMES {}", encoding)
}

/// Connection options derived from `config.db`.
pub fn connect_options(db: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .database(&db.name)
        .username(&db.user)
        .password(&db.passwd)
        .charset(&db.encoding)
}

/// Pool options: persistence and the per-connection session setup.
pub fn pool_options(db: &DbConfig) -> MySqlPoolOptions {
    let names = set_names(&db.encoding);
    let options = MySqlPoolOptions::new().after_connect(move |conn, _meta| {
        let names = names.clone();
        Box::pin(async move {
            conn.execute(CLEAR_SQL_MODE).await?;
            conn.execute(names.as_str()).await?;
            Ok(())
        })
    });

    if db.persistent {
        options.min_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        options.idle_timeout(IDLE_TIMEOUT)
    }
}

/// Opens the database handle during bootstrap.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, db: &DbConfig) -> Result<MySqlPool, sqlx::Error>;
}

/// Connects eagerly, so an unreachable server fails the bootstrap.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, db: &DbConfig) -> Result<MySqlPool, sqlx::Error> {
        tracing::info!(
            host = %db.host,
            port = db.port,
            database = %db.name,
            persistent = db.persistent,
            "Connecting to database"
        );
        pool_options(db).connect_with(connect_options(db)).await
    }
}

/// Builds the pool without touching the network. Connections are made on first use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LazyConnector;

#[async_trait]
impl Connector for LazyConnector {
    async fn connect(&self, db: &DbConfig) -> Result<MySqlPool, sqlx::Error> {
        Ok(pool_options(db).connect_lazy_with(connect_options(db)))
    }
}
