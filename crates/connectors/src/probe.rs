use crate::error::DbError;
use async_trait::async_trait;
use model::spec::ConnectionConfig;
use mysql_async::prelude::*;
use tracing::{error, info};

/// Trait for "pinging" a data source.
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable.
    async fn ping(&self) -> Result<(), DbError>;
}

/// MySQL/MariaDB pinger.
pub struct MySqlConnectionPinger {
    pub config: ConnectionConfig,
}

#[async_trait]
impl ConnectionPinger for MySqlConnectionPinger {
    async fn ping(&self) -> Result<(), DbError> {
        let endpoint = self.config.endpoint();
        info!("Pinging MySQL at '{endpoint}'");

        let opts = mysql_async::Opts::from_url(&self.config.url()).map_err(|e| {
            error!("MySQL connection string parse failed: {e}");
            DbError::MySql(mysql_async::Error::Url(e))
        })?;
        let pool = mysql_async::Pool::new(opts);
        let outcome = ping_pool(&pool, &endpoint).await;
        pool.disconnect().await.ok();
        outcome
    }
}

async fn ping_pool(pool: &mysql_async::Pool, endpoint: &str) -> Result<(), DbError> {
    let mut conn = pool.get_conn().await.map_err(|e| {
        error!("MySQL connection to '{endpoint}' failed: {e}");
        DbError::MySql(e)
    })?;

    let val: Option<i32> = conn.query_first("SELECT 1").await.map_err(|e| {
        error!("MySQL ping query on '{endpoint}' failed: {e}");
        DbError::MySql(e)
    })?;

    match val {
        Some(1) => {
            info!("MySQL ping to '{endpoint}' succeeded");
            Ok(())
        }
        other => Err(DbError::Decode(format!(
            "MySQL ping to '{endpoint}' returned unexpected result: {other:?}"
        ))),
    }
}
