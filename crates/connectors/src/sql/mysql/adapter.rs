use crate::{
    error::{ConnectorError, DbError},
    sql::mysql::decode,
};
use model::{
    core::value::FieldValue,
    records::row::{RowData, RowSet},
    spec::ConnectionConfig,
};
use mysql_async::{Opts, OptsBuilder, Pool, Row, prelude::Queryable};
use tracing::{debug, info};

/// Fetches whole result sets from a MySQL/MariaDB server.
///
/// The adapter holds connection options only. Every fetch opens its own
/// connection and tears it down unconditionally on the way out, also when
/// the query fails; nothing is pooled across calls.
pub struct MySqlAdapter {
    opts: Opts,
}

impl MySqlAdapter {
    pub fn new(config: &ConnectionConfig) -> Result<Self, ConnectorError> {
        let builder = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()));
        Ok(MySqlAdapter {
            opts: Opts::from(builder),
        })
    }

    /// Runs one statement and materializes every row plus the column
    /// descriptors into a `RowSet`.
    pub async fn fetch_rowset(&self, entity: &str, sql: &str) -> Result<RowSet, DbError> {
        let pool = Pool::new(self.opts.clone());
        let fetched = fetch_all(&pool, entity, sql).await;
        // Teardown happens on both paths before the result is surfaced.
        pool.disconnect().await.ok();
        fetched
    }
}

async fn fetch_all(pool: &Pool, entity: &str, sql: &str) -> Result<RowSet, DbError> {
    let mut conn = pool.get_conn().await?;
    info!("Executing query: {sql}");

    let mut result = conn.query_iter(sql).await?;
    let columns = result
        .columns()
        .ok_or_else(|| DbError::NoColumns(sql.to_string()))?;
    let descriptors: Vec<_> = columns.iter().map(decode::column_descriptor).collect();

    let raw_rows: Vec<Row> = result.collect().await?;
    debug!("Fetched {} rows from '{entity}'", raw_rows.len());

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            let field_values = descriptors
                .iter()
                .enumerate()
                .map(|(idx, descriptor)| {
                    let raw = row.as_ref(idx).cloned().unwrap_or(mysql_async::Value::NULL);
                    let value = decode::decode_value(raw, &descriptor.data_type);
                    FieldValue {
                        name: descriptor.name.clone(),
                        value: (!value.is_null()).then_some(value),
                        data_type: descriptor.data_type.clone(),
                    }
                })
                .collect();
            RowData::new(entity, field_values)
        })
        .collect();

    Ok(RowSet::new(entity, descriptors, rows))
}
