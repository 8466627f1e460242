//! Traced database client wrapper.
//!
//! Wraps a tokio-postgres client and logs all queries via tracing.

use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Error, Row};
use tracing::Instrument;

/// A tokio-postgres client whose queries are logged via tracing.
///
/// # Example
///
/// ```ignore
/// let (client, connection) = config.connect(NoTls).await?;
/// tokio::spawn(connection);
///
/// let client = TracedClient::new(client);
/// let rows = client.query("SELECT 1", &[]).await?;
/// ```
pub struct TracedClient {
    inner: Client,
}

impl TracedClient {
    pub fn new(client: Client) -> Self {
        Self { inner: client }
    }

    /// Execute a query, returning all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let rows = self
            .inner
            .query(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", rows.len());
        Ok(rows)
    }
}
