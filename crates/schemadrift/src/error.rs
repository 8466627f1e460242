use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by a [`SchemaProvider`](crate::SchemaProvider) lookup.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Raised by the comparer when either side lacks the requested table.
    #[error("table \"{table}\" not found")]
    TableNotFound { table: String },
}

impl Error {
    /// Whether this error ends the run (as opposed to being reported inline).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Postgres(_) | Error::Io(_))
    }
}
