//! Memoized schema lookups.

use crate::{Error, Field, Index, Introspect, Result, Table, group_index_parts};
use indexmap::IndexMap;
use tokio::sync::OnceCell;

/// Read-only view of one database schema.
///
/// The first call to any accessor loads every table through the wrapped
/// [`Introspect`] source and caches the result for the lifetime of the
/// provider. There is no invalidation; a provider is meant to serve a
/// single comparison run.
pub struct SchemaProvider<S> {
    source: S,
    tables: OnceCell<IndexMap<String, Table>>,
}

impl<S: Introspect> SchemaProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tables: OnceCell::new(),
        }
    }

    /// Names of all tables known to this schema.
    pub async fn tables(&self) -> Result<impl Iterator<Item = &str>> {
        Ok(self.schema().await?.keys().map(String::as_str))
    }

    /// Fields of `table`, in column order.
    pub async fn fields(&self, table: &str) -> Result<&[Field]> {
        Ok(&self.table(table).await?.fields)
    }

    /// Indexes on `table`, ordered by index name.
    pub async fn indexes(&self, table: &str) -> Result<&[Index]> {
        Ok(&self.table(table).await?.indexes)
    }

    async fn table(&self, table: &str) -> Result<&Table> {
        self.schema()
            .await?
            .get(table)
            .ok_or_else(|| Error::UnknownTable(table.to_string()))
    }

    async fn schema(&self) -> Result<&IndexMap<String, Table>> {
        self.tables.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<IndexMap<String, Table>> {
        let names = self.source.table_names().await?;
        tracing::debug!(tables = names.len(), "loading schema");

        let mut tables = IndexMap::with_capacity(names.len());
        for name in names {
            let fields = self.source.describe(&name).await?;
            let indexes = group_index_parts(self.source.index_parts(&name).await?);
            tracing::trace!(
                table = %name,
                fields = fields.len(),
                indexes = indexes.len(),
                "loaded table"
            );
            tables.insert(
                name.clone(),
                Table {
                    name,
                    fields,
                    indexes,
                },
            );
        }

        tracing::info!(tables = tables.len(), "schema loaded");
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndexPart, StaticIntrospector};
    use std::cell::Cell;

    /// Counts how often the schema is enumerated.
    struct Counting {
        inner: StaticIntrospector,
        loads: Cell<usize>,
    }

    impl Introspect for Counting {
        async fn table_names(&self) -> Result<Vec<String>> {
            self.loads.set(self.loads.get() + 1);
            self.inner.table_names().await
        }

        async fn describe(&self, table: &str) -> Result<Vec<Field>> {
            self.inner.describe(table).await
        }

        async fn index_parts(&self, table: &str) -> Result<Vec<IndexPart>> {
            self.inner.index_parts(table).await
        }
    }

    fn users_schema() -> StaticIntrospector {
        StaticIntrospector::new()
            .table(
                "users",
                vec![
                    Field::new("id", "bigint").not_null(),
                    Field::new("email", "text"),
                ],
                vec![IndexPart {
                    key_name: "users_pkey".to_string(),
                    non_unique: false,
                    primary: true,
                    seq_in_index: 1,
                    column_name: "id".to_string(),
                    nullable: false,
                    index_type: "BTREE".to_string(),
                }],
            )
            .table("orders", vec![Field::new("id", "bigint")], vec![])
    }

    #[tokio::test]
    async fn test_tables() {
        let provider = SchemaProvider::new(users_schema());
        let tables: Vec<&str> = provider.tables().await.unwrap().collect();
        assert_eq!(tables, vec!["users", "orders"]);
    }

    #[tokio::test]
    async fn test_fields_and_indexes() {
        let provider = SchemaProvider::new(users_schema());

        let fields = provider.fields("users").await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "email");

        let indexes = provider.indexes("users").await.unwrap();
        assert_eq!(indexes.len(), 1);
        assert!(indexes[0].unique);
        assert!(provider.indexes("orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let provider = SchemaProvider::new(users_schema());

        let err = provider.fields("payments").await.unwrap_err();
        assert!(matches!(err, Error::UnknownTable(name) if name == "payments"));

        let err = provider.indexes("payments").await.unwrap_err();
        assert!(matches!(err, Error::UnknownTable(name) if name == "payments"));
    }

    #[tokio::test]
    async fn test_schema_loaded_once() {
        let provider = SchemaProvider::new(Counting {
            inner: users_schema(),
            loads: Cell::new(0),
        });

        provider.fields("users").await.unwrap();
        provider.indexes("orders").await.unwrap();
        let _ = provider.tables().await.unwrap().count();
        let _ = provider.fields("missing").await;

        assert_eq!(provider.source.loads.get(), 1);
    }
}
