//! Schema introspection: the raw metadata a [`SchemaProvider`](crate::SchemaProvider)
//! is built from.

use crate::{Field, IndexPart, KeyRole, Result, TracedClient};

/// A read-only source of schema metadata.
///
/// Implementations answer one question per call and do no caching; the
/// provider layered on top takes care of that.
#[allow(async_fn_in_trait)]
pub trait Introspect {
    /// Names of all tables in the schema.
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Columns of `table`, in column order.
    async fn describe(&self, table: &str) -> Result<Vec<Field>>;

    /// One row per column of every index on `table`.
    async fn index_parts(&self, table: &str) -> Result<Vec<IndexPart>>;
}

const TABLE_NAMES_SQL: &str = r#"
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = $1 AND table_type = 'BASE TABLE'
ORDER BY table_name
"#;

const DESCRIBE_SQL: &str = r#"
SELECT
    a.attname::text,
    format_type(a.atttypid, a.atttypmod),
    NOT a.attnotnull,
    CASE
        WHEN EXISTS (
            SELECT 1 FROM pg_index i
            WHERE i.indrelid = a.attrelid AND i.indisprimary AND a.attnum = ANY (i.indkey)
        ) THEN 'PRI'
        WHEN EXISTS (
            SELECT 1 FROM pg_index i
            WHERE i.indrelid = a.attrelid AND i.indisunique AND i.indnatts = 1
              AND i.indkey[0] = a.attnum
        ) THEN 'UNI'
        WHEN EXISTS (
            SELECT 1 FROM pg_index i
            WHERE i.indrelid = a.attrelid AND i.indkey[0] = a.attnum
        ) THEN 'MUL'
        ELSE ''
    END,
    pg_get_expr(d.adbin, d.adrelid),
    CASE
        WHEN a.attidentity <> '' THEN 'identity'
        WHEN a.attgenerated <> '' THEN 'generated'
        ELSE ''
    END
FROM pg_attribute a
JOIN pg_class c ON c.oid = a.attrelid
JOIN pg_namespace n ON n.oid = c.relnamespace
LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
WHERE n.nspname = $1 AND c.relname = $2 AND a.attnum > 0 AND NOT a.attisdropped
ORDER BY a.attnum
"#;

const INDEX_PARTS_SQL: &str = r#"
SELECT
    ic.relname::text,
    NOT i.indisunique,
    i.indisprimary,
    k.ord::int4,
    COALESCE(a.attname::text, pg_get_indexdef(i.indexrelid, k.ord::int4, true)),
    NOT COALESCE(a.attnotnull, false),
    upper(am.amname::text)
FROM pg_index i
JOIN pg_class t ON t.oid = i.indrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
JOIN pg_class ic ON ic.oid = i.indexrelid
JOIN pg_am am ON am.oid = ic.relam
CROSS JOIN LATERAL unnest(i.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
LEFT JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum AND k.attnum > 0
WHERE n.nspname = $1 AND t.relname = $2 AND k.ord <= i.indnkeyatts
ORDER BY ic.relname, k.ord
"#;

/// Introspects one namespace of a live Postgres database.
pub struct PgIntrospector {
    client: TracedClient,
    namespace: String,
}

impl PgIntrospector {
    pub fn new(client: TracedClient, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

impl Introspect for PgIntrospector {
    async fn table_names(&self) -> Result<Vec<String>> {
        let rows = self.client.query(TABLE_NAMES_SQL, &[&self.namespace]).await?;
        rows.iter()
            .map(|row| Ok(row.try_get::<_, String>(0)?))
            .collect()
    }

    async fn describe(&self, table: &str) -> Result<Vec<Field>> {
        let rows = self
            .client
            .query(DESCRIBE_SQL, &[&self.namespace, &table])
            .await?;

        rows.iter()
            .map(|row| {
                let key: String = row.try_get(3)?;
                Ok(Field {
                    name: row.try_get(0)?,
                    ty: row.try_get(1)?,
                    nullable: row.try_get(2)?,
                    key: KeyRole::from_code(&key),
                    default: row.try_get(4)?,
                    extra: row.try_get(5)?,
                })
            })
            .collect()
    }

    async fn index_parts(&self, table: &str) -> Result<Vec<IndexPart>> {
        let rows = self
            .client
            .query(INDEX_PARTS_SQL, &[&self.namespace, &table])
            .await?;

        rows.iter()
            .map(|row| {
                Ok(IndexPart {
                    key_name: row.try_get(0)?,
                    non_unique: row.try_get(1)?,
                    primary: row.try_get(2)?,
                    seq_in_index: row.try_get(3)?,
                    column_name: row.try_get(4)?,
                    nullable: row.try_get(5)?,
                    index_type: row.try_get(6)?,
                })
            })
            .collect()
    }
}

/// An in-memory schema snapshot.
///
/// Useful for comparing against a schema that was captured earlier, and
/// for exercising the comparer without a database.
#[derive(Debug, Clone, Default)]
pub struct StaticIntrospector {
    tables: Vec<StaticTable>,
}

#[derive(Debug, Clone)]
struct StaticTable {
    name: String,
    fields: Vec<Field>,
    index_parts: Vec<IndexPart>,
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with its fields and raw index rows.
    pub fn table(mut self, name: &str, fields: Vec<Field>, index_parts: Vec<IndexPart>) -> Self {
        self.tables.push(StaticTable {
            name: name.to_string(),
            fields,
            index_parts,
        });
        self
    }

    fn find(&self, table: &str) -> Option<&StaticTable> {
        self.tables.iter().find(|t| t.name == table)
    }
}

impl Introspect for StaticIntrospector {
    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn describe(&self, table: &str) -> Result<Vec<Field>> {
        Ok(self
            .find(table)
            .map(|t| t.fields.clone())
            .unwrap_or_default())
    }

    async fn index_parts(&self, table: &str) -> Result<Vec<IndexPart>> {
        Ok(self
            .find(table)
            .map(|t| t.index_parts.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_parts_skip_included_columns() {
        // INCLUDE columns follow the key columns in indkey
        assert!(INDEX_PARTS_SQL.contains("k.ord <= i.indnkeyatts"));
    }

    #[tokio::test]
    async fn test_static_unknown_table_is_empty() {
        let source = StaticIntrospector::new().table("users", vec![Field::new("id", "bigint")], vec![]);

        assert_eq!(source.table_names().await.unwrap(), vec!["users"]);
        assert_eq!(source.describe("users").await.unwrap().len(), 1);
        assert!(source.describe("orders").await.unwrap().is_empty());
        assert!(source.index_parts("orders").await.unwrap().is_empty());
    }
}
