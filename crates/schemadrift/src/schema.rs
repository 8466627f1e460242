//! Schema model: fields, indexes and tables as reported by introspection.
//!
//! Indexes arrive from the database as one row per indexed column
//! ([`IndexPart`]). [`group_index_parts`] folds those rows into [`Index`]
//! values, whose identity is the ordered list of columns rather than the
//! index name.

use indexmap::IndexMap;
use std::fmt;

/// The role a column plays in the table's keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyRole {
    #[default]
    None,
    /// Part of the primary key.
    Primary,
    /// Sole column of a unique index.
    Unique,
    /// Leading column of a non-unique (or composite) index.
    Index,
}

impl KeyRole {
    /// Parse the short code used by `DESCRIBE`-style output.
    pub fn from_code(code: &str) -> Self {
        match code {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            "MUL" => KeyRole::Index,
            _ => KeyRole::None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            KeyRole::None => "",
            KeyRole::Primary => "PRI",
            KeyRole::Unique => "UNI",
            KeyRole::Index => "MUL",
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name, unique within its table
    pub name: String,
    /// Declared type in the engine's syntax, e.g. `character varying(255)`
    pub ty: String,
    pub nullable: bool,
    pub key: KeyRole,
    /// Default expression, if any
    pub default: Option<String>,
    /// Extra attribute such as `identity`; empty when there is none
    pub extra: String,
}

impl Field {
    /// A plain nullable column without key, default or extra attribute.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            nullable: true,
            key: KeyRole::None,
            default: None,
            extra: String::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_key(mut self, key: KeyRole) -> Self {
        self.key = key;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// One column of one index, as the database lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPart {
    /// Name of the index this row belongs to
    pub key_name: String,
    pub non_unique: bool,
    pub primary: bool,
    /// 1-based position of the column within the index
    pub seq_in_index: i32,
    pub column_name: String,
    /// Whether the indexed column accepts NULL
    pub nullable: bool,
    /// Access method, e.g. `BTREE`
    pub index_type: String,
}

/// An index, identified by its ordered column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub columns: Vec<String>,
    pub unique: bool,
    /// Nullability of the leading column
    pub nullable: bool,
    /// Access method of the index, e.g. `BTREE` or `HASH`
    pub kind: String,
}

impl Index {
    /// Build an index from the rows that make it up.
    ///
    /// Rows are ordered by their position in the index; `unique`,
    /// `nullable` and `kind` come from the leading row. Returns `None`
    /// when there are no rows.
    pub fn from_parts(mut parts: Vec<IndexPart>) -> Option<Self> {
        parts.sort_by_key(|p| p.seq_in_index);
        let first = parts.first()?;
        let unique = !first.non_unique;
        let nullable = first.nullable;
        let kind = first.index_type.clone();

        Some(Self {
            columns: parts.into_iter().map(|p| p.column_name).collect(),
            unique,
            nullable,
            kind,
        })
    }

    /// Comparison key: the columns joined with `,`.
    pub fn key(&self) -> String {
        self.columns.join(",")
    }

    /// Human-facing name: the columns joined with `, `.
    pub fn display_name(&self) -> String {
        self.columns.join(", ")
    }
}

/// Group raw index rows into indexes.
///
/// Rows are stably sorted by (index name, position) and split into a new
/// index whenever the name changes, so rows of one index need not be
/// adjacent in the input.
///
/// The result holds one index per column list. When several indexes share
/// a column list, the primary key wins; otherwise the last one by index
/// name does. Output is ordered by the first index name seen for each
/// column list.
pub fn group_index_parts(mut parts: Vec<IndexPart>) -> Vec<Index> {
    parts.sort_by(|a, b| {
        a.key_name
            .cmp(&b.key_name)
            .then(a.seq_in_index.cmp(&b.seq_in_index))
    });

    let mut by_key: IndexMap<String, (bool, Index)> = IndexMap::new();
    let mut insert = |group: Vec<IndexPart>| {
        let primary = group.iter().any(|p| p.primary);
        let Some(index) = Index::from_parts(group) else {
            return;
        };
        match by_key.get_mut(&index.key()) {
            Some((true, _)) if !primary => {}
            Some(slot) => *slot = (primary, index),
            None => {
                by_key.insert(index.key(), (primary, index));
            }
        }
    };

    let mut group: Vec<IndexPart> = Vec::new();
    for part in parts {
        if group.first().is_some_and(|g| g.key_name != part.key_name) {
            insert(std::mem::take(&mut group));
        }
        group.push(part);
    }
    insert(group);

    by_key.into_values().map(|(_, index)| index).collect()
}

/// A table with its fields and indexes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub name: String,
    /// Fields in column order
    pub fields: Vec<Field>,
    /// Indexes, one per column list (see [`group_index_parts`])
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Find an index by its comparison key (see [`Index::key`]).
    pub fn index(&self, key: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.key() == key)
    }
}
