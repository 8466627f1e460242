//! Schema comparison - check a candidate schema against a reference schema.
//!
//! The reference schema is treated as ground truth. Each comparison walks
//! the *candidate* side and reports what the reference lacks or disagrees
//! on:
//!
//! ```text
//! Comparing fields for table "users"
//!   [email] "type" is character varying(100), should be character varying(255)
//!   [email] "null" is true, should be false
//!   [created_at] is missing
//! ```
//!
//! Entities that only exist in the reference are not reported. Differences
//! are findings, never errors; the only error a comparison raises on its
//! own is [`Error::TableNotFound`].

use crate::{Error, Field, Index, Introspect, Result, SchemaProvider};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;

/// What a [`Report`] is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Tables,
    Fields { table: String },
    Indexes { table: String },
}

impl Subject {
    /// Heading printed above the findings.
    pub fn heading(&self) -> String {
        match self {
            Subject::Tables => "Checking table presence".to_string(),
            Subject::Fields { table } => format!("Comparing fields for table \"{table}\""),
            Subject::Indexes { table } => format!("Comparing indexes for table \"{table}\""),
        }
    }

    /// Line printed when there are no findings.
    pub fn in_sync_message(&self) -> &'static str {
        match self {
            Subject::Tables => "All tables are present",
            Subject::Fields { .. } => "All fields in sync",
            Subject::Indexes { .. } => "All indexes in sync",
        }
    }
}

/// A single discrepancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// The entity exists in the candidate but not in the reference.
    Missing { name: String },
    /// An attribute differs between the two schemas.
    Mismatch {
        name: String,
        attribute: &'static str,
        /// Value in the reference schema
        actual: String,
        /// Value in the candidate schema
        expected: String,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Missing { name } => write!(f, "[{name}] is missing"),
            Finding::Mismatch {
                name,
                attribute,
                actual,
                expected,
            } => write!(f, "[{name}] \"{attribute}\" is {actual}, should be {expected}"),
        }
    }
}

/// The outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: Subject,
    pub findings: Vec<Finding>,
}

impl Report {
    fn new(subject: Subject) -> Self {
        Self {
            subject,
            findings: Vec::new(),
        }
    }

    /// Returns true if there are no findings.
    pub fn is_in_sync(&self) -> bool {
        self.findings.is_empty()
    }

    fn missing(&mut self, name: impl Into<String>) {
        self.findings.push(Finding::Missing { name: name.into() });
    }

    /// Record a mismatch if `actual` and `expected` differ.
    fn check<T: PartialEq + ToString>(
        &mut self,
        name: &str,
        attribute: &'static str,
        actual: T,
        expected: T,
    ) {
        if actual != expected {
            self.findings.push(Finding::Mismatch {
                name: name.to_string(),
                attribute,
                actual: actual.to_string(),
                expected: expected.to_string(),
            });
        }
    }
}

/// Renders an optional default the way findings print it.
fn default_value(default: &Option<String>) -> &str {
    default.as_deref().unwrap_or("(none)")
}

/// Compares a candidate schema against a reference schema.
pub struct SchemaComparer<S> {
    reference: SchemaProvider<S>,
    candidate: SchemaProvider<S>,
}

impl<S: Introspect> SchemaComparer<S> {
    pub fn new(reference: SchemaProvider<S>, candidate: SchemaProvider<S>) -> Self {
        Self {
            reference,
            candidate,
        }
    }

    /// Report tables present in the candidate but absent from the reference.
    ///
    /// Only presence is checked; columns of missing tables are not listed.
    pub async fn compare_tables(&self) -> Result<Report> {
        let reference: BTreeSet<&str> = self.reference.tables().await?.collect();
        let candidate: BTreeSet<&str> = self.candidate.tables().await?.collect();

        let mut report = Report::new(Subject::Tables);
        for table in candidate.difference(&reference) {
            report.missing(*table);
        }

        tracing::debug!(missing = report.findings.len(), "compared tables");
        Ok(report)
    }

    /// Compare the fields of `table`, driven by the candidate's columns.
    ///
    /// For each candidate field the reference either lacks it (one
    /// `Missing` finding) or is checked for type, nullability and default,
    /// each reported independently.
    pub async fn compare_fields(&self, table: &str) -> Result<Report> {
        let reference = self
            .reference
            .fields(table)
            .await
            .map_err(table_not_found(table))?;
        let candidate = self
            .candidate
            .fields(table)
            .await
            .map_err(table_not_found(table))?;

        let mut report = Report::new(Subject::Fields {
            table: table.to_string(),
        });
        for field in candidate {
            match reference.iter().find(|f| f.name == field.name) {
                None => report.missing(&field.name),
                Some(existing) => diff_field(&mut report, existing, field),
            }
        }

        tracing::debug!(table, findings = report.findings.len(), "compared fields");
        Ok(report)
    }

    /// Compare the indexes of `table`, keyed by their ordered column list.
    ///
    /// An index on `(a, b)` and one on `(b, a)` are different indexes.
    pub async fn compare_indexes(&self, table: &str) -> Result<Report> {
        let reference = self
            .reference
            .indexes(table)
            .await
            .map_err(table_not_found(table))?;
        let candidate = self
            .candidate
            .indexes(table)
            .await
            .map_err(table_not_found(table))?;

        let mut report = Report::new(Subject::Indexes {
            table: table.to_string(),
        });
        let reference = index_map(reference);
        for (key, index) in index_map(candidate) {
            match reference.get(&key) {
                None => report.missing(index.display_name()),
                Some(existing) => diff_index(&mut report, existing, index),
            }
        }

        tracing::debug!(table, findings = report.findings.len(), "compared indexes");
        Ok(report)
    }

    /// Fields report followed by indexes report for `table`.
    pub async fn compare_table(&self, table: &str) -> Result<[Report; 2]> {
        Ok([
            self.compare_fields(table).await?,
            self.compare_indexes(table).await?,
        ])
    }
}

/// Maps an unknown-table lookup failure to [`Error::TableNotFound`].
fn table_not_found(table: &str) -> impl Fn(Error) -> Error + '_ {
    move |err| match err {
        Error::UnknownTable(_) => Error::TableNotFound {
            table: table.to_string(),
        },
        other => other,
    }
}

/// Key indexes by their column list; a later index replaces an earlier
/// one with the same columns.
fn index_map(indexes: &[Index]) -> IndexMap<String, &Index> {
    indexes.iter().map(|index| (index.key(), index)).collect()
}

fn diff_field(report: &mut Report, reference: &Field, candidate: &Field) {
    let name = &candidate.name;
    report.check(name, "type", &reference.ty, &candidate.ty);
    report.check(name, "null", reference.nullable, candidate.nullable);
    report.check(
        name,
        "default",
        default_value(&reference.default),
        default_value(&candidate.default),
    );
}

fn diff_index(report: &mut Report, reference: &Index, candidate: &Index) {
    let name = candidate.display_name();
    report.check(&name, "null", reference.nullable, candidate.nullable);
    report.check(&name, "unique", reference.unique, candidate.unique);
}
