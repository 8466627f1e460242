//! Detect schema drift between two Postgres databases.
//!
//! One database is the *reference* (ground truth), the other the
//! *candidate*. The crate loads both schemas through [`SchemaProvider`]s
//! and reports what the reference lacks or disagrees on:
//!
//! - tables present in the candidate but not in the reference,
//! - per table, missing fields and type/nullability/default mismatches,
//! - per table, missing indexes and nullability/uniqueness mismatches.
//!
//! Indexes are matched by their ordered column list, not by name.
//!
//! ```ignore
//! let comparer = SchemaComparer::new(
//!     SchemaProvider::new(PgIntrospector::new(TracedClient::new(a), "public")),
//!     SchemaProvider::new(PgIntrospector::new(TracedClient::new(b), "public")),
//! );
//!
//! let mut reporter = Reporter::new(std::io::stdout());
//! reporter.report(&comparer.compare_tables().await?)?;
//! ```

mod compare;
mod error;
mod introspect;
mod provider;
mod report;
pub mod schema;
mod traced;

pub use compare::{Finding, Report, SchemaComparer, Subject};
pub use error::Error;
pub use introspect::{Introspect, PgIntrospector, StaticIntrospector};
pub use provider::SchemaProvider;
pub use report::Reporter;
pub use schema::{Field, Index, IndexPart, KeyRole, Table, group_index_parts};
pub use traced::TracedClient;

/// Result type for schemadrift operations.
pub type Result<T> = std::result::Result<T, Error>;
