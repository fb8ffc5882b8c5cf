//! Catalog lookups against PostgreSQL system tables.
//!
//! Two lookups back the cache usage report:
//! - `pg_database` — maps the requested database name to its storage oid
//! - `pg_class` — maps a relation storage oid back to the relation name
//!
//! Relation lookups open a fresh connection per call. For a database with
//! many relations this is the dominant cost of a run.

mod queries;

use postgres::{Client, NoTls};
use tracing::debug;

/// Error type for catalog access.
#[derive(Debug)]
pub enum CatalogError {
    /// Connection failed.
    Connection(String),
    /// Query execution failed.
    Query(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Connection(msg) => write!(f, "PostgreSQL: {}", msg),
            CatalogError::Query(msg) => write!(f, "PostgreSQL query error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Connection parameters shared by every catalog lookup.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl ConnectParams {
    /// Builds a keyword/value conninfo string targeting `dbname`.
    fn conninfo(&self, dbname: &str) -> String {
        if self.password.is_empty() {
            format!(
                "host={} port={} user={} dbname={}",
                self.host, self.port, self.user, dbname
            )
        } else {
            format!(
                "host={} port={} user={} password={} dbname={}",
                self.host, self.port, self.user, self.password, dbname
            )
        }
    }
}

/// One row from pg_database: database name plus its storage oid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub name: String,
    pub oid: u32,
}

/// Looks up the requested database in pg_database.
///
/// Returns every row whose name equals `dbname`, excluding names that
/// contain "template" anywhere. In practice that is one row, or none when
/// the name is mistyped.
pub fn lookup_databases(
    params: &ConnectParams,
    dbname: &str,
) -> Result<Vec<DatabaseEntry>, CatalogError> {
    let mut client = connect(params, dbname)?;
    let rows = client
        .query(queries::DATABASE_LOOKUP, &[&dbname])
        .map_err(|e| CatalogError::Query(format_postgres_error(&e)))?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        entries.push(DatabaseEntry {
            name: row.get(0),
            oid: row.get(1),
        });
    }
    debug!(database = %dbname, matches = entries.len(), "pg_database lookup done");
    Ok(entries)
}

/// Resolves relation storage oids to relation names.
///
/// A trait so the collector can run against a canned mapping in tests.
pub trait RelationLookup {
    /// Returns the relation name for `oid`, or `None` when pg_class has no
    /// matching row.
    fn relation_name(&mut self, oid: u32) -> Result<Option<String>, CatalogError>;
}

/// `RelationLookup` backed by pg_class in the target database.
///
/// Opens a fresh connection on every call; no pooling or reuse. The
/// connection is dropped, and thereby closed, before the call returns.
pub struct CatalogRelationLookup {
    params: ConnectParams,
    dbname: String,
}

impl CatalogRelationLookup {
    pub fn new(params: ConnectParams, dbname: impl Into<String>) -> Self {
        Self {
            params,
            dbname: dbname.into(),
        }
    }
}

impl RelationLookup for CatalogRelationLookup {
    fn relation_name(&mut self, oid: u32) -> Result<Option<String>, CatalogError> {
        let mut client = connect(&self.params, &self.dbname)?;
        let rows = client
            .query(queries::RELATION_LOOKUP, &[&oid])
            .map_err(|e| CatalogError::Query(format_postgres_error(&e)))?;
        Ok(rows.first().map(|row| row.get(0)))
    }
}

fn connect(params: &ConnectParams, dbname: &str) -> Result<Client, CatalogError> {
    debug!(host = %params.host, database = %dbname, "connecting");
    Client::connect(&params.conninfo(dbname), NoTls)
        .map_err(|e| CatalogError::Connection(format_postgres_error(&e)))
}

/// Formats a postgres error compactly, preferring the server message.
fn format_postgres_error(e: &postgres::Error) -> String {
    if let Some(db_error) = e.as_db_error() {
        format!("{}: {}", db_error.severity(), db_error.message())
    } else {
        let msg = e.to_string();
        if msg.contains("Connection refused") {
            "connection refused".to_string()
        } else {
            msg
        }
    }
}
