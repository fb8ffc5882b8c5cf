//! Storage-directory scan and cache probing.
//!
//! Walks `<base_dir>/<database oid>/`, resolves each numeric file name to
//! a relation through the catalog, asks the probe how much of the file is
//! resident in the page cache, and accumulates the answers into a
//! `UsageReport`.

pub mod mock;
pub mod probe;
pub mod traits;

use std::path::Path;

use tracing::{debug, info};

use crate::catalog::{CatalogError, DatabaseEntry, RelationLookup};
use crate::report::UsageReport;
use probe::{CacheProbe, ProbeError};
use traits::FileSystem;

/// Error type for the collection phase.
#[derive(Debug)]
pub enum CollectError {
    /// Storage directory enumeration failed.
    Scan(String),
    /// Catalog lookup failed.
    Catalog(CatalogError),
    /// Cache probe failed.
    Probe(ProbeError),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Scan(msg) => write!(f, "storage scan: {}", msg),
            CollectError::Catalog(e) => e.fmt(f),
            CollectError::Probe(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<CatalogError> for CollectError {
    fn from(e: CatalogError) -> Self {
        CollectError::Catalog(e)
    }
}

impl From<ProbeError> for CollectError {
    fn from(e: ProbeError) -> Self {
        CollectError::Probe(e)
    }
}

/// Scans one database's storage directory and probes every resolvable
/// relation file.
///
/// File names that are not fully numeric are ignored. Files whose oid has
/// no pg_class row, and files for which the probe reports no usable size,
/// are skipped without failing the run. Everything else lands in the
/// returned report keyed `<database>:<relation>`.
pub fn collect_usage(
    fs: &dyn FileSystem,
    lookup: &mut dyn RelationLookup,
    probe: &dyn CacheProbe,
    base_dir: &Path,
    db: &DatabaseEntry,
) -> Result<UsageReport, CollectError> {
    let dir = base_dir.join(db.oid.to_string());
    info!(database = %db.name, dir = %dir.display(), "scanning storage directory");

    let entries = fs
        .read_dir(&dir)
        .map_err(|e| CollectError::Scan(format!("{}: {}", dir.display(), e)))?;

    let mut report = UsageReport::new();
    for path in entries {
        let Some(oid) = relation_oid(&path) else {
            continue;
        };
        let Some(relname) = lookup.relation_name(oid)? else {
            debug!(oid, "no pg_class row, skipping");
            continue;
        };
        let Some(bytes) = probe.resident_bytes(&path)? else {
            debug!(oid, relation = %relname, "no usable size in probe output, skipping");
            continue;
        };
        report.record(&db.name, &relname, bytes);
    }

    info!(database = %db.name, relations = report.len(), "scan complete");
    Ok(report)
}

/// Extracts the relation oid from a storage file path.
///
/// Only fully numeric file names count; fork and segment files such as
/// `12345_vm` or `12345.1` are ignored.
fn relation_oid(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}
