//! pgosmem - PostgreSQL OS page cache usage reporter library.
//!
//! This library provides the pieces behind the `pgosmem` binary:
//! - `catalog` — pg_database / pg_class lookups
//! - `collector` — storage-directory scan and per-file cache probing
//! - `report` — usage accumulation, ordering and text rendering

pub mod catalog;
pub mod collector;
pub mod report;
