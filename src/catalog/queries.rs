//! SQL text for the catalog lookups.
//!
//! Caller-supplied values are always bound as query parameters, never
//! spliced into the SQL text.

/// Matches the requested database by exact name. Any name containing
/// "template" is excluded, even a user database like `mytemplate1`.
pub(super) const DATABASE_LOOKUP: &str = "\
    SELECT datname, oid FROM pg_database \
    WHERE datname = $1 AND datname NOT LIKE '%template%'";

/// Maps a relation storage oid back to its relation name.
pub(super) const RELATION_LOOKUP: &str = "SELECT relname FROM pg_class WHERE oid = $1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_lookup_is_parameterized() {
        assert!(DATABASE_LOOKUP.contains("datname = $1"));
    }

    #[test]
    fn test_database_lookup_excludes_templates() {
        assert!(DATABASE_LOOKUP.contains("NOT LIKE '%template%'"));
    }

    #[test]
    fn test_relation_lookup_is_parameterized() {
        assert!(RELATION_LOOKUP.contains("oid = $1"));
    }
}
