//! Cache usage accumulation and report rendering.
//!
//! The report is a flat `<database>:<relation>` to byte-count mapping,
//! printed largest first under a fixed banner.

use std::collections::HashMap;
use std::io::{self, Write};

/// Banner printed before the usage lines.
const BANNER: &str = "OS Cache Usage:";

/// Accumulated resident-byte counts keyed `<database>:<relation>`.
///
/// Built by the collector and handed to rendering as a value. Last write
/// wins when a key repeats.
#[derive(Debug, Default)]
pub struct UsageReport {
    usage: HashMap<String, u64>,
}

impl UsageReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the resident byte count for one relation.
    pub fn record(&mut self, database: &str, relation: &str, bytes: u64) {
        self.usage.insert(format!("{}:{}", database, relation), bytes);
    }

    /// Folds another report into this one. Keys present in both take the
    /// other report's value.
    pub fn merge(&mut self, other: UsageReport) {
        self.usage.extend(other.usage);
    }

    pub fn len(&self) -> usize {
        self.usage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }

    /// Returns the entries ordered for printing: byte count descending,
    /// ties broken by key in reverse lexical order.
    pub fn sorted_entries(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.usage.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| (b.1, b.0).cmp(&(a.1, a.0)));
        entries
    }

    /// Writes the banner and one `key:bytes` line per entry to `out`.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", BANNER)?;
        for (key, bytes) in self.sorted_entries() {
            writeln!(out, "{}:{}", key, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_bytes_descending() {
        let mut report = UsageReport::new();
        report.record("shop", "orders", 512);
        report.record("shop", "customers", 4096);
        report.record("shop", "items", 1024);

        assert_eq!(
            report.sorted_entries(),
            vec![
                ("shop:customers", 4096),
                ("shop:items", 1024),
                ("shop:orders", 512),
            ]
        );
    }

    #[test]
    fn test_ties_break_by_reverse_key_order() {
        let mut report = UsageReport::new();
        report.record("shop", "aaa", 1024);
        report.record("shop", "zzz", 1024);
        report.record("shop", "mmm", 1024);

        assert_eq!(
            report.sorted_entries(),
            vec![("shop:zzz", 1024), ("shop:mmm", 1024), ("shop:aaa", 1024)]
        );
    }

    #[test]
    fn test_adjacent_lines_never_increase() {
        let mut report = UsageReport::new();
        report.record("db", "a", 10);
        report.record("db", "b", 300);
        report.record("db", "c", 300);
        report.record("db", "d", 7);

        let entries = report.sorted_entries();
        for pair in entries.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
            if pair[0].1 == pair[1].1 {
                assert!(pair[0].0 >= pair[1].0);
            }
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut report = UsageReport::new();
        report.record("shop", "orders", 512);
        report.record("shop", "orders", 2048);

        assert_eq!(report.sorted_entries(), vec![("shop:orders", 2048)]);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut left = UsageReport::new();
        left.record("shop", "orders", 512);
        let mut right = UsageReport::new();
        right.record("shop", "orders", 1024);
        right.record("shop", "customers", 64);

        left.merge(right);
        assert_eq!(
            left.sorted_entries(),
            vec![("shop:orders", 1024), ("shop:customers", 64)]
        );
    }

    #[test]
    fn test_render_banner_and_lines() {
        let mut report = UsageReport::new();
        report.record("shop", "customers", 2_097_152);
        report.record("shop", "orders", 524_288);

        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "OS Cache Usage:\nshop:customers:2097152\nshop:orders:524288\n"
        );
    }

    #[test]
    fn test_render_empty_report_is_banner_only() {
        let report = UsageReport::new();
        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "OS Cache Usage:\n");
    }
}
