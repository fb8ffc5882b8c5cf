//! Cache residency probing via an external `fincore`-style command.
//!
//! The probe runs the command once per file and reads the resident size
//! out of its text output. All knowledge of that output's shape lives in
//! `parse_resident_bytes`, which is a pure function testable with plain
//! strings.

use std::path::Path;
use std::process::Command;

/// Reporting unit of the probe's size field, in bytes.
const PROBE_UNIT_BYTES: u64 = 1024;

/// Error type for probe failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// The external command could not be started.
    Launch(String),
    /// The command produced output of an unexpected shape.
    Output(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Launch(msg) => write!(f, "failed to run probe command: {}", msg),
            ProbeError::Output(msg) => write!(f, "unexpected probe output: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Reports how many bytes of a file are resident in the OS page cache.
///
/// A trait so the collector can run against canned outputs in tests.
pub trait CacheProbe {
    /// Returns the resident byte count for `path`, or `None` when the
    /// probe output carries no usable size for it.
    fn resident_bytes(&self, path: &Path) -> Result<Option<u64>, ProbeError>;
}

/// `CacheProbe` that shells out to a `fincore`-style executable.
///
/// Blocks until the child exits; no timeout. The child's exit status is
/// not inspected, only its output.
pub struct FincoreProbe {
    command: String,
}

impl FincoreProbe {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl CacheProbe for FincoreProbe {
    fn resident_bytes(&self, path: &Path) -> Result<Option<u64>, ProbeError> {
        let output = Command::new(&self.command)
            .arg(path)
            .output()
            .map_err(|e| ProbeError::Launch(format!("{}: {}", self.command, e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        parse_resident_bytes(&text)
    }
}

/// Extracts the resident size from probe output.
///
/// The second whitespace-separated field is the resident size in
/// kilobyte units. A field with no digit in it yields `None`; a field
/// that has digits but is not a number is an error. Fewer than two
/// fields is an error.
pub fn parse_resident_bytes(output: &str) -> Result<Option<u64>, ProbeError> {
    let mut fields = output.split_whitespace();
    let _ = fields.next();
    let size = fields.next().ok_or_else(|| {
        ProbeError::Output(format!(
            "expected at least two fields, got {:?}",
            output.trim()
        ))
    })?;

    if !size.contains(|c: char| c.is_ascii_digit()) {
        return Ok(None);
    }

    let kilobytes: u64 = size
        .parse()
        .map_err(|_| ProbeError::Output(format!("unparseable size field {:?}", size)))?;
    Ok(Some(kilobytes * PROBE_UNIT_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_second_field_in_kilobytes() {
        assert_eq!(parse_resident_bytes("123 456 pages"), Ok(Some(456 * 1024)));
        assert_eq!(
            parse_resident_bytes("16401 2048 blocks"),
            Ok(Some(2_097_152))
        );
        assert_eq!(parse_resident_bytes("16402 512 blocks"), Ok(Some(524_288)));
    }

    #[test]
    fn test_parse_handles_extra_whitespace() {
        assert_eq!(parse_resident_bytes("  a\t 8 \n"), Ok(Some(8 * 1024)));
    }

    #[test]
    fn test_digit_free_size_field_is_skipped() {
        assert_eq!(parse_resident_bytes("12345 cached pages"), Ok(None));
        assert_eq!(parse_resident_bytes("file -- pages"), Ok(None));
    }

    #[test]
    fn test_partially_numeric_size_field_is_an_error() {
        assert!(matches!(
            parse_resident_bytes("12345 4k6 pages"),
            Err(ProbeError::Output(_))
        ));
        assert!(matches!(
            parse_resident_bytes("12345 -1 pages"),
            Err(ProbeError::Output(_))
        ));
    }

    #[test]
    fn test_too_few_fields_is_an_error() {
        assert!(matches!(
            parse_resident_bytes(""),
            Err(ProbeError::Output(_))
        ));
        assert!(matches!(
            parse_resident_bytes("only_one_field"),
            Err(ProbeError::Output(_))
        ));
    }

    #[test]
    fn test_missing_command_is_a_launch_error() {
        let probe = FincoreProbe::new("pgosmem-no-such-probe-command");
        assert!(matches!(
            probe.resident_bytes(Path::new("/tmp/x")),
            Err(ProbeError::Launch(_))
        ));
    }
}
