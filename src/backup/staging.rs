//! Timestamped staging directory naming and creation.

use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name format of backup directories: `YYYY.MM.DD-HH.MM.SS`.
///
/// Fixed-width and zero-padded, so lexicographic order of directory names is
/// chronological order.
pub static TIME_FORMAT: &str = "%Y.%m.%d-%H.%M.%S";

pub fn dir_name(dt: &DateTime<Local>) -> String {
    dt.format(TIME_FORMAT).to_string()
}

/// Returns the parsed timestamp when `name` matches the backup directory
/// grammar and is a calendar-valid date/time. Anything else returns `None`
/// and must never be treated as a backup directory.
pub fn parse_dir_name(name: &str) -> Option<NaiveDateTime> {
    if !matches_grammar(name) {
        return None;
    }
    NaiveDateTime::parse_from_str(name, TIME_FORMAT).ok()
}

/// Exact digit grammar `NNNN.NN.NN-NN.NN.NN`.
fn matches_grammar(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() != 19 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 | 16 => *b == b'.',
        10 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Creates the staging directory for a run under `parent`.
///
/// Idempotent: succeeds when the directory already exists.
pub fn create(parent: &Path, started_at: &DateTime<Local>) -> io::Result<PathBuf> {
    let dir = parent.join(dir_name(started_at));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid_name() {
        let ts = parse_dir_name("2023.01.02-03.04.05").unwrap();
        assert_eq!(ts.format(TIME_FORMAT).to_string(), "2023.01.02-03.04.05");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(parse_dir_name("2023.01.02").is_none());
        assert!(parse_dir_name("2023.01.02-03.04.05.tar").is_none());
        assert!(parse_dir_name("202a.01.02-03.04.05").is_none());
        assert!(parse_dir_name("2023-01-02-03.04.05").is_none());
        assert!(parse_dir_name("my-backup-folder").is_none());
        assert!(parse_dir_name("").is_none());
    }

    #[test]
    fn test_parse_rejects_calendar_invalid() {
        // Matches the digit grammar but is not a real date
        assert!(parse_dir_name("2023.13.01-00.00.00").is_none());
        assert!(parse_dir_name("2023.01.01-25.00.00").is_none());
    }

    #[test]
    fn test_dir_name_roundtrip() {
        let dt = Local.with_ymd_and_hms(2023, 6, 7, 8, 9, 10).unwrap();
        let name = dir_name(&dt);
        assert_eq!(name, "2023.06.07-08.09.10");
        assert!(parse_dir_name(&name).is_some());
    }

    #[test]
    fn test_create_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dt = Local.with_ymd_and_hms(2023, 6, 7, 8, 9, 10).unwrap();

        let first = create(tmp.path(), &dt).unwrap();
        assert!(first.is_dir());
        let second = create(tmp.path(), &dt).unwrap();
        assert_eq!(first, second);
    }
}
