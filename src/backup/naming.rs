//! Deterministic mapping from filesystem paths to archive file names.

use sanitize_filename::sanitize;
use std::path::Path;

/// Character joining path components in generated archive names
pub static JOIN_CHAR: char = '_';
/// Extension of every generated archive
pub static ARCHIVE_EXT: &str = "zip";
/// Stem used when a path reduces to nothing (e.g. `/`)
static FALLBACK_STEM: &str = "archive";

/// Maps an arbitrary filesystem path to a filesystem-safe archive file name.
///
/// Every run of drive-separator (`:`) and path-separator (`/`, `\`) characters
/// collapses to a single [`JOIN_CHAR`]; the join character is then trimmed from
/// both ends and the stem is sanitized before the `.zip` extension is appended.
///
/// Pure and deterministic, but not injective: distinct paths such as `a/b` and
/// `a_b` map to the same name. Callers that write multiple archives must plan
/// names up front and treat duplicates as an error.
pub fn archive_file_name<P: AsRef<Path>>(path: P) -> String {
    let raw = path.as_ref().to_string_lossy();
    let mut joined = String::with_capacity(raw.len());
    let mut prev_join = false;
    for c in raw.chars() {
        if matches!(c, ':' | '/' | '\\') {
            if !prev_join {
                joined.push(JOIN_CHAR);
            }
            prev_join = true;
        } else {
            joined.push(c);
            prev_join = false;
        }
    }

    let stem = sanitize(joined.trim_matches(JOIN_CHAR));
    let stem = if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    };
    format!("{stem}.{ARCHIVE_EXT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_path() {
        assert_eq!(
            archive_file_name("C:\\Users\\me\\docs"),
            "C_Users_me_docs.zip"
        );
    }

    #[test]
    fn test_unix_path() {
        assert_eq!(archive_file_name("/home/me/docs"), "home_me_docs.zip");
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(archive_file_name("C:/data\\logs"), "C_data_logs.zip");
    }

    #[test]
    fn test_trailing_separator_stripped() {
        assert_eq!(archive_file_name("C:\\"), "C.zip");
        assert_eq!(archive_file_name("/home/me/"), "home_me.zip");
    }

    #[test]
    fn test_root_falls_back() {
        assert_eq!(archive_file_name("/"), "archive.zip");
    }

    #[test]
    fn test_known_collision() {
        // Distinct inputs may collide; the planner turns this into an error.
        assert_eq!(archive_file_name("/a/b"), archive_file_name("/a_b"));
    }

    #[test]
    fn test_never_ends_with_join_char_before_extension() {
        for input in [
            "C:\\", "/home/", "D:\\data\\\\", "//srv//", "/", "relative/dir/",
        ] {
            let name = archive_file_name(input);
            assert!(name.ends_with(".zip"), "{name}");
            let stem = name.strip_suffix(".zip").unwrap();
            assert!(!stem.ends_with(JOIN_CHAR), "{name}");
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            archive_file_name("/var/lib/app"),
            archive_file_name("/var/lib/app")
        );
    }
}
