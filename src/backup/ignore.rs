//! Prefix-based exclusion of files discovered during a folder walk.
//!
//! Matching is a case-insensitive prefix test against normalized paths, not
//! glob matching; there is no wildcard support.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    prefixes: Vec<String>,
}

impl IgnoreMatcher {
    /// Builds a matcher for one folder target.
    ///
    /// Relative rules are anchored to the folder root. `always_ignored` holds
    /// paths excluded for every folder target (the staging directory and the
    /// destination root), so a backup never recurses into its own output.
    pub fn for_folder<P: AsRef<Path>>(
        root: &Path,
        rules: &[PathBuf],
        always_ignored: &[P],
    ) -> Self {
        let prefixes = rules
            .iter()
            .map(|rule| {
                if rule.is_absolute() {
                    rule.clone()
                } else {
                    root.join(rule)
                }
            })
            .chain(always_ignored.iter().map(|p| p.as_ref().to_path_buf()))
            .map(|p| normalize(&p))
            .collect();
        Self { prefixes }
    }

    /// Returns true when the candidate file should be included in the archive.
    pub fn includes(&self, candidate: &Path) -> bool {
        let candidate = normalize(candidate);
        !self
            .prefixes
            .iter()
            .any(|prefix| candidate.starts_with(prefix))
    }
}

/// Unifies separators to `/`, lowercases, and trims trailing separators so
/// prefix comparison behaves the same for both path-separator styles.
fn normalize(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/").to_lowercase();
    while s.ends_with('/') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_rule_excludes_subtree() {
        let root = Path::new("/data/project");
        let matcher = IgnoreMatcher::for_folder::<&Path>(root, &[PathBuf::from("target")], &[]);

        assert!(!matcher.includes(Path::new("/data/project/target/debug/app")));
        assert!(matcher.includes(Path::new("/data/project/src/main.rs")));
    }

    #[test]
    fn test_absolute_rule() {
        let root = Path::new("/data/project");
        let matcher =
            IgnoreMatcher::for_folder::<&Path>(root, &[PathBuf::from("/data/project/.git")], &[]);

        assert!(!matcher.includes(Path::new("/data/project/.git/HEAD")));
        assert!(matcher.includes(Path::new("/data/project/README.md")));
    }

    #[test]
    fn test_case_insensitive() {
        let root = Path::new("/data/Project");
        let matcher = IgnoreMatcher::for_folder::<&Path>(root, &[PathBuf::from("Cache")], &[]);

        assert!(!matcher.includes(Path::new("/data/project/CACHE/blob")));
    }

    #[test]
    fn test_separator_styles_match() {
        let root = Path::new("C:\\data");
        let matcher = IgnoreMatcher::for_folder::<&Path>(root, &[PathBuf::from("tmp")], &[]);

        assert!(!matcher.includes(Path::new("C:\\data\\tmp\\junk.bin")));
        assert!(!matcher.includes(Path::new("C:/data/tmp/junk.bin")));
    }

    #[test]
    fn test_always_ignored_paths() {
        let root = Path::new("/data");
        let staging = Path::new("/data/2023.01.01-00.00.00");
        let matcher = IgnoreMatcher::for_folder(root, &[], &[staging]);

        assert!(!matcher.includes(Path::new("/data/2023.01.01-00.00.00/docs.zip")));
        assert!(matcher.includes(Path::new("/data/notes.txt")));
    }

    #[test]
    fn test_no_rules_includes_everything() {
        let matcher = IgnoreMatcher::for_folder::<&Path>(Path::new("/data"), &[], &[]);
        assert!(matcher.includes(Path::new("/data/anything")));
    }
}
