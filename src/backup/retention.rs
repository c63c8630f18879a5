//! Retention pruning of timestamped backup directories at the destination.

use crate::backup::result_error::result::Result;
use crate::backup::staging;
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A destination subdirectory participating in retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionEntry {
    pub path: PathBuf,
    pub timestamp: NaiveDateTime,
}

/// What a prune pass deleted and what it could not delete.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Scans the immediate subdirectories of `destination` for backup
/// directories, sorted lexicographically by basename (chronological for the
/// fixed-width timestamp format).
///
/// Names that do not match the timestamp grammar never participate, which
/// protects unrelated directories living next to the backups.
pub fn scan(destination: &Path) -> Result<Vec<RetentionEntry>> {
    let entries = fs::read_dir(destination)?
        .filter_map(|res| res.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name();
            staging::parse_dir_name(name.to_string_lossy().as_ref()).map(|timestamp| {
                RetentionEntry {
                    path: entry.path(),
                    timestamp,
                }
            })
        })
        .sorted_unstable_by_key(|entry| entry.path.file_name().map(|n| n.to_os_string()))
        .collect_vec();
    Ok(entries)
}

/// Deletes the oldest backup directories until at most `keep_versions`
/// remain.
///
/// `keep_versions <= 0` disables pruning entirely (unlimited retention).
/// Deletions are independent: a failure is logged, recorded in the report,
/// and the entry still leaves the pending list, so the loop is bounded by
/// the initial match count.
pub fn prune(destination: &Path, keep_versions: i64) -> Result<PruneReport> {
    let mut report = PruneReport::default();
    if keep_versions <= 0 {
        info!("keep_versions is {keep_versions}, cleaning is ignored");
        return Ok(report);
    }

    let mut pending: VecDeque<RetentionEntry> = scan(destination)?.into();
    while pending.len() as i64 > keep_versions {
        let Some(entry) = pending.pop_front() else {
            break;
        };
        match fs::remove_dir_all(&entry.path) {
            Ok(()) => {
                info!("Deleted old version: {:?}", entry.path);
                report.deleted.push(entry.path);
            }
            Err(e) => {
                error!("Error deleting old version {:?}: {}", entry.path, e);
                report.failed.push(entry.path);
            }
        }
    }
    Ok(report)
}
