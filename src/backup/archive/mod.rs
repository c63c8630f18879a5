//! Archive creation for folder and file targets.
//!
//! Every target produces its own zip archive inside the staging directory.
//! Archives are written to a temporary file first and only persisted under
//! their final name after the zip trailer is complete, so a failed target
//! leaves nothing behind and its handle is closed on every exit path.
//! Failures are isolated per target; they never abort the batch.

use crate::backup::backup_config::FolderTarget;
use crate::backup::ignore::IgnoreMatcher;
use crate::backup::naming;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use derive_more::Display;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{error, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Status of a single archived target.
#[derive(Debug, Display)]
pub enum ArchiveStatus {
    #[display("ok")]
    Ok,
    #[display("skipped: {_0}")]
    Skipped(String),
    #[display("failed: {_0}")]
    Failed(Error),
}

/// Per-target outcome; produced once, never mutated.
#[derive(Debug)]
pub struct ArchiveResult {
    pub source: PathBuf,
    pub archive_name: String,
    pub status: ArchiveStatus,
    pub elapsed: Duration,
}

impl ArchiveResult {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ArchiveStatus::Ok)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, ArchiveStatus::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ArchiveStatus::Failed(_))
    }

    /// Result for a target whose archive name was already claimed by an
    /// earlier target of the same run.
    pub fn collision(source: PathBuf, name: String, first: PathBuf) -> Self {
        Self {
            source: source.clone(),
            archive_name: name.clone(),
            status: ArchiveStatus::Failed(Error::NameCollision {
                name,
                first,
                second: source,
            }),
            elapsed: Duration::ZERO,
        }
    }
}

/// Archives every regular file under the folder target into one zip in
/// `staging_dir`, honoring the target's ignore rules. Entry names are the
/// paths relative to the folder root, preserving subdirectory structure.
///
/// The staging directory and the destination root are always ignored, so a
/// backup never recurses into its own in-progress output.
pub fn archive_folder(
    target: &FolderTarget,
    staging_dir: &Path,
    destination: &Path,
) -> ArchiveResult {
    let root = target.path().as_path();
    let archive_name = naming::archive_file_name(root);
    let started = Instant::now();

    if !root.is_dir() {
        error!("{:?} is not a folder or doesn't exist, omitted", root);
        return ArchiveResult {
            source: root.to_path_buf(),
            archive_name,
            status: ArchiveStatus::Skipped("not an existing directory".into()),
            elapsed: started.elapsed(),
        };
    }

    info!("Compressing folder: {:?}", root);
    let matcher = IgnoreMatcher::for_folder(root, target.ignore(), &[staging_dir, destination]);
    let res = write_folder_zip(root, &matcher, staging_dir, &archive_name);
    finish_result(root, archive_name, started, res)
}

/// Archives a single file into a one-entry zip named after its path. The
/// entry name is the file's base name only, compressed at the strongest
/// deflate level.
pub fn archive_file(path: &Path, staging_dir: &Path) -> ArchiveResult {
    let archive_name = naming::archive_file_name(path);
    let started = Instant::now();

    if !path.is_file() {
        error!("{:?} is not a file or doesn't exist, omitted", path);
        return ArchiveResult {
            source: path.to_path_buf(),
            archive_name,
            status: ArchiveStatus::Skipped("not an existing file".into()),
            elapsed: started.elapsed(),
        };
    }

    info!("Compressing file: {:?}", path);
    let res = write_file_zip(path, staging_dir, &archive_name);
    finish_result(path, archive_name, started, res)
}

fn finish_result(
    source: &Path,
    archive_name: String,
    started: Instant,
    res: Result<usize>,
) -> ArchiveResult {
    let elapsed = started.elapsed();
    let status = match res {
        Ok(entries) => {
            info!(
                "(ok) {} entries, time: {:.3} s: {}",
                entries,
                elapsed.as_secs_f64(),
                archive_name
            );
            ArchiveStatus::Ok
        }
        Err(e) => {
            error!(
                "(err) time: {:.3} s, archiving {:?}: {}",
                elapsed.as_secs_f64(),
                source,
                e
            );
            ArchiveStatus::Failed(e)
        }
    };
    ArchiveResult {
        source: source.to_path_buf(),
        archive_name,
        status,
        elapsed,
    }
}

fn write_folder_zip(
    root: &Path,
    matcher: &IgnoreMatcher,
    staging_dir: &Path,
    archive_name: &str,
) -> Result<usize> {
    // Enumerate before opening the archive so a walk error leaves no file behind.
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && matcher.includes(entry.path()) {
            files.push(entry.into_path());
        }
    }

    let tmp = NamedTempFile::new_in(staging_dir)?;
    let mut zip = ZipWriter::new(tmp);
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        zip.start_file(entry_name(path.strip_prefix(root)?), options)?;
        let mut reader = File::open(path)?;
        io::copy(&mut reader, &mut zip)?;
    }

    zip.finish()?.persist(staging_dir.join(archive_name))?;
    Ok(files.len())
}

fn write_file_zip(path: &Path, staging_dir: &Path, archive_name: &str) -> Result<usize> {
    let entry = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Io(io::Error::other(format!("{path:?} has no file name"))))?;

    let tmp = NamedTempFile::new_in(staging_dir)?;
    let mut zip = ZipWriter::new(tmp);
    let options = FileOptions::<()>::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    zip.start_file(entry, options)?;
    let mut reader = File::open(path)?;
    io::copy(&mut reader, &mut zip)?;

    zip.finish()?.persist(staging_dir.join(archive_name))?;
    Ok(1)
}

/// Zip entry names always use `/` separators.
fn entry_name(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
