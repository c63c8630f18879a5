//! Run orchestration: init, archive phases, encryption, move, retention.
//!
//! A run is strictly sequential and terminal. Only initialization can fail
//! it; every later phase isolates its own failures and the next phase is
//! always attempted.

use crate::backup::archive::{self, ArchiveResult};
use crate::backup::backup_config::{BackupConfig, BackupTarget, FolderTarget};
use crate::backup::encrypt::{EncryptOutcome, Encryptor};
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::retention::{self, PruneReport};
use crate::backup::{naming, secret, staging};
use chrono::{DateTime, Local};
use getset::Getters;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

static DIVIDER_WIDTH: usize = 80;

/// Logs a divider and the phase name around `f`.
fn run_phase<T>(name: &str, f: impl FnOnce() -> T) -> T {
    info!("{}", "-".repeat(DIVIDER_WIDTH));
    info!("{name}");
    info!("{}", "-".repeat(DIVIDER_WIDTH));
    f()
}

/// Immutable state of one backup run, built once at initialization and
/// threaded through the phases.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct RunContext {
    config: BackupConfig,
    password: Option<RedactedString>,
    started_at: DateTime<Local>,
    staging_dir: PathBuf,
    staging_name: String,
}

/// Aggregate of one completed run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<ArchiveResult>,
    pub encrypt_outcome: Option<EncryptOutcome>,
    pub moved_to: Option<PathBuf>,
    pub prune: Option<PruneReport>,
}

impl RunReport {
    pub fn ok_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}

impl RunContext {
    /// Initializes a run.
    ///
    /// When encryption is enabled the password is loaded first; an
    /// unreadable source or an empty secret fails the whole run before any
    /// filesystem side effect. The staging directory is then created under
    /// `work_dir`, named by the run's start timestamp.
    pub fn new(config: BackupConfig, work_dir: &Path) -> Result<Self> {
        let password = if config.encrypt {
            let path = config
                .password_file
                .as_deref()
                .ok_or(Error::MissingPasswordFile)?;
            let password =
                secret::load_first_line(path).with_msg("Reading password file failed")?;
            if password.is_empty() {
                return Err(Error::EmptyPassword(path.to_path_buf()));
            }
            Some(password)
        } else {
            None
        };

        let started_at = Local::now();
        let staging_dir = staging::create(work_dir, &started_at)
            .map_err(Error::from)
            .with_msg("Creating staging directory failed")?;
        let staging_name = staging::dir_name(&started_at);
        info!("Folder to backup: {staging_name}");

        Ok(Self {
            config,
            password,
            started_at,
            staging_dir,
            staging_name,
        })
    }

    /// Executes the phases in order and aggregates their outcomes.
    ///
    /// Never aborts early: per-target failures, encryption failures, move
    /// failures and prune failures are logged and isolated.
    pub fn run(&self, encryptor: &dyn Encryptor, pool: &ThreadPool) -> RunReport {
        let mut report = RunReport::default();

        let (folder_plan, file_plan, collisions) = self.plan_targets();
        report.results.extend(collisions);

        report.results.extend(run_phase("folders backup", || {
            self.folders_backup(&folder_plan, pool)
        }));
        report.results.extend(run_phase("files backup", || {
            self.files_backup(&file_plan, pool)
        }));
        report.encrypt_outcome = run_phase("encrypt", || self.encrypt(encryptor));
        report.moved_to = run_phase("move backup", || self.move_backup());
        report.prune = run_phase("clean old versions", || self.clean_old());

        info!(
            "Backup finished: {} ok, {} skipped, {} failed",
            report.ok_count(),
            report.skipped_count(),
            report.failed_count()
        );
        report
    }

    /// Claims an archive name for every target. The first target keeps the
    /// name; later targets normalizing to the same name fail upfront instead
    /// of silently overwriting an earlier archive.
    fn plan_targets(&self) -> (Vec<FolderTarget>, Vec<PathBuf>, Vec<ArchiveResult>) {
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        let mut folders = Vec::new();
        let mut files = Vec::new();
        let mut collisions = Vec::new();

        for target in self.config.targets() {
            let source = target.source_path().to_path_buf();
            match claimed.entry(naming::archive_file_name(&source)) {
                Entry::Vacant(vacant) => {
                    vacant.insert(source);
                    match target {
                        BackupTarget::Folder(folder) => folders.push(folder),
                        BackupTarget::File(file) => files.push(file),
                    }
                }
                Entry::Occupied(occupied) => {
                    error!(
                        "Archive name {:?} already claimed by {:?}, omitting {:?}",
                        occupied.key(),
                        occupied.get(),
                        source
                    );
                    collisions.push(ArchiveResult::collision(
                        source,
                        occupied.key().clone(),
                        occupied.get().clone(),
                    ));
                }
            }
        }
        (folders, files, collisions)
    }

    fn folders_backup(&self, folders: &[FolderTarget], pool: &ThreadPool) -> Vec<ArchiveResult> {
        if folders.is_empty() {
            info!("No folders to compress");
            return Vec::new();
        }
        info!("Folders to compress: {}", folders.len());
        pool.install(|| {
            folders
                .par_iter()
                .map(|target| {
                    archive::archive_folder(
                        target,
                        &self.staging_dir,
                        self.config.destination.as_ref(),
                    )
                })
                .collect()
        })
    }

    fn files_backup(&self, files: &[PathBuf], pool: &ThreadPool) -> Vec<ArchiveResult> {
        if files.is_empty() {
            info!("No files to compress");
            return Vec::new();
        }
        info!("Files to compress: {}", files.len());
        pool.install(|| {
            files
                .par_iter()
                .map(|file| archive::archive_file(file, &self.staging_dir))
                .collect()
        })
    }

    /// Best-effort: any failure is a warning and the run proceeds with the
    /// unencrypted staging directory.
    fn encrypt(&self, encryptor: &dyn Encryptor) -> Option<EncryptOutcome> {
        let password = match &self.password {
            Some(password) => password,
            None => {
                info!("Encryption is off");
                return None;
            }
        };

        match encryptor.encrypt(&self.staging_dir, &self.staging_name, password) {
            Ok(EncryptOutcome::Success) => {
                info!("Encryption done successfully");
                Some(EncryptOutcome::Success)
            }
            Ok(EncryptOutcome::NonZeroExit { code, stderr }) => {
                warn!("Encryption was unsuccessful (exit {code:?}): {stderr}");
                Some(EncryptOutcome::NonZeroExit { code, stderr })
            }
            Ok(EncryptOutcome::TimedOut) => {
                warn!("Encryption timed out, moving the staging directory unencrypted");
                Some(EncryptOutcome::TimedOut)
            }
            Err(e) => {
                warn!("Encryption could not run: {e}");
                None
            }
        }
    }

    /// Moves the staging directory under the destination root. On failure
    /// the staging directory is left in place as a recovery artifact; it is
    /// never deleted.
    fn move_backup(&self) -> Option<PathBuf> {
        info!("Moving files...");
        let dest = self.config.destination.join(&self.staging_name);
        match move_dir(&self.staging_dir, &dest) {
            Ok(()) => {
                info!("Moved successfully");
                Some(dest)
            }
            Err(e) => {
                error!(
                    "Moving {:?} to {:?} failed, staging directory retained: {}",
                    self.staging_dir, dest, e
                );
                None
            }
        }
    }

    /// Runs regardless of the move outcome, so a failed move this run does
    /// not block pruning of historical versions.
    fn clean_old(&self) -> Option<PruneReport> {
        match retention::prune(self.config.destination.as_ref(), self.config.keep_versions) {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Scanning destination for old versions failed: {e}");
                None
            }
        }
    }
}

/// Rename first; fall back to copy-then-delete for cross-filesystem moves.
/// The source is removed only after a fully successful copy.
fn move_dir(src: &Path, dest: &Path) -> Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    copy_dir_all(src, dest)?;
    fs::remove_dir_all(src)?;
    Ok(())
}

fn copy_dir_all(src: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{dest:?} already exists"),
        ));
    }
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
