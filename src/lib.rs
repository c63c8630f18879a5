//! # zipkeep
//!
//! A backup tool that zips configured folders and files into timestamped,
//! optionally-encrypted bundles and prunes old versions.
//!
//! ## Features
//!
//! - **Folder and file targets**: recursive zip archives with prefix-based
//!   ignore rules, one archive per target
//! - **Timestamped staging**: each run stages into a `YYYY.MM.DD-HH.MM.SS`
//!   directory before moving it to the destination
//! - **Best-effort encryption**: an external 7-Zip-style tool over the whole
//!   staging directory; failures degrade to an unencrypted backup
//! - **Retention management**: keep the N most recent versions at the
//!   destination, leaving unrelated directories untouched
//! - **Failure isolation**: a broken target, a failed move, or an
//!   undeletable old version never aborts the rest of the run
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use zipkeep::backup::backup_config::BackupConfig;
//! use zipkeep::backup::runner::RunContext;
//!
//! // Load configuration from a YAML file
//! let config: BackupConfig = serde_yml::from_reader(std::fs::File::open("config.yaml")?)?;
//!
//! // Run one backup round
//! let pool = rayon::ThreadPoolBuilder::new().build()?;
//! let ctx = RunContext::new(config, Path::new("."))?;
//! let encryptor = ctx.config().encryptor.clone();
//! ctx.run(encryptor.as_ref(), &pool);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
