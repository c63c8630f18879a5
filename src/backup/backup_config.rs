use crate::backup::encrypt::external::ExternalEncryptorConfig;
use crate::backup::validate::validate_writable_dir;
use bon::Builder;
use derive_more::From;
use getset::Getters;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use validator::Validate;

#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    #[serde(default)]
    pub encrypt: bool,
    pub password_file: Option<Arc<Path>>,
    #[validate(custom(function = validate_writable_dir))]
    pub destination: Arc<Path>,
    #[serde(default)]
    pub keep_versions: i64,
    #[serde(default)]
    pub folders: Arc<Vec<FolderTarget>>,
    #[serde(default)]
    pub files: Arc<Vec<PathBuf>>,
    #[serde(default)]
    pub encryptor: Arc<ExternalEncryptorConfig>,
}

impl BackupConfig {
    /// All configured targets, folders first, in configuration order.
    pub fn targets(&self) -> impl Iterator<Item = BackupTarget> + '_ {
        self.folders
            .iter()
            .cloned()
            .map(BackupTarget::from)
            .chain(self.files.iter().cloned().map(BackupTarget::from))
    }
}

/// A folder to archive recursively, with optional ignore prefixes.
///
/// Ignore entries are path prefixes, either absolute or relative to the
/// folder itself; no wildcard support.
#[derive(Clone, Debug, Serialize, Deserialize, Builder, Getters, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct FolderTarget {
    #[builder(into)]
    path: PathBuf,
    #[serde(default)]
    #[builder(default, into)]
    ignore: Vec<PathBuf>,
}

/// One configured backup source.
#[derive(Clone, Debug, From)]
pub enum BackupTarget {
    Folder(FolderTarget),
    File(PathBuf),
}

impl BackupTarget {
    pub fn source_path(&self) -> &Path {
        match self {
            BackupTarget::Folder(folder) => folder.path(),
            BackupTarget::File(path) => path,
        }
    }
}
