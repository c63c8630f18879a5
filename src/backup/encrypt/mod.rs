//! Best-effort encryption of the staging directory.
//!
//! Encryption is delegated to an external tool treated as an opaque black
//! box; the tool is reached through the narrow [`Encryptor`] seam so tests
//! can substitute a fake implementation.

pub mod external;

use crate::backup::redacted::RedactedString;
use crate::backup::result_error::result::Result;
use std::path::Path;

/// Outcome of an encryption attempt.
///
/// Anything other than `Success` is reported as a warning by the caller and
/// the run proceeds with the unencrypted staging directory; losing
/// encryption must never lose the backup itself.
#[derive(Debug)]
pub enum EncryptOutcome {
    Success,
    NonZeroExit { code: Option<i32>, stderr: String },
    TimedOut,
}

impl EncryptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EncryptOutcome::Success)
    }
}

pub trait Encryptor {
    /// Encrypts the contents of `staging_dir` into a bundle derived from
    /// `archive_base_name`, protected by `password`.
    ///
    /// `Err` means the tool could not be invoked at all.
    fn encrypt(
        &self,
        staging_dir: &Path,
        archive_base_name: &str,
        password: &RedactedString,
    ) -> Result<EncryptOutcome>;
}
