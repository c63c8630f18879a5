//! External 7-Zip-style encryptor invoked as a subprocess.

use crate::backup::encrypt::{EncryptOutcome, Encryptor};
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::result::Result;
use bon::Builder;
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use validator::Validate;

static POLL_INTERVAL: Duration = Duration::from_millis(200);

fn default_program() -> PathBuf {
    PathBuf::from("7z")
}

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

/// Configuration of the external encryption tool.
///
/// The executable location is configurable instead of hardcoded. The timeout
/// bounds the blocking wait on the subprocess; expiry is a non-fatal outcome,
/// consistent with the best-effort encryption policy.
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct ExternalEncryptorConfig {
    #[serde(default = "default_program")]
    #[builder(default = default_program(), into)]
    program: PathBuf,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    #[builder(default = default_timeout())]
    timeout: Duration,
}

impl Default for ExternalEncryptorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout: default_timeout(),
        }
    }
}

impl Encryptor for ExternalEncryptorConfig {
    /// Runs `<program> a <base>.7z -sdel -mhe=on -p<password> -y *` inside
    /// the staging directory. `-sdel` makes the tool remove the archives it
    /// swallowed; `-mhe=on` also hides the entry names.
    fn encrypt(
        &self,
        staging_dir: &Path,
        archive_base_name: &str,
        password: &RedactedString,
    ) -> Result<EncryptOutcome> {
        info!(
            "Encrypting staging directory {:?} with {:?}",
            staging_dir, self.program
        );
        let mut child = Command::new(&self.program)
            .arg("a")
            .arg(format!("{archive_base_name}.7z"))
            .arg("-sdel")
            .arg("-mhe=on")
            .arg(format!("-p{}", password.inner()))
            .arg("-y")
            .arg("*")
            .current_dir(staging_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let deadline = Instant::now() + *self.timeout();
        loop {
            match child.try_wait()? {
                Some(status) if status.success() => return Ok(EncryptOutcome::Success),
                Some(status) => {
                    let mut stderr = String::new();
                    if let Some(mut pipe) = child.stderr.take() {
                        let _ = pipe.read_to_string(&mut stderr);
                    }
                    return Ok(EncryptOutcome::NonZeroExit {
                        code: status.code(),
                        stderr,
                    });
                }
                None if Instant::now() >= deadline => {
                    debug!("Encryptor exceeded {:?}, killing it", self.timeout());
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(EncryptOutcome::TimedOut);
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        }
    }
}
