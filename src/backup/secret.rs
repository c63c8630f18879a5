//! Password loading from a secret file.

use crate::backup::redacted::RedactedString;
use crate::backup::result_error::result::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads the first line of `path`, trimmed of surrounding whitespace.
///
/// The caller decides whether an empty secret is acceptable.
pub fn load_first_line(path: &Path) -> Result<RedactedString> {
    let file = File::open(path)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    Ok(RedactedString::builder().inner(line.trim()).build())
}
