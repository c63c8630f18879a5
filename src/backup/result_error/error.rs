use crate::backup::result_error::WithMsg;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error("password file {0:?} is empty")]
    EmptyPassword(PathBuf),
    #[error("encryption is enabled but no password_file is configured")]
    MissingPasswordFile,
    #[error("archive name {name:?} for {second:?} already claimed by {first:?}")]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("{msg}: {error}")]
    WithMsg { msg: String, error: Box<Error> },
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Self::Io(value.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);

        match error {
            Error::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_with_msg() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);
        let error_with_msg = error.with_msg("Custom message");

        match error_with_msg {
            Error::WithMsg { msg, .. } => assert_eq!(msg, "Custom message"),
            _ => panic!("Expected WithMsg error"),
        }
    }

    #[test]
    fn test_error_with_msg_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error).with_msg("Operation failed");
        let error_str = error.to_string();

        assert!(error_str.contains("Operation failed"));
        assert!(error_str.contains("file not found"));
    }

    #[test]
    fn test_name_collision_display() {
        let error = Error::NameCollision {
            name: "home_user_docs.zip".into(),
            first: PathBuf::from("/home/user/docs"),
            second: PathBuf::from("/home/user_docs"),
        };
        let error_str = error.to_string();

        assert!(error_str.contains("home_user_docs.zip"));
        assert!(error_str.contains("claimed"));
    }

    #[test]
    fn test_empty_password_display() {
        let error = Error::EmptyPassword(PathBuf::from("/secrets/psw"));
        assert!(error.to_string().contains("psw"));
    }
}
