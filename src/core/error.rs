//! Error types for the dictionary attack
//!
//! A rejected candidate is not an error: it is the `Ok(false)` answer of the
//! oracle. Everything in here aborts the run.
//! Error messages MUST NOT contain candidate passwords.

use std::io;
use std::path::PathBuf;

/// Fatal errors raised while preparing or running an attack
#[derive(Debug, thiserror::Error)]
pub enum AttackError {
    #[error("Failed to create pipe at {path}: {source}")]
    ChannelCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to deliver candidate through pipe: {0}")]
    Delivery(#[source] io::Error),

    #[error("Candidate of {len} bytes does not fit in a single pipe write (max {max})")]
    InvalidCandidate { len: usize, max: usize },

    #[error("Could not find \"{0}\" utility")]
    HelperNotFound(String),

    #[error("Failed to launch {path}: {source}")]
    HelperLaunch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read dictionary {path}: {source}")]
    DictionaryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not resolve username for uid {uid}: {reason}")]
    UserLookup { uid: u32, reason: String },

    #[error("Canceled by user")]
    Canceled,
}

pub type Result<T> = std::result::Result<T, AttackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(AttackError::Canceled.to_string(), "Canceled by user");
        assert_eq!(
            AttackError::HelperNotFound("unix_chkpwd".to_string()).to_string(),
            "Could not find \"unix_chkpwd\" utility"
        );
    }

    #[test]
    fn test_source_is_chained() {
        use std::error::Error;

        let err = AttackError::Delivery(io::Error::from_raw_os_error(libc::ENOSPC));
        assert!(err.source().is_some());
    }
}
