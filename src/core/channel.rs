/*!
 * Credential channel
 *
 * A named pipe (FIFO) used to hand a candidate password to the helper as if
 * it had been typed at its prompt. One conduit is created per run, reused
 * for every attempt, and unlinked on every exit path.
 *
 * The FIFO lives inside a freshly created private directory (mode 0700,
 * created with exclusive semantics), so its name cannot be raced.
 */

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::error::{AttackError, Result};

/// Default permission bits of the FIFO (owner read/write)
pub const DEFAULT_FIFO_MODE: u32 = 0o600;

/// Largest payload (candidate + NUL) written in one atomic, non-blocking write
pub const MAX_PAYLOAD: usize = libc::PIPE_BUF;

const DIR_PREFIX: &str = "chkpwd-";
const FIFO_NAME: &str = "pipe";

/// A single-run FIFO special file
#[derive(Debug)]
pub struct Conduit {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Conduit {
    /// Create the conduit under the system temporary directory
    pub fn create(mode: u32) -> Result<Self> {
        Self::create_in(&std::env::temp_dir(), mode)
    }

    /// Create the conduit under `parent`
    pub fn create_in(parent: &Path, mode: u32) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(parent)
            .map_err(|source| AttackError::ChannelCreation {
                path: parent.to_path_buf(),
                source,
            })?;

        let path = dir.path().join(FIFO_NAME);
        mkfifo(&path, mode).map_err(|source| AttackError::ChannelCreation {
            path: path.clone(),
            source,
        })?;

        log::debug!("Created FIFO {} (mode {:o})", path.display(), mode);

        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `candidate` followed by a NUL byte into the pipe.
    ///
    /// The read side is opened non-blocking first so that a reader is
    /// registered before the write-side open, which would otherwise block
    /// until one appears. Both descriptors are returned open; dropping the
    /// [`Delivery`] closes them.
    pub fn deliver(&self, candidate: &str) -> Result<Delivery> {
        let bytes = candidate.as_bytes();
        if bytes.len() + 1 > MAX_PAYLOAD {
            return Err(AttackError::InvalidCandidate {
                len: bytes.len(),
                max: MAX_PAYLOAD - 1,
            });
        }

        let reader = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(AttackError::Delivery)?;

        let mut writer = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(AttackError::Delivery)?;

        let mut payload = Vec::with_capacity(bytes.len() + 1);
        payload.extend_from_slice(bytes);
        payload.push(0);
        writer.write_all(&payload).map_err(AttackError::Delivery)?;

        Ok(Delivery { reader, writer })
    }

    /// Unlink the FIFO and its private directory. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed FIFO {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove FIFO {}: {}", self.path.display(), e),
        }

        if let Some(dir) = self.dir.take() {
            let dir_path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Failed to remove {}: {}", dir_path.display(), e);
                }
            }
        }
    }
}

impl Drop for Conduit {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Both ends of the pipe for one attempt
#[derive(Debug)]
pub struct Delivery {
    reader: File,
    // Held open until the helper has run
    #[allow(dead_code)]
    writer: File,
}

impl Delivery {
    /// Read side, to become the helper's standard input
    pub fn reader(&self) -> &File {
        &self.reader
    }
}

fn mkfifo(path: &Path, mode: u32) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    fn read_all_available(mut file: &File) -> Vec<u8> {
        let mut buf = [0u8; 64];
        let n = file.read(&mut buf).expect("data available");
        buf[..n].to_vec()
    }

    #[test]
    fn test_create_makes_private_fifo() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();

        let meta = std::fs::metadata(conduit.path()).unwrap();
        assert!(meta.file_type().is_fifo());
        assert_eq!(meta.permissions().mode() & 0o077, 0);

        let parent = conduit.path().parent().unwrap();
        let dir_mode = std::fs::metadata(parent).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn test_create_fails_in_missing_directory() {
        let scratch = tempfile::tempdir().unwrap();
        let missing = scratch.path().join("does/not/exist");

        let err = Conduit::create_in(&missing, DEFAULT_FIFO_MODE).unwrap_err();
        assert!(matches!(err, AttackError::ChannelCreation { .. }));
    }

    #[test]
    fn test_deliver_without_external_reader() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();

        // Nobody else has the FIFO open; this must not hang
        let delivery = conduit.deliver("s3cret").unwrap();
        assert_eq!(read_all_available(delivery.reader()), b"s3cret\0");
    }

    #[test]
    fn test_deliver_reuses_conduit() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();

        // Unread bytes of an attempt are discarded once both ends close
        drop(conduit.deliver("first").unwrap());

        let delivery = conduit.deliver("second").unwrap();
        assert_eq!(read_all_available(delivery.reader()), b"second\0");
    }

    #[test]
    fn test_deliver_empty_candidate() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();

        let delivery = conduit.deliver("").unwrap();
        assert_eq!(read_all_available(delivery.reader()), b"\0");
    }

    #[test]
    fn test_deliver_rejects_oversized_candidate() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();

        let huge = "a".repeat(MAX_PAYLOAD);
        let err = conduit.deliver(&huge).unwrap_err();
        assert!(matches!(err, AttackError::InvalidCandidate { .. }));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let scratch = tempfile::tempdir().unwrap();
        let mut conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();
        let path = conduit.path().to_path_buf();

        conduit.destroy();
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());

        conduit.destroy();
        assert!(matches!(
            conduit.deliver("late"),
            Err(AttackError::Delivery(_))
        ));
    }

    #[test]
    fn test_drop_removes_fifo() {
        let scratch = tempfile::tempdir().unwrap();
        let path = {
            let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();
            conduit.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
