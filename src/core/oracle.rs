/*!
 * Verification oracle
 *
 * Runs the PAM `unix_chkpwd` helper as `<helper> <username> nullok` with the
 * conduit's read side as stdin. Exit status 0 means the password was
 * accepted; any other status, including death by signal, is a rejection.
 */

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::channel::Conduit;
use super::error::{AttackError, Result};

/// Name of the PAM verification helper
pub const HELPER_NAME: &str = "unix_chkpwd";

/// Fixed second argument: do not fail on empty passwords
pub const NULLOK_FLAG: &str = "nullok";

/// Where the helper usually lives when `which` misses it (sbin is often not in PATH)
const FALLBACK_DIRS: [&str; 3] = ["/usr/sbin", "/sbin", "/usr/local/sbin"];

/// Accept/reject signal for one (username, candidate) pair
pub trait Oracle {
    /// `Ok(true)` if accepted, `Ok(false)` if rejected, `Err` only when the
    /// attempt itself could not be carried out.
    fn attempt(&mut self, username: &str, candidate: &str) -> Result<bool>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn attempt(&mut self, username: &str, candidate: &str) -> Result<bool> {
        (**self).attempt(username, candidate)
    }
}

/// Resolve the installed `unix_chkpwd`
pub fn locate_helper() -> Result<PathBuf> {
    locate(HELPER_NAME)
}

/// Resolve `name` via `which`, then `PATH`, then the usual sbin directories
pub fn locate(name: &str) -> Result<PathBuf> {
    if let Some(path) = which(name) {
        if path.is_file() {
            return Ok(path);
        }
        log::warn!(
            "Path indicated by \"which\" utility \"{}\" does not exist",
            path.display()
        );
    }

    let path_dirs: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).collect())
        .unwrap_or_default();

    path_dirs
        .iter()
        .map(PathBuf::as_path)
        .chain(FALLBACK_DIRS.iter().map(Path::new))
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| AttackError::HelperNotFound(name.to_string()))
}

/// Validate an explicitly configured helper path
pub fn verify_helper(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(AttackError::HelperNotFound(path.display().to_string()))
    }
}

fn which(name: &str) -> Option<PathBuf> {
    let output = Command::new("which")
        .arg(name)
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if found.is_empty() {
        None
    } else {
        Some(PathBuf::from(found))
    }
}

/// Run the helper once with `input` as its stdin
pub fn check(helper: &Path, username: &str, input: &File) -> Result<bool> {
    let launch_error = |source| AttackError::HelperLaunch {
        path: helper.to_path_buf(),
        source,
    };

    let stdin = input.try_clone().map_err(launch_error)?;
    let status = Command::new(helper)
        .arg(username)
        .arg(NULLOK_FLAG)
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(launch_error)?;

    Ok(is_accepted(status))
}

/// Only a clean exit with status 0 counts as acceptance
pub fn is_accepted(status: ExitStatus) -> bool {
    status.code() == Some(0)
}

/// The real oracle: conduit + `unix_chkpwd`
pub struct ChkpwdOracle<'a> {
    helper: PathBuf,
    conduit: &'a Conduit,
}

impl<'a> ChkpwdOracle<'a> {
    pub fn new(helper: PathBuf, conduit: &'a Conduit) -> Self {
        Self { helper, conduit }
    }
}

impl Oracle for ChkpwdOracle<'_> {
    fn attempt(&mut self, username: &str, candidate: &str) -> Result<bool> {
        // Both pipe ends close when `delivery` drops, on success or error
        let delivery = match self.conduit.deliver(candidate) {
            Ok(delivery) => delivery,
            // Far beyond anything the helper reads; cannot be the password
            Err(AttackError::InvalidCandidate { len, max }) => {
                log::warn!("Skipping {} byte candidate (max {})", len, max);
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        check(&self.helper, username, delivery.reader())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::DEFAULT_FIFO_MODE;
    use std::os::unix::process::ExitStatusExt;

    // `sh <script> nullok`: the username slot carries the script path
    fn script(dir: &Path, body: &str) -> String {
        let path = dir.join("helper.sh");
        std::fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    #[test]
    fn test_exit_status_mapping() {
        assert!(is_accepted(ExitStatus::from_raw(0)));
        for code in [1, 2, 7, 130] {
            assert!(!is_accepted(ExitStatus::from_raw(code << 8)), "exit {code}");
        }
        // Killed by SIGKILL / SIGINT
        assert!(!is_accepted(ExitStatus::from_raw(libc::SIGKILL)));
        assert!(!is_accepted(ExitStatus::from_raw(libc::SIGINT)));
    }

    #[test]
    fn test_check_nonzero_exits_reject() {
        let scratch = tempfile::tempdir().unwrap();
        let stdin = File::open("/dev/null").unwrap();

        for code in [1, 2, 130] {
            let helper = script(scratch.path(), &format!("exit {code}\n"));
            assert!(!check(&sh(), &helper, &stdin).unwrap(), "exit {code}");
        }

        let helper = script(scratch.path(), "kill -9 $$\n");
        assert!(!check(&sh(), &helper, &stdin).unwrap());

        let helper = script(scratch.path(), "exit 0\n");
        assert!(check(&sh(), &helper, &stdin).unwrap());
    }

    #[test]
    fn test_check_passes_fixed_flag() {
        let scratch = tempfile::tempdir().unwrap();
        let stdin = File::open("/dev/null").unwrap();
        let helper = script(scratch.path(), "[ \"$1\" = \"nullok\" ] && [ $# -eq 1 ]\n");

        assert!(check(&sh(), &helper, &stdin).unwrap());
    }

    #[test]
    fn test_check_missing_executable_is_launch_error() {
        let scratch = tempfile::tempdir().unwrap();
        let stdin = File::open("/dev/null").unwrap();
        let missing = scratch.path().join("no-such-helper");

        let err = check(&missing, "alice", &stdin).unwrap_err();
        assert!(matches!(err, AttackError::HelperLaunch { .. }));
    }

    #[test]
    fn test_oracle_feeds_candidate_through_conduit() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();
        let helper = script(
            scratch.path(),
            "[ \"$(dd bs=512 count=1 2>/dev/null | tr -d '\\000')\" = \"hunter2\" ]\n",
        );

        let mut oracle = ChkpwdOracle::new(sh(), &conduit);
        assert!(!oracle.attempt(&helper, "hunter1").unwrap());
        assert!(oracle.attempt(&helper, "hunter2").unwrap());
        assert!(!oracle.attempt(&helper, "Hunter2").unwrap());
    }

    #[test]
    fn test_oversized_candidate_is_rejected() {
        let scratch = tempfile::tempdir().unwrap();
        let conduit = Conduit::create_in(scratch.path(), DEFAULT_FIFO_MODE).unwrap();
        let helper = script(scratch.path(), "exit 0\n");

        let mut oracle = ChkpwdOracle::new(sh(), &conduit);
        let huge = "a".repeat(crate::core::channel::MAX_PAYLOAD);
        assert!(!oracle.attempt(&helper, &huge).unwrap());
        assert!(oracle.attempt(&helper, "short").unwrap());
    }

    #[test]
    fn test_locate_finds_shell() {
        let path = locate("sh").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_locate_missing_helper() {
        let err = locate("definitely-not-a-real-helper-binary").unwrap_err();
        assert!(matches!(err, AttackError::HelperNotFound(_)));
    }

    #[test]
    fn test_verify_helper_rejects_directory() {
        let scratch = tempfile::tempdir().unwrap();
        assert!(verify_helper(scratch.path()).is_err());
    }
}
