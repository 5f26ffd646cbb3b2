//! Current user lookup (`unix_chkpwd` only checks the caller's own account)

use std::ffi::CStr;

use super::error::{AttackError, Result};

/// Used when sysconf has no hint
const PASSWD_BUF_FALLBACK: usize = 1024;
/// Give up growing the buffer past this
const PASSWD_BUF_MAX: usize = 1 << 20;

/// Login name of the real uid
pub fn current_username() -> Result<String> {
    // SAFETY: getuid never fails
    let uid = unsafe { libc::getuid() };
    username_for(uid)
}

pub fn username_for(uid: libc::uid_t) -> Result<String> {
    lookup(uid, initial_buffer_len())
}

fn initial_buffer_len() -> usize {
    // SAFETY: sysconf has no preconditions
    let hint = unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) };
    usize::try_from(hint)
        .ok()
        .filter(|&len| len > 0)
        .unwrap_or(PASSWD_BUF_FALLBACK)
}

/// `getpwuid_r`, doubling the buffer while it reports ERANGE
fn lookup(uid: libc::uid_t, initial_len: usize) -> Result<String> {
    let lookup_error = |reason: String| AttackError::UserLookup { uid, reason };

    let mut buf_len = initial_len.max(1);
    loop {
        // SAFETY: passwd is plain old data; all-zero is a valid value
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut buf = vec![0 as libc::c_char; buf_len];
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        // SAFETY: all pointers reference live, correctly sized buffers
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };

        if rc == libc::ERANGE && buf_len < PASSWD_BUF_MAX {
            buf_len = (buf_len * 2).min(PASSWD_BUF_MAX);
            log::debug!("passwd buffer too small, retrying with {} bytes", buf_len);
            continue;
        }
        if rc != 0 {
            return Err(lookup_error(
                std::io::Error::from_raw_os_error(rc).to_string(),
            ));
        }
        if result.is_null() || pwd.pw_name.is_null() {
            return Err(lookup_error("no passwd entry".to_string()));
        }

        // SAFETY: pw_name points into `buf`, NUL-terminated by getpwuid_r
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Ok(name.to_string_lossy().into_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_uid_zero() {
        assert_eq!(username_for(0).unwrap(), "root");
    }

    #[test]
    fn test_current_user_resolves() {
        let name = current_username().unwrap();
        assert!(!name.is_empty());
    }

    #[test]
    fn test_buffer_grows_until_entry_fits() {
        assert_eq!(lookup(0, 1).unwrap(), "root");
    }

    #[test]
    fn test_initial_buffer_len_positive() {
        assert!(initial_buffer_len() > 0);
    }

    #[test]
    fn test_unknown_uid() {
        let err = username_for(4_000_000_000).unwrap_err();
        assert!(matches!(err, AttackError::UserLookup { .. }));
    }
}
