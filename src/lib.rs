/*!
 * Dictionary attack against the local PAM `unix_chkpwd` helper
 *
 * Candidates are written to a private FIFO that becomes the helper's
 * stdin, exactly as if typed at its prompt; the helper's exit status
 * tells whether the password is right. Educational use only.
 */

pub mod console;
pub mod core;

pub use crate::core::*;
