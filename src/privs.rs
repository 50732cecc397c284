//! Irreversible privilege drop.

use std::io;

use crate::error::FatalError;

/// Set the real (and saved) uid to the current effective uid, so the
/// effective identity is the only identity the process has left. After this
/// returns there is no way back to the invoker's privilege. Must run after
/// the caller check and strictly before the exec.
pub fn drop_privilege() -> Result<(), FatalError> {
    let euid = unsafe { libc::geteuid() };
    let ret = unsafe { libc::setuid(euid) };
    if ret != 0 {
        return Err(FatalError::Privilege {
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}
