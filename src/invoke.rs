//! Process image replacement.
//!
//! The wrapper's entire delivery is one execve: the configured script takes
//! over this process with the received argument vector and environment block
//! forwarded verbatim. No filtering or rewriting happens here; whatever the
//! web server passed in is what the script sees. Sanitizing CGI input is the
//! script's job.

use std::ffi::{CString, OsString};
use std::io;
use std::os::unix::ffi::OsStringExt;
use std::ptr;

use crate::config::WrapperConfig;
use crate::error::FatalError;

extern "C" {
    // The environment exactly as execve delivered it, terminal NULL included.
    // The typed accessors in std re-parse entries and drop any without a '='.
    static environ: *const *const libc::c_char;
}

/// Replace the current process with the configured script. On success this
/// never returns; the returned value is always the reason the exec failed.
pub fn run_script(cfg: &WrapperConfig) -> FatalError {
    exec(cfg.script_path, argument_vector(), unsafe { environ })
}

/// Snapshot of the wrapper's own argument vector, element 0 included. The
/// script inherits the name the wrapper was invoked under, not the script
/// path.
fn argument_vector() -> Vec<OsString> {
    std::env::args_os().collect()
}

/// execve(2). Only ever returns the failure. `envp` must be a NULL-terminated
/// array in the shape execve hands out, alive across the call.
fn exec(script: &str, argv: Vec<OsString>, envp: *const *const libc::c_char) -> FatalError {
    let path = match CString::new(script) {
        Ok(path) => path,
        Err(_) => return invalid(script, "script path contains a NUL byte"),
    };
    let argv = match to_cstring_vec(argv) {
        Ok(argv) => argv,
        Err(_) => return invalid(script, "argument vector contains a NUL byte"),
    };

    let argv_ptrs = with_terminating_null(&argv);

    // Returning from execve at all means it failed.
    unsafe {
        libc::execve(path.as_ptr(), argv_ptrs.as_ptr(), envp);
    }

    FatalError::Exec {
        script: script.to_string(),
        source: io::Error::last_os_error(),
    }
}

fn invalid(script: &str, what: &str) -> FatalError {
    FatalError::Exec {
        script: script.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, what.to_string()),
    }
}

/// Convert to C strings, preserving order. Fails on interior NUL bytes,
/// which execve could never carry.
fn to_cstring_vec(items: Vec<OsString>) -> Result<Vec<CString>, std::ffi::NulError> {
    items
        .into_iter()
        .map(|item| CString::new(item.into_vec()))
        .collect()
}

/// Pointer array in the shape execve expects. The pointers borrow from
/// `items`, which must stay alive across the call.
fn with_terminating_null(items: &[CString]) -> Vec<*const libc::c_char> {
    let mut ptrs: Vec<*const libc::c_char> = items.iter().map(|item| item.as_ptr()).collect();
    ptrs.push(ptr::null());
    ptrs
}
