//! Fatal diagnostics.
//!
//! Every failure in the wrapper ends here: one LOG_ERR line to syslog,
//! tagged with the configured identity, then a non-zero exit. Nothing is
//! written to stdout or stderr under any circumstance; the CGI stream
//! belongs to the script, and wrapper internals must not reach remote
//! clients. That also rules out panicking on this path, so message
//! sanitization is total rather than fallible.

use std::ffi::CString;
use std::fmt::Display;
use std::process;

/// Longest message forwarded to syslog; anything longer is truncated.
const MAX_LINE: usize = 1024;

/// Log a fatal condition and terminate with a failure status.
pub fn report_fatal(log_ident: &str, message: impl Display) -> ! {
    emit(log_ident, &message.to_string());
    process::exit(1);
}

/// Write one LOG_ERR line tagged with `ident`. Callable at any point and
/// under any privilege state.
fn emit(ident: &str, message: &str) {
    let ident = sanitize(ident);
    let message = sanitize(message);
    // openlog keeps the ident pointer, so the CString must stay alive
    // until after closelog.
    unsafe {
        libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_DAEMON);
        libc::syslog(
            libc::LOG_ERR,
            b"%s\0".as_ptr() as *const libc::c_char,
            message.as_ptr(),
        );
        libc::closelog();
    }
}

/// Cap the length and drop NUL bytes so the conversion cannot fail.
fn sanitize(text: &str) -> CString {
    let bytes: Vec<u8> = text.bytes().filter(|&b| b != 0).take(MAX_LINE).collect();
    // NUL bytes were just removed, so this never takes the fallback.
    CString::new(bytes).unwrap_or_default()
}
