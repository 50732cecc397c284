//! Setuid privilege-boundary wrapper for CGI scripts.
//!
//! The binary is installed setuid to the CGI owner and fronts one configured
//! script. It refuses callers other than the configured web-server identity,
//! then sheds the invoker's privilege before handing the process over to the
//! script via execve. Failures go to syslog only; the invoker sees nothing
//! but a non-zero exit.

pub mod config;
pub mod error;
pub mod invoke;
pub mod privs;
pub mod report;
pub mod verify;

pub use config::WrapperConfig;
pub use error::FatalError;
