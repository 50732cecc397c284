//! Terminal failure conditions.
//!
//! Every variant ends the process: the only consumer is the fatal reporter,
//! which writes one syslog line and exits non-zero. There is no recovery
//! path and no variant is ever downgraded to a warning.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatalError {
    /// The invoking process is not the trusted owner identity.
    #[error("caller verification failed: {reason}")]
    TrustViolation { reason: String },

    /// setuid-to-self failed; the privilege state is unresolved.
    #[error("failed to drop privileges: {source}")]
    Privilege { source: io::Error },

    /// The process image could not be replaced with the script.
    #[error("failed to exec {script}: {source}")]
    Exec { script: String, source: io::Error },
}
