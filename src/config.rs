//! Build-time wrapper configuration.
//!
//! The script path, trusted owner identity, and syslog tag are chosen when
//! the binary is compiled (see build.rs and the CGIGATE_* build environment)
//! and assembled here into one immutable struct. Components receive it
//! explicitly; nothing reads configuration through globals.

// Constants generated by the build script.
mod compiled {
    include!(concat!(env!("OUT_DIR"), "/wrapper_config.rs"));
}

/// Configuration baked into the binary.
///
/// | field         | meaning                                        |
/// |---------------|------------------------------------------------|
/// | `script_path` | target executable to exec                      |
/// | `owner_uid`   | required owner uid of the invoking process     |
/// | `owner_gid`   | required owner gid of the invoking process     |
/// | `log_ident`   | tag attached to every syslog line              |
#[derive(Debug, Clone)]
pub struct WrapperConfig {
    pub script_path: &'static str,
    pub owner_uid: libc::uid_t,
    pub owner_gid: libc::gid_t,
    pub log_ident: &'static str,
}

impl WrapperConfig {
    /// The configuration this binary was compiled with.
    pub fn compiled() -> Self {
        Self {
            script_path: compiled::SCRIPT_PATH,
            owner_uid: compiled::OWNER_UID as libc::uid_t,
            owner_gid: compiled::OWNER_GID as libc::gid_t,
            log_ident: compiled::LOG_IDENT,
        }
    }
}
