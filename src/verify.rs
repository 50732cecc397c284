//! Caller verification.
//!
//! The wrapper is setuid and must only ever act on behalf of the web server
//! it was installed for. The server is the parent process, so authorization
//! means: the parent's real uid/gid equal the owner identity compiled into
//! the binary. Anything that prevents resolving the parent's identity counts
//! as a refusal; this check fails closed.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::WrapperConfig;
use crate::error::FatalError;

const PROC_ROOT: &str = "/proc";

/// Real uid/gid owning a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Credentials {
    uid: libc::uid_t,
    gid: libc::gid_t,
}

/// Check that the invoking (parent) process is owned by the configured
/// trusted identity. `Ok(())` authorizes the wrapper to proceed; any error
/// means the invocation must be refused.
pub fn check_caller(cfg: &WrapperConfig) -> Result<(), FatalError> {
    let ppid = unsafe { libc::getppid() };
    let creds = match read_credentials(Path::new(PROC_ROOT), ppid) {
        Ok(creds) => creds,
        Err(err) => {
            return Err(FatalError::TrustViolation {
                reason: format!("cannot resolve the owner of parent process {ppid}: {err:#}"),
            })
        }
    };

    // The parent may have exited while its status file was being read; the
    // wrapper would then be reparented and the credentials above describe
    // the wrong process.
    let ppid_now = unsafe { libc::getppid() };
    if ppid_now != ppid {
        return Err(FatalError::TrustViolation {
            reason: format!("parent process changed from {ppid} to {ppid_now} during verification"),
        });
    }

    if creds.uid != cfg.owner_uid {
        return Err(FatalError::TrustViolation {
            reason: format!(
                "parent process {ppid} is owned by uid {}, expected uid {}",
                creds.uid, cfg.owner_uid
            ),
        });
    }
    if creds.gid != cfg.owner_gid {
        return Err(FatalError::TrustViolation {
            reason: format!(
                "parent process {ppid} is owned by gid {}, expected gid {}",
                creds.gid, cfg.owner_gid
            ),
        });
    }
    Ok(())
}

/// Read the real uid/gid of `pid` from `<proc_root>/<pid>/status`.
fn read_credentials(proc_root: &Path, pid: libc::pid_t) -> Result<Credentials> {
    let status_path = proc_root.join(pid.to_string()).join("status");
    let text = fs::read_to_string(&status_path)
        .with_context(|| format!("failed to read {}", status_path.display()))?;
    parse_status(&text).with_context(|| format!("malformed {}", status_path.display()))
}

/// Extract the real uid and gid from proc status text. The `Uid:` and `Gid:`
/// rows carry four columns (real, effective, saved, filesystem); ownership
/// follows the real id in the first column.
fn parse_status(text: &str) -> Result<Credentials> {
    let mut uid = None;
    let mut gid = None;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("Uid:") {
            uid = Some(parse_first_id(rest).context("invalid Uid: row")?);
        } else if let Some(rest) = line.strip_prefix("Gid:") {
            gid = Some(parse_first_id(rest).context("invalid Gid: row")?);
        }
    }
    match (uid, gid) {
        (Some(uid), Some(gid)) => Ok(Credentials { uid, gid }),
        _ => bail!("missing Uid:/Gid: rows"),
    }
}

fn parse_first_id(row: &str) -> Result<u32> {
    row.split_whitespace()
        .next()
        .context("empty row")?
        .parse()
        .context("not a numeric id")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SAMPLE_STATUS: &str = "Name:\thttpd\n\
        Umask:\t0022\n\
        State:\tS (sleeping)\n\
        Tgid:\t4242\n\
        Pid:\t4242\n\
        PPid:\t1\n\
        Uid:\t65534\t65534\t65534\t65534\n\
        Gid:\t65533\t65533\t65533\t65533\n\
        Groups:\t65533\n";

    fn test_config(uid: libc::uid_t, gid: libc::gid_t) -> WrapperConfig {
        WrapperConfig {
            script_path: "/bin/true",
            owner_uid: uid,
            owner_gid: gid,
            log_ident: "cgigate (test)",
        }
    }

    fn own_parent_credentials() -> Credentials {
        let ppid = unsafe { libc::getppid() };
        read_credentials(Path::new(PROC_ROOT), ppid)
            .unwrap_or_else(|err| panic!("cannot read own parent credentials: {err:#}"))
    }

    #[test]
    fn test_parse_status_takes_real_ids() {
        let creds = parse_status(SAMPLE_STATUS).unwrap();
        assert_eq!(
            creds,
            Credentials {
                uid: 65534,
                gid: 65533,
            }
        );
    }

    #[test]
    fn test_parse_status_single_space_columns() {
        let creds = parse_status("Uid: 7 8 9 10\nGid: 11 12 13 14\n").unwrap();
        assert_eq!(creds, Credentials { uid: 7, gid: 11 });
    }

    #[test]
    fn test_parse_status_missing_gid_row() {
        let err = parse_status("Name:\tx\nUid:\t0\t0\t0\t0\n").unwrap_err();
        assert!(
            err.to_string().contains("missing Uid:/Gid:"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_parse_status_rejects_non_numeric_id() {
        let err = parse_status("Uid:\tabc\t0\t0\t0\nGid:\t0\t0\t0\t0\n").unwrap_err();
        assert!(
            err.to_string().contains("invalid Uid: row"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_parse_status_rejects_empty_uid_row() {
        let err = parse_status("Uid:\nGid:\t0\t0\t0\t0\n").unwrap_err();
        assert!(
            err.to_string().contains("invalid Uid: row"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_read_credentials_from_fake_proc() {
        let proc_root = tempfile::tempdir().unwrap();
        let dir = proc_root.path().join("4242");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("status"), SAMPLE_STATUS).unwrap();

        let creds = read_credentials(proc_root.path(), 4242).unwrap();
        assert_eq!(
            creds,
            Credentials {
                uid: 65534,
                gid: 65533,
            }
        );
    }

    #[test]
    fn test_read_credentials_missing_process_fails_closed() {
        let proc_root = tempfile::tempdir().unwrap();
        let err = read_credentials(proc_root.path(), 4242).unwrap_err();
        assert!(
            err.to_string().contains("failed to read"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_read_credentials_garbage_status_fails_closed() {
        let proc_root = tempfile::tempdir().unwrap();
        let dir = proc_root.path().join("7");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("status"), "not a status file at all\n").unwrap();

        let err = read_credentials(proc_root.path(), 7).unwrap_err();
        assert!(
            err.to_string().contains("malformed"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_read_credentials_live_parent() {
        // The test runner is our parent and is owned by whoever runs the
        // tests, so its real ids must match our own real ids.
        let creds = own_parent_credentials();
        assert_eq!(creds.uid, unsafe { libc::getuid() });
        assert_eq!(creds.gid, unsafe { libc::getgid() });
    }

    #[test]
    fn test_check_caller_accepts_matching_owner() {
        let creds = own_parent_credentials();
        let cfg = test_config(creds.uid, creds.gid);
        check_caller(&cfg).unwrap();
    }

    #[test]
    fn test_check_caller_rejects_uid_mismatch() {
        let creds = own_parent_credentials();
        let cfg = test_config(creds.uid.wrapping_add(1), creds.gid);
        let err = check_caller(&cfg).unwrap_err();
        match err {
            FatalError::TrustViolation { reason } => {
                assert!(reason.contains("uid"), "unexpected reason: {reason}")
            }
            other => panic!("expected TrustViolation, got {other}"),
        }
    }

    #[test]
    fn test_check_caller_rejects_gid_mismatch() {
        let creds = own_parent_credentials();
        let cfg = test_config(creds.uid, creds.gid.wrapping_add(1));
        let err = check_caller(&cfg).unwrap_err();
        match err {
            FatalError::TrustViolation { reason } => {
                assert!(reason.contains("gid"), "unexpected reason: {reason}")
            }
            other => panic!("expected TrustViolation, got {other}"),
        }
    }
}
