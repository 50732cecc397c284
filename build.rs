use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Script exec'd after the caller check passes.
const DEFAULT_SCRIPT: &str = "/usr/lib/cgigate/driver";

/// Default trusted owner, the conventional "nobody" account.
const DEFAULT_OWNER_UID: u32 = 65534;
const DEFAULT_OWNER_GID: u32 = 65534;

// Everything the wrapper needs to know is fixed at build time: the script it
// guards, the parent identity allowed to invoke it, and the syslog tag.
// Generated as typed constants so the binary never parses configuration.
fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed=CGIGATE_SCRIPT");
    println!("cargo:rerun-if-env-changed=CGIGATE_OWNER_UID");
    println!("cargo:rerun-if-env-changed=CGIGATE_OWNER_GID");
    println!("cargo:rerun-if-env-changed=CGIGATE_LOG_IDENT");

    let script = match env::var("CGIGATE_SCRIPT") {
        Ok(path) => path,
        Err(env::VarError::NotPresent) => DEFAULT_SCRIPT.to_string(),
        Err(err) => return Err(err).context("CGIGATE_SCRIPT is not valid unicode"),
    };
    validate_script_path(&script)?;

    let owner_uid = parse_id("CGIGATE_OWNER_UID", DEFAULT_OWNER_UID)?;
    let owner_gid = parse_id("CGIGATE_OWNER_GID", DEFAULT_OWNER_GID)?;

    let log_ident = match env::var("CGIGATE_LOG_IDENT") {
        Ok(ident) if !ident.trim().is_empty() => ident,
        Ok(_) | Err(env::VarError::NotPresent) => default_log_ident(&script),
        Err(err) => return Err(err).context("CGIGATE_LOG_IDENT is not valid unicode"),
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR not set")?);
    let dest = out_dir.join("wrapper_config.rs");
    let contents = format!(
        "pub const SCRIPT_PATH: &str = {script:?};\n\
         pub const OWNER_UID: u32 = {owner_uid};\n\
         pub const OWNER_GID: u32 = {owner_gid};\n\
         pub const LOG_IDENT: &str = {log_ident:?};\n"
    );
    fs::write(&dest, contents).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}

fn validate_script_path(script: &str) -> Result<()> {
    if script.is_empty() {
        bail!("CGIGATE_SCRIPT must not be empty");
    }
    if !Path::new(script).is_absolute() {
        bail!("CGIGATE_SCRIPT must be an absolute path, got '{script}'");
    }
    Ok(())
}

fn parse_id(var: &str, default: u32) -> Result<u32> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{var} must be a numeric id, got '{raw}'")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("{var} is not valid unicode")),
    }
}

/// Syslog tag used when CGIGATE_LOG_IDENT is not set: the wrapper name plus
/// the script it guards, so one log stream can tell instances apart.
fn default_log_ident(script: &str) -> String {
    let name = Path::new(script)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| script.to_string());
    format!("cgigate ({name})")
}
