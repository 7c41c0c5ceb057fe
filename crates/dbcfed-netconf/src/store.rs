//! # On-Disk Layout and Crash-Atomic Writes
//!
//! ```text
//! <federation dir>/
//!   federation.json              network configuration
//!   mints/<MintId>.json          public mint credential sets
//!
//! <mint home>/                   operator-local, never shared
//!   privkeylists/<MintId>.json   credential sets with private signing keys
//!   secrets/<name>.key           identity key seeds (hex)
//! ```
//!
//! ## Atomic Writes
//!
//! [`write_atomic`] writes `<name>.tmp`, syncs it, moves any existing target
//! to `<name>.bak`, renames the temp file onto the target and finally deletes
//! the backup. A crash at any point leaves either the old or the new artifact
//! recoverable; [`read_recovering`] falls back to the backup when the target
//! is missing.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use dbcfed_core::MintId;

use crate::error::NetconfError;
use crate::identity_key::IdentityKey;

/// Network configuration file name.
pub const NETWORK_FILE: &str = "federation.json";

/// Directory of public mint credential sets.
pub const MINT_DIR: &str = "mints";

/// Directory of private key lists under the mint home.
pub const PRIVKEYLIST_DIR: &str = "privkeylists";

/// Directory of identity secrets under the mint home.
pub const SECRETS_DIR: &str = "secrets";

/// Extension of identity secret files.
pub const SECRET_EXTENSION: &str = "key";

/// Who may read a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// World readable (`0o644`).
    Public,
    /// Owner only (`0o600`).
    Private,
}

impl FileMode {
    /// Unix permission bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::Public => 0o644,
            Self::Private => 0o600,
        }
    }
}

// ─── Paths ───────────────────────────────────────────────────────────

/// `<dir>/federation.json`.
pub fn network_path(dir: &Path) -> PathBuf {
    dir.join(NETWORK_FILE)
}

/// `<dir>/mints/<id>.json`.
pub fn mint_path(dir: &Path, id: &MintId) -> PathBuf {
    dir.join(MINT_DIR).join(id.file_name())
}

/// `<home>/privkeylists/<id>.json`.
pub fn privkeylist_path(home: &Path, id: &MintId) -> PathBuf {
    home.join(PRIVKEYLIST_DIR).join(id.file_name())
}

/// `<home>/secrets/<name>.key`.
pub fn secret_path(home: &Path, name: &str) -> PathBuf {
    home.join(SECRETS_DIR).join(format!("{name}.{SECRET_EXTENSION}"))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> NetconfError + '_ {
    move |source| NetconfError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ─── Atomic I/O ──────────────────────────────────────────────────────

/// Replace `path` with `data` so that a crash never leaves a partial file.
pub fn write_atomic(path: &Path, data: &[u8], mode: FileMode) -> Result<(), NetconfError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let tmp = with_suffix(path, ".tmp");
    let bak = with_suffix(path, ".bak");

    let mut file = create_file(&tmp, mode)?;
    file.write_all(data).map_err(io_err(&tmp))?;
    file.sync_all().map_err(io_err(&tmp))?;
    drop(file);
    set_mode(&tmp, mode)?;

    let had_target = path.exists();
    if had_target {
        fs::rename(path, &bak).map_err(io_err(path))?;
    }
    fs::rename(&tmp, path).map_err(io_err(&tmp))?;
    // A backup left by an interrupted earlier write is stale now too.
    match fs::remove_file(&bak) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_err(&bak)(e)),
        _ => Ok(()),
    }
}

#[cfg_attr(not(unix), allow(unused_variables))]
fn create_file(path: &Path, mode: FileMode) -> Result<fs::File, NetconfError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode.bits());
    }
    options.open(path).map_err(io_err(path))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: FileMode) -> Result<(), NetconfError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode.bits())).map_err(io_err(path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: FileMode) -> Result<(), NetconfError> {
    Ok(())
}

/// Read `path`, or its `.bak` sibling if an interrupted write left only that.
pub fn read_recovering(path: &Path) -> Result<Vec<u8>, NetconfError> {
    match fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let bak = with_suffix(path, ".bak");
            match fs::read(&bak) {
                Ok(data) => {
                    tracing::warn!(path = %path.display(), "recovered from backup");
                    Ok(data)
                }
                Err(_) => Err(NetconfError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }),
            }
        }
        Err(e) => Err(NetconfError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Whether `path` or its backup exists.
pub fn exists(path: &Path) -> bool {
    path.exists() || with_suffix(path, ".bak").exists()
}

/// Deserialize a JSON artifact.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, NetconfError> {
    let data = read_recovering(path)?;
    serde_json::from_slice(&data).map_err(|source| NetconfError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a JSON artifact (pretty printed) and write it atomically.
pub fn save_json<T: Serialize>(
    path: &Path,
    value: &T,
    mode: FileMode,
) -> Result<(), NetconfError> {
    let mut data = serde_json::to_vec_pretty(value).map_err(|source| NetconfError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    data.push(b'\n');
    let data = Zeroizing::new(data);
    write_atomic(path, &data, mode)
}

// ─── Identity secrets ────────────────────────────────────────────────

/// Store an identity key's seed as `<home>/secrets/<name>.key`.
///
/// Refuses to overwrite an existing secret.
pub fn save_secret(home: &Path, name: &str, key: &IdentityKey) -> Result<PathBuf, NetconfError> {
    let path = secret_path(home, name);
    if exists(&path) {
        return Err(NetconfError::Io {
            path,
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "secret exists already",
            ),
        });
    }
    let seed = key.keypair()?.seed_hex();
    let mut line = Zeroizing::new(String::with_capacity(seed.len() + 1));
    line.push_str(&seed);
    line.push('\n');
    write_atomic(&path, line.as_bytes(), FileMode::Private)?;
    tracing::info!(path = %path.display(), mint = %key.marshal_id(), "saved identity secret");
    Ok(path)
}

/// Load an identity secret by name, or the only one present if `name` is
/// `None`.
pub fn load_secret(home: &Path, name: Option<&str>) -> Result<IdentityKey, NetconfError> {
    let path = match name {
        Some(name) => secret_path(home, name),
        None => only_secret(home)?,
    };
    let data = Zeroizing::new(read_recovering(&path)?);
    let text = std::str::from_utf8(&data).map_err(|e| NetconfError::Io {
        path: path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    IdentityKey::from_secret(text.trim())
}

fn only_secret(home: &Path) -> Result<PathBuf, NetconfError> {
    let dir = home.join(SECRETS_DIR);
    let mut found = Vec::new();
    for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
        let path = entry.map_err(io_err(&dir))?.path();
        if path.extension().is_some_and(|ext| ext == SECRET_EXTENSION) {
            found.push(path);
        }
    }
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(NetconfError::SecretSelection {
            dir,
            reason: "no secret key file".to_string(),
        }),
        n => Err(NetconfError::SecretSelection {
            dir,
            reason: format!("{n} secret key files, choose one"),
        }),
    }
}
