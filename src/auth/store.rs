//! On-disk token cache under `~/.credentials`

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{AuthError, Result};

use super::tokens::{self, TokenRecord};

/// Directory under the user's home that holds cached tokens.
pub const CREDENTIALS_DIR: &str = ".credentials";

/// Source of the invoking user's home directory.
pub trait HomeDirectoryProvider {
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Home directory of the current process user.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserHome;

impl HomeDirectoryProvider for UserHome {
    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir()
    }
}

/// A fixed home directory.
#[derive(Debug, Clone)]
pub struct FixedHome(pub PathBuf);

impl HomeDirectoryProvider for FixedHome {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Token cache keyed by logical token-file name.
#[derive(Debug, Clone)]
pub struct CredentialStore<H> {
    home: H,
}

impl<H: HomeDirectoryProvider> CredentialStore<H> {
    pub fn new(home: H) -> Self {
        Self { home }
    }

    /// Path of the cache file for `name`, creating the credentials
    /// directory if it is missing.
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf> {
        let home = self.home.home_dir().ok_or(AuthError::UserResolution)?;
        let dir = home.join(CREDENTIALS_DIR);

        if let Err(e) = create_private_dir(&dir) {
            tracing::warn!("Failed to create {}: {}", dir.display(), e);
        }

        Ok(dir.join(escape_name(name)))
    }

    /// Read a cached token.
    pub fn load(&self, path: &Path) -> Result<TokenRecord> {
        let file = File::open(path).map_err(|source| AuthError::CacheMiss {
            path: path.to_path_buf(),
            source,
        })?;
        tokens::decode(BufReader::new(file))
    }

    /// Replace the cached token at `path`.
    pub fn save(&self, path: &Path, record: &TokenRecord) -> Result<()> {
        tracing::info!("Saving credential file to: {}", path.display());

        let mut content = Vec::new();
        tokens::encode(record, &mut content)?;

        let persist_err = |source: io::Error| AuthError::Persist {
            path: path.to_path_buf(),
            source,
        };
        let mut file = create_private_file(path).map_err(persist_err)?;
        file.write_all(&content).map_err(persist_err)?;
        file.flush().map_err(persist_err)
    }

    /// Delete the cached token at `path`. Returns whether a file was removed.
    pub fn remove(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(AuthError::Persist {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Escape a logical name into a single safe file name component, using the
/// same escaping as Go's `url.QueryEscape`.
fn escape_name(name: &str) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    // form-urlencoded keeps `*` and escapes `~`; QueryEscape does the opposite
    let escaped = escaped.replace("%7E", "~").replace('*', "%2A");
    match escaped.as_str() {
        "" => "%00".to_string(),
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => escaped,
    }
}

fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

fn create_private_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
