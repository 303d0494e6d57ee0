use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Key under which a profile's password is stored.
pub fn password_key(base_url: &str, profile: &str) -> String {
    format!("{}@{}", profile, base_url.trim_end_matches('/'))
}

/// Passwords kept in a JSON file readable only by the current user.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at `~/.<app>/credentials`.
    pub fn new(app: &str) -> Result<Self> {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        Ok(Self {
            path: home.join(format!(".{}", app)).join("credentials"),
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a secret, replacing any previous value for `account`.
    pub fn set_secret(&self, account: &str, secret: &str) -> Result<()> {
        let mut creds = self.read_all()?;
        creds.insert(account.to_string(), secret.to_string());
        self.write_all(&creds)
    }

    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        let creds = self.read_all()?;
        Ok(creds.get(account).cloned())
    }

    /// Delete a secret. Missing files and accounts are not an error.
    pub fn delete_secret(&self, account: &str) -> Result<()> {
        let mut creds = self.read_all()?;
        if creds.remove(account).is_none() {
            return Ok(());
        }
        self.write_all(&creds)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed credentials file {}", self.path.display()))
    }

    fn write_all(&self, creds: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options
            .open(&self.path)
            .with_context(|| format!("Unable to write {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, creds)?;
        Ok(())
    }
}
