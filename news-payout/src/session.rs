use crate::types::{Identity, KeyValueStore, NewsError, Result};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const USER_KEY: &str = "user";

const SESSION_FILE: &str = "session.json";

/// Key/value store persisted as a flat JSON object on disk.
///
/// The whole map is rewritten on every mutation, so a reload always sees
/// the last value written. A mutation that cannot be written is not applied.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, starting empty when the file does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened session store {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(default_session_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk, then adopt them. On failure the store keeps
    /// its previous contents.
    fn commit(&mut self, entries: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, text)?;
        self.entries = entries;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value.to_string());
        self.commit(entries)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        if self.entries.contains_key(key) {
            let mut entries = self.entries.clone();
            entries.remove(key);
            self.commit(entries)?;
        }
        Ok(())
    }
}

pub fn default_session_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "news-payout", "news-payout")
        .ok_or_else(|| NewsError::Config("Could not determine a data directory".to_string()))?;
    Ok(dirs.data_dir().join(SESSION_FILE))
}

/// The identity persisted by the last sign-in, if any.
pub fn load_user(store: &dyn KeyValueStore) -> Option<Identity> {
    let raw = store.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(identity) => Some(identity),
        Err(e) => {
            warn!("Stored user could not be decoded, treating as signed out: {}", e);
            None
        }
    }
}

pub fn save_user(store: &mut dyn KeyValueStore, identity: &Identity) -> Result<()> {
    let raw = serde_json::to_string(identity)?;
    store
        .set(USER_KEY, &raw)
        .map_err(|e| NewsError::Storage(e.to_string()))?;
    info!("Signed in as {}", identity.email.as_deref().unwrap_or(&identity.uid));
    Ok(())
}

/// Forget the signed-in user. The payout rate is left alone.
pub fn clear_user(store: &mut dyn KeyValueStore) -> Result<()> {
    store
        .remove(USER_KEY)
        .map_err(|e| NewsError::Storage(e.to_string()))?;
    info!("Signed out");
    Ok(())
}
