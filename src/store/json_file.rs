//! A single JSON document holding every roster and balance.
//!
//! Every mutation rewrites the whole document and then copies it into the
//! backup directory as `pets_<timestamp>.json`, keeping only the newest few
//! copies. Top-level keys this store does not manage are carried through
//! untouched. A mutation whose save fails leaves the in-memory copy as it
//! was.

use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::errors::StoreResult;
use crate::pet::Pet;
use crate::store::{CurrencyLedger, PetStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

const BACKUP_PREFIX: &str = "pets_";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StoreDocument {
    #[serde(default)]
    pub pets: BTreeMap<String, Vec<Pet>>,
    #[serde(default)]
    pub coins: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

pub struct JsonFileStore {
    path: PathBuf,
    backup_dir: PathBuf,
    backup_keep: usize,
    clock: Arc<dyn Clock>,
    document: RwLock<StoreDocument>,
}

impl JsonFileStore {
    /// Load the document at `path`, or start empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>, backup_keep: usize) -> StoreResult<Self> {
        Self::open_with_clock(path, backup_dir, backup_keep, Arc::new(SystemClock)).await
    }

    pub async fn from_config(config: &GameConfig) -> StoreResult<Self> {
        Self::open(&config.pet_file, &config.backup_dir, config.backup_keep).await
    }

    pub async fn open_with_clock(
        path: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
        backup_keep: usize,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        let path = path.into();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No pet file yet; starting empty");
                StoreDocument::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            backup_dir: backup_dir.into(),
            backup_keep,
            clock,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> StoreDocument {
        self.document.read().await.clone()
    }

    /// Write `document` next to the target and rename it into place, then back it up.
    async fn persist(&self, document: &StoreDocument) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(document)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "Saved pet data");

        if let Err(err) = self.create_backup().await {
            tracing::warn!(error = %err, "Error creating backup");
        }
        Ok(())
    }

    async fn create_backup(&self) -> StoreResult<()> {
        if self.backup_keep == 0 {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.backup_dir).await?;

        let mut existing = self.list_backups().await?;
        while existing.len() >= self.backup_keep {
            let oldest = existing.remove(0);
            tokio::fs::remove_file(self.backup_dir.join(&oldest)).await?;
        }

        let timestamp = self.clock.now().format("%Y%m%d_%H%M%S");
        let backup_file = self
            .backup_dir
            .join(format!("{}{}.json", BACKUP_PREFIX, timestamp));
        tokio::fs::copy(&self.path, &backup_file).await?;
        Ok(())
    }

    /// Backup file names, oldest first.
    pub async fn list_backups(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(BACKUP_PREFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl PetStore for JsonFileStore {
    async fn get_pets(&self, user_id: &str) -> StoreResult<Vec<Pet>> {
        Ok(self
            .document
            .read()
            .await
            .pets
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_pets(&self, user_id: &str, pets: Vec<Pet>) -> StoreResult<()> {
        let mut document = self.document.write().await;
        let mut updated = document.clone();
        updated.pets.insert(user_id.to_string(), pets);
        self.persist(&updated).await?;
        *document = updated;
        Ok(())
    }
}

#[async_trait]
impl CurrencyLedger for JsonFileStore {
    async fn add_coins(&self, user_id: &str, amount: u64) -> StoreResult<u64> {
        let mut document = self.document.write().await;
        let mut updated = document.clone();
        let balance = updated.coins.entry(user_id.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        let balance = *balance;
        self.persist(&updated).await?;
        *document = updated;
        Ok(balance)
    }

    async fn balance(&self, user_id: &str) -> StoreResult<u64> {
        Ok(self
            .document
            .read()
            .await
            .coins
            .get(user_id)
            .copied()
            .unwrap_or(0))
    }
}
