//! Per-community JSON document store.
//!
//! Layout follows the storage collaborator's contract: one document per
//! community per module name, `<root>/<community_id>/<module>.json`.
//! Documents are validated into typed records on load; a corrupt document
//! is a storage error, never a silently-empty default. Writes go through a
//! temp file and rename so a crash cannot leave a half-written document.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::domain::{PlannedStream, TrackedStreamer};
use crate::error::{Error, Result};

const TRACKED_MODULE: &str = "streamers";
const PLANNED_MODULE: &str = "planned_streams";

/// Tracked streamers of one community, keyed by lowercased handle.
pub type TrackedMap = BTreeMap<String, TrackedStreamer>;
/// Planned streams of one community, keyed by lowercased handle.
pub type PlannedMap = BTreeMap<String, PlannedStream>;

/// File-backed store of per-community records.
pub struct GuildStore {
    root: PathBuf,
}

impl GuildStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List all communities that have stored data.
    pub async fn communities(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut communities = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                communities.push(name.to_string());
            }
        }
        communities.sort();
        Ok(communities)
    }

    pub async fn load_tracked(&self, community: &str) -> Result<TrackedMap> {
        self.load(community, TRACKED_MODULE).await
    }

    pub async fn save_tracked(&self, community: &str, records: &TrackedMap) -> Result<()> {
        self.save(community, TRACKED_MODULE, records).await
    }

    pub async fn load_planned(&self, community: &str) -> Result<PlannedMap> {
        self.load(community, PLANNED_MODULE).await
    }

    pub async fn save_planned(&self, community: &str, records: &PlannedMap) -> Result<()> {
        self.save(community, PLANNED_MODULE, records).await
    }

    fn module_path(&self, community: &str, module: &str) -> PathBuf {
        self.root.join(community).join(format!("{module}.json"))
    }

    async fn load<T: DeserializeOwned + Default>(&self, community: &str, module: &str) -> Result<T> {
        let path = self.module_path(community, module);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| Error::storage(format!("corrupt document {}: {e}", path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save<T: Serialize>(&self, community: &str, module: &str, value: &T) -> Result<()> {
        let path = self.module_path(community, module);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
