//! Local filesystem storage implementation.
//!
//! JSON-file backend for development, the CLI and tests. Production
//! deployments should sit on the relational store behind the query API.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── listings.json         # Staging records by RERA id
//! ├── projects.json         # Canonical projects by internal id
//! └── flags.json            # Red flags, active and resolved
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{FlagType, ListingProject, Project, RedFlag};
use crate::storage::{ProjectStore, StaleCandidate};

const LISTINGS_KEY: &str = "listings.json";
const PROJECTS_KEY: &str = "projects.json";
const FLAGS_KEY: &str = "flags.json";

#[derive(Debug, Default)]
struct StoreState {
    listings: BTreeMap<String, ListingProject>,
    projects: BTreeMap<i64, Project>,
    flags: Vec<RedFlag>,
    next_flag_id: u64,
}

/// Local filesystem storage backend.
pub struct LocalStore {
    root_dir: PathBuf,
    state: RwLock<StoreState>,
}

impl LocalStore {
    /// Open a store rooted at the given directory, loading any existing
    /// data files.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let store = Self {
            root_dir,
            state: RwLock::new(StoreState::default()),
        };

        let listings: Vec<ListingProject> = store.read_json(LISTINGS_KEY).await?.unwrap_or_default();
        let projects: Vec<Project> = store.read_json(PROJECTS_KEY).await?.unwrap_or_default();
        let flags: Vec<RedFlag> = store.read_json(FLAGS_KEY).await?.unwrap_or_default();

        {
            let mut state = store.state.write().await;
            state.listings = listings
                .into_iter()
                .map(|l| (l.rera_id.clone(), l))
                .collect();
            state.projects = projects.into_iter().map(|p| (p.internal_id, p)).collect();
            state.next_flag_id = flags.iter().map(|f| f.id + 1).max().unwrap_or(1);
            state.flags = flags;
        }

        Ok(store)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read JSON data, returning None if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn persist_listings(&self, state: &StoreState) -> Result<()> {
        let records: Vec<&ListingProject> = state.listings.values().collect();
        self.write_json(LISTINGS_KEY, &records).await
    }

    async fn persist_projects(&self, state: &StoreState) -> Result<()> {
        let records: Vec<&Project> = state.projects.values().collect();
        self.write_json(PROJECTS_KEY, &records).await
    }

    async fn persist_flags(&self, state: &StoreState) -> Result<()> {
        self.write_json(FLAGS_KEY, &state.flags).await
    }

    /// Read back one staging record (test and inspection helper).
    pub async fn listing(&self, rera_id: &str) -> Option<ListingProject> {
        self.state.read().await.listings.get(rera_id).cloned()
    }

    /// Read back one canonical project (test and inspection helper).
    pub async fn project(&self, internal_id: i64) -> Option<Project> {
        self.state.read().await.projects.get(&internal_id).cloned()
    }

    /// All flags ever recorded for a project, active and resolved.
    pub async fn project_flags(&self, project_id: i64) -> Vec<RedFlag> {
        self.state
            .read()
            .await
            .flags
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Counts of listings, projects and active flags, for status output.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.read().await;
        let active = state.flags.iter().filter(|f| f.resolved_at.is_none()).count();
        (state.listings.len(), state.projects.len(), active)
    }
}

#[async_trait]
impl ProjectStore for LocalStore {
    async fn upsert_listing(&self, listing: &ListingProject) -> Result<()> {
        let mut state = self.state.write().await;
        let mut record = listing.clone();
        // The crawl overwrite must not clear the sync bookkeeping.
        if let Some(existing) = state.listings.get(&record.rera_id) {
            record.detail_synced_at = record.detail_synced_at.or(existing.detail_synced_at);
        }
        state.listings.insert(record.rera_id.clone(), record);
        self.persist_listings(&state).await
    }

    async fn stale_candidates(&self, batch_size: usize) -> Result<Vec<StaleCandidate>> {
        let state = self.state.read().await;
        let candidates = state
            .listings
            .values()
            .filter(|l| match (l.last_modified, l.detail_synced_at) {
                (_, None) => true,
                (Some(modified), Some(synced)) => {
                    modified.and_time(chrono::NaiveTime::MIN).and_utc() > synced
                }
                (None, Some(_)) => false,
            })
            .take(batch_size)
            .map(|l| StaleCandidate {
                internal_id: l.internal_id,
                rera_id: l.rera_id.clone(),
                last_modified: l.last_modified,
            })
            .collect();
        Ok(candidates)
    }

    async fn upsert_project(&self, project: &Project) -> Result<()> {
        let mut state = self.state.write().await;
        state.projects.insert(project.internal_id, project.clone());
        self.persist_projects(&state).await
    }

    async fn mark_detail_synced(&self, internal_id: i64, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().await;
        for listing in state.listings.values_mut() {
            if listing.internal_id == Some(internal_id) {
                listing.detail_synced_at = Some(at);
            }
        }
        self.persist_listings(&state).await
    }

    async fn find_active_flag(
        &self,
        project_id: i64,
        flag_type: FlagType,
    ) -> Result<Option<RedFlag>> {
        let state = self.state.read().await;
        Ok(state
            .flags
            .iter()
            .find(|f| {
                f.project_id == project_id
                    && f.flag_type == flag_type
                    && f.resolved_at.is_none()
            })
            .cloned())
    }

    async fn create_flag(
        &self,
        project_id: i64,
        flag_type: FlagType,
        detected_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let id = state.next_flag_id;
        state.next_flag_id += 1;
        state.flags.push(RedFlag {
            id,
            project_id,
            flag_type,
            detected_at,
            resolved_at: None,
        });
        self.persist_flags(&state).await
    }

    async fn resolve_flag(&self, flag_id: u64, resolved_at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(flag) = state.flags.iter_mut().find(|f| f.id == flag_id) else {
            return Err(AppError::validation(format!("Unknown flag id {flag_id}")));
        };
        flag.resolved_at = Some(resolved_at);
        self.persist_flags(&state).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn listing(rera_id: &str, internal_id: Option<i64>) -> ListingProject {
        ListingProject {
            rera_id: rera_id.to_string(),
            project_name: format!("Project {rera_id}"),
            developer: None,
            location_taluka: None,
            district: None,
            pincode: None,
            last_modified: None,
            internal_id,
            has_extension_cert: false,
            detail_synced_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_listing_round_trips_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalStore::open(dir.path()).await.unwrap();
            store.upsert_listing(&listing("P1", Some(10))).await.unwrap();
        }
        let store = LocalStore::open(dir.path()).await.unwrap();
        let loaded = store.listing("P1").await.unwrap();
        assert_eq!(loaded.internal_id, Some(10));
    }

    #[tokio::test]
    async fn upsert_listing_keeps_sync_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).await.unwrap();

        store.upsert_listing(&listing("P1", Some(10))).await.unwrap();
        store.mark_detail_synced(10, Utc::now()).await.unwrap();

        // A later crawl of the same page overwrites the row.
        store.upsert_listing(&listing("P1", Some(10))).await.unwrap();
        let loaded = store.listing("P1").await.unwrap();
        assert!(loaded.detail_synced_at.is_some());
    }

    #[tokio::test]
    async fn stale_candidates_returns_unsynced_and_modified() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).await.unwrap();

        // Never synced: stale.
        store.upsert_listing(&listing("P1", Some(1))).await.unwrap();

        // Synced after its last modification: fresh.
        let mut synced = listing("P2", Some(2));
        synced.last_modified = NaiveDate::from_ymd_opt(2024, 1, 1);
        store.upsert_listing(&synced).await.unwrap();
        store.mark_detail_synced(2, Utc::now()).await.unwrap();

        // Synced long ago, modified afterwards: stale again.
        let mut modified = listing("P3", Some(3));
        modified.last_modified = Some(Utc::now().date_naive());
        modified.detail_synced_at = Some(Utc::now() - chrono::Duration::days(30));
        store.upsert_listing(&modified).await.unwrap();

        let candidates = store.stale_candidates(50).await.unwrap();
        let ids: Vec<&str> = candidates.iter().map(|c| c.rera_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P3"]);
    }

    #[tokio::test]
    async fn stale_candidates_honors_batch_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).await.unwrap();
        for i in 0..5 {
            store
                .upsert_listing(&listing(&format!("P{i}"), Some(i)))
                .await
                .unwrap();
        }
        assert_eq!(store.stale_candidates(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn flag_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).await.unwrap();

        store
            .create_flag(7, FlagType::ProjectLapsed, Utc::now())
            .await
            .unwrap();
        let active = store
            .find_active_flag(7, FlagType::ProjectLapsed)
            .await
            .unwrap()
            .expect("flag should be active");

        store.resolve_flag(active.id, Utc::now()).await.unwrap();
        assert!(
            store
                .find_active_flag(7, FlagType::ProjectLapsed)
                .await
                .unwrap()
                .is_none()
        );

        // Resolved flags stay on record.
        assert_eq!(store.project_flags(7).await.len(), 1);
    }
}
