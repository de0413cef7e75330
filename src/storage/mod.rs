//! Storage abstractions for crawled project data.
//!
//! The pipeline is the sole writer of all three entities; the read-only
//! query API lives elsewhere and consumes whatever backend implements
//! [`ProjectStore`]. `LocalStore` is the JSON-file backend used by the CLI
//! and the test suite; production deployments sit on a relational store.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::models::{FlagType, ListingProject, Project, RedFlag};

// Re-export for convenience
pub use local::LocalStore;

/// A staging row the detail phase still needs to visit.
///
/// Returned by the staleness query: rows never synchronized, or whose
/// registry-reported last-modified date postdates the last sync.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleCandidate {
    pub internal_id: Option<i64>,
    pub rera_id: String,
    pub last_modified: Option<NaiveDate>,
}

/// Persistence operations consumed by the ingestion pipeline.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert or overwrite a staging record, keyed by `rera_id`.
    ///
    /// An existing record keeps its `detail_synced_at` stamp.
    async fn upsert_listing(&self, listing: &ListingProject) -> Result<()>;

    /// Up to `batch_size` staging rows matching the staleness predicate.
    async fn stale_candidates(&self, batch_size: usize) -> Result<Vec<StaleCandidate>>;

    /// Insert or overwrite a canonical project, keyed by `internal_id`.
    async fn upsert_project(&self, project: &Project) -> Result<()>;

    /// Stamp the staging rows for `internal_id` as detail-synchronized.
    async fn mark_detail_synced(&self, internal_id: i64, at: DateTime<Utc>) -> Result<()>;

    /// The unresolved flag of the given type for a project, if any.
    async fn find_active_flag(
        &self,
        project_id: i64,
        flag_type: FlagType,
    ) -> Result<Option<RedFlag>>;

    /// Open a new flag.
    async fn create_flag(
        &self,
        project_id: i64,
        flag_type: FlagType,
        detected_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Resolve an existing flag.
    async fn resolve_flag(&self, flag_id: u64, resolved_at: DateTime<Utc>) -> Result<()>;
}
