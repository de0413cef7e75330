// src/pipeline/sync.rs

//! Detail synchronization phase.
//!
//! Works off persisted staleness, not the current crawl's page range: a
//! staging record is due when it has never been synchronized or when the
//! registry reported a modification after the last sync.

use crate::error::{AppError, Result};
use crate::services::Jurisdiction;
use crate::storage::ProjectStore;

/// Synchronize all stale projects in batches.
///
/// Per-record failures are logged with the record's identifying fields and
/// never abort the batch. A missing credential is different: no detail
/// call can proceed without one, so the run stops with an
/// operator-actionable error.
pub async fn run_detail_phase(
    jurisdiction: &Jurisdiction,
    store: &dyn ProjectStore,
    batch_size: usize,
) -> Result<()> {
    log::info!(
        "[{}] Checking for projects requiring detail sync...",
        jurisdiction.display_name
    );

    let mut total_processed: usize = 0;

    loop {
        let pending = store.stale_candidates(batch_size).await?;
        if pending.is_empty() {
            break;
        }

        log::info!(
            "[{}] Processing batch of {} projects...",
            jurisdiction.display_name,
            pending.len()
        );

        for candidate in &pending {
            // Listing cards without a detail link cannot be synchronized.
            let Some(internal_id) = candidate.internal_id else {
                continue;
            };

            match jurisdiction.detail.process_project(internal_id).await {
                Ok(()) => total_processed += 1,
                Err(error @ AppError::Credential(_)) => {
                    log::error!("[{}] {error}", jurisdiction.display_name);
                    return Err(error);
                }
                Err(error) => {
                    log::error!(
                        "[{}] Error processing project {} ({internal_id}): {error}",
                        jurisdiction.display_name,
                        candidate.rera_id
                    );
                }
            }
        }

        if pending.len() < batch_size {
            break;
        }
    }

    log::info!(
        "[{}] Detail sync completed. Processed {total_processed} projects total.",
        jurisdiction.display_name
    );
    Ok(())
}
