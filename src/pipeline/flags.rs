// src/pipeline/flags.rs

//! Red-flag engine.
//!
//! A fixed, ordered set of compliance predicates evaluated against one
//! canonical snapshot, reconciled idempotently against persisted flag
//! state: a predicate turning true opens a flag, turning false resolves
//! the active one, anything else writes nothing.

use chrono::Utc;

use crate::error::Result;
use crate::models::{FlagCheck, FlagType, Project};
use crate::storage::ProjectStore;

/// Days a project may sit unsold after registration before it is flagged.
const NO_SALES_GRACE_DAYS: i64 = 365;

/// Evaluate every red-flag predicate against one project snapshot.
pub fn evaluate_red_flags(project: &Project) -> Vec<FlagCheck> {
    vec![
        FlagCheck {
            flag_type: FlagType::CompletionDateDelayed,
            condition: matches!(
                (project.original_completion, project.proposed_completion),
                (Some(original), Some(proposed)) if proposed > original
            ),
        },
        FlagCheck {
            flag_type: FlagType::ProjectLapsed,
            condition: project.is_lapsed,
        },
        FlagCheck {
            flag_type: FlagType::ExtensionGranted,
            condition: project
                .extension_cert_ref
                .as_deref()
                .is_some_and(|r| !r.is_empty()),
        },
        FlagCheck {
            // Absent unit counts are treated as zero; migrated projects
            // predate the registry and are exempt.
            flag_type: FlagType::ZeroUnitsRegistered,
            condition: project.total_units.unwrap_or(0) == 0 && !project.is_migrated,
        },
        FlagCheck {
            flag_type: FlagType::NoSalesRecorded,
            condition: project.sold_units == Some(0)
                && project.registration_date.is_some_and(|registered| {
                    (Utc::now().date_naive() - registered).num_days() > NO_SALES_GRACE_DAYS
                }),
        },
    ]
}

/// Reconcile evaluated predicates against persisted flag state.
///
/// Idempotent per (project, flag type): at most one active flag exists at
/// any time, and re-running over an unchanged snapshot writes nothing.
pub async fn derive_red_flags(store: &dyn ProjectStore, project: &Project) -> Result<()> {
    for FlagCheck {
        flag_type,
        condition,
    } in evaluate_red_flags(project)
    {
        let existing = store.find_active_flag(project.internal_id, flag_type).await?;

        match (condition, existing) {
            (true, None) => {
                log::info!(
                    "Project {} ({}): raising {flag_type}",
                    project.internal_id,
                    project.rera_id
                );
                store
                    .create_flag(project.internal_id, flag_type, Utc::now())
                    .await?;
            }
            (false, Some(flag)) => {
                log::info!(
                    "Project {} ({}): resolving {flag_type}",
                    project.internal_id,
                    project.rera_id
                );
                store.resolve_flag(flag.id, Utc::now()).await?;
            }
            _ => {}
        }
    }
    Ok(())
}
