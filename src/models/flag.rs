//! Compliance red-flag types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed enumeration of red-flag kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    CompletionDateDelayed,
    ProjectLapsed,
    ExtensionGranted,
    ZeroUnitsRegistered,
    NoSalesRecorded,
}

impl FlagType {
    /// Stable string form used in logs and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::CompletionDateDelayed => "completion_date_delayed",
            FlagType::ProjectLapsed => "project_lapsed",
            FlagType::ExtensionGranted => "extension_granted",
            FlagType::ZeroUnitsRegistered => "zero_units_registered",
            FlagType::NoSalesRecorded => "no_sales_recorded",
        }
    }
}

impl std::fmt::Display for FlagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived compliance signal, tracked as active/resolved over time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedFlag {
    pub id: u64,

    /// Internal id of the owning project
    pub project_id: i64,

    pub flag_type: FlagType,

    pub detected_at: DateTime<Utc>,

    /// `None` while the flag is still active
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Result of evaluating one predicate against a project snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagCheck {
    pub flag_type: FlagType,
    pub condition: bool,
}
