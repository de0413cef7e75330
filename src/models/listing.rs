//! Staging record extracted from one listing-page project card.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A project as seen on the public listing page.
///
/// One row per project, keyed by the externally displayed RERA registration
/// number. Overwritten on every crawl of the page containing it; the detail
/// phase reads it back to decide which projects need a full sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingProject {
    /// External registration number, e.g. "P52100000001"
    pub rera_id: String,

    /// Project display name
    pub project_name: String,

    /// Developer display name as free text (not linked to a developer entity)
    pub developer: Option<String>,

    /// Location label from the listing, e.g. "Andheri, Mumbai Suburban"
    pub location_taluka: Option<String>,

    /// District caption value
    pub district: Option<String>,

    /// Postal code caption value
    pub pincode: Option<String>,

    /// Registry-reported last-modified date
    pub last_modified: Option<NaiveDate>,

    /// Registry-internal numeric id used for the detail lookup.
    /// Absent when the card carries no detail link.
    pub internal_id: Option<i64>,

    /// Whether the card links an extension certificate
    pub has_extension_cert: bool,

    /// When the detail phase last synchronized this project
    #[serde(default)]
    pub detail_synced_at: Option<DateTime<Utc>>,
}
