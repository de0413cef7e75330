//! Canonical project snapshot built from the authenticated detail API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Full project record, keyed by the registry's internal numeric id.
///
/// Created on the first successful detail fetch and fully overwritten on
/// every later one. Every date and number is either a parsed value or
/// `None`; tolerant parsing happens at mapping time so no malformed
/// provider string ever reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Registry-internal numeric id
    pub internal_id: i64,

    /// External registration number
    pub rera_id: String,

    /// Project display name
    pub name: String,

    /// Project type, e.g. "Residential"
    pub project_type: Option<String>,

    /// Current status code reported by the registry
    pub current_status: Option<String>,

    /// Human-readable status label
    pub status_name: Option<String>,

    pub district: Option<String>,
    pub taluka: Option<String>,
    pub pincode: Option<String>,

    /// Date of RERA registration
    pub registration_date: Option<NaiveDate>,

    /// Date the application was filed
    pub application_date: Option<NaiveDate>,

    /// Completion date originally proposed at registration
    pub original_completion: Option<NaiveDate>,

    /// Currently proposed completion date
    pub proposed_completion: Option<NaiveDate>,

    /// Date the registration certificate was generated
    pub cert_generation_date: Option<NaiveDate>,

    /// Acknowledgement number of the application
    pub ack_number: Option<String>,

    pub total_units: Option<i64>,
    pub sold_units: Option<i64>,

    /// Registration fees payable, parsed from a provider decimal string
    pub fees_payable: Option<f64>,

    /// Gross applicable fees, parsed from a provider decimal string
    pub gross_fees: Option<f64>,

    /// Migrated from the pre-RERA regime (provider sentinel 1/0)
    pub is_migrated: bool,

    /// Registration has lapsed (provider sentinel 1/0)
    pub is_lapsed: bool,

    /// Project is a single building rather than a layout (sentinel 1/0)
    pub is_building: bool,

    /// DMS reference of the registration certificate
    pub cert_dms_ref: Option<String>,

    /// DMS reference of the extension certificate, if one was granted
    pub extension_cert_ref: Option<String>,

    /// Promoter profile type id
    pub promoter_type_id: Option<i64>,

    /// Registry location id
    pub location_id: Option<i64>,

    /// Opaque copy of the raw provider payload
    pub raw_response: serde_json::Value,

    /// When this snapshot was last synchronized
    pub last_synced: DateTime<Utc>,
}
