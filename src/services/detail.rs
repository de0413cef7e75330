// src/services/detail.rs

//! Detail scraper service.
//!
//! Fetches full project detail from the authenticated registration API and
//! maps the provider payload into the canonical snapshot. Field names on
//! the wire follow the provider's own spelling, misspellings included.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{JurisdictionConfig, Project};
use crate::pipeline::derive_red_flags;
use crate::services::DetailScraper;
use crate::storage::ProjectStore;
use crate::utils::parse::{parse_date, parse_decimal, parse_integer};
use crate::utils::token::{DEFAULT_VALID_MINUTES, TokenManager};
use crate::utils::{RetryOptions, with_retry};

const DETAIL_ENDPOINT: &str = "getProjectGeneralDetailsByProjectId";

/// Raw provider payload under the response envelope's `responseObject`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPayload {
    pub project_registartion_no: Option<String>,
    pub project_name: Option<String>,
    pub project_type_name: Option<String>,
    pub project_current_status: Option<String>,
    pub project_status_name: Option<String>,
    pub district: Option<String>,
    pub taluka: Option<String>,
    pub pincode: Option<String>,
    pub original_project_propose_completion_date: Option<String>,
    pub project_propose_complition_date: Option<String>,
    pub rera_registration_date: Option<String>,
    pub project_application_date: Option<String>,
    pub registration_certificate_generation_date: Option<String>,
    pub acknowledgement_number: Option<String>,
    pub total_number_of_units: Option<i64>,
    pub total_number_of_sold_units: Option<i64>,
    pub project_fees_payable_amount: Option<String>,
    pub project_calculated_gross_fees_applicable: Option<String>,
    pub is_migrated: Option<i64>,
    pub is_project_lapsed: Option<i64>,
    pub is_building: Option<i64>,
    pub registration_certificate_dms_ref_no: Option<String>,
    pub extension_certificate_dms_ref_no: Option<String>,
    pub user_profile_type_id: Option<String>,
    pub project_location_id: Option<String>,
}

/// Map a raw detail payload into the canonical project snapshot.
///
/// Total over well-formed payloads: dates and numbers that fail to parse
/// become `None`, sentinel integers become booleans, and the raw payload
/// is retained verbatim. Only a payload missing its identity (registration
/// number or name) is rejected.
pub fn map_project(internal_id: i64, raw: serde_json::Value) -> Result<Project> {
    let payload: DetailPayload = serde_json::from_value(raw.clone())?;

    let rera_id = non_empty(payload.project_registartion_no).ok_or_else(|| {
        AppError::validation(format!("Project {internal_id}: missing registration number"))
    })?;
    let name = non_empty(payload.project_name)
        .ok_or_else(|| AppError::validation(format!("Project {internal_id}: missing name")))?;

    Ok(Project {
        internal_id,
        rera_id,
        name,
        project_type: non_empty(payload.project_type_name),
        current_status: non_empty(payload.project_current_status),
        status_name: non_empty(payload.project_status_name),
        district: non_empty(payload.district),
        taluka: non_empty(payload.taluka),
        pincode: non_empty(payload.pincode),
        registration_date: parse_date(payload.rera_registration_date.as_deref()),
        application_date: parse_date(payload.project_application_date.as_deref()),
        original_completion: parse_date(
            payload.original_project_propose_completion_date.as_deref(),
        ),
        proposed_completion: parse_date(payload.project_propose_complition_date.as_deref()),
        cert_generation_date: parse_date(
            payload.registration_certificate_generation_date.as_deref(),
        ),
        ack_number: non_empty(payload.acknowledgement_number),
        total_units: payload.total_number_of_units,
        sold_units: payload.total_number_of_sold_units,
        fees_payable: parse_decimal(payload.project_fees_payable_amount.as_deref()),
        gross_fees: parse_decimal(payload.project_calculated_gross_fees_applicable.as_deref()),
        is_migrated: payload.is_migrated == Some(1),
        is_lapsed: payload.is_project_lapsed == Some(1),
        is_building: payload.is_building == Some(1),
        cert_dms_ref: non_empty(payload.registration_certificate_dms_ref_no),
        extension_cert_ref: non_empty(payload.extension_certificate_dms_ref_no),
        promoter_type_id: parse_integer(payload.user_profile_type_id.as_deref()),
        location_id: parse_integer(payload.project_location_id.as_deref()),
        raw_response: raw,
        last_synced: Utc::now(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Detail scraper for the MahaRERA project-registration API.
pub struct MahaDetailScraper {
    client: reqwest::Client,
    api_base_url: String,
    store: Arc<dyn ProjectStore>,
    retry: RetryOptions,
    tokens: Mutex<TokenManager>,
    fallback_token: Option<String>,
}

impl MahaDetailScraper {
    pub fn new(
        client: reqwest::Client,
        jurisdiction: &JurisdictionConfig,
        store: Arc<dyn ProjectStore>,
        retry: RetryOptions,
        fallback_token: Option<String>,
    ) -> Self {
        Self {
            client,
            api_base_url: jurisdiction.detail_api_url.clone(),
            store,
            retry,
            tokens: Mutex::new(TokenManager::new()),
            fallback_token,
        }
    }

    /// A usable bearer token: the cached one if still valid, else the
    /// operator-supplied fallback. No token at all is fatal for the run.
    fn valid_token(&self) -> Result<String> {
        let mut tokens = self.tokens.lock().expect("token lock poisoned");
        if let Some(token) = tokens.token() {
            return Ok(token.to_string());
        }

        let Some(fallback) = self.fallback_token.as_deref() else {
            return Err(AppError::credential(
                "No valid bearer token found. Provide one via:\n  \
                 1. RERA_TOKEN environment variable, or\n  \
                 2. --token CLI flag\n\n\
                 Obtain the token manually from the registry: open a project \
                 detail page with DevTools -> Network, find the Authorization \
                 header on an API request, and copy the Bearer value (valid \
                 for ~100 minutes).",
            ));
        };
        tokens.set_token(fallback, DEFAULT_VALID_MINUTES);
        Ok(fallback.to_string())
    }

    /// POST the detail endpoint; `None` when the envelope carries no
    /// payload for this project.
    async fn fetch_details(
        &self,
        internal_id: i64,
        token: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}{DETAIL_ENDPOINT}", self.api_base_url);

        let envelope: serde_json::Value = with_retry(&self.retry, || {
            let request = self
                .client
                .post(&url)
                .bearer_auth(token)
                .json(&serde_json::json!({ "projectId": internal_id }));
            let url = url.clone();
            async move {
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AppError::status(status, url));
                }
                Ok(response.json().await?)
            }
        })
        .await?;

        Ok(match envelope.get("responseObject") {
            None | Some(serde_json::Value::Null) => None,
            Some(payload) => Some(payload.clone()),
        })
    }
}

#[async_trait]
impl DetailScraper for MahaDetailScraper {
    async fn process_project(&self, internal_id: i64) -> Result<()> {
        let token = self.valid_token()?;

        let Some(raw) = self.fetch_details(internal_id, &token).await? else {
            log::debug!("Project {internal_id}: no detail payload, skipping");
            return Ok(());
        };

        let project = map_project(internal_id, raw)?;
        self.store.upsert_project(&project).await?;
        self.store.mark_detail_synced(internal_id, Utc::now()).await?;

        // Every fresh snapshot re-derives its compliance flags.
        derive_red_flags(self.store.as_ref(), &project).await?;

        log::info!("Processed project {internal_id} ({})", project.rera_id);
        Ok(())
    }
}
