use crate::constants::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use crate::error::{ClaError, Result};
use crate::types::parse_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Company as stored in the companies table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_id: String,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_manager_id: Option<String>,
    #[serde(default)]
    pub company_acl: Vec<String>,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default = "default_version")]
    pub version: String,
}

pub(crate) fn default_version() -> String {
    "v1".to_string()
}

impl CompanyRecord {
    pub fn to_model(&self) -> Company {
        Company {
            company_id: self.company_id.clone(),
            company_name: self.company_name.clone(),
            company_external_id: self.company_external_id.clone().unwrap_or_default(),
            company_manager_id: self.company_manager_id.clone().unwrap_or_default(),
            company_acl: self.company_acl.clone(),
            created: parse_or_now(&self.date_created, "date_created", &self.company_id),
            updated: parse_or_now(&self.date_modified, "date_modified", &self.company_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "companyID")]
    pub company_id: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "companyExternalID")]
    pub company_external_id: String,
    #[serde(rename = "companyManagerID")]
    pub company_manager_id: String,
    #[serde(rename = "companyACL")]
    pub company_acl: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Companies {
    pub result_count: i64,
    pub total_count: i64,
    pub last_key_scanned: String,
    pub search_terms: String,
    pub companies: Vec<Company>,
}

impl Companies {
    pub fn empty(search_terms: &str) -> Self {
        Self {
            search_terms: search_terms.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompanyInput {
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "companyExternalID", default)]
    pub company_external_id: Option<String>,
    #[serde(rename = "companyManagerID", default)]
    pub company_manager_id: Option<String>,
    #[serde(rename = "companyACL", default)]
    pub company_acl: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyWithInvite {
    #[serde(rename = "companyID")]
    pub company_id: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "companyExternalID")]
    pub company_external_id: String,
    #[serde(rename = "companyACL")]
    pub company_acl: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompaniesWithInvites {
    pub result_count: i64,
    pub total_count: i64,
    pub companies_with_invites: Vec<CompanyWithInvite>,
}

/// Lifecycle of a company access request. Only pending requests move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => STATUS_PENDING,
            InviteStatus::Approved => STATUS_APPROVED,
            InviteStatus::Rejected => STATUS_REJECTED,
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            STATUS_PENDING => Ok(InviteStatus::Pending),
            STATUS_APPROVED => Ok(InviteStatus::Approved),
            STATUS_REJECTED => Ok(InviteStatus::Rejected),
            other => Err(ClaError::Validation(format!("unknown invite status '{other}'"))),
        }
    }

    pub fn transition_to(self, next: InviteStatus) -> Result<InviteStatus> {
        match (self, next) {
            (InviteStatus::Pending, InviteStatus::Approved)
            | (InviteStatus::Pending, InviteStatus::Rejected) => Ok(next),
            (from, to) => Err(ClaError::InvalidStatusTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request by a user to join a company's managers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub company_invite_id: String,
    pub requested_company_id: String,
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: InviteStatus,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
}

// Records written without a status (or with an empty one) read as pending
fn deserialize_status<'de, D>(deserializer: D) -> std::result::Result<InviteStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(InviteStatus::Pending),
        Some(value) => InviteStatus::parse(value).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteRequestInput {
    #[serde(rename = "userID")]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AclEntryInput {
    pub username: String,
}
