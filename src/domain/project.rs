use super::company::default_version;
use crate::types::parse_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: String,
    #[serde(default)]
    pub project_external_id: String,
    pub project_name: String,
    #[serde(default)]
    pub project_acl: Vec<String>,
    #[serde(default = "enabled")]
    pub project_icla_enabled: bool,
    #[serde(default = "enabled")]
    pub project_ccla_enabled: bool,
    #[serde(default)]
    pub project_ccla_requires_icla_signature: bool,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn enabled() -> bool {
    true
}

impl ProjectRecord {
    pub fn to_model(&self) -> Project {
        Project {
            project_id: self.project_id.clone(),
            project_external_id: self.project_external_id.clone(),
            project_name: self.project_name.clone(),
            project_acl: self.project_acl.clone(),
            project_icla_enabled: self.project_icla_enabled,
            project_ccla_enabled: self.project_ccla_enabled,
            project_ccla_requires_icla_signature: self.project_ccla_requires_icla_signature,
            date_created: parse_or_now(&self.date_created, "date_created", &self.project_id),
            date_modified: parse_or_now(&self.date_modified, "date_modified", &self.project_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    #[serde(rename = "projectID")]
    pub project_id: String,
    #[serde(rename = "projectExternalID")]
    pub project_external_id: String,
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "projectACL")]
    pub project_acl: Vec<String>,
    #[serde(rename = "projectICLAEnabled")]
    pub project_icla_enabled: bool,
    #[serde(rename = "projectCCLAEnabled")]
    pub project_ccla_enabled: bool,
    #[serde(rename = "projectCCLARequiresICLA")]
    pub project_ccla_requires_icla_signature: bool,
    #[serde(rename = "dateCreated")]
    pub date_created: DateTime<Utc>,
    #[serde(rename = "dateModified")]
    pub date_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projects {
    pub result_count: i64,
    pub total_count: i64,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectInput {
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "projectExternalID", default)]
    pub project_external_id: String,
    #[serde(rename = "projectACL", default)]
    pub project_acl: Vec<String>,
    #[serde(rename = "projectICLAEnabled", default = "enabled")]
    pub project_icla_enabled: bool,
    #[serde(rename = "projectCCLAEnabled", default = "enabled")]
    pub project_ccla_enabled: bool,
    #[serde(rename = "projectCCLARequiresICLA", default)]
    pub project_ccla_requires_icla_signature: bool,
}

/// Project as reported by the external project directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalProject {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Parent", default)]
    pub parent: String,
}
