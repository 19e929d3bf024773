use crate::types::parse_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub repository enabled (or previously enabled) for CLA checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepositoryRecord {
    pub repository_id: String,
    pub repository_project_id: String,
    #[serde(default)]
    pub repository_sfdc_id: String,
    pub repository_name: String,
    #[serde(default)]
    pub repository_url: String,
    #[serde(default = "default_repository_type")]
    pub repository_type: String,
    pub repository_organization_name: String,
    #[serde(default)]
    pub repository_external_id: String,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
}

fn default_repository_type() -> String {
    "github".to_string()
}

fn enabled() -> bool {
    true
}

impl GithubRepositoryRecord {
    pub fn to_model(&self) -> GithubRepository {
        GithubRepository {
            repository_id: self.repository_id.clone(),
            repository_project_id: self.repository_project_id.clone(),
            project_sfid: self.repository_sfdc_id.clone(),
            repository_name: self.repository_name.clone(),
            repository_url: self.repository_url.clone(),
            repository_type: self.repository_type.clone(),
            repository_organization_name: self.repository_organization_name.clone(),
            repository_external_id: self.repository_external_id.clone(),
            enabled: self.enabled,
            date_created: parse_or_now(&self.date_created, "date_created", &self.repository_id),
            date_modified: parse_or_now(&self.date_modified, "date_modified", &self.repository_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubRepository {
    #[serde(rename = "repositoryID")]
    pub repository_id: String,
    #[serde(rename = "repositoryProjectID")]
    pub repository_project_id: String,
    #[serde(rename = "projectSFID")]
    pub project_sfid: String,
    #[serde(rename = "repositoryName")]
    pub repository_name: String,
    #[serde(rename = "repositoryUrl")]
    pub repository_url: String,
    #[serde(rename = "repositoryType")]
    pub repository_type: String,
    #[serde(rename = "repositoryOrganizationName")]
    pub repository_organization_name: String,
    #[serde(rename = "repositoryExternalID")]
    pub repository_external_id: String,
    pub enabled: bool,
    #[serde(rename = "dateCreated")]
    pub date_created: DateTime<Utc>,
    #[serde(rename = "dateModified")]
    pub date_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GithubRepositories {
    pub list: Vec<GithubRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGithubRepository {
    #[serde(rename = "repositoryProjectID")]
    pub repository_project_id: String,
    #[serde(rename = "repositoryName")]
    pub repository_name: String,
    #[serde(rename = "repositoryUrl", default)]
    pub repository_url: String,
    #[serde(rename = "repositoryOrganizationName")]
    pub repository_organization_name: String,
    #[serde(rename = "repositoryExternalID")]
    pub repository_external_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryEnabledInput {
    pub enabled: bool,
}

/// Repository visible to a GitHub app installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepositoryInfo {
    pub repository_github_id: i64,
    pub repository_name: String,
    #[serde(default)]
    pub repository_url: String,
}

/// GitHub organization linked to a project. The installation listing is the
/// last sync reported by the GitHub app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubOrganizationRecord {
    pub organization_name: String,
    pub organization_sfid: String,
    pub project_sfid: String,
    #[serde(default)]
    pub organization_installation_id: i64,
    #[serde(default)]
    pub auto_enabled: bool,
    #[serde(default)]
    pub branch_protection_enabled: bool,
    #[serde(default)]
    pub installation_repositories: Vec<GithubRepositoryInfo>,
    #[serde(default)]
    pub installation_error: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
}

impl GithubOrganizationRecord {
    pub fn to_model(&self) -> GithubOrganization {
        GithubOrganization {
            organization_name: self.organization_name.clone(),
            organization_sfid: self.organization_sfid.clone(),
            project_sfid: self.project_sfid.clone(),
            organization_installation_id: self.organization_installation_id,
            auto_enabled: self.auto_enabled,
            branch_protection_enabled: self.branch_protection_enabled,
            date_created: parse_or_now(&self.date_created, "date_created", &self.organization_name),
            date_modified: parse_or_now(
                &self.date_modified,
                "date_modified",
                &self.organization_name,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubOrganization {
    pub organization_name: String,
    #[serde(rename = "organizationSfid")]
    pub organization_sfid: String,
    #[serde(rename = "projectSFID")]
    pub project_sfid: String,
    #[serde(rename = "organizationInstallationID")]
    pub organization_installation_id: i64,
    pub auto_enabled: bool,
    pub branch_protection_enabled: bool,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGithubOrganization {
    pub organization_name: String,
    #[serde(default)]
    pub auto_enabled: bool,
    #[serde(default)]
    pub branch_protection_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGithubOrganization {
    pub auto_enabled: bool,
    #[serde(default)]
    pub branch_protection_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGithubRepository {
    pub connection_status: String,
    pub enabled: bool,
    #[serde(rename = "repositoryID")]
    pub repository_id: String,
    pub repository_name: String,
    #[serde(rename = "repositoryGithubID")]
    pub repository_github_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGithubOrganization {
    pub auto_enabled: bool,
    pub branch_protection_enabled: bool,
    pub connection_status: String,
    pub github_organization_name: String,
    pub repositories: Vec<ProjectGithubRepository>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectGithubOrganizations {
    pub list: Vec<ProjectGithubOrganization>,
}
