use crate::types::{parse_or_now, CountMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Values of the `metric_type` attribute in the metrics table
pub const METRIC_TYPE_TOTAL_COUNT: &str = "total_count";
pub const METRIC_TYPE_COMPANY: &str = "company";
pub const METRIC_TYPE_PROJECT: &str = "project";
pub const METRIC_TYPE_CLA_MANAGER_DISTRIBUTION: &str = "cla_manager_distribution";

// Fixed ids for the singleton metric documents
pub const TOTAL_COUNT_METRIC_ID: &str = "total_count";
pub const CLA_MANAGER_DISTRIBUTION_METRIC_ID: &str = "cla_manager_distribution";

/// Global dashboard counters, one section per table. A section that could not
/// be read stays at its zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub users: CountMetrics,
    pub signatures: CountMetrics,
    pub companies: CountMetrics,
    pub repositories: CountMetrics,
    pub projects: CountMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalCountMetricsRecord {
    pub id: String,
    pub metric_type: String,
    pub cla_managers_count: i64,
    pub contributors_count: i64,
    pub corporate_contributors_count: i64,
    pub individual_contributors_count: i64,
    pub companies_count: i64,
    pub projects_count: i64,
    pub repositories_count: i64,
    pub github_repositories_count: i64,
    pub gerrit_repositories_count: i64,
    pub companies_project_contribution_count: i64,
    #[serde(default)]
    pub created_at: String,
}

impl TotalCountMetricsRecord {
    pub fn to_model(&self) -> TotalCountMetrics {
        TotalCountMetrics {
            cla_managers_count: self.cla_managers_count,
            contributors_count: self.contributors_count,
            corporate_contributors_count: self.corporate_contributors_count,
            individual_contributors_count: self.individual_contributors_count,
            companies_count: self.companies_count,
            projects_count: self.projects_count,
            repositories_count: self.repositories_count,
            github_repositories_count: self.github_repositories_count,
            gerrit_repositories_count: self.gerrit_repositories_count,
            companies_project_contribution_count: self.companies_project_contribution_count,
            created_at: parse_or_now(&self.created_at, "created_at", &self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCountMetrics {
    pub cla_managers_count: i64,
    pub contributors_count: i64,
    pub corporate_contributors_count: i64,
    pub individual_contributors_count: i64,
    pub companies_count: i64,
    pub projects_count: i64,
    pub repositories_count: i64,
    pub github_repositories_count: i64,
    pub gerrit_repositories_count: i64,
    pub companies_project_contribution_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaManagerDistributionRecord {
    pub id: String,
    pub metric_type: String,
    pub one_cla_manager: i64,
    pub two_cla_manager: i64,
    pub three_cla_manager: i64,
    pub four_or_more_cla_manager: i64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaManagerDistribution {
    pub one_cla_manager: i64,
    pub two_cla_managers: i64,
    pub three_cla_managers: i64,
    pub four_or_more_cla_managers: i64,
    pub created_at: DateTime<Utc>,
}

impl ClaManagerDistributionRecord {
    pub fn to_model(&self) -> ClaManagerDistribution {
        ClaManagerDistribution {
            one_cla_manager: self.one_cla_manager,
            two_cla_managers: self.two_cla_manager,
            three_cla_managers: self.three_cla_manager,
            four_or_more_cla_managers: self.four_or_more_cla_manager,
            created_at: parse_or_now(&self.created_at, "created_at", &self.id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetricRecord {
    /// Company id
    pub id: String,
    pub metric_type: String,
    pub company_name: String,
    pub project_count: i64,
    pub corporate_contributors_count: i64,
    pub cla_managers_count: i64,
    #[serde(default)]
    pub created_at: String,
}

impl CompanyMetricRecord {
    pub fn to_model(&self) -> CompanyMetric {
        CompanyMetric {
            company_id: self.id.clone(),
            company_name: self.company_name.clone(),
            project_count: self.project_count,
            corporate_contributors_count: self.corporate_contributors_count,
            cla_managers_count: self.cla_managers_count,
            created_at: parse_or_now(&self.created_at, "created_at", &self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMetric {
    #[serde(rename = "companyID")]
    pub company_id: String,
    pub company_name: String,
    pub project_count: i64,
    pub corporate_contributors_count: i64,
    pub cla_managers_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetricRecord {
    /// Project (CLA group) id
    pub id: String,
    pub metric_type: String,
    pub external_project_id: String,
    pub project_name: String,
    pub companies_count: i64,
    pub individual_contributors_count: i64,
    pub corporate_contributors_count: i64,
    pub cla_managers_count: i64,
    pub repositories_count: i64,
    #[serde(default)]
    pub created_at: String,
}

impl ProjectMetricRecord {
    pub fn to_model(&self) -> ProjectMetric {
        ProjectMetric {
            project_id: self.id.clone(),
            project_name: self.project_name.clone(),
            companies_count: self.companies_count,
            individual_contributors_count: self.individual_contributors_count,
            corporate_contributors_count: self.corporate_contributors_count,
            cla_managers_count: self.cla_managers_count,
            repositories_count: self.repositories_count,
            total_contributors_count: self.individual_contributors_count
                + self.corporate_contributors_count,
            created_at: parse_or_now(&self.created_at, "created_at", &self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetric {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub project_name: String,
    pub companies_count: i64,
    pub individual_contributors_count: i64,
    pub corporate_contributors_count: i64,
    pub cla_managers_count: i64,
    pub repositories_count: i64,
    pub total_contributors_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Project metrics grouped under one external (Salesforce) project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SfProjectMetric {
    #[serde(rename = "projectExternalID")]
    pub project_external_id: String,
    pub list: Vec<ProjectMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectMetric {
    pub list: Vec<SfProjectMetric>,
    pub next_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCompanies {
    pub average_company_cla_managers: i64,
    pub average_company_corporate_contributors: i64,
    pub average_company_project_count: i64,
    pub top_companies_by_cla_managers: Vec<CompanyMetric>,
    pub top_companies_by_corporate_contributors: Vec<CompanyMetric>,
    pub top_companies_by_project_count: Vec<CompanyMetric>,
}

/// Which id a project metric lookup is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectIdType {
    Internal,
    Salesforce,
}

impl ProjectIdType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(ProjectIdType::Internal),
            "salesforce" => Some(ProjectIdType::Salesforce),
            _ => None,
        }
    }
}
