use crate::types::parse_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GerritRecord {
    pub gerrit_id: String,
    pub project_id: String,
    pub gerrit_name: String,
    pub gerrit_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id_icla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id_ccla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name_icla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name_ccla: Option<String>,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
}

impl GerritRecord {
    pub fn to_model(&self) -> Gerrit {
        Gerrit {
            gerrit_id: self.gerrit_id.clone(),
            project_id: self.project_id.clone(),
            gerrit_name: self.gerrit_name.clone(),
            gerrit_url: self.gerrit_url.clone(),
            group_id_icla: self.group_id_icla.clone().unwrap_or_default(),
            group_id_ccla: self.group_id_ccla.clone().unwrap_or_default(),
            group_name_icla: self.group_name_icla.clone().unwrap_or_default(),
            group_name_ccla: self.group_name_ccla.clone().unwrap_or_default(),
            date_created: parse_or_now(&self.date_created, "date_created", &self.gerrit_id),
            date_modified: parse_or_now(&self.date_modified, "date_modified", &self.gerrit_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gerrit {
    #[serde(rename = "gerritID")]
    pub gerrit_id: String,
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub gerrit_name: String,
    pub gerrit_url: String,
    pub group_id_icla: String,
    pub group_id_ccla: String,
    pub group_name_icla: String,
    pub group_name_ccla: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GerritList {
    pub list: Vec<Gerrit>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGerrit {
    pub gerrit_name: String,
    pub gerrit_url: String,
    #[serde(default)]
    pub group_id_icla: Option<String>,
    #[serde(default)]
    pub group_id_ccla: Option<String>,
    #[serde(default)]
    pub group_name_icla: Option<String>,
    #[serde(default)]
    pub group_name_ccla: Option<String>,
}
