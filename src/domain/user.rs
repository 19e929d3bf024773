use super::company::default_version;
use crate::types::parse_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lf_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lf_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_github_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_github_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_company_id: Option<String>,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl UserRecord {
    pub fn to_model(&self) -> User {
        User {
            user_id: self.user_id.clone(),
            lf_username: self.lf_username.clone().unwrap_or_default(),
            lf_email: self.lf_email.clone().unwrap_or_default(),
            username: self.user_name.clone().unwrap_or_default(),
            emails: self.user_emails.clone(),
            github_id: self.user_github_id,
            github_username: self.user_github_username.clone().unwrap_or_default(),
            company_id: self.user_company_id.clone().unwrap_or_default(),
            date_created: parse_or_now(&self.date_created, "date_created", &self.user_id),
            date_modified: parse_or_now(&self.date_modified, "date_modified", &self.user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub lf_username: String,
    pub lf_email: String,
    pub username: String,
    pub emails: Vec<String>,
    #[serde(rename = "githubID")]
    pub github_id: Option<i64>,
    pub github_username: String,
    #[serde(rename = "companyID")]
    pub company_id: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl User {
    /// Name matched against company ACLs: the LF username, else the display username
    pub fn acl_name(&self) -> Option<&str> {
        [self.lf_username.as_str(), self.username.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[serde(default)]
    pub lf_username: Option<String>,
    #[serde(default)]
    pub lf_email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(rename = "githubID", default)]
    pub github_id: Option<i64>,
    #[serde(default)]
    pub github_username: Option<String>,
}
