use crate::constants::{table_name, GITHUB_ORGS_TABLE};
use crate::domain::GithubOrganizationRecord;
use crate::error::{ClaError, Result};
use crate::storage::{from_document, from_documents, to_document, DocumentStore};
use crate::types::current_time;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait GithubOrgRepository: Send + Sync {
    async fn add_github_organization(&self, record: GithubOrganizationRecord) -> Result<GithubOrganizationRecord>;
    async fn get_github_organization(&self, organization_name: &str) -> Result<Option<GithubOrganizationRecord>>;
    async fn get_github_organizations(&self, project_sfid: &str) -> Result<Vec<GithubOrganizationRecord>>;
    async fn update_github_organization(
        &self,
        organization_name: &str,
        auto_enabled: bool,
        branch_protection_enabled: bool,
    ) -> Result<GithubOrganizationRecord>;
    async fn delete_github_organization(&self, organization_name: &str) -> Result<()>;
}

pub struct StoreGithubOrgRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreGithubOrgRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, GITHUB_ORGS_TABLE),
        }
    }
}

#[async_trait]
impl GithubOrgRepository for StoreGithubOrgRepository {
    async fn add_github_organization(&self, record: GithubOrganizationRecord) -> Result<GithubOrganizationRecord> {
        if self.get_github_organization(&record.organization_name).await?.is_some() {
            return Err(ClaError::Conflict(format!(
                "github organization {} already exists",
                record.organization_name
            )));
        }
        self.store.put_item(&self.table, to_document(&record)?).await?;
        debug!("added github organization {} for project {}", record.organization_name, record.project_sfid);
        Ok(record)
    }

    async fn get_github_organization(&self, organization_name: &str) -> Result<Option<GithubOrganizationRecord>> {
        match self.store.get_item(&self.table, organization_name).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    async fn get_github_organizations(&self, project_sfid: &str) -> Result<Vec<GithubOrganizationRecord>> {
        let docs = self
            .store
            .query(&self.table, "project_sfid", &Value::from(project_sfid), None)
            .await?;
        from_documents(docs)
    }

    async fn update_github_organization(
        &self,
        organization_name: &str,
        auto_enabled: bool,
        branch_protection_enabled: bool,
    ) -> Result<GithubOrganizationRecord> {
        let (_, now) = current_time();
        let doc = self
            .store
            .update_item(
                &self.table,
                organization_name,
                vec![
                    ("auto_enabled".into(), json!(auto_enabled)),
                    ("branch_protection_enabled".into(), json!(branch_protection_enabled)),
                    ("date_modified".into(), json!(now)),
                ],
            )
            .await
            .map_err(|e| match e {
                ClaError::NotFound { .. } => ClaError::not_found("github organization", organization_name),
                other => other,
            })?;
        from_document(doc)
    }

    async fn delete_github_organization(&self, organization_name: &str) -> Result<()> {
        self.store.delete_item(&self.table, organization_name).await
    }
}
