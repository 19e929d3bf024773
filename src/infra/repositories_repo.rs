use crate::constants::{table_name, REPOSITORIES_TABLE};
use crate::domain::{GithubRepository, GithubRepositoryRecord};
use crate::error::{ClaError, Result};
use crate::storage::{from_document, from_documents, scan_all, to_document, Condition, DocumentStore};
use crate::types::{current_time, CountMetrics};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait RepositoriesRepository: Send + Sync {
    async fn add_github_repository(&self, record: GithubRepositoryRecord) -> Result<GithubRepository>;
    async fn get_repository(&self, repository_id: &str) -> Result<GithubRepository>;
    async fn list_project_repositories(
        &self,
        project_id: &str,
        enabled: Option<bool>,
    ) -> Result<Vec<GithubRepository>>;
    /// Repositories linked to an external (Salesforce) project id
    async fn list_project_sfid_repositories(&self, project_sfid: &str) -> Result<Vec<GithubRepository>>;
    async fn list_all_repositories(&self) -> Result<Vec<GithubRepository>>;
    async fn set_repository_enabled(&self, repository_id: &str, enabled: bool) -> Result<GithubRepository>;
    /// Disable every repository of an organization, returning how many changed
    async fn disable_organization_repositories(&self, organization_name: &str) -> Result<usize>;
    async fn get_metrics(&self) -> Result<CountMetrics>;
}

pub struct StoreRepositoriesRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreRepositoriesRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, REPOSITORIES_TABLE),
        }
    }

    async fn query_models(&self, attr: &str, value: &str, filter: Option<Condition>) -> Result<Vec<GithubRepository>> {
        let docs = self
            .store
            .query(&self.table, attr, &Value::from(value), filter.as_ref())
            .await?;
        let records: Vec<GithubRepositoryRecord> = from_documents(docs)?;
        Ok(records.iter().map(GithubRepositoryRecord::to_model).collect())
    }
}

#[async_trait]
impl RepositoriesRepository for StoreRepositoriesRepository {
    async fn add_github_repository(&self, record: GithubRepositoryRecord) -> Result<GithubRepository> {
        let existing = self
            .query_models(
                "repository_external_id",
                &record.repository_external_id,
                Some(Condition::equals(
                    "repository_project_id",
                    record.repository_project_id.as_str(),
                )),
            )
            .await?;
        if !existing.is_empty() {
            warn!(
                "github repository {} already registered for project {}",
                record.repository_external_id, record.repository_project_id
            );
            return Err(ClaError::Conflict(format!(
                "github repository {} already exists for project {}",
                record.repository_name, record.repository_project_id
            )));
        }
        self.store.put_item(&self.table, to_document(&record)?).await?;
        debug!("added github repository {}", record.repository_id);
        Ok(record.to_model())
    }

    async fn get_repository(&self, repository_id: &str) -> Result<GithubRepository> {
        let doc = self
            .store
            .get_item(&self.table, repository_id)
            .await?
            .ok_or_else(|| ClaError::not_found("github repository", repository_id))?;
        let record: GithubRepositoryRecord = from_document(doc)?;
        Ok(record.to_model())
    }

    async fn list_project_repositories(
        &self,
        project_id: &str,
        enabled: Option<bool>,
    ) -> Result<Vec<GithubRepository>> {
        self.query_models(
            "repository_project_id",
            project_id,
            enabled.map(|value| Condition::equals("enabled", value)),
        )
        .await
    }

    async fn list_project_sfid_repositories(&self, project_sfid: &str) -> Result<Vec<GithubRepository>> {
        self.query_models("repository_sfdc_id", project_sfid, None).await
    }

    async fn list_all_repositories(&self) -> Result<Vec<GithubRepository>> {
        let docs = scan_all(self.store.as_ref(), &self.table, None, None).await?;
        let records: Vec<GithubRepositoryRecord> = from_documents(docs)?;
        Ok(records.iter().map(GithubRepositoryRecord::to_model).collect())
    }

    async fn set_repository_enabled(&self, repository_id: &str, enabled: bool) -> Result<GithubRepository> {
        let (_, now) = current_time();
        let doc = self
            .store
            .update_item(
                &self.table,
                repository_id,
                vec![
                    ("enabled".into(), json!(enabled)),
                    ("date_modified".into(), json!(now)),
                ],
            )
            .await
            .map_err(|e| match e {
                ClaError::NotFound { .. } => ClaError::not_found("github repository", repository_id),
                other => other,
            })?;
        let record: GithubRepositoryRecord = from_document(doc)?;
        Ok(record.to_model())
    }

    async fn disable_organization_repositories(&self, organization_name: &str) -> Result<usize> {
        let repos = self
            .query_models(
                "repository_organization_name",
                organization_name,
                Some(Condition::equals("enabled", true)),
            )
            .await?;
        for repo in &repos {
            self.set_repository_enabled(&repo.repository_id, false).await?;
        }
        debug!("disabled {} repositories of organization {}", repos.len(), organization_name);
        Ok(repos.len())
    }

    async fn get_metrics(&self) -> Result<CountMetrics> {
        Ok(CountMetrics {
            total_count: self.store.item_count(&self.table).await?,
        })
    }
}
