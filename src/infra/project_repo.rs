use crate::constants::{table_name, PROJECTS_TABLE};
use crate::domain::{CreateProjectInput, Project, ProjectRecord, Projects};
use crate::error::{ClaError, Result};
use crate::storage::{from_document, from_documents, scan_all, to_document, DocumentStore};
use crate::types::{current_time, CountMetrics};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create_project(&self, input: &CreateProjectInput) -> Result<Project>;
    async fn get_project(&self, project_id: &str) -> Result<Project>;
    async fn get_project_by_external_id(&self, external_id: &str) -> Result<Project>;
    async fn get_projects_by_external_id(&self, external_id: &str) -> Result<Vec<Project>>;
    async fn get_projects(&self) -> Result<Projects>;
    async fn delete_project(&self, project_id: &str) -> Result<()>;
    async fn get_metrics(&self) -> Result<CountMetrics>;
}

pub struct StoreProjectRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreProjectRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, PROJECTS_TABLE),
        }
    }
}

#[async_trait]
impl ProjectRepository for StoreProjectRepository {
    async fn create_project(&self, input: &CreateProjectInput) -> Result<Project> {
        let (_, now) = current_time();
        let record = ProjectRecord {
            project_id: Uuid::new_v4().to_string(),
            project_external_id: input.project_external_id.trim().to_string(),
            project_name: input.project_name.trim().to_string(),
            project_acl: input.project_acl.clone(),
            project_icla_enabled: input.project_icla_enabled,
            project_ccla_enabled: input.project_ccla_enabled,
            project_ccla_requires_icla_signature: input.project_ccla_requires_icla_signature,
            date_created: now.clone(),
            date_modified: now,
            version: "v1".to_string(),
        };
        self.store.put_item(&self.table, to_document(&record)?).await?;
        debug!("project created {}", record.project_id);
        Ok(record.to_model())
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let doc = self
            .store
            .get_item(&self.table, project_id)
            .await?
            .ok_or_else(|| ClaError::not_found("project", project_id))?;
        let record: ProjectRecord = from_document(doc)?;
        Ok(record.to_model())
    }

    async fn get_project_by_external_id(&self, external_id: &str) -> Result<Project> {
        self.get_projects_by_external_id(external_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClaError::not_found("project", external_id))
    }

    async fn get_projects_by_external_id(&self, external_id: &str) -> Result<Vec<Project>> {
        let docs = self
            .store
            .query(
                &self.table,
                "project_external_id",
                &Value::from(external_id),
                None,
            )
            .await
            .map_err(|e| {
                warn!("error querying projects by external id {}, error: {}", external_id, e);
                e
            })?;
        let records: Vec<ProjectRecord> = from_documents(docs)?;
        Ok(records.iter().map(ProjectRecord::to_model).collect())
    }

    async fn get_projects(&self) -> Result<Projects> {
        let docs = scan_all(self.store.as_ref(), &self.table, None, None).await?;
        let records: Vec<ProjectRecord> = from_documents(docs)?;
        let projects: Vec<Project> = records.iter().map(ProjectRecord::to_model).collect();
        let total_count = self.store.item_count(&self.table).await?;
        Ok(Projects {
            result_count: projects.len() as i64,
            total_count,
            projects,
        })
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        // Surface a 404 rather than silently deleting nothing
        self.get_project(project_id).await?;
        self.store.delete_item(&self.table, project_id).await
    }

    async fn get_metrics(&self) -> Result<CountMetrics> {
        Ok(CountMetrics {
            total_count: self.store.item_count(&self.table).await?,
        })
    }
}
