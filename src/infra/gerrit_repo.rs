use crate::constants::{table_name, GERRIT_INSTANCES_TABLE};
use crate::domain::{Gerrit, GerritRecord};
use crate::error::{ClaError, Result};
use crate::storage::{from_document, from_documents, scan_all, to_document, DocumentStore};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait GerritRepository: Send + Sync {
    async fn add_gerrit(&self, record: GerritRecord) -> Result<Gerrit>;
    async fn get_gerrit(&self, gerrit_id: &str) -> Result<Gerrit>;
    async fn get_project_gerrits(&self, project_id: &str) -> Result<Vec<Gerrit>>;
    async fn list_all_gerrits(&self) -> Result<Vec<Gerrit>>;
    async fn delete_gerrit(&self, gerrit_id: &str) -> Result<()>;
}

pub struct StoreGerritRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreGerritRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, GERRIT_INSTANCES_TABLE),
        }
    }
}

#[async_trait]
impl GerritRepository for StoreGerritRepository {
    async fn add_gerrit(&self, record: GerritRecord) -> Result<Gerrit> {
        self.store.put_item(&self.table, to_document(&record)?).await?;
        Ok(record.to_model())
    }

    async fn get_gerrit(&self, gerrit_id: &str) -> Result<Gerrit> {
        let doc = self
            .store
            .get_item(&self.table, gerrit_id)
            .await?
            .ok_or_else(|| ClaError::not_found("gerrit instance", gerrit_id))?;
        let record: GerritRecord = from_document(doc)?;
        Ok(record.to_model())
    }

    async fn get_project_gerrits(&self, project_id: &str) -> Result<Vec<Gerrit>> {
        let docs = self
            .store
            .query(&self.table, "project_id", &Value::from(project_id), None)
            .await?;
        let records: Vec<GerritRecord> = from_documents(docs)?;
        Ok(records.iter().map(GerritRecord::to_model).collect())
    }

    async fn list_all_gerrits(&self) -> Result<Vec<Gerrit>> {
        let docs = scan_all(self.store.as_ref(), &self.table, None, None).await?;
        let records: Vec<GerritRecord> = from_documents(docs)?;
        Ok(records.iter().map(GerritRecord::to_model).collect())
    }

    async fn delete_gerrit(&self, gerrit_id: &str) -> Result<()> {
        self.store.delete_item(&self.table, gerrit_id).await
    }
}
