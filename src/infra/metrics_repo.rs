use crate::constants::{table_name, METRICS_TABLE};
use crate::domain::{
    ClaManagerDistributionRecord, CompanyMetricRecord, ProjectMetricRecord,
    TotalCountMetricsRecord, CLA_MANAGER_DISTRIBUTION_METRIC_ID, METRIC_TYPE_COMPANY,
    METRIC_TYPE_PROJECT, TOTAL_COUNT_METRIC_ID,
};
use crate::error::{ClaError, Result};
use crate::storage::{
    from_document, from_documents, scan_all, scan_page, to_document, Condition, DocumentStore,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Precomputed metric documents. Every kind lives in one table keyed by `id`
/// and discriminated by `metric_type`.
#[async_trait]
pub trait MetricsRepository: Send + Sync {
    async fn get_total_count_metrics(&self) -> Result<TotalCountMetricsRecord>;
    async fn get_cla_manager_distribution(&self) -> Result<ClaManagerDistributionRecord>;
    async fn get_company_metric(&self, company_id: &str) -> Result<CompanyMetricRecord>;
    async fn get_company_metrics(&self) -> Result<Vec<CompanyMetricRecord>>;
    async fn get_project_metric(&self, project_id: &str) -> Result<ProjectMetricRecord>;
    async fn get_project_metrics(&self) -> Result<Vec<ProjectMetricRecord>>;
    async fn get_project_metrics_by_external_id(
        &self,
        external_project_id: &str,
    ) -> Result<Vec<ProjectMetricRecord>>;
    async fn list_project_metrics(
        &self,
        page_size: usize,
        next_key: Option<&str>,
    ) -> Result<(Vec<ProjectMetricRecord>, Option<String>)>;

    async fn put_total_count_metrics(&self, record: &TotalCountMetricsRecord) -> Result<()>;
    async fn put_cla_manager_distribution(&self, record: &ClaManagerDistributionRecord) -> Result<()>;
    async fn put_company_metric(&self, record: &CompanyMetricRecord) -> Result<()>;
    async fn put_project_metric(&self, record: &ProjectMetricRecord) -> Result<()>;
    async fn delete_metric(&self, id: &str) -> Result<()>;
}

pub struct StoreMetricsRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreMetricsRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, METRICS_TABLE),
        }
    }

    async fn get_metric<T: serde::de::DeserializeOwned>(&self, id: &str, kind: &'static str) -> Result<T> {
        let doc = self
            .store
            .get_item(&self.table, id)
            .await
            .map_err(|e| {
                warn!("error retrieving {} {}, error: {}", kind, id, e);
                e
            })?
            .ok_or_else(|| ClaError::not_found(kind, id))?;
        from_document(doc)
    }

    async fn put_metric<T: Serialize + Sync>(&self, record: &T) -> Result<()> {
        self.store.put_item(&self.table, to_document(record)?).await
    }
}

#[async_trait]
impl MetricsRepository for StoreMetricsRepository {
    async fn get_total_count_metrics(&self) -> Result<TotalCountMetricsRecord> {
        self.get_metric(TOTAL_COUNT_METRIC_ID, "total count metric").await
    }

    async fn get_cla_manager_distribution(&self) -> Result<ClaManagerDistributionRecord> {
        self.get_metric(CLA_MANAGER_DISTRIBUTION_METRIC_ID, "cla manager distribution")
            .await
    }

    async fn get_company_metric(&self, company_id: &str) -> Result<CompanyMetricRecord> {
        self.get_metric(company_id, "company metric").await
    }

    async fn get_company_metrics(&self) -> Result<Vec<CompanyMetricRecord>> {
        let docs = scan_all(
            self.store.as_ref(),
            &self.table,
            Some(Condition::equals("metric_type", METRIC_TYPE_COMPANY)),
            None,
        )
        .await?;
        from_documents(docs)
    }

    async fn get_project_metric(&self, project_id: &str) -> Result<ProjectMetricRecord> {
        self.get_metric(project_id, "project metric").await
    }

    async fn get_project_metrics(&self) -> Result<Vec<ProjectMetricRecord>> {
        let docs = scan_all(
            self.store.as_ref(),
            &self.table,
            Some(Condition::equals("metric_type", METRIC_TYPE_PROJECT)),
            None,
        )
        .await?;
        from_documents(docs)
    }

    async fn get_project_metrics_by_external_id(
        &self,
        external_project_id: &str,
    ) -> Result<Vec<ProjectMetricRecord>> {
        let docs = scan_all(
            self.store.as_ref(),
            &self.table,
            Some(
                Condition::equals("metric_type", METRIC_TYPE_PROJECT)
                    .and(Condition::equals("external_project_id", external_project_id)),
            ),
            None,
        )
        .await?;
        from_documents(docs)
    }

    async fn list_project_metrics(
        &self,
        page_size: usize,
        next_key: Option<&str>,
    ) -> Result<(Vec<ProjectMetricRecord>, Option<String>)> {
        let (docs, last_key) = scan_page(
            self.store.as_ref(),
            &self.table,
            Some(Condition::equals("metric_type", METRIC_TYPE_PROJECT)),
            page_size,
            next_key.map(str::to_string),
        )
        .await?;
        Ok((from_documents(docs)?, last_key))
    }

    async fn put_total_count_metrics(&self, record: &TotalCountMetricsRecord) -> Result<()> {
        self.put_metric(record).await
    }

    async fn put_cla_manager_distribution(&self, record: &ClaManagerDistributionRecord) -> Result<()> {
        self.put_metric(record).await
    }

    async fn put_company_metric(&self, record: &CompanyMetricRecord) -> Result<()> {
        self.put_metric(record).await
    }

    async fn put_project_metric(&self, record: &ProjectMetricRecord) -> Result<()> {
        self.put_metric(record).await
    }

    async fn delete_metric(&self, id: &str) -> Result<()> {
        self.store.delete_item(&self.table, id).await.map_err(|e| {
            warn!("unable to delete metric {}, error: {}", id, e);
            e
        })
    }
}
