use crate::constants::{table_name, REFERENCE_TYPE_COMPANY, REFERENCE_TYPE_USER, SIGNATURES_TABLE};
use crate::domain::{merge_list, ApprovalListUpdate, Signature, SignatureRecord, Signatures};
use crate::error::{ClaError, Result};
use crate::storage::{
    from_document, from_documents, scan_all, scan_page, Condition, DocumentStore,
};
use crate::types::{current_time, CountMetrics};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait SignatureRepository: Send + Sync {
    async fn get_signature(&self, signature_id: &str) -> Result<Signature>;
    async fn get_project_signatures(
        &self,
        project_id: &str,
        page_size: usize,
        next_key: Option<&str>,
    ) -> Result<Signatures>;
    async fn get_company_signatures(&self, company_id: &str) -> Result<Signatures>;
    async fn get_user_signatures(&self, user_id: &str) -> Result<Signatures>;
    /// Every stored signature, for metric recomputation
    async fn get_all_signature_records(&self) -> Result<Vec<SignatureRecord>>;
    async fn update_approval_list(
        &self,
        signature_id: &str,
        update: &ApprovalListUpdate,
    ) -> Result<Signature>;
    async fn get_metrics(&self) -> Result<CountMetrics>;
}

pub struct StoreSignatureRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreSignatureRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, SIGNATURES_TABLE),
        }
    }

    async fn get_record(&self, signature_id: &str) -> Result<SignatureRecord> {
        let doc = self
            .store
            .get_item(&self.table, signature_id)
            .await?
            .ok_or_else(|| ClaError::not_found("signature", signature_id))?;
        from_document(doc)
    }

    async fn scan_signatures(&self, filter: Condition) -> Result<Signatures> {
        let docs = scan_all(self.store.as_ref(), &self.table, Some(filter), None).await?;
        let records: Vec<SignatureRecord> = from_documents(docs)?;
        let signatures: Vec<Signature> = records.iter().map(SignatureRecord::to_model).collect();
        Ok(Signatures {
            result_count: signatures.len() as i64,
            total_count: signatures.len() as i64,
            last_key_scanned: String::new(),
            signatures,
        })
    }
}

#[async_trait]
impl SignatureRepository for StoreSignatureRepository {
    async fn get_signature(&self, signature_id: &str) -> Result<Signature> {
        Ok(self.get_record(signature_id).await?.to_model())
    }

    async fn get_project_signatures(
        &self,
        project_id: &str,
        page_size: usize,
        next_key: Option<&str>,
    ) -> Result<Signatures> {
        let (docs, last_key) = scan_page(
            self.store.as_ref(),
            &self.table,
            Some(Condition::equals("signature_project_id", project_id)),
            page_size,
            next_key.map(str::to_string),
        )
        .await
        .map_err(|e| {
            warn!("error retrieving project signatures for project {}, error: {}", project_id, e);
            e
        })?;
        let records: Vec<SignatureRecord> = from_documents(docs)?;
        let signatures: Vec<Signature> = records.iter().map(SignatureRecord::to_model).collect();
        let total_count = self.store.item_count(&self.table).await?;
        debug!(
            "project {} signatures page returned {} result(s)",
            project_id,
            signatures.len()
        );
        Ok(Signatures {
            result_count: signatures.len() as i64,
            total_count,
            last_key_scanned: last_key.unwrap_or_default(),
            signatures,
        })
    }

    async fn get_company_signatures(&self, company_id: &str) -> Result<Signatures> {
        self.scan_signatures(
            Condition::equals("signature_reference_id", company_id)
                .and(Condition::equals("signature_reference_type", REFERENCE_TYPE_COMPANY)),
        )
        .await
    }

    async fn get_user_signatures(&self, user_id: &str) -> Result<Signatures> {
        self.scan_signatures(
            Condition::equals("signature_reference_id", user_id)
                .and(Condition::equals("signature_reference_type", REFERENCE_TYPE_USER)),
        )
        .await
    }

    async fn get_all_signature_records(&self) -> Result<Vec<SignatureRecord>> {
        let docs = scan_all(self.store.as_ref(), &self.table, None, None).await?;
        from_documents(docs)
    }

    async fn update_approval_list(
        &self,
        signature_id: &str,
        update: &ApprovalListUpdate,
    ) -> Result<Signature> {
        let record = self.get_record(signature_id).await?;
        if update.is_empty() {
            return Ok(record.to_model());
        }

        let (_, now) = current_time();
        let updates = vec![
            (
                "email_whitelist".to_string(),
                json!(merge_list(
                    &record.email_whitelist,
                    &update.add_email_approval_list,
                    &update.remove_email_approval_list
                )),
            ),
            (
                "domain_whitelist".to_string(),
                json!(merge_list(
                    &record.domain_whitelist,
                    &update.add_domain_approval_list,
                    &update.remove_domain_approval_list
                )),
            ),
            (
                "github_whitelist".to_string(),
                json!(merge_list(
                    &record.github_whitelist,
                    &update.add_github_username_approval_list,
                    &update.remove_github_username_approval_list
                )),
            ),
            (
                "github_org_whitelist".to_string(),
                json!(merge_list(
                    &record.github_org_whitelist,
                    &update.add_github_org_approval_list,
                    &update.remove_github_org_approval_list
                )),
            ),
            ("date_modified".to_string(), json!(now)),
        ];
        let doc = self.store.update_item(&self.table, signature_id, updates).await?;
        let updated: SignatureRecord = from_document(doc)?;
        Ok(updated.to_model())
    }

    async fn get_metrics(&self) -> Result<CountMetrics> {
        Ok(CountMetrics {
            total_count: self.store.item_count(&self.table).await?,
        })
    }
}
