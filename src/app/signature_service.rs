use crate::constants::DEFAULT_SIGNATURES_PAGE_SIZE;
use crate::domain::{ApprovalListUpdate, Signature, Signatures};
use crate::error::Result;
use crate::infra::signature_repo::SignatureRepository;
use crate::types::{non_blank, PageParams};
use std::sync::Arc;
use tracing::debug;

pub struct SignatureService {
    signatures: Arc<dyn SignatureRepository>,
}

impl SignatureService {
    pub fn new(signatures: Arc<dyn SignatureRepository>) -> Self {
        Self { signatures }
    }

    pub async fn get_signature(&self, signature_id: &str) -> Result<Signature> {
        self.signatures.get_signature(signature_id).await
    }

    pub async fn get_project_signatures(
        &self,
        project_id: &str,
        page: &PageParams,
    ) -> Result<Signatures> {
        let page_size = page
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_SIGNATURES_PAGE_SIZE);
        self.signatures
            .get_project_signatures(project_id, page_size, non_blank(page.next_key.as_deref()))
            .await
    }

    pub async fn get_company_signatures(&self, company_id: &str) -> Result<Signatures> {
        self.signatures.get_company_signatures(company_id).await
    }

    pub async fn get_user_signatures(&self, user_id: &str) -> Result<Signatures> {
        self.signatures.get_user_signatures(user_id).await
    }

    pub async fn update_approval_list(
        &self,
        signature_id: &str,
        update: &ApprovalListUpdate,
    ) -> Result<Signature> {
        if update.is_empty() {
            debug!("empty approval list update for signature {}", signature_id);
        }
        self.signatures.update_approval_list(signature_id, update).await
    }
}
