use crate::constants::{table_name, COMPANIES_TABLE, COMPANY_INVITES_TABLE, STATUS_JOINED};
use crate::domain::{
    Companies, CompaniesWithInvites, Company, CompanyRecord, CompanyWithInvite,
    CreateCompanyInput, Invite, InviteStatus, User,
};
use crate::error::{ClaError, Result};
use crate::storage::{
    from_document, from_documents, scan_all, to_document, Condition, Document, DocumentStore,
};
use crate::types::{current_time, non_blank, CountMetrics};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create_company(&self, input: &CreateCompanyInput) -> Result<Company>;
    async fn get_companies(&self) -> Result<Companies>;
    async fn get_company(&self, company_id: &str) -> Result<Company>;
    async fn get_company_by_external_id(&self, external_id: &str) -> Result<Company>;
    async fn get_company_by_name(&self, company_name: &str) -> Result<Option<Company>>;
    async fn search_company_by_name(
        &self,
        company_name: &str,
        next_key: Option<&str>,
    ) -> Result<Companies>;
    async fn delete_company_by_id(&self, company_id: &str) -> Result<()>;
    async fn delete_company_by_external_id(&self, external_id: &str) -> Result<()>;
    async fn get_companies_by_user_manager(&self, user_id: &str, user: &User) -> Result<Companies>;
    async fn get_companies_by_user_manager_with_invites(
        &self,
        user_id: &str,
        user: &User,
    ) -> Result<CompaniesWithInvites>;
    async fn update_company_access_list(&self, company_id: &str, acl: &[String]) -> Result<()>;
    async fn get_metrics(&self) -> Result<CountMetrics>;
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Create a pending invite unless one already exists for the pair, in
    /// which case the existing invite is returned unchanged.
    async fn add_pending_company_invite_request(
        &self,
        company_id: &str,
        user_id: &str,
    ) -> Result<Invite>;
    async fn get_company_invite_request(&self, invite_id: &str) -> Result<Option<Invite>>;
    async fn get_company_invite_requests(
        &self,
        company_id: &str,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>>;
    async fn get_company_user_invite_request(
        &self,
        company_id: &str,
        user_id: &str,
    ) -> Result<Option<Invite>>;
    async fn get_user_invite_requests(&self, user_id: &str) -> Result<Vec<Invite>>;
    async fn approve_company_access_request(&self, invite_id: &str) -> Result<Invite>;
    async fn reject_company_access_request(&self, invite_id: &str) -> Result<Invite>;
}

/// Company and company-invite tables over a document store
pub struct StoreCompanyRepository {
    store: Arc<dyn DocumentStore>,
    company_table: String,
    invites_table: String,
}

impl StoreCompanyRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            company_table: table_name(stage, COMPANIES_TABLE),
            invites_table: table_name(stage, COMPANY_INVITES_TABLE),
        }
    }

    async fn scan_companies(
        &self,
        filter: Option<Condition>,
        next_key: Option<&str>,
        search_terms: &str,
    ) -> Result<Companies> {
        let docs = scan_all(
            self.store.as_ref(),
            &self.company_table,
            filter,
            next_key.map(str::to_string),
        )
        .await
        .map_err(|e| {
            warn!("error scanning companies table, error: {}", e);
            e
        })?;
        let companies = build_company_models(docs)?;

        // May lag behind the real count; the store refreshes it periodically
        let total_count = self.store.item_count(&self.company_table).await.map_err(|e| {
            warn!("error retrieving total company record count, error: {}", e);
            e
        })?;

        Ok(Companies {
            result_count: companies.len() as i64,
            total_count,
            last_key_scanned: String::new(),
            search_terms: search_terms.to_string(),
            companies,
        })
    }

    // Every invite requesting access to `company_id`
    async fn delete_company_invites(&self, company_id: &str) -> Result<()> {
        let invites = self
            .store
            .query(
                &self.invites_table,
                "requested_company_id",
                &json!(company_id),
                None,
            )
            .await?;
        for doc in &invites {
            if let Some(invite_id) = doc.get("company_invite_id").and_then(|v| v.as_str()) {
                self.store.delete_item(&self.invites_table, invite_id).await?;
            }
        }
        if !invites.is_empty() {
            debug!("deleted {} invites of company {}", invites.len(), company_id);
        }
        Ok(())
    }

    async fn update_invite_request_status(
        &self,
        invite_id: &str,
        status: InviteStatus,
    ) -> Result<Invite> {
        let invite = self
            .get_company_invite_request(invite_id)
            .await?
            .ok_or_else(|| {
                warn!("unable to locate previous invite {}", invite_id);
                ClaError::not_found("company invite", invite_id)
            })?;
        let next = invite.status.transition_to(status)?;

        let (_, now) = current_time();
        let updated = self
            .store
            .update_item(
                &self.invites_table,
                invite_id,
                vec![
                    ("requested_company_id".into(), json!(invite.requested_company_id)),
                    ("user_id".into(), json!(invite.user_id)),
                    ("status".into(), json!(next.as_str())),
                    ("date_modified".into(), json!(now)),
                ],
            )
            .await
            .map_err(|e| {
                warn!("unable to update invite {} with status {}, error: {}", invite_id, next, e);
                e
            })?;
        from_document(updated)
    }
}

fn build_company_models(docs: Vec<Document>) -> Result<Vec<Company>> {
    let records: Vec<CompanyRecord> = from_documents(docs).map_err(|e| {
        warn!("error unmarshalling companies from database, error: {}", e);
        e
    })?;
    Ok(records.iter().map(CompanyRecord::to_model).collect())
}

#[async_trait]
impl CompanyRepository for StoreCompanyRepository {
    async fn create_company(&self, input: &CreateCompanyInput) -> Result<Company> {
        let (_, now) = current_time();
        let record = CompanyRecord {
            company_id: Uuid::new_v4().to_string(),
            company_name: input.company_name.trim().to_string(),
            company_external_id: non_blank(input.company_external_id.as_deref())
                .map(str::to_string),
            company_manager_id: non_blank(input.company_manager_id.as_deref())
                .map(str::to_string),
            company_acl: input.company_acl.clone(),
            date_created: now.clone(),
            date_modified: now,
            version: "v1".to_string(),
        };
        self.store
            .put_item(&self.company_table, to_document(&record)?)
            .await?;
        debug!("company created {:?}", record);
        Ok(record.to_model())
    }

    async fn get_companies(&self) -> Result<Companies> {
        self.scan_companies(None, None, "").await
    }

    async fn get_company(&self, company_id: &str) -> Result<Company> {
        let item = self
            .store
            .get_item(&self.company_table, company_id)
            .await
            .map_err(|e| {
                warn!("error fetching company using company id: {}, error: {}", company_id, e);
                e
            })?
            .ok_or_else(|| ClaError::not_found("company", company_id))?;
        let record: CompanyRecord = from_document(item)?;
        Ok(record.to_model())
    }

    async fn get_company_by_external_id(&self, external_id: &str) -> Result<Company> {
        let docs = self
            .store
            .query(
                &self.company_table,
                "company_external_id",
                &Value::from(external_id),
                None,
            )
            .await?;
        let doc = docs
            .into_iter()
            .next()
            .ok_or_else(|| ClaError::not_found("company", external_id))?;
        let record: CompanyRecord = from_document(doc)?;
        Ok(record.to_model())
    }

    async fn get_company_by_name(&self, company_name: &str) -> Result<Option<Company>> {
        let docs = self
            .store
            .query(
                &self.company_table,
                "company_name",
                &Value::from(company_name),
                None,
            )
            .await?;
        if docs.is_empty() {
            debug!("Company query by name returned no results using companyName: {}", company_name);
            return Ok(None);
        }
        Ok(build_company_models(docs)?.into_iter().next())
    }

    async fn search_company_by_name(
        &self,
        company_name: &str,
        next_key: Option<&str>,
    ) -> Result<Companies> {
        // No results, and no scan, for a blank search
        if company_name.trim().is_empty() {
            return Ok(Companies::empty(company_name));
        }
        if let Some(key) = next_key {
            debug!("Received a nextKey, value: {}", key);
        }
        self.scan_companies(
            Some(Condition::contains("company_name", company_name)),
            non_blank(next_key),
            company_name,
        )
        .await
    }

    async fn delete_company_by_id(&self, company_id: &str) -> Result<()> {
        self.store.delete_item(&self.company_table, company_id).await?;
        self.delete_company_invites(company_id).await
    }

    async fn delete_company_by_external_id(&self, external_id: &str) -> Result<()> {
        let company = self.get_company_by_external_id(external_id).await?;
        self.delete_company_by_id(&company.company_id).await
    }

    async fn get_companies_by_user_manager(&self, user_id: &str, user: &User) -> Result<Companies> {
        if user_id.trim().is_empty() {
            return Ok(Companies::empty(""));
        }
        let Some(acl_name) = user.acl_name() else {
            warn!(
                "unable to query user with no LF username or username in their data model - user id: {}",
                user_id
            );
            return Ok(Companies::empty(""));
        };
        self.scan_companies(Some(Condition::contains("company_acl", acl_name)), None, "")
            .await
    }

    async fn get_companies_by_user_manager_with_invites(
        &self,
        user_id: &str,
        user: &User,
    ) -> Result<CompaniesWithInvites> {
        let companies = self.get_companies_by_user_manager(user_id, user).await?;
        let invites = self.get_user_invite_requests(user_id).await.map_err(|e| {
            warn!("error retrieving company invites for userID {}, error: {}", user_id, e);
            e
        })?;

        let mut list: Vec<CompanyWithInvite> = companies
            .companies
            .iter()
            .map(|company| CompanyWithInvite {
                company_id: company.company_id.clone(),
                company_name: company.company_name.clone(),
                company_external_id: company.company_external_id.clone(),
                company_acl: company.company_acl.clone(),
                created: company.created,
                updated: company.updated,
                status: STATUS_JOINED.to_string(),
            })
            .collect();

        for invite in &invites {
            let company = match self.get_company(&invite.requested_company_id).await {
                Ok(company) => company,
                Err(e) => {
                    warn!(
                        "error retrieving company with company ID {}, error: {} - skipping invite",
                        invite.requested_company_id, e
                    );
                    continue;
                }
            };
            list.push(CompanyWithInvite {
                company_id: company.company_id,
                company_name: company.company_name,
                company_external_id: company.company_external_id,
                company_acl: company.company_acl,
                created: company.created,
                updated: company.updated,
                status: invite.status.to_string(),
            });
        }

        Ok(CompaniesWithInvites {
            result_count: list.len() as i64,
            total_count: companies.total_count + invites.len() as i64,
            companies_with_invites: list,
        })
    }

    async fn update_company_access_list(&self, company_id: &str, acl: &[String]) -> Result<()> {
        let (_, now) = current_time();
        self.store
            .update_item(
                &self.company_table,
                company_id,
                vec![
                    ("company_acl".into(), json!(acl)),
                    ("date_modified".into(), json!(now)),
                ],
            )
            .await
            .map_err(|e| {
                warn!("Error updating Company Access List, error: {}", e);
                match e {
                    ClaError::NotFound { .. } => ClaError::not_found("company", company_id),
                    other => other,
                }
            })?;
        Ok(())
    }

    async fn get_metrics(&self) -> Result<CountMetrics> {
        Ok(CountMetrics {
            total_count: self.store.item_count(&self.company_table).await?,
        })
    }
}

#[async_trait]
impl InviteRepository for StoreCompanyRepository {
    async fn add_pending_company_invite_request(
        &self,
        company_id: &str,
        user_id: &str,
    ) -> Result<Invite> {
        // Read-then-write: not transactional, two racing callers can both insert
        if let Some(previous) = self.get_company_user_invite_request(company_id, user_id).await? {
            warn!(
                "Invite already exists for company id: {} and user: {} - skipping creation",
                company_id, user_id
            );
            return Ok(previous);
        }

        let (_, now) = current_time();
        let invite = Invite {
            company_invite_id: Uuid::new_v4().to_string(),
            requested_company_id: company_id.to_string(),
            user_id: user_id.to_string(),
            status: InviteStatus::Pending,
            date_created: now.clone(),
            date_modified: now,
        };
        self.store
            .put_item(&self.invites_table, to_document(&invite)?)
            .await
            .map_err(|e| {
                warn!("Unable to create a new pending invite, error: {}", e);
                e
            })?;

        self.get_company_invite_request(&invite.company_invite_id)
            .await?
            .ok_or_else(|| ClaError::not_found("company invite", invite.company_invite_id))
    }

    async fn get_company_invite_request(&self, invite_id: &str) -> Result<Option<Invite>> {
        match self.store.get_item(&self.invites_table, invite_id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => {
                warn!("unable to locate the company invite based on invite ID: {}", invite_id);
                Ok(None)
            }
        }
    }

    async fn get_company_invite_requests(
        &self,
        company_id: &str,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>> {
        let docs = self
            .store
            .query(
                &self.invites_table,
                "requested_company_id",
                &Value::from(company_id),
                None,
            )
            .await
            .map_err(|e| {
                warn!("Unable to retrieve data from Company-Invites table, error: {}", e);
                e
            })?;
        let invites: Vec<Invite> = from_documents(docs)?;
        // Status is filtered after decoding so records missing a status count as pending
        Ok(match status {
            Some(wanted) => invites.into_iter().filter(|i| i.status == wanted).collect(),
            None => invites,
        })
    }

    async fn get_company_user_invite_request(
        &self,
        company_id: &str,
        user_id: &str,
    ) -> Result<Option<Invite>> {
        let filter = Condition::equals("user_id", user_id);
        let docs = self
            .store
            .query(
                &self.invites_table,
                "requested_company_id",
                &Value::from(company_id),
                Some(&filter),
            )
            .await?;
        if docs.len() > 1 {
            warn!(
                "Company invite should have one result, found: {} for company id: {} and user id: {}",
                docs.len(),
                company_id,
                user_id
            );
        }
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => {
                debug!(
                    "Unable to find company invite for company id: {} and user id: {}",
                    company_id, user_id
                );
                Ok(None)
            }
        }
    }

    async fn get_user_invite_requests(&self, user_id: &str) -> Result<Vec<Invite>> {
        let docs = scan_all(
            self.store.as_ref(),
            &self.invites_table,
            Some(Condition::equals("user_id", user_id)),
            None,
        )
        .await?;
        from_documents(docs)
    }

    async fn approve_company_access_request(&self, invite_id: &str) -> Result<Invite> {
        self.update_invite_request_status(invite_id, InviteStatus::Approved)
            .await
    }

    async fn reject_company_access_request(&self, invite_id: &str) -> Result<Invite> {
        self.update_invite_request_status(invite_id, InviteStatus::Rejected)
            .await
    }
}
