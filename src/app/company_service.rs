use crate::domain::{
    Companies, CompaniesWithInvites, Company, CreateCompanyInput, Invite, InviteStatus,
};
use crate::error::{ClaError, Result};
use crate::infra::company_repo::{CompanyRepository, InviteRepository};
use crate::infra::user_repo::UserRepository;
use crate::types::non_blank;
use std::sync::Arc;
use tracing::{info, warn};

/// Company management and the company access (invite) workflow
pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
    invites: Arc<dyn InviteRepository>,
    users: Arc<dyn UserRepository>,
}

impl CompanyService {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        invites: Arc<dyn InviteRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            companies,
            invites,
            users,
        }
    }

    pub async fn create_company(&self, input: &CreateCompanyInput) -> Result<Company> {
        let name = input.company_name.trim();
        if name.is_empty() {
            return Err(ClaError::Validation("company name must not be empty".into()));
        }
        if self.companies.get_company_by_name(name).await?.is_some() {
            return Err(ClaError::Conflict(format!("company '{name}' already exists")));
        }
        self.companies.create_company(input).await
    }

    pub async fn get_companies(&self) -> Result<Companies> {
        self.companies.get_companies().await
    }

    pub async fn get_company(&self, company_id: &str) -> Result<Company> {
        self.companies.get_company(company_id).await
    }

    pub async fn get_company_by_external_id(&self, external_id: &str) -> Result<Company> {
        self.companies.get_company_by_external_id(external_id).await
    }

    pub async fn search_company_by_name(
        &self,
        company_name: Option<&str>,
        next_key: Option<&str>,
    ) -> Result<Companies> {
        self.companies
            .search_company_by_name(company_name.unwrap_or_default(), non_blank(next_key))
            .await
    }

    pub async fn delete_company_by_id(&self, company_id: &str) -> Result<()> {
        self.companies.get_company(company_id).await?;
        self.companies.delete_company_by_id(company_id).await
    }

    pub async fn delete_company_by_external_id(&self, external_id: &str) -> Result<()> {
        self.companies.delete_company_by_external_id(external_id).await
    }

    pub async fn get_companies_by_user_manager(&self, user_id: &str) -> Result<Companies> {
        let user = self.users.get_user(user_id).await?;
        self.companies.get_companies_by_user_manager(user_id, &user).await
    }

    pub async fn get_companies_by_user_manager_with_invites(
        &self,
        user_id: &str,
    ) -> Result<CompaniesWithInvites> {
        let user = self.users.get_user(user_id).await?;
        self.companies
            .get_companies_by_user_manager_with_invites(user_id, &user)
            .await
    }

    /// Ask to join a company's managers. Repeating the request returns the
    /// invite already on file.
    pub async fn request_company_access(&self, company_id: &str, user_id: &str) -> Result<Invite> {
        if user_id.trim().is_empty() {
            return Err(ClaError::Validation("userID must not be empty".into()));
        }
        self.companies.get_company(company_id).await?;
        self.users.get_user(user_id).await?;
        self.invites
            .add_pending_company_invite_request(company_id, user_id)
            .await
    }

    pub async fn get_company_invites(
        &self,
        company_id: &str,
        status: Option<&str>,
    ) -> Result<Vec<Invite>> {
        let status = non_blank(status).map(InviteStatus::parse).transpose()?;
        self.companies.get_company(company_id).await?;
        self.invites.get_company_invite_requests(company_id, status).await
    }

    pub async fn get_user_invites(&self, user_id: &str) -> Result<Vec<Invite>> {
        self.invites.get_user_invite_requests(user_id).await
    }

    /// Approve a pending request and add the requesting user to the company ACL
    pub async fn approve_invite(&self, company_id: &str, invite_id: &str) -> Result<Invite> {
        let invite = self.company_invite(company_id, invite_id).await?;
        invite.status.transition_to(InviteStatus::Approved)?;
        let user = self.users.get_user(&invite.user_id).await?;
        let Some(acl_name) = user.acl_name().map(str::to_string) else {
            return Err(ClaError::Validation(format!(
                "user {} has no username to add to the company ACL",
                user.user_id
            )));
        };

        // The invite stays pending until the user is on the ACL
        self.add_acl_entry(company_id, &acl_name).await.map_err(|e| {
            warn!(
                "unable to add user {} to company {} ACL for invite {}, error: {}",
                acl_name, company_id, invite_id, e
            );
            e
        })?;
        let approved = self.invites.approve_company_access_request(invite_id).await?;
        info!("approved invite {} for user {} on company {}", invite_id, acl_name, company_id);
        Ok(approved)
    }

    pub async fn reject_invite(&self, company_id: &str, invite_id: &str) -> Result<Invite> {
        self.company_invite(company_id, invite_id).await?;
        let rejected = self.invites.reject_company_access_request(invite_id).await?;
        info!("rejected invite {} on company {}", invite_id, company_id);
        Ok(rejected)
    }

    pub async fn add_acl_entry(&self, company_id: &str, username: &str) -> Result<Company> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ClaError::Validation("username must not be empty".into()));
        }
        let mut company = self.companies.get_company(company_id).await?;
        if !company.company_acl.iter().any(|entry| entry == username) {
            company.company_acl.push(username.to_string());
            self.companies
                .update_company_access_list(company_id, &company.company_acl)
                .await?;
        }
        Ok(company)
    }

    pub async fn remove_acl_entry(&self, company_id: &str, username: &str) -> Result<Company> {
        let mut company = self.companies.get_company(company_id).await?;
        let before = company.company_acl.len();
        company.company_acl.retain(|entry| entry != username);
        if company.company_acl.len() == before {
            return Err(ClaError::not_found("company ACL entry", username));
        }
        self.companies
            .update_company_access_list(company_id, &company.company_acl)
            .await?;
        Ok(company)
    }

    async fn company_invite(&self, company_id: &str, invite_id: &str) -> Result<Invite> {
        self.companies.get_company(company_id).await?;
        let invite = self
            .invites
            .get_company_invite_request(invite_id)
            .await?
            .ok_or_else(|| ClaError::not_found("company invite", invite_id))?;
        if invite.requested_company_id != company_id {
            warn!(
                "invite {} belongs to company {}, not {}",
                invite_id, invite.requested_company_id, company_id
            );
            return Err(ClaError::not_found("company invite", invite_id));
        }
        Ok(invite)
    }
}
