use crate::app::ports::ProjectDirectory;
use crate::constants::{
    CONNECTED, CONNECTION_FAILURE, NO_CONNECTION, PARTIAL_CONNECTION, THE_LINUX_FOUNDATION,
};
use crate::domain::{
    CreateGithubOrganization, GithubOrganization, GithubOrganizationRecord,
    GithubRepositoryInfo, ProjectGithubOrganization, ProjectGithubOrganizations,
    ProjectGithubRepository, UpdateGithubOrganization,
};
use crate::error::{ClaError, Result};
use crate::infra::github_org_repo::GithubOrgRepository;
use crate::infra::repositories_repo::RepositoriesRepository;
use crate::types::current_time;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// GitHub organizations linked to a project, with their app connection state
pub struct GithubOrgService {
    orgs: Arc<dyn GithubOrgRepository>,
    repositories: Arc<dyn RepositoriesRepository>,
    directory: Arc<dyn ProjectDirectory>,
}

impl GithubOrgService {
    pub fn new(
        orgs: Arc<dyn GithubOrgRepository>,
        repositories: Arc<dyn RepositoriesRepository>,
        directory: Arc<dyn ProjectDirectory>,
    ) -> Self {
        Self {
            orgs,
            repositories,
            directory,
        }
    }

    pub async fn get_github_organizations(
        &self,
        project_sfid: &str,
    ) -> Result<ProjectGithubOrganizations> {
        self.directory.get_project(project_sfid).await?;

        let orgs = self.orgs.get_github_organizations(project_sfid).await?;
        let repos = self
            .repositories
            .list_project_sfid_repositories(project_sfid)
            .await?;

        let mut out: Vec<ProjectGithubOrganization> = Vec::with_capacity(orgs.len());
        let mut org_index: HashMap<String, usize> = HashMap::new();
        // Repositories the installation can see, keyed by org and GitHub id
        let mut visible: HashMap<(String, i64), &GithubRepositoryInfo> = HashMap::new();

        for org in &orgs {
            for info in &org.installation_repositories {
                visible.insert((org.organization_name.clone(), info.repository_github_id), info);
            }
            org_index.insert(org.organization_name.clone(), out.len());
            out.push(ProjectGithubOrganization {
                auto_enabled: org.auto_enabled,
                branch_protection_enabled: org.branch_protection_enabled,
                connection_status: installation_status(org).to_string(),
                github_organization_name: org.organization_name.clone(),
                repositories: Vec::new(),
            });
        }

        for repo in repos.iter().filter(|r| r.enabled) {
            let Some(&idx) = org_index.get(&repo.repository_organization_name) else {
                warn!(
                    "repositories table contains stale data for organization {}",
                    repo.repository_organization_name
                );
                continue;
            };
            let github_id = repo.repository_external_id.parse::<i64>().ok();
            if github_id.is_none() {
                warn!(
                    "repository {} github id '{}' is not an integer",
                    repo.repository_id, repo.repository_external_id
                );
            }
            let key = github_id.map(|id| (repo.repository_organization_name.clone(), id));
            let org = &mut out[idx];
            match key.and_then(|k| visible.remove(&k)) {
                Some(info) => org.repositories.push(ProjectGithubRepository {
                    connection_status: CONNECTED.to_string(),
                    enabled: true,
                    repository_id: repo.repository_id.clone(),
                    repository_name: repo.repository_name.clone(),
                    repository_github_id: info.repository_github_id,
                }),
                None => {
                    org.repositories.push(ProjectGithubRepository {
                        connection_status: CONNECTION_FAILURE.to_string(),
                        enabled: true,
                        repository_id: repo.repository_id.clone(),
                        repository_name: repo.repository_name.clone(),
                        repository_github_id: github_id.unwrap_or_default(),
                    });
                    if org.connection_status == CONNECTED {
                        org.connection_status = PARTIAL_CONNECTION.to_string();
                    }
                }
            }
        }

        // Whatever is still visible is connected but not enabled; keep installation order
        for (idx, org) in orgs.iter().enumerate() {
            for info in &org.installation_repositories {
                let key = (org.organization_name.clone(), info.repository_github_id);
                if visible.remove(&key).is_some() {
                    out[idx].repositories.push(ProjectGithubRepository {
                        connection_status: CONNECTED.to_string(),
                        enabled: false,
                        repository_id: String::new(),
                        repository_name: info.repository_name.clone(),
                        repository_github_id: info.repository_github_id,
                    });
                }
            }
        }

        Ok(ProjectGithubOrganizations { list: out })
    }

    pub async fn add_github_organization(
        &self,
        project_sfid: &str,
        input: &CreateGithubOrganization,
    ) -> Result<GithubOrganization> {
        let name = input.organization_name.trim();
        if name.is_empty() {
            return Err(ClaError::Validation("organizationName must not be empty".into()));
        }
        let project = self.directory.get_project(project_sfid).await?;
        let organization_sfid = if project.parent.is_empty() || project.parent == THE_LINUX_FOUNDATION
        {
            project_sfid.to_string()
        } else {
            project.parent.clone()
        };

        let (_, now) = current_time();
        let record = GithubOrganizationRecord {
            organization_name: name.to_string(),
            organization_sfid,
            project_sfid: project_sfid.to_string(),
            organization_installation_id: 0,
            auto_enabled: input.auto_enabled,
            branch_protection_enabled: input.branch_protection_enabled,
            installation_repositories: Vec::new(),
            installation_error: String::new(),
            date_created: now.clone(),
            date_modified: now,
        };
        let added = self.orgs.add_github_organization(record).await?;
        info!("added github organization {} to project {}", name, project_sfid);
        Ok(added.to_model())
    }

    pub async fn delete_github_organization(
        &self,
        project_sfid: &str,
        organization_name: &str,
    ) -> Result<()> {
        self.directory.get_project(project_sfid).await?;
        self.project_org(project_sfid, organization_name).await?;
        let disabled = self
            .repositories
            .disable_organization_repositories(organization_name)
            .await?;
        info!(
            "disabled {} repositories before deleting github organization {}",
            disabled, organization_name
        );
        self.orgs.delete_github_organization(organization_name).await
    }

    pub async fn update_github_organization(
        &self,
        project_sfid: &str,
        organization_name: &str,
        input: &UpdateGithubOrganization,
    ) -> Result<GithubOrganization> {
        self.directory.get_project(project_sfid).await?;
        self.project_org(project_sfid, organization_name).await?;
        let updated = self
            .orgs
            .update_github_organization(
                organization_name,
                input.auto_enabled,
                input.branch_protection_enabled,
            )
            .await?;
        Ok(updated.to_model())
    }

    async fn project_org(
        &self,
        project_sfid: &str,
        organization_name: &str,
    ) -> Result<GithubOrganizationRecord> {
        match self.orgs.get_github_organization(organization_name).await? {
            Some(org) if org.project_sfid == project_sfid => Ok(org),
            _ => Err(ClaError::not_found("github organization", organization_name)),
        }
    }
}

fn installation_status(org: &GithubOrganizationRecord) -> &'static str {
    if org.organization_installation_id == 0 {
        NO_CONNECTION
    } else if !org.installation_error.is_empty() {
        CONNECTION_FAILURE
    } else {
        CONNECTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(installation_id: i64, error: &str) -> GithubOrganizationRecord {
        GithubOrganizationRecord {
            organization_name: "acme".into(),
            organization_sfid: "sf1".into(),
            project_sfid: "sf1".into(),
            organization_installation_id: installation_id,
            auto_enabled: false,
            branch_protection_enabled: false,
            installation_repositories: vec![],
            installation_error: error.into(),
            date_created: String::new(),
            date_modified: String::new(),
        }
    }

    #[test]
    fn test_installation_status() {
        assert_eq!(installation_status(&org(0, "")), NO_CONNECTION);
        assert_eq!(installation_status(&org(0, "boom")), NO_CONNECTION);
        assert_eq!(installation_status(&org(42, "bad credentials")), CONNECTION_FAILURE);
        assert_eq!(installation_status(&org(42, "")), CONNECTED);
    }
}
