use crate::domain::{
    CreateGithubRepository, GithubRepositories, GithubRepository, GithubRepositoryRecord,
};
use crate::error::{ClaError, Result};
use crate::infra::project_repo::ProjectRepository;
use crate::infra::repositories_repo::RepositoriesRepository;
use crate::types::current_time;
use std::sync::Arc;
use uuid::Uuid;

/// GitHub repositories enabled for CLA checks on a project
pub struct RepositoryService {
    repositories: Arc<dyn RepositoriesRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl RepositoryService {
    pub fn new(
        repositories: Arc<dyn RepositoriesRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            repositories,
            projects,
        }
    }

    pub async fn add_github_repository(
        &self,
        project_id: &str,
        input: &CreateGithubRepository,
    ) -> Result<GithubRepository> {
        if input.repository_project_id != project_id {
            return Err(ClaError::Validation(format!(
                "repositoryProjectID {} does not match project {}",
                input.repository_project_id, project_id
            )));
        }
        for (field, value) in [
            ("repositoryName", &input.repository_name),
            ("repositoryOrganizationName", &input.repository_organization_name),
            ("repositoryExternalID", &input.repository_external_id),
        ] {
            if value.trim().is_empty() {
                return Err(ClaError::Validation(format!("{field} must not be empty")));
            }
        }
        let project = self.projects.get_project(project_id).await?;

        let (_, now) = current_time();
        let record = GithubRepositoryRecord {
            repository_id: Uuid::new_v4().to_string(),
            repository_project_id: project.project_id,
            repository_sfdc_id: project.project_external_id,
            repository_name: input.repository_name.trim().to_string(),
            repository_url: input.repository_url.trim().to_string(),
            repository_type: "github".to_string(),
            repository_organization_name: input.repository_organization_name.trim().to_string(),
            repository_external_id: input.repository_external_id.trim().to_string(),
            enabled: true,
            date_created: now.clone(),
            date_modified: now,
        };
        self.repositories.add_github_repository(record).await
    }

    pub async fn list_project_repositories(
        &self,
        project_id: &str,
        enabled: Option<bool>,
    ) -> Result<GithubRepositories> {
        self.projects.get_project(project_id).await?;
        Ok(GithubRepositories {
            list: self
                .repositories
                .list_project_repositories(project_id, enabled)
                .await?,
        })
    }

    pub async fn set_repository_enabled(
        &self,
        project_id: &str,
        repository_id: &str,
        enabled: bool,
    ) -> Result<GithubRepository> {
        let repo = self.repositories.get_repository(repository_id).await?;
        if repo.repository_project_id != project_id {
            return Err(ClaError::not_found("github repository", repository_id));
        }
        self.repositories
            .set_repository_enabled(repository_id, enabled)
            .await
    }
}
