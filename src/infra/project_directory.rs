use crate::app::ports::ProjectDirectory;
use crate::domain::ExternalProject;
use crate::error::{ClaError, Result};
use crate::infra::project_repo::ProjectRepository;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Project service behind the API gateway
pub struct HttpProjectDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProjectDirectory {
    pub fn new(api_gateway_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: api_gateway_url.trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, project_sfid: &str) -> String {
        format!("{}/project-service/v1/projects/{}", self.base_url, project_sfid)
    }
}

#[async_trait]
impl ProjectDirectory for HttpProjectDirectory {
    async fn get_project(&self, project_sfid: &str) -> Result<ExternalProject> {
        let url = self.project_url(project_sfid);
        debug!("looking up project {} at {}", project_sfid, url);
        let resp = self.client.get(&url).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(ClaError::not_found("project", project_sfid)),
            status if status.is_success() => Ok(resp.json::<ExternalProject>().await?),
            status => {
                warn!("project service returned {} for project {}", status, project_sfid);
                Err(ClaError::Upstream {
                    message: format!("project service returned {status} for {project_sfid}"),
                })
            }
        }
    }
}

/// Local-mode directory that answers from the project table. Projects sharing
/// an external id are children of it, so there is no parent to report.
pub struct StoreProjectDirectory {
    projects: Arc<dyn ProjectRepository>,
}

impl StoreProjectDirectory {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }
}

#[async_trait]
impl ProjectDirectory for StoreProjectDirectory {
    async fn get_project(&self, project_sfid: &str) -> Result<ExternalProject> {
        let project = self.projects.get_project_by_external_id(project_sfid).await?;
        Ok(ExternalProject {
            id: project_sfid.to_string(),
            name: project.project_name,
            parent: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_url_trims_trailing_slash() {
        let dir = HttpProjectDirectory::new("https://api.example.org/");
        assert_eq!(
            dir.project_url("a0941"),
            "https://api.example.org/project-service/v1/projects/a0941"
        );
    }
}
