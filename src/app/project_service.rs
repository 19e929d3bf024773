use crate::domain::{CreateProjectInput, Project, Projects};
use crate::error::{ClaError, Result};
use crate::infra::project_repo::ProjectRepository;
use std::sync::Arc;

pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }

    pub async fn create_project(&self, input: &CreateProjectInput) -> Result<Project> {
        if input.project_name.trim().is_empty() {
            return Err(ClaError::Validation("project name must not be empty".into()));
        }
        self.projects.create_project(input).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.projects.get_project(project_id).await
    }

    pub async fn get_project_by_external_id(&self, external_id: &str) -> Result<Project> {
        self.projects.get_project_by_external_id(external_id).await
    }

    pub async fn get_projects(&self) -> Result<Projects> {
        self.projects.get_projects().await
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.projects.delete_project(project_id).await
    }
}
