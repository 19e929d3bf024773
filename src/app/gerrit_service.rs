use crate::domain::{CreateGerrit, Gerrit, GerritList, GerritRecord};
use crate::error::{ClaError, Result};
use crate::infra::gerrit_repo::GerritRepository;
use crate::infra::project_repo::ProjectRepository;
use crate::types::{current_time, non_blank};
use std::sync::Arc;
use uuid::Uuid;

pub struct GerritService {
    gerrits: Arc<dyn GerritRepository>,
    projects: Arc<dyn ProjectRepository>,
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

impl GerritService {
    pub fn new(gerrits: Arc<dyn GerritRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { gerrits, projects }
    }

    pub async fn add_gerrit(&self, project_id: &str, input: &CreateGerrit) -> Result<Gerrit> {
        let name = input.gerrit_name.trim();
        let url = input.gerrit_url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(ClaError::Validation("gerritName and gerritUrl are required".into()));
        }
        self.projects.get_project(project_id).await?;

        let existing = self.gerrits.get_project_gerrits(project_id).await?;
        if existing.iter().any(|g| g.gerrit_name == name) {
            return Err(ClaError::Conflict(format!(
                "gerrit instance '{name}' already exists for project {project_id}"
            )));
        }

        let (_, now) = current_time();
        let record = GerritRecord {
            gerrit_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            gerrit_name: name.to_string(),
            gerrit_url: url.to_string(),
            group_id_icla: owned(input.group_id_icla.as_deref()),
            group_id_ccla: owned(input.group_id_ccla.as_deref()),
            group_name_icla: owned(input.group_name_icla.as_deref()),
            group_name_ccla: owned(input.group_name_ccla.as_deref()),
            date_created: now.clone(),
            date_modified: now,
        };
        self.gerrits.add_gerrit(record).await
    }

    pub async fn get_project_gerrits(&self, project_id: &str) -> Result<GerritList> {
        Ok(GerritList {
            list: self.gerrits.get_project_gerrits(project_id).await?,
        })
    }

    pub async fn delete_gerrit(&self, project_id: &str, gerrit_id: &str) -> Result<()> {
        let gerrit = self.gerrits.get_gerrit(gerrit_id).await?;
        if gerrit.project_id != project_id {
            return Err(ClaError::not_found("gerrit instance", gerrit_id));
        }
        self.gerrits.delete_gerrit(gerrit_id).await
    }
}
