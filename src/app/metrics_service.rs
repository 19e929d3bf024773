use crate::constants::{DEFAULT_PROJECT_METRICS_PAGE_SIZE, TOP_COMPANIES_COUNT};
use crate::domain::{
    ClaManagerDistribution, CompanyMetric, CompanyMetricRecord, ListProjectMetric, Metrics,
    ProjectIdType, ProjectMetricRecord, SfProjectMetric, TopCompanies, TotalCountMetrics,
};
use crate::error::{ClaError, Result};
use crate::infra::company_repo::CompanyRepository;
use crate::infra::metrics_repo::MetricsRepository;
use crate::infra::project_repo::ProjectRepository;
use crate::infra::repositories_repo::RepositoriesRepository;
use crate::infra::signature_repo::SignatureRepository;
use crate::infra::user_repo::UserRepository;
use crate::observability::metrics::aggregation;
use crate::types::{non_blank, CountMetrics, PageParams};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Sources for the global dashboard counters
pub struct CountSources {
    pub users: Arc<dyn UserRepository>,
    pub signatures: Arc<dyn SignatureRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub repositories: Arc<dyn RepositoriesRepository>,
    pub projects: Arc<dyn ProjectRepository>,
}

pub struct MetricsService {
    sources: CountSources,
    metrics: Arc<dyn MetricsRepository>,
}

impl MetricsService {
    pub fn new(sources: CountSources, metrics: Arc<dyn MetricsRepository>) -> Self {
        Self { sources, metrics }
    }

    /// Read every table count concurrently. A section that fails is logged
    /// and left at zero; the call itself never fails.
    pub async fn get_metrics(&self) -> Metrics {
        let s = &self.sources;
        let (users, signatures, companies, repositories, projects) = tokio::join!(
            count_section("users", s.users.get_metrics()),
            count_section("signatures", s.signatures.get_metrics()),
            count_section("companies", s.companies.get_metrics()),
            count_section("repositories", s.repositories.get_metrics()),
            count_section("projects", s.projects.get_metrics()),
        );
        Metrics {
            users,
            signatures,
            companies,
            repositories,
            projects,
        }
    }

    pub async fn get_total_count_metrics(&self) -> Result<TotalCountMetrics> {
        Ok(self.metrics.get_total_count_metrics().await?.to_model())
    }

    pub async fn get_cla_manager_distribution(&self) -> Result<ClaManagerDistribution> {
        Ok(self.metrics.get_cla_manager_distribution().await?.to_model())
    }

    pub async fn get_company_metric(&self, company_id: &str) -> Result<CompanyMetric> {
        Ok(self.metrics.get_company_metric(company_id).await?.to_model())
    }

    pub async fn get_top_companies(&self) -> Result<TopCompanies> {
        let records = self.metrics.get_company_metrics().await?;
        let companies: Arc<Vec<CompanyMetric>> =
            Arc::new(records.iter().map(CompanyMetricRecord::to_model).collect());

        let by_projects = {
            let companies = Arc::clone(&companies);
            tokio::task::spawn_blocking(move || rank_companies(&companies, |c| c.project_count))
        };
        let by_contributors = {
            let companies = Arc::clone(&companies);
            tokio::task::spawn_blocking(move || {
                rank_companies(&companies, |c| c.corporate_contributors_count)
            })
        };
        let by_managers = {
            let companies = Arc::clone(&companies);
            tokio::task::spawn_blocking(move || rank_companies(&companies, |c| c.cla_managers_count))
        };

        let (totals, by_projects, by_contributors, by_managers) = tokio::join!(
            self.metrics.get_total_count_metrics(),
            by_projects,
            by_contributors,
            by_managers,
        );

        let mut top = TopCompanies {
            top_companies_by_project_count: by_projects?,
            top_companies_by_corporate_contributors: by_contributors?,
            top_companies_by_cla_managers: by_managers?,
            ..Default::default()
        };
        match totals {
            Ok(tm) => {
                top.average_company_cla_managers = average(tm.cla_managers_count, tm.companies_count);
                top.average_company_corporate_contributors =
                    average(tm.corporate_contributors_count, tm.companies_count);
                top.average_company_project_count =
                    average(tm.companies_project_contribution_count, tm.companies_count);
            }
            Err(e) => {
                warn!("unable to get total count metrics, error: {}", e);
                aggregation::section_failed("total_count");
            }
        }
        Ok(top)
    }

    pub async fn get_project_metric(&self, project_id: &str, id_type: &str) -> Result<SfProjectMetric> {
        let id_type = ProjectIdType::parse(id_type)
            .ok_or_else(|| ClaError::Validation(format!("invalid idType '{id_type}'")))?;
        match id_type {
            ProjectIdType::Internal => {
                let pm = self.metrics.get_project_metric(project_id).await?;
                Ok(SfProjectMetric {
                    project_external_id: pm.external_project_id.clone(),
                    list: vec![pm.to_model()],
                })
            }
            ProjectIdType::Salesforce => {
                let list = self.metrics.get_project_metrics_by_external_id(project_id).await?;
                Ok(SfProjectMetric {
                    project_external_id: project_id.to_string(),
                    list: list.iter().map(ProjectMetricRecord::to_model).collect(),
                })
            }
        }
    }

    pub async fn list_project_metrics(&self, page: &PageParams) -> Result<ListProjectMetric> {
        let page_size = page
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PROJECT_METRICS_PAGE_SIZE);
        let (records, next_key) = self
            .metrics
            .list_project_metrics(page_size, non_blank(page.next_key.as_deref()))
            .await?;
        Ok(ListProjectMetric {
            list: group_by_external_project(&records),
            next_key: next_key.unwrap_or_default(),
        })
    }
}

async fn count_section<F>(section: &'static str, fut: F) -> CountMetrics
where
    F: Future<Output = Result<CountMetrics>>,
{
    match fut.await {
        Ok(count) => count,
        Err(e) => {
            warn!("unable to get {} metrics, error: {}", section, e);
            aggregation::section_failed(section);
            CountMetrics::default()
        }
    }
}

/// `round(numerator / denominator)`, or 0 when there is nothing to divide by
pub fn average(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64).round() as i64
}

/// Highest `key` first, ties broken by company name ignoring case, top five kept
pub fn rank_companies<F>(companies: &[CompanyMetric], key: F) -> Vec<CompanyMetric>
where
    F: Fn(&CompanyMetric) -> i64,
{
    let mut ranked = companies.to_vec();
    ranked.sort_by(|a, b| {
        key(b)
            .cmp(&key(a))
            .then_with(|| a.company_name.to_lowercase().cmp(&b.company_name.to_lowercase()))
    });
    ranked.truncate(TOP_COMPANIES_COUNT);
    ranked
}

/// Group project metrics under their external project, in first-seen order
fn group_by_external_project(records: &[ProjectMetricRecord]) -> Vec<SfProjectMetric> {
    let mut groups: Vec<SfProjectMetric> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for pm in records {
        let idx = *index.entry(pm.external_project_id.as_str()).or_insert_with(|| {
            groups.push(SfProjectMetric {
                project_external_id: pm.external_project_id.clone(),
                list: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].list.push(pm.to_model());
    }
    groups
}
