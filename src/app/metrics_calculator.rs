use crate::domain::{
    ClaManagerDistributionRecord, Company, CompanyMetricRecord, Gerrit, GithubRepository,
    Project, ProjectMetricRecord, SignatureRecord, TotalCountMetricsRecord,
    CLA_MANAGER_DISTRIBUTION_METRIC_ID, METRIC_TYPE_CLA_MANAGER_DISTRIBUTION,
    METRIC_TYPE_COMPANY, METRIC_TYPE_PROJECT, METRIC_TYPE_TOTAL_COUNT, TOTAL_COUNT_METRIC_ID,
};
use crate::error::Result;
use crate::infra::company_repo::CompanyRepository;
use crate::infra::gerrit_repo::GerritRepository;
use crate::infra::metrics_repo::MetricsRepository;
use crate::infra::project_repo::ProjectRepository;
use crate::infra::repositories_repo::RepositoriesRepository;
use crate::infra::signature_repo::SignatureRepository;
use crate::types::current_time;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Base table contents the derived metrics are computed from
#[derive(Debug, Default)]
pub struct MetricInputs {
    pub companies: Vec<Company>,
    pub projects: Vec<Project>,
    pub signatures: Vec<SignatureRecord>,
    pub repositories: Vec<GithubRepository>,
    pub gerrits: Vec<Gerrit>,
}

/// Every derived document, ready to be written
#[derive(Debug, Default)]
pub struct ComputedMetrics {
    pub total: TotalCountMetricsRecord,
    pub distribution: ClaManagerDistributionRecord,
    pub companies: Vec<CompanyMetricRecord>,
    pub projects: Vec<ProjectMetricRecord>,
}

pub struct MetricsCalculator {
    companies: Arc<dyn CompanyRepository>,
    projects: Arc<dyn ProjectRepository>,
    signatures: Arc<dyn SignatureRepository>,
    repositories: Arc<dyn RepositoriesRepository>,
    gerrits: Arc<dyn GerritRepository>,
    metrics: Arc<dyn MetricsRepository>,
}

impl MetricsCalculator {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        projects: Arc<dyn ProjectRepository>,
        signatures: Arc<dyn SignatureRepository>,
        repositories: Arc<dyn RepositoriesRepository>,
        gerrits: Arc<dyn GerritRepository>,
        metrics: Arc<dyn MetricsRepository>,
    ) -> Self {
        Self {
            companies,
            projects,
            signatures,
            repositories,
            gerrits,
            metrics,
        }
    }

    /// Recompute every metric document from the base tables and store it
    pub async fn calculate_and_store(&self) -> Result<ComputedMetrics> {
        let started = Instant::now();
        let (companies, projects, signatures, repositories, gerrits) = tokio::try_join!(
            self.companies.get_companies(),
            self.projects.get_projects(),
            self.signatures.get_all_signature_records(),
            self.repositories.list_all_repositories(),
            self.gerrits.list_all_gerrits(),
        )?;
        let inputs = MetricInputs {
            companies: companies.companies,
            projects: projects.projects,
            signatures,
            repositories,
            gerrits,
        };

        let (_, now) = current_time();
        let computed = compute_metrics(&inputs, &now);

        for record in &computed.companies {
            self.metrics.put_company_metric(record).await?;
        }
        for record in &computed.projects {
            self.metrics.put_project_metric(record).await?;
        }
        self.metrics.put_total_count_metrics(&computed.total).await?;
        self.metrics
            .put_cla_manager_distribution(&computed.distribution)
            .await?;
        let removed = self.remove_stale_metrics(&computed).await?;

        info!(
            "calculated metrics for {} companies and {} projects in {:?}",
            computed.companies.len(),
            computed.projects.len(),
            started.elapsed()
        );
        if removed > 0 {
            info!("removed {} metrics of deleted companies and projects", removed);
        }
        Ok(computed)
    }

    /// Delete company and project metrics whose entity no longer exists
    async fn remove_stale_metrics(&self, computed: &ComputedMetrics) -> Result<usize> {
        let current: HashSet<&str> = computed
            .companies
            .iter()
            .map(|c| c.id.as_str())
            .chain(computed.projects.iter().map(|p| p.id.as_str()))
            .collect();
        let (companies, projects) = tokio::try_join!(
            self.metrics.get_company_metrics(),
            self.metrics.get_project_metrics(),
        )?;

        let stale: Vec<String> = companies
            .into_iter()
            .map(|c| c.id)
            .chain(projects.into_iter().map(|p| p.id))
            .filter(|id| !current.contains(id.as_str()))
            .collect();
        for id in &stale {
            self.metrics.delete_metric(id).await?;
        }
        Ok(stale.len())
    }
}

/// Derive every metric document. Only signed and approved signatures count.
pub fn compute_metrics(inputs: &MetricInputs, created_at: &str) -> ComputedMetrics {
    let effective: Vec<&SignatureRecord> =
        inputs.signatures.iter().filter(|s| s.is_effective()).collect();

    let companies: Vec<CompanyMetricRecord> = inputs
        .companies
        .iter()
        .map(|company| {
            let projects: HashSet<&str> = effective
                .iter()
                .filter(|s| s.is_ccla() && s.signature_reference_id == company.company_id)
                .map(|s| s.signature_project_id.as_str())
                .collect();
            let contributors: HashSet<&str> = effective
                .iter()
                .filter(|s| {
                    s.is_employee()
                        && s.signature_user_ccla_company_id.as_deref()
                            == Some(company.company_id.as_str())
                })
                .map(|s| s.signature_reference_id.as_str())
                .collect();
            CompanyMetricRecord {
                id: company.company_id.clone(),
                metric_type: METRIC_TYPE_COMPANY.to_string(),
                company_name: company.company_name.clone(),
                project_count: projects.len() as i64,
                corporate_contributors_count: contributors.len() as i64,
                cla_managers_count: company.company_acl.len() as i64,
                created_at: created_at.to_string(),
            }
        })
        .collect();

    let projects: Vec<ProjectMetricRecord> = inputs
        .projects
        .iter()
        .map(|project| {
            let pid = project.project_id.as_str();
            let sigs: Vec<&&SignatureRecord> = effective
                .iter()
                .filter(|s| s.signature_project_id == pid)
                .collect();
            let ccla_companies: HashSet<&str> = sigs
                .iter()
                .filter(|s| s.is_ccla())
                .map(|s| s.signature_reference_id.as_str())
                .collect();
            let repositories = inputs
                .repositories
                .iter()
                .filter(|r| r.repository_project_id == pid)
                .count()
                + inputs.gerrits.iter().filter(|g| g.project_id == pid).count();
            ProjectMetricRecord {
                id: project.project_id.clone(),
                metric_type: METRIC_TYPE_PROJECT.to_string(),
                external_project_id: project.project_external_id.clone(),
                project_name: project.project_name.clone(),
                companies_count: ccla_companies.len() as i64,
                individual_contributors_count: sigs.iter().filter(|s| s.is_icla()).count() as i64,
                corporate_contributors_count: sigs.iter().filter(|s| s.is_employee()).count()
                    as i64,
                cla_managers_count: sigs
                    .iter()
                    .filter(|s| s.is_ccla())
                    .map(|s| s.signature_acl.len() as i64)
                    .sum(),
                repositories_count: repositories as i64,
                created_at: created_at.to_string(),
            }
        })
        .collect();

    let cla_managers: HashSet<&str> = effective
        .iter()
        .filter(|s| s.is_ccla())
        .flat_map(|s| s.signature_acl.iter().map(String::as_str))
        .collect();
    let individual: HashSet<&str> = effective
        .iter()
        .filter(|s| s.is_icla())
        .map(|s| s.signature_reference_id.as_str())
        .collect();
    let corporate: HashSet<&str> = effective
        .iter()
        .filter(|s| s.is_employee())
        .map(|s| s.signature_reference_id.as_str())
        .collect();

    let github_repositories = inputs.repositories.len() as i64;
    let gerrit_repositories = inputs.gerrits.len() as i64;
    let total = TotalCountMetricsRecord {
        id: TOTAL_COUNT_METRIC_ID.to_string(),
        metric_type: METRIC_TYPE_TOTAL_COUNT.to_string(),
        cla_managers_count: cla_managers.len() as i64,
        contributors_count: (individual.len() + corporate.len()) as i64,
        corporate_contributors_count: corporate.len() as i64,
        individual_contributors_count: individual.len() as i64,
        companies_count: inputs.companies.len() as i64,
        projects_count: inputs.projects.len() as i64,
        repositories_count: github_repositories + gerrit_repositories,
        github_repositories_count: github_repositories,
        gerrit_repositories_count: gerrit_repositories,
        companies_project_contribution_count: companies.iter().map(|c| c.project_count).sum(),
        created_at: created_at.to_string(),
    };

    let mut distribution = ClaManagerDistributionRecord {
        id: CLA_MANAGER_DISTRIBUTION_METRIC_ID.to_string(),
        metric_type: METRIC_TYPE_CLA_MANAGER_DISTRIBUTION.to_string(),
        created_at: created_at.to_string(),
        ..Default::default()
    };
    for company in &inputs.companies {
        match company.company_acl.len() {
            0 => {}
            1 => distribution.one_cla_manager += 1,
            2 => distribution.two_cla_manager += 1,
            3 => distribution.three_cla_manager += 1,
            _ => distribution.four_or_more_cla_manager += 1,
        }
    }

    ComputedMetrics {
        total,
        distribution,
        companies,
        projects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn company(id: &str, acl: &[&str]) -> Company {
        Company {
            company_id: id.into(),
            company_name: id.to_uppercase(),
            company_external_id: String::new(),
            company_manager_id: String::new(),
            company_acl: acl.iter().map(|s| s.to_string()).collect(),
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    fn signature(
        id: &str,
        project: &str,
        reference: &str,
        kind: &str,
        company: Option<&str>,
        acl: &[&str],
        approved: bool,
    ) -> SignatureRecord {
        serde_json::from_value(json!({
            "signature_id": id,
            "signature_project_id": project,
            "signature_reference_id": reference,
            "signature_reference_type": kind,
            "signature_signed": true,
            "signature_approved": approved,
            "signature_user_ccla_company_id": company,
            "signature_acl": acl,
        }))
        .unwrap()
    }

    #[test]
    fn test_compute_metrics() {
        let project: Project = crate::domain::ProjectRecord {
            project_id: "p1".into(),
            project_external_id: "sf1".into(),
            project_name: "Project One".into(),
            project_acl: vec![],
            project_icla_enabled: true,
            project_ccla_enabled: true,
            project_ccla_requires_icla_signature: false,
            date_created: String::new(),
            date_modified: String::new(),
            version: "v1".into(),
        }
        .to_model();
        let inputs = MetricInputs {
            companies: vec![
                company("c1", &["alice", "bob"]),
                company("c2", &["carol"]),
                company("c3", &[]),
            ],
            projects: vec![project],
            signatures: vec![
                signature("s1", "p1", "c1", "company", None, &["alice", "bob"], true),
                signature("s2", "p1", "c2", "company", None, &["alice"], true),
                signature("s3", "p1", "u1", "user", None, &[], true),
                signature("s4", "p1", "u2", "user", Some("c1"), &[], true),
                signature("s5", "p1", "u3", "user", Some("c1"), &[], true),
                // Unapproved signatures are ignored
                signature("s6", "p1", "u4", "user", None, &[], false),
            ],
            repositories: vec![],
            gerrits: vec![],
        };

        let computed = compute_metrics(&inputs, "2021-01-01T00:00:00.000Z");

        let c1 = &computed.companies[0];
        assert_eq!(c1.project_count, 1);
        assert_eq!(c1.corporate_contributors_count, 2);
        assert_eq!(c1.cla_managers_count, 2);

        let p1 = &computed.projects[0];
        assert_eq!(p1.companies_count, 2);
        assert_eq!(p1.individual_contributors_count, 1);
        assert_eq!(p1.corporate_contributors_count, 2);
        assert_eq!(p1.cla_managers_count, 3);
        assert_eq!(p1.external_project_id, "sf1");

        assert_eq!(computed.total.cla_managers_count, 2);
        assert_eq!(computed.total.contributors_count, 3);
        assert_eq!(computed.total.companies_project_contribution_count, 2);

        assert_eq!(computed.distribution.one_cla_manager, 1);
        assert_eq!(computed.distribution.two_cla_manager, 1);
        assert_eq!(computed.distribution.four_or_more_cla_manager, 0);
    }
}
