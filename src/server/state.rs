use crate::app::company_service::CompanyService;
use crate::app::gerrit_service::GerritService;
use crate::app::github_org_service::GithubOrgService;
use crate::app::metrics_calculator::MetricsCalculator;
use crate::app::metrics_service::{CountSources, MetricsService};
use crate::app::ports::{Authorizer, ProjectDirectory};
use crate::app::project_service::ProjectService;
use crate::app::repository_service::RepositoryService;
use crate::app::signature_service::SignatureService;
use crate::app::user_service::UserService;
use crate::config::Config;
use crate::infra::authorizer::StaticTokenAuthorizer;
use crate::infra::company_repo::StoreCompanyRepository;
use crate::infra::gerrit_repo::StoreGerritRepository;
use crate::infra::github_org_repo::StoreGithubOrgRepository;
use crate::infra::metrics_repo::StoreMetricsRepository;
use crate::infra::project_directory::{HttpProjectDirectory, StoreProjectDirectory};
use crate::infra::project_repo::StoreProjectRepository;
use crate::infra::repositories_repo::StoreRepositoriesRepository;
use crate::infra::signature_repo::StoreSignatureRepository;
use crate::infra::user_repo::StoreUserRepository;
use crate::storage::DocumentStore;
use std::sync::Arc;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub companies: Arc<CompanyService>,
    pub projects: Arc<ProjectService>,
    pub signatures: Arc<SignatureService>,
    pub repositories: Arc<RepositoryService>,
    pub gerrits: Arc<GerritService>,
    pub github_orgs: Arc<GithubOrgService>,
    pub users: Arc<UserService>,
    pub metrics: Arc<MetricsService>,
    pub calculator: Arc<MetricsCalculator>,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    /// Wire every repository and service over one document store
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        let authorizer: Arc<dyn Authorizer> =
            Arc::new(StaticTokenAuthorizer::new(config.auth.tokens.clone()));
        Self::with_authorizer(store, config, authorizer)
    }

    pub fn with_authorizer(
        store: Arc<dyn DocumentStore>,
        config: &Config,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let stage = config.stage.as_str();
        let company_repo = Arc::new(StoreCompanyRepository::new(store.clone(), stage));
        let project_repo = Arc::new(StoreProjectRepository::new(store.clone(), stage));
        let signature_repo = Arc::new(StoreSignatureRepository::new(store.clone(), stage));
        let repositories_repo = Arc::new(StoreRepositoriesRepository::new(store.clone(), stage));
        let gerrit_repo = Arc::new(StoreGerritRepository::new(store.clone(), stage));
        let github_org_repo = Arc::new(StoreGithubOrgRepository::new(store.clone(), stage));
        let user_repo = Arc::new(StoreUserRepository::new(store.clone(), stage));
        let metrics_repo = Arc::new(StoreMetricsRepository::new(store, stage));

        let directory: Arc<dyn ProjectDirectory> = if config.local_mode {
            Arc::new(StoreProjectDirectory::new(project_repo.clone()))
        } else {
            Arc::new(HttpProjectDirectory::new(&config.api_gateway_url))
        };

        Self {
            companies: Arc::new(CompanyService::new(
                company_repo.clone(),
                company_repo.clone(),
                user_repo.clone(),
            )),
            projects: Arc::new(ProjectService::new(project_repo.clone())),
            signatures: Arc::new(SignatureService::new(signature_repo.clone())),
            repositories: Arc::new(RepositoryService::new(
                repositories_repo.clone(),
                project_repo.clone(),
            )),
            gerrits: Arc::new(GerritService::new(gerrit_repo.clone(), project_repo.clone())),
            github_orgs: Arc::new(GithubOrgService::new(
                github_org_repo,
                repositories_repo.clone(),
                directory,
            )),
            users: Arc::new(UserService::new(user_repo.clone())),
            metrics: Arc::new(MetricsService::new(
                CountSources {
                    users: user_repo,
                    signatures: signature_repo.clone(),
                    companies: company_repo.clone(),
                    repositories: repositories_repo.clone(),
                    projects: project_repo.clone(),
                },
                metrics_repo.clone(),
            )),
            calculator: Arc::new(MetricsCalculator::new(
                company_repo,
                project_repo,
                signature_repo,
                repositories_repo,
                gerrit_repo,
                metrics_repo,
            )),
            authorizer,
        }
    }
}
