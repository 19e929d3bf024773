// Adapters: document-store repositories and external ports

pub mod authorizer;
pub mod company_repo;
pub mod gerrit_repo;
pub mod github_org_repo;
pub mod metrics_repo;
pub mod project_directory;
pub mod project_repo;
pub mod repositories_repo;
pub mod signature_repo;
pub mod user_repo;
