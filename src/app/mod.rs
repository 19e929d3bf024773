// Application services: business rules over the repository and port traits

pub mod company_service;
pub mod gerrit_service;
pub mod github_org_service;
pub mod metrics_calculator;
pub mod metrics_service;
pub mod ports;
pub mod project_service;
pub mod repository_service;
pub mod signature_service;
pub mod user_service;
