/// Table and attribute constants shared by the storage adapters.
/// Table names are stage-scoped: `cla-{stage}-{entity}`.

pub const COMPANIES_TABLE: &str = "companies";
pub const COMPANY_INVITES_TABLE: &str = "company-invites";
pub const PROJECTS_TABLE: &str = "projects";
pub const SIGNATURES_TABLE: &str = "signatures";
pub const REPOSITORIES_TABLE: &str = "repositories";
pub const GERRIT_INSTANCES_TABLE: &str = "gerrit-instances";
pub const GITHUB_ORGS_TABLE: &str = "github-orgs";
pub const USERS_TABLE: &str = "users";
pub const METRICS_TABLE: &str = "metrics";

/// Every entity table, paired with its primary key attribute
pub const TABLES: &[(&str, &str)] = &[
    (COMPANIES_TABLE, "company_id"),
    (COMPANY_INVITES_TABLE, "company_invite_id"),
    (PROJECTS_TABLE, "project_id"),
    (SIGNATURES_TABLE, "signature_id"),
    (REPOSITORIES_TABLE, "repository_id"),
    (GERRIT_INSTANCES_TABLE, "gerrit_id"),
    (GITHUB_ORGS_TABLE, "organization_name"),
    (USERS_TABLE, "user_id"),
    (METRICS_TABLE, "id"),
];

/// Build the stage-scoped table name for an entity
pub fn table_name(stage: &str, entity: &str) -> String {
    format!("cla-{stage}-{entity}")
}

// Invite status values as stored
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

// Status reported for companies the user already manages
pub const STATUS_JOINED: &str = "Joined";

// Signature reference types
pub const REFERENCE_TYPE_USER: &str = "user";
pub const REFERENCE_TYPE_COMPANY: &str = "company";

// GitHub organization connection status values
pub const CONNECTED: &str = "connected";
pub const PARTIAL_CONNECTION: &str = "partial_connection";
pub const CONNECTION_FAILURE: &str = "connection_failure";
pub const NO_CONNECTION: &str = "no_connection";

/// Root foundation project; projects parented directly under it own their orgs
pub const THE_LINUX_FOUNDATION: &str = "The Linux Foundation";

pub const TOP_COMPANIES_COUNT: usize = 5;
pub const DEFAULT_PROJECT_METRICS_PAGE_SIZE: usize = 100;
pub const DEFAULT_SIGNATURES_PAGE_SIZE: usize = 50;
