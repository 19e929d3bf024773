//! v1 API surface, served under `/v3`

use super::state::AppState;
use crate::domain::{
    AclEntryInput, ApprovalListUpdate, Companies, CompaniesWithInvites, Company,
    CreateCompanyInput, CreateGerrit, CreateGithubRepository, CreateProjectInput, CreateUserInput,
    Gerrit, GerritList, GithubRepositories, GithubRepository, Invite, InviteRequestInput, Metrics,
    Project, Projects, RepositoryEnabledInput, Signature, Signatures, User,
};
use crate::error::Result;
use crate::types::PageParams;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ops/health", get(super::health))
        .route("/ops/version", get(super::version))
        // companies
        .route("/company", get(get_companies).post(create_company))
        .route("/company/search", get(search_companies))
        .route("/company/:company_id", get(get_company).delete(delete_company))
        .route(
            "/company/external/:external_id",
            get(get_company_by_external_id).delete(delete_company_by_external_id),
        )
        .route("/company/user/:user_id", get(get_companies_by_user_manager))
        .route(
            "/company/user/:user_id/invites",
            get(get_companies_by_user_manager_with_invites),
        )
        .route("/company/:company_id/invites", get(get_company_invites))
        .route("/company/:company_id/invite-request", post(request_company_access))
        .route(
            "/company/:company_id/invite-request/:invite_id/approve",
            put(approve_invite),
        )
        .route(
            "/company/:company_id/invite-request/:invite_id/reject",
            put(reject_invite),
        )
        .route("/company/:company_id/acl", post(add_acl_entry))
        .route("/company/:company_id/acl/:username", delete(remove_acl_entry))
        .route("/user/:user_id/invites", get(get_user_invites))
        // projects
        .route("/project", get(get_projects).post(create_project))
        .route("/project/:project_id", get(get_project).delete(delete_project))
        .route("/project/external/:external_id", get(get_project_by_external_id))
        .route(
            "/project/:project_id/github/repositories",
            get(list_repositories).post(add_repository),
        )
        .route(
            "/project/:project_id/github/repositories/:repository_id",
            put(set_repository_enabled),
        )
        .route("/project/:project_id/gerrits", get(list_gerrits).post(add_gerrit))
        .route("/project/:project_id/gerrits/:gerrit_id", delete(delete_gerrit))
        // signatures
        .route("/signatures/:signature_id", get(get_signature))
        .route("/signatures/:signature_id/approval-list", put(update_approval_list))
        .route("/signatures/project/:project_id", get(get_project_signatures))
        .route("/signatures/company/:company_id", get(get_company_signatures))
        .route("/signatures/user/:user_id", get(get_user_signatures))
        // users
        .route("/users", post(create_user))
        .route("/users/:user_id", get(get_user))
        .route("/users/username/:lf_username", get(get_user_by_lf_username))
        .route("/metrics", get(get_metrics))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    company_name: Option<String>,
    next_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InviteStatusQuery {
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EnabledQuery {
    enabled: Option<bool>,
}

// companies

async fn get_companies(State(state): State<AppState>) -> Result<Json<Companies>> {
    Ok(Json(state.companies.get_companies().await?))
}

async fn create_company(
    State(state): State<AppState>,
    Json(input): Json<CreateCompanyInput>,
) -> Result<Json<Company>> {
    Ok(Json(state.companies.create_company(&input).await?))
}

async fn search_companies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Companies>> {
    let companies = state
        .companies
        .search_company_by_name(query.company_name.as_deref(), query.next_key.as_deref())
        .await?;
    Ok(Json(companies))
}

async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Company>> {
    Ok(Json(state.companies.get_company(&company_id).await?))
}

async fn delete_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<StatusCode> {
    state.companies.delete_company_by_id(&company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_company_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<Company>> {
    Ok(Json(state.companies.get_company_by_external_id(&external_id).await?))
}

async fn delete_company_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<StatusCode> {
    state.companies.delete_company_by_external_id(&external_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_companies_by_user_manager(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Companies>> {
    Ok(Json(state.companies.get_companies_by_user_manager(&user_id).await?))
}

async fn get_companies_by_user_manager_with_invites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CompaniesWithInvites>> {
    let companies = state
        .companies
        .get_companies_by_user_manager_with_invites(&user_id)
        .await?;
    Ok(Json(companies))
}

async fn get_company_invites(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<InviteStatusQuery>,
) -> Result<Json<Vec<Invite>>> {
    let invites = state
        .companies
        .get_company_invites(&company_id, query.status.as_deref())
        .await?;
    Ok(Json(invites))
}

async fn request_company_access(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Json(input): Json<InviteRequestInput>,
) -> Result<Json<Invite>> {
    let invite = state
        .companies
        .request_company_access(&company_id, &input.user_id)
        .await?;
    Ok(Json(invite))
}

async fn approve_invite(
    State(state): State<AppState>,
    Path((company_id, invite_id)): Path<(String, String)>,
) -> Result<Json<Invite>> {
    Ok(Json(state.companies.approve_invite(&company_id, &invite_id).await?))
}

async fn reject_invite(
    State(state): State<AppState>,
    Path((company_id, invite_id)): Path<(String, String)>,
) -> Result<Json<Invite>> {
    Ok(Json(state.companies.reject_invite(&company_id, &invite_id).await?))
}

async fn add_acl_entry(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Json(input): Json<AclEntryInput>,
) -> Result<Json<Company>> {
    Ok(Json(state.companies.add_acl_entry(&company_id, &input.username).await?))
}

async fn remove_acl_entry(
    State(state): State<AppState>,
    Path((company_id, username)): Path<(String, String)>,
) -> Result<Json<Company>> {
    Ok(Json(state.companies.remove_acl_entry(&company_id, &username).await?))
}

async fn get_user_invites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Invite>>> {
    Ok(Json(state.companies.get_user_invites(&user_id).await?))
}

// projects

async fn get_projects(State(state): State<AppState>) -> Result<Json<Projects>> {
    Ok(Json(state.projects.get_projects().await?))
}

async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects.create_project(&input).await?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects.get_project(&project_id).await?))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<StatusCode> {
    state.projects.delete_project(&project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_project_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects.get_project_by_external_id(&external_id).await?))
}

async fn list_repositories(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<EnabledQuery>,
) -> Result<Json<GithubRepositories>> {
    let repos = state
        .repositories
        .list_project_repositories(&project_id, query.enabled)
        .await?;
    Ok(Json(repos))
}

async fn add_repository(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(input): Json<CreateGithubRepository>,
) -> Result<Json<GithubRepository>> {
    Ok(Json(state.repositories.add_github_repository(&project_id, &input).await?))
}

async fn set_repository_enabled(
    State(state): State<AppState>,
    Path((project_id, repository_id)): Path<(String, String)>,
    Json(input): Json<RepositoryEnabledInput>,
) -> Result<Json<GithubRepository>> {
    let repo = state
        .repositories
        .set_repository_enabled(&project_id, &repository_id, input.enabled)
        .await?;
    Ok(Json(repo))
}

async fn list_gerrits(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<GerritList>> {
    Ok(Json(state.gerrits.get_project_gerrits(&project_id).await?))
}

async fn add_gerrit(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(input): Json<CreateGerrit>,
) -> Result<Json<Gerrit>> {
    Ok(Json(state.gerrits.add_gerrit(&project_id, &input).await?))
}

async fn delete_gerrit(
    State(state): State<AppState>,
    Path((project_id, gerrit_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state.gerrits.delete_gerrit(&project_id, &gerrit_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// signatures

async fn get_signature(
    State(state): State<AppState>,
    Path(signature_id): Path<String>,
) -> Result<Json<Signature>> {
    Ok(Json(state.signatures.get_signature(&signature_id).await?))
}

async fn update_approval_list(
    State(state): State<AppState>,
    Path(signature_id): Path<String>,
    Json(update): Json<ApprovalListUpdate>,
) -> Result<Json<Signature>> {
    let signature = state
        .signatures
        .update_approval_list(&signature_id, &update)
        .await?;
    Ok(Json(signature))
}

async fn get_project_signatures(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Signatures>> {
    Ok(Json(state.signatures.get_project_signatures(&project_id, &page).await?))
}

async fn get_company_signatures(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Signatures>> {
    Ok(Json(state.signatures.get_company_signatures(&company_id).await?))
}

async fn get_user_signatures(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Signatures>> {
    Ok(Json(state.signatures.get_user_signatures(&user_id).await?))
}

// users

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<Json<User>> {
    Ok(Json(state.users.create_user(&input).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get_user(&user_id).await?))
}

async fn get_user_by_lf_username(
    State(state): State<AppState>,
    Path(lf_username): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get_user_by_lf_username(&lf_username).await?))
}

async fn get_metrics(State(state): State<AppState>) -> Json<Metrics> {
    Json(state.metrics.get_metrics().await)
}
