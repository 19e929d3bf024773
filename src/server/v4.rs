//! v2 API surface, served under `/v4`

use super::state::AppState;
use crate::domain::{
    ClaManagerDistribution, CompanyMetric, CreateGithubOrganization, GithubOrganization,
    ListProjectMetric, ProjectGithubOrganizations, SfProjectMetric, TopCompanies,
    TotalCountMetrics, UpdateGithubOrganization,
};
use crate::error::Result;
use crate::types::PageParams;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ops/health", get(super::health))
        .route("/ops/version", get(super::version))
        .route("/metrics/total-count", get(get_total_count))
        .route("/metrics/cla-manager-distribution", get(get_cla_manager_distribution))
        .route("/metrics/top-companies", get(get_top_companies))
        .route("/metrics/company/:company_id", get(get_company_metric))
        .route("/metrics/project/:project_id", get(get_project_metric))
        .route("/metrics/projects", get(list_project_metrics))
        .route(
            "/project/:project_sfid/github/organizations",
            get(get_github_organizations).post(add_github_organization),
        )
        .route(
            "/project/:project_sfid/github/organizations/:org_name",
            axum::routing::put(update_github_organization).delete(delete_github_organization),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdTypeQuery {
    #[serde(default = "internal_id_type")]
    id_type: String,
}

fn internal_id_type() -> String {
    "internal".to_string()
}

async fn get_total_count(State(state): State<AppState>) -> Result<Json<TotalCountMetrics>> {
    Ok(Json(state.metrics.get_total_count_metrics().await?))
}

async fn get_cla_manager_distribution(
    State(state): State<AppState>,
) -> Result<Json<ClaManagerDistribution>> {
    Ok(Json(state.metrics.get_cla_manager_distribution().await?))
}

async fn get_top_companies(State(state): State<AppState>) -> Result<Json<TopCompanies>> {
    Ok(Json(state.metrics.get_top_companies().await?))
}

async fn get_company_metric(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<CompanyMetric>> {
    Ok(Json(state.metrics.get_company_metric(&company_id).await?))
}

async fn get_project_metric(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<IdTypeQuery>,
) -> Result<Json<SfProjectMetric>> {
    Ok(Json(state.metrics.get_project_metric(&project_id, &query.id_type).await?))
}

async fn list_project_metrics(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListProjectMetric>> {
    Ok(Json(state.metrics.list_project_metrics(&page).await?))
}

async fn get_github_organizations(
    State(state): State<AppState>,
    Path(project_sfid): Path<String>,
) -> Result<Json<ProjectGithubOrganizations>> {
    Ok(Json(state.github_orgs.get_github_organizations(&project_sfid).await?))
}

async fn add_github_organization(
    State(state): State<AppState>,
    Path(project_sfid): Path<String>,
    Json(input): Json<CreateGithubOrganization>,
) -> Result<Json<GithubOrganization>> {
    let org = state
        .github_orgs
        .add_github_organization(&project_sfid, &input)
        .await?;
    Ok(Json(org))
}

async fn update_github_organization(
    State(state): State<AppState>,
    Path((project_sfid, org_name)): Path<(String, String)>,
    Json(input): Json<UpdateGithubOrganization>,
) -> Result<Json<GithubOrganization>> {
    let org = state
        .github_orgs
        .update_github_organization(&project_sfid, &org_name, &input)
        .await?;
    Ok(Json(org))
}

async fn delete_github_organization(
    State(state): State<AppState>,
    Path((project_sfid, org_name)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .github_orgs
        .delete_github_organization(&project_sfid, &org_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
