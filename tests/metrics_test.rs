mod common;

use anyhow::Result;
use cla_backend::constants::{
    COMPANIES_TABLE, GERRIT_INSTANCES_TABLE, PROJECTS_TABLE, SIGNATURES_TABLE, USERS_TABLE,
};
use cla_backend::error::ClaError;
use cla_backend::types::PageParams;
use common::{app_state, CountingStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn signature(id: &str, project: &str, reference: &str, kind: &str, effective: bool) -> Value {
    json!({
        "signature_id": id,
        "signature_project_id": project,
        "signature_reference_id": reference,
        "signature_reference_type": kind,
        "signature_signed": effective,
        "signature_approved": effective,
    })
}

async fn seeded_store() -> Arc<CountingStore> {
    let store = CountingStore::new(2);
    for (id, name, acl) in [
        ("c-1", "Acme", vec!["a", "b", "c"]),
        ("c-2", "beta", vec!["d"]),
        ("c-3", "Alpha", vec![]),
    ] {
        store
            .seed(
                COMPANIES_TABLE,
                json!({"company_id": id, "company_name": name, "company_acl": acl}),
            )
            .await;
    }
    for (id, external) in [("p-1", "sf-1"), ("p-2", "sf-1"), ("p-3", "sf-2")] {
        store
            .seed(
                PROJECTS_TABLE,
                json!({"project_id": id, "project_external_id": external, "project_name": id}),
            )
            .await;
    }

    let ccla = |id: &str, project: &str, company: &str, acl: Vec<&str>, effective: bool| {
        let mut sig = signature(id, project, company, "company", effective);
        sig["signature_acl"] = json!(acl);
        sig
    };
    let mut signatures = vec![
        ccla("s-1", "p-1", "c-1", vec!["a", "b"], true),
        ccla("s-2", "p-2", "c-1", vec!["c"], true),
        ccla("s-3", "p-1", "c-2", vec!["d"], true),
        // Not approved, ignored everywhere
        ccla("s-4", "p-3", "c-3", vec!["e"], false),
    ];
    for (id, project, user, company) in [("s-5", "p-1", "u-1", "c-1"), ("s-6", "p-2", "u-2", "c-1")] {
        let mut sig = signature(id, project, user, "user", true);
        sig["signature_user_ccla_company_id"] = json!(company);
        signatures.push(sig);
    }
    signatures.push(signature("s-7", "p-1", "u-3", "user", true));
    signatures.push(signature("s-8", "p-1", "u-4", "user", false));
    for sig in signatures {
        store.seed(SIGNATURES_TABLE, sig).await;
    }

    store
        .seed(
            GERRIT_INSTANCES_TABLE,
            json!({
                "gerrit_id": "g-1",
                "project_id": "p-1",
                "gerrit_name": "review",
                "gerrit_url": "https://review.example.org",
            }),
        )
        .await;
    for id in ["u-1", "u-2"] {
        store
            .seed(USERS_TABLE, json!({"user_id": id, "lf_username": id}))
            .await;
    }
    store
}

#[tokio::test]
async fn test_failed_section_stays_zero() -> Result<()> {
    let store = seeded_store().await;
    store.fail_item_count(USERS_TABLE);
    let state = app_state(&store);

    let metrics = state.metrics.get_metrics().await;

    assert_eq!(metrics.users.total_count, 0);
    assert_eq!(metrics.companies.total_count, 3);
    assert_eq!(metrics.projects.total_count, 3);
    assert_eq!(metrics.signatures.total_count, 8);
    assert_eq!(metrics.repositories.total_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_calculated_totals_and_distribution() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);

    state.calculator.calculate_and_store().await?;

    let totals = state.metrics.get_total_count_metrics().await?;
    assert_eq!(totals.companies_count, 3);
    assert_eq!(totals.projects_count, 3);
    assert_eq!(totals.cla_managers_count, 4);
    assert_eq!(totals.corporate_contributors_count, 2);
    assert_eq!(totals.individual_contributors_count, 1);
    assert_eq!(totals.contributors_count, 3);
    assert_eq!(totals.gerrit_repositories_count, 1);
    assert_eq!(totals.repositories_count, 1);
    assert_eq!(totals.companies_project_contribution_count, 3);

    let distribution = state.metrics.get_cla_manager_distribution().await?;
    assert_eq!(distribution.one_cla_manager, 1);
    assert_eq!(distribution.two_cla_managers, 0);
    assert_eq!(distribution.three_cla_managers, 1);
    assert_eq!(distribution.four_or_more_cla_managers, 0);

    let acme = state.metrics.get_company_metric("c-1").await?;
    assert_eq!(acme.project_count, 2);
    assert_eq!(acme.corporate_contributors_count, 2);
    assert_eq!(acme.cla_managers_count, 3);
    Ok(())
}

#[tokio::test]
async fn test_top_companies_ranking() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);
    state.calculator.calculate_and_store().await?;

    let top = state.metrics.get_top_companies().await?;

    let names = |list: &[cla_backend::domain::CompanyMetric]| -> Vec<String> {
        list.iter().map(|c| c.company_name.clone()).collect()
    };
    assert_eq!(names(&top.top_companies_by_project_count), vec!["Acme", "beta", "Alpha"]);
    assert_eq!(names(&top.top_companies_by_cla_managers), vec!["Acme", "beta", "Alpha"]);
    // Ties on zero contributors order by name, ignoring case
    assert_eq!(
        names(&top.top_companies_by_corporate_contributors),
        vec!["Acme", "Alpha", "beta"]
    );
    assert_eq!(top.average_company_cla_managers, 1);
    assert_eq!(top.average_company_corporate_contributors, 1);
    assert_eq!(top.average_company_project_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_project_metric_by_id_type() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);
    state.calculator.calculate_and_store().await?;

    let internal = state.metrics.get_project_metric("p-1", "internal").await?;
    assert_eq!(internal.project_external_id, "sf-1");
    let p1 = &internal.list[0];
    assert_eq!(p1.companies_count, 2);
    assert_eq!(p1.individual_contributors_count, 1);
    assert_eq!(p1.corporate_contributors_count, 1);
    assert_eq!(p1.total_contributors_count, 2);
    assert_eq!(p1.cla_managers_count, 3);
    assert_eq!(p1.repositories_count, 1);

    let salesforce = state.metrics.get_project_metric("sf-1", "salesforce").await?;
    assert_eq!(salesforce.project_external_id, "sf-1");
    let ids: Vec<&str> = salesforce.list.iter().map(|p| p.project_id.as_str()).collect();
    assert_eq!(ids, vec!["p-1", "p-2"]);

    let err = state
        .metrics
        .get_project_metric("p-1", "external")
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn test_list_project_metrics_pages() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);
    state.calculator.calculate_and_store().await?;

    let first = state
        .metrics
        .list_project_metrics(&PageParams {
            page_size: Some(2),
            next_key: None,
        })
        .await?;
    assert_eq!(first.list.len(), 1);
    assert_eq!(first.list[0].project_external_id, "sf-1");
    assert_eq!(first.list[0].list.len(), 2);
    assert_eq!(first.next_key, "p-2");

    let second = state
        .metrics
        .list_project_metrics(&PageParams {
            page_size: Some(2),
            next_key: Some(first.next_key.clone()),
        })
        .await?;
    assert_eq!(second.list.len(), 1);
    assert_eq!(second.list[0].project_external_id, "sf-2");
    assert_eq!(second.next_key, "");
    Ok(())
}

#[tokio::test]
async fn test_recalculation_drops_deleted_companies_and_projects() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);
    state.calculator.calculate_and_store().await?;
    assert_eq!(state.metrics.get_company_metric("c-1").await?.company_name, "Acme");

    state.companies.delete_company_by_id("c-1").await?;
    state.projects.delete_project("p-3").await?;
    state.calculator.calculate_and_store().await?;

    let err = state.metrics.get_company_metric("c-1").await.unwrap_err();
    assert!(matches!(err, ClaError::NotFound { .. }));
    let err = state
        .metrics
        .get_project_metric("p-3", "internal")
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::NotFound { .. }));
    let sf2 = state.metrics.get_project_metric("sf-2", "salesforce").await?;
    assert!(sf2.list.is_empty());

    let top = state.metrics.get_top_companies().await?;
    let names: Vec<&str> = top
        .top_companies_by_project_count
        .iter()
        .map(|c| c.company_name.as_str())
        .collect();
    assert_eq!(names, vec!["beta", "Alpha"]);

    let totals = state.metrics.get_total_count_metrics().await?;
    assert_eq!(totals.companies_count, 2);
    assert_eq!(totals.projects_count, 2);

    let page = state
        .metrics
        .list_project_metrics(&PageParams {
            page_size: Some(10),
            next_key: None,
        })
        .await?;
    let ids: Vec<&str> = page
        .list
        .iter()
        .flat_map(|group| group.list.iter().map(|p| p.project_id.as_str()))
        .collect();
    assert_eq!(ids, vec!["p-1", "p-2"]);
    Ok(())
}
