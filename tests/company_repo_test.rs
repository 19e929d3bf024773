mod common;

use anyhow::Result;
use cla_backend::constants::{COMPANIES_TABLE, COMPANY_INVITES_TABLE, USERS_TABLE};
use cla_backend::domain::User;
use cla_backend::error::ClaError;
use cla_backend::infra::company_repo::{
    CompanyRepository, InviteRepository, StoreCompanyRepository,
};
use cla_backend::storage::DocumentStore;
use chrono::Utc;
use common::{CountingStore, STAGE};
use serde_json::json;
use std::sync::Arc;

fn repo(store: &Arc<CountingStore>) -> StoreCompanyRepository {
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    StoreCompanyRepository::new(dyn_store, STAGE)
}

fn user(lf_username: &str, username: &str) -> User {
    User {
        user_id: "u-1".into(),
        lf_username: lf_username.into(),
        lf_email: String::new(),
        username: username.into(),
        emails: vec![],
        github_id: None,
        github_username: String::new(),
        company_id: String::new(),
        date_created: Utc::now(),
        date_modified: Utc::now(),
    }
}

async fn seed_companies(store: &CountingStore) {
    let companies = [
        ("c-1", "Acme Corp", vec!["alice"]),
        ("c-2", "Globex", vec!["bob"]),
        ("c-3", "Acme Labs", vec!["alice", "bob"]),
        ("c-4", "Initech", vec![]),
        ("c-5", "Umbrella", vec!["alice"]),
    ];
    for (id, name, acl) in companies {
        store
            .seed(
                COMPANIES_TABLE,
                json!({
                    "company_id": id,
                    "company_name": name,
                    "company_acl": acl,
                    "date_created": "2020-01-01T00:00:00.000Z",
                    "date_modified": "2020-01-01T00:00:00.000Z",
                }),
            )
            .await;
    }
}

#[tokio::test]
async fn test_get_companies_reads_every_page() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;

    let companies = repo(&store).get_companies().await?;

    assert_eq!(companies.result_count, 5);
    assert_eq!(companies.total_count, 5);
    let ids: Vec<&str> = companies.companies.iter().map(|c| c.company_id.as_str()).collect();
    assert_eq!(ids, vec!["c-1", "c-2", "c-3", "c-4", "c-5"]);
    // 5 items at 2 per page
    assert_eq!(store.scans(), 3);
    Ok(())
}

#[tokio::test]
async fn test_blank_search_does_not_scan() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;
    let repo = repo(&store);

    for blank in ["", "   "] {
        let result = repo.search_company_by_name(blank, None).await?;
        assert_eq!(result.result_count, 0);
        assert!(result.companies.is_empty());
    }
    assert_eq!(store.scans(), 0);
    Ok(())
}

#[tokio::test]
async fn test_search_matches_across_pages() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;

    let result = repo(&store).search_company_by_name("Acme", None).await?;

    assert_eq!(result.search_terms, "Acme");
    assert_eq!(result.result_count, 2);
    assert_eq!(result.total_count, 5);
    let names: Vec<&str> = result.companies.iter().map(|c| c.company_name.as_str()).collect();
    assert_eq!(names, vec!["Acme Corp", "Acme Labs"]);
    Ok(())
}

#[tokio::test]
async fn test_search_resumes_after_next_key() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;

    let result = repo(&store).search_company_by_name("Acme", Some("c-1")).await?;

    assert_eq!(result.result_count, 1);
    assert_eq!(result.companies[0].company_id, "c-3");
    Ok(())
}

#[tokio::test]
async fn test_companies_by_user_manager() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;
    let repo = repo(&store);

    let managed = repo.get_companies_by_user_manager("u-1", &user("alice", "")).await?;
    let ids: Vec<&str> = managed.companies.iter().map(|c| c.company_id.as_str()).collect();
    assert_eq!(ids, vec!["c-1", "c-3", "c-5"]);

    // Falls back to the username when there is no LF username
    let managed = repo.get_companies_by_user_manager("u-1", &user("", "bob")).await?;
    assert_eq!(managed.result_count, 2);

    let scans_before = store.scans();
    let none = repo.get_companies_by_user_manager("u-1", &user("", "")).await?;
    assert_eq!(none.result_count, 0);
    let none = repo.get_companies_by_user_manager(" ", &user("alice", "")).await?;
    assert_eq!(none.result_count, 0);
    assert_eq!(store.scans(), scans_before);
    Ok(())
}

#[tokio::test]
async fn test_companies_with_invites() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;
    store
        .seed(USERS_TABLE, json!({"user_id": "u-1", "lf_username": "alice"}))
        .await;
    for (invite_id, company_id, status) in [
        ("i-1", "c-2", json!("pending")),
        ("i-2", "c-missing", json!("pending")),
        ("i-3", "c-4", json!("")),
    ] {
        store
            .seed(
                COMPANY_INVITES_TABLE,
                json!({
                    "company_invite_id": invite_id,
                    "requested_company_id": company_id,
                    "user_id": "u-1",
                    "status": status,
                }),
            )
            .await;
    }

    let result = repo(&store)
        .get_companies_by_user_manager_with_invites("u-1", &user("alice", ""))
        .await?;

    let rows: Vec<(&str, &str)> = result
        .companies_with_invites
        .iter()
        .map(|c| (c.company_id.as_str(), c.status.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("c-1", "Joined"),
            ("c-3", "Joined"),
            ("c-5", "Joined"),
            ("c-2", "pending"),
            ("c-4", "pending"),
        ]
    );
    assert_eq!(result.result_count, 5);
    Ok(())
}

#[tokio::test]
async fn test_update_access_list_of_missing_company() -> Result<()> {
    let store = CountingStore::new(2);
    let err = repo(&store)
        .update_company_access_list("c-404", &["alice".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "company does not exist: c-404");
    Ok(())
}

#[tokio::test]
async fn test_delete_company_removes_its_invites() -> Result<()> {
    let store = CountingStore::new(2);
    seed_companies(&store).await;
    store
        .seed(
            COMPANIES_TABLE,
            json!({"company_id": "c-6", "company_name": "Hooli", "company_external_id": "sf-6"}),
        )
        .await;
    for (invite_id, company_id) in [("i-1", "c-1"), ("i-2", "c-1"), ("i-3", "c-2"), ("i-4", "c-6")] {
        store
            .seed(
                COMPANY_INVITES_TABLE,
                json!({
                    "company_invite_id": invite_id,
                    "requested_company_id": company_id,
                    "user_id": "u-1",
                    "status": "pending",
                }),
            )
            .await;
    }
    let repo = repo(&store);

    repo.delete_company_by_id("c-1").await?;
    assert!(repo.get_company_invite_requests("c-1", None).await?.is_empty());
    assert!(repo.get_company_invite_request("i-1").await?.is_none());
    assert_eq!(repo.get_company_invite_requests("c-2", None).await?.len(), 1);

    repo.delete_company_by_external_id("sf-6").await?;
    assert!(repo.get_company_invite_request("i-4").await?.is_none());
    let err = repo.get_company("c-6").await.unwrap_err();
    assert!(matches!(err, ClaError::NotFound { .. }));

    let remaining = repo.get_user_invite_requests("u-1").await?;
    let ids: Vec<&str> = remaining.iter().map(|i| i.company_invite_id.as_str()).collect();
    assert_eq!(ids, vec!["i-3"]);
    Ok(())
}
