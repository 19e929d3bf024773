mod common;

use anyhow::Result;
use cla_backend::constants::PROJECTS_TABLE;
use cla_backend::domain::{CreateGerrit, CreateGithubRepository};
use cla_backend::error::ClaError;
use common::{app_state, CountingStore};
use serde_json::json;
use std::sync::Arc;

async fn seeded_store() -> Arc<CountingStore> {
    let store = CountingStore::new(10);
    for (id, external) in [("p-1", "sf-1"), ("p-2", "sf-2")] {
        store
            .seed(
                PROJECTS_TABLE,
                json!({"project_id": id, "project_external_id": external, "project_name": id}),
            )
            .await;
    }
    store
}

fn gerrit(name: &str, url: &str) -> CreateGerrit {
    CreateGerrit {
        gerrit_name: name.to_string(),
        gerrit_url: url.to_string(),
        group_id_icla: Some("1001".to_string()),
        group_id_ccla: Some("  ".to_string()),
        group_name_icla: None,
        group_name_ccla: None,
    }
}

fn github_repo(project_id: &str, name: &str, external_id: &str) -> CreateGithubRepository {
    CreateGithubRepository {
        repository_project_id: project_id.to_string(),
        repository_name: format!("acme-org/{name}"),
        repository_url: format!("https://github.com/acme-org/{name}"),
        repository_organization_name: "acme-org".to_string(),
        repository_external_id: external_id.to_string(),
    }
}

#[tokio::test]
async fn test_add_gerrit_validates_and_rejects_duplicates() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);

    let added = state
        .gerrits
        .add_gerrit("p-1", &gerrit(" review ", "https://review.example.org"))
        .await?;
    assert_eq!(added.gerrit_name, "review");
    assert_eq!(added.project_id, "p-1");
    assert_eq!(added.group_id_icla, "1001");
    assert_eq!(added.group_id_ccla, "");

    for input in [gerrit("", "https://x.example.org"), gerrit("other", "   ")] {
        let err = state.gerrits.add_gerrit("p-1", &input).await.unwrap_err();
        assert!(matches!(err, ClaError::Validation(_)));
    }

    let err = state
        .gerrits
        .add_gerrit("p-1", &gerrit("review", "https://mirror.example.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::Conflict(_)));

    // Names only clash within a project
    state
        .gerrits
        .add_gerrit("p-2", &gerrit("review", "https://review.example.org"))
        .await?;

    let err = state
        .gerrits
        .add_gerrit("p-404", &gerrit("review", "https://review.example.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::NotFound { entity: "project", .. }));
    Ok(())
}

#[tokio::test]
async fn test_gerrits_listed_and_deleted_per_project() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);
    let review = state
        .gerrits
        .add_gerrit("p-1", &gerrit("review", "https://review.example.org"))
        .await?;
    state
        .gerrits
        .add_gerrit("p-1", &gerrit("staging", "https://staging.example.org"))
        .await?;
    let other = state
        .gerrits
        .add_gerrit("p-2", &gerrit("review", "https://review.example.org"))
        .await?;

    let mut names: Vec<String> = state
        .gerrits
        .get_project_gerrits("p-1")
        .await?
        .list
        .into_iter()
        .map(|g| g.gerrit_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["review", "staging"]);

    // Deleting through another project's route leaves the instance alone
    let err = state
        .gerrits
        .delete_gerrit("p-1", &other.gerrit_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::NotFound { entity: "gerrit instance", .. }));
    assert_eq!(state.gerrits.get_project_gerrits("p-2").await?.list.len(), 1);

    state.gerrits.delete_gerrit("p-1", &review.gerrit_id).await?;
    let remaining = state.gerrits.get_project_gerrits("p-1").await?.list;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].gerrit_name, "staging");

    let err = state
        .gerrits
        .delete_gerrit("p-1", &review.gerrit_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_add_github_repository() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);

    let added = state
        .repositories
        .add_github_repository("p-1", &github_repo("p-1", "widgets", "101"))
        .await?;
    assert!(added.enabled);
    assert_eq!(added.project_sfid, "sf-1");
    assert_eq!(added.repository_type, "github");
    assert_eq!(added.repository_external_id, "101");

    let err = state
        .repositories
        .add_github_repository("p-1", &github_repo("p-1", "widgets-renamed", "101"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::Conflict(_)));

    // The same GitHub repository may be registered on another project
    state
        .repositories
        .add_github_repository("p-2", &github_repo("p-2", "widgets", "101"))
        .await?;

    let err = state
        .repositories
        .add_github_repository("p-1", &github_repo("p-2", "gadgets", "102"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::Validation(_)));

    let err = state
        .repositories
        .add_github_repository("p-1", &github_repo("p-1", "gadgets", " "))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn test_repository_enabled_filter_and_toggle() -> Result<()> {
    let store = seeded_store().await;
    let state = app_state(&store);
    let widgets = state
        .repositories
        .add_github_repository("p-1", &github_repo("p-1", "widgets", "101"))
        .await?;
    let gadgets = state
        .repositories
        .add_github_repository("p-1", &github_repo("p-1", "gadgets", "102"))
        .await?;

    let disabled = state
        .repositories
        .set_repository_enabled("p-1", &gadgets.repository_id, false)
        .await?;
    assert!(!disabled.enabled);
    assert!(disabled.date_modified >= gadgets.date_modified);

    let enabled = state
        .repositories
        .list_project_repositories("p-1", Some(true))
        .await?;
    let ids: Vec<&str> = enabled.list.iter().map(|r| r.repository_id.as_str()).collect();
    assert_eq!(ids, vec![widgets.repository_id.as_str()]);

    let off = state
        .repositories
        .list_project_repositories("p-1", Some(false))
        .await?;
    assert_eq!(off.list.len(), 1);
    assert_eq!(off.list[0].repository_id, gadgets.repository_id);

    let all = state.repositories.list_project_repositories("p-1", None).await?;
    assert_eq!(all.list.len(), 2);

    // A repository can only be toggled through the project it belongs to
    let err = state
        .repositories
        .set_repository_enabled("p-2", &widgets.repository_id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::NotFound { entity: "github repository", .. }));
    let still_on = state
        .repositories
        .list_project_repositories("p-1", Some(true))
        .await?;
    assert_eq!(still_on.list.len(), 1);

    let err = state
        .repositories
        .list_project_repositories("p-404", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaError::NotFound { .. }));
    Ok(())
}
