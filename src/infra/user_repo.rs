use crate::constants::{table_name, USERS_TABLE};
use crate::domain::{CreateUserInput, User, UserRecord};
use crate::error::{ClaError, Result};
use crate::storage::{from_document, from_documents, to_document, DocumentStore};
use crate::types::{current_time, non_blank, CountMetrics};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<User>;
    async fn get_user_by_lf_username(&self, lf_username: &str) -> Result<Option<User>>;
    async fn create_user(&self, input: &CreateUserInput) -> Result<User>;
    async fn get_metrics(&self) -> Result<CountMetrics>;
}

pub struct StoreUserRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, stage: &str) -> Self {
        Self {
            store,
            table: table_name(stage, USERS_TABLE),
        }
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        let doc = self
            .store
            .get_item(&self.table, user_id)
            .await?
            .ok_or_else(|| ClaError::not_found("user", user_id))?;
        let record: UserRecord = from_document(doc)?;
        Ok(record.to_model())
    }

    async fn get_user_by_lf_username(&self, lf_username: &str) -> Result<Option<User>> {
        let docs = self
            .store
            .query(&self.table, "lf_username", &Value::from(lf_username), None)
            .await?;
        if docs.len() > 1 {
            warn!("found {} users with lf username {}", docs.len(), lf_username);
        }
        let records: Vec<UserRecord> = from_documents(docs)?;
        Ok(records.first().map(UserRecord::to_model))
    }

    async fn create_user(&self, input: &CreateUserInput) -> Result<User> {
        let (_, now) = current_time();
        let record = UserRecord {
            user_id: Uuid::new_v4().to_string(),
            lf_username: owned(input.lf_username.as_deref()),
            lf_email: owned(input.lf_email.as_deref()),
            user_name: owned(input.username.as_deref()),
            user_emails: input.emails.clone(),
            user_github_id: input.github_id,
            user_github_username: owned(input.github_username.as_deref()),
            user_company_id: None,
            date_created: now.clone(),
            date_modified: now,
            version: "v1".to_string(),
        };
        self.store.put_item(&self.table, to_document(&record)?).await?;
        debug!("created user {}", record.user_id);
        Ok(record.to_model())
    }

    async fn get_metrics(&self) -> Result<CountMetrics> {
        Ok(CountMetrics {
            total_count: self.store.item_count(&self.table).await?,
        })
    }
}
