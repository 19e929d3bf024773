#![allow(dead_code)]

use async_trait::async_trait;
use cla_backend::config::Config;
use cla_backend::constants::table_name;
use cla_backend::error::{ClaError, Result};
use cla_backend::server::AppState;
use cla_backend::storage::{
    Condition, Document, DocumentStore, InMemoryDocumentStore, ScanInput, ScanOutput,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const STAGE: &str = "test";

/// In-memory store that counts scans and can be told to fail table counts
pub struct CountingStore {
    inner: InMemoryDocumentStore,
    scans: AtomicUsize,
    failing_counts: Mutex<HashSet<String>>,
}

impl CountingStore {
    pub fn new(page_size: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryDocumentStore::for_stage(STAGE, page_size).unwrap(),
            scans: AtomicUsize::new(0),
            failing_counts: Mutex::new(HashSet::new()),
        })
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn fail_item_count(&self, entity: &str) {
        self.failing_counts
            .lock()
            .unwrap()
            .insert(table_name(STAGE, entity));
    }

    /// Insert a raw document into the stage table for `entity`
    pub async fn seed(&self, entity: &str, value: Value) {
        let doc = value.as_object().cloned().expect("seed documents are objects");
        self.inner.put_item(&table_name(STAGE, entity), doc).await.unwrap();
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Document>> {
        self.inner.get_item(table, key).await
    }

    async fn put_item(&self, table: &str, item: Document) -> Result<()> {
        self.inner.put_item(table, item).await
    }

    async fn delete_item(&self, table: &str, key: &str) -> Result<()> {
        self.inner.delete_item(table, key).await
    }

    async fn query(
        &self,
        table: &str,
        index_attr: &str,
        value: &Value,
        filter: Option<&Condition>,
    ) -> Result<Vec<Document>> {
        self.inner.query(table, index_attr, value, filter).await
    }

    async fn scan(&self, table: &str, input: ScanInput) -> Result<ScanOutput> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(table, input).await
    }

    async fn update_item(
        &self,
        table: &str,
        key: &str,
        updates: Vec<(String, Value)>,
    ) -> Result<Document> {
        self.inner.update_item(table, key, updates).await
    }

    async fn item_count(&self, table: &str) -> Result<i64> {
        if self.failing_counts.lock().unwrap().contains(table) {
            return Err(ClaError::storage(format!("count unavailable for {table}")));
        }
        self.inner.item_count(table).await
    }
}

pub fn test_config() -> Config {
    Config {
        stage: STAGE.to_string(),
        local_mode: true,
        ..Config::default()
    }
}

pub fn app_state(store: &Arc<CountingStore>) -> AppState {
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    AppState::new(dyn_store, &test_config())
}
