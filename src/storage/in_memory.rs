use super::{Condition, Document, DocumentStore, ScanInput, ScanOutput};
use crate::constants::{table_name, TABLES};
use crate::error::{ClaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::ops::Bound;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub const DEFAULT_PAGE_SIZE: usize = 100;

struct Table {
    key_attr: String,
    items: BTreeMap<String, Document>,
}

#[derive(Serialize, Deserialize)]
struct TableSnapshot {
    key_attr: String,
    items: Vec<Document>,
}

/// In-memory document store for development/testing. Items are kept in key
/// order so scans page deterministically.
pub struct InMemoryDocumentStore {
    tables: Mutex<HashMap<String, Table>>,
    page_size: usize,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl InMemoryDocumentStore {
    /// `page_size` bounds how many items a single scan page evaluates
    pub fn new(page_size: usize) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Create a table if it does not exist yet
    pub fn create_table(&self, name: &str, key_attr: &str) -> Result<()> {
        let mut tables = self.lock()?;
        tables.entry(name.to_string()).or_insert_with(|| Table {
            key_attr: key_attr.to_string(),
            items: BTreeMap::new(),
        });
        Ok(())
    }

    /// Store with every CLA table created under the given stage
    pub fn for_stage(stage: &str, page_size: usize) -> Result<Self> {
        let store = Self::new(page_size);
        for (entity, key_attr) in TABLES {
            store.create_table(&table_name(stage, entity), key_attr)?;
        }
        Ok(store)
    }

    pub fn load_snapshot(&self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let snapshot: BTreeMap<String, TableSnapshot> = serde_json::from_str(&content)?;
        let mut tables = self.lock()?;
        let mut loaded = 0usize;

        for (name, table_snapshot) in snapshot {
            let mut items = BTreeMap::new();
            for item in table_snapshot.items {
                let key = key_of(&table_snapshot.key_attr, &item)?;
                items.insert(key, item);
            }
            loaded += items.len();
            tables.insert(
                name,
                Table {
                    key_attr: table_snapshot.key_attr,
                    items,
                },
            );
        }

        info!("Loaded {} item(s) from snapshot {}", loaded, path.display());
        Ok(())
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot: BTreeMap<String, TableSnapshot> = {
            let tables = self.lock()?;
            tables
                .iter()
                .map(|(name, table)| {
                    (
                        name.clone(),
                        TableSnapshot {
                            key_attr: table.key_attr.clone(),
                            items: table.items.values().cloned().collect(),
                        },
                    )
                })
                .collect()
        };
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        info!("Saved snapshot to {}", path.display());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Table>>> {
        self.tables
            .lock()
            .map_err(|_| ClaError::storage("document store lock poisoned"))
    }
}

fn key_of(key_attr: &str, item: &Document) -> Result<String> {
    item.get(key_attr)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClaError::storage(format!("item is missing key attribute {key_attr}")))
}

fn table_mut<'a>(tables: &'a mut HashMap<String, Table>, name: &str) -> Result<&'a mut Table> {
    tables
        .get_mut(name)
        .ok_or_else(|| ClaError::storage(format!("table {name} does not exist")))
}

fn table_ref<'a>(tables: &'a HashMap<String, Table>, name: &str) -> Result<&'a Table> {
    tables
        .get(name)
        .ok_or_else(|| ClaError::storage(format!("table {name} does not exist")))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Document>> {
        let tables = self.lock()?;
        Ok(table_ref(&tables, table)?.items.get(key).cloned())
    }

    async fn put_item(&self, table: &str, item: Document) -> Result<()> {
        let mut tables = self.lock()?;
        let t = table_mut(&mut tables, table)?;
        let key = key_of(&t.key_attr, &item)?;
        debug!("Put item {} into {}", key, table);
        t.items.insert(key, item);
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &str) -> Result<()> {
        let mut tables = self.lock()?;
        if table_mut(&mut tables, table)?.items.remove(key).is_some() {
            debug!("Deleted item {} from {}", key, table);
        }
        Ok(())
    }

    async fn query(
        &self,
        table: &str,
        index_attr: &str,
        value: &Value,
        filter: Option<&Condition>,
    ) -> Result<Vec<Document>> {
        let tables = self.lock()?;
        let items = table_ref(&tables, table)?
            .items
            .values()
            .filter(|doc| doc.get(index_attr) == Some(value))
            .filter(|doc| filter.map_or(true, |f| f.matches(doc)))
            .cloned()
            .collect();
        Ok(items)
    }

    async fn scan(&self, table: &str, input: ScanInput) -> Result<ScanOutput> {
        let tables = self.lock()?;
        let t = table_ref(&tables, table)?;
        let limit = input.limit.unwrap_or(self.page_size).min(self.page_size).max(1);

        let lower = match input.exclusive_start_key {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let mut range = t.items.range((lower, Bound::Unbounded));
        let evaluated: Vec<(&String, &Document)> = range.by_ref().take(limit).collect();
        let more = range.next().is_some();

        let last_evaluated_key = if more {
            evaluated.last().map(|(k, _)| (*k).clone())
        } else {
            None
        };
        let scanned_count = evaluated.len();
        let items = evaluated
            .into_iter()
            .map(|(_, doc)| doc)
            .filter(|doc| input.filter.as_ref().map_or(true, |f| f.matches(doc)))
            .cloned()
            .collect();

        Ok(ScanOutput {
            items,
            last_evaluated_key,
            scanned_count,
        })
    }

    async fn update_item(
        &self,
        table: &str,
        key: &str,
        updates: Vec<(String, Value)>,
    ) -> Result<Document> {
        let mut tables = self.lock()?;
        let item = table_mut(&mut tables, table)?
            .items
            .get_mut(key)
            .ok_or_else(|| ClaError::not_found("item", key))?;
        for (attr, value) in updates {
            item.insert(attr, value);
        }
        debug!("Updated item {} in {}", key, table);
        Ok(item.clone())
    }

    async fn item_count(&self, table: &str) -> Result<i64> {
        let tables = self.lock()?;
        Ok(table_ref(&tables, table)?.items.len() as i64)
    }
}
