use crate::error::{ClaError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub mod in_memory;

pub use in_memory::InMemoryDocumentStore;

/// A stored record: attribute name to JSON value
pub type Document = serde_json::Map<String, Value>;

/// Filter evaluated against each document a query or scan reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Attribute equals the value exactly
    Equals(String, Value),
    /// Substring match for string attributes, membership for list attributes
    Contains(String, String),
    And(Vec<Condition>),
}

impl Condition {
    pub fn equals(attr: &str, value: impl Into<Value>) -> Self {
        Condition::Equals(attr.to_string(), value.into())
    }

    pub fn contains(attr: &str, needle: &str) -> Self {
        Condition::Contains(attr.to_string(), needle.to_string())
    }

    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut all) => {
                all.push(other);
                Condition::And(all)
            }
            first => Condition::And(vec![first, other]),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Equals(attr, value) => doc.get(attr) == Some(value),
            Condition::Contains(attr, needle) => match doc.get(attr) {
                Some(Value::String(s)) => s.contains(needle.as_str()),
                Some(Value::Array(values)) => values
                    .iter()
                    .any(|v| v.as_str() == Some(needle.as_str())),
                _ => false,
            },
            Condition::And(all) => all.iter().all(|c| c.matches(doc)),
        }
    }
}

/// Parameters for a single scan page
#[derive(Debug, Clone, Default)]
pub struct ScanInput {
    pub filter: Option<Condition>,
    /// Primary key of the last item evaluated by the previous page
    pub exclusive_start_key: Option<String>,
    /// Maximum number of items evaluated (not returned) by this page
    pub limit: Option<usize>,
}

impl ScanInput {
    pub fn filtered(filter: Condition) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub items: Vec<Document>,
    /// Continuation token; `None` once the table is exhausted
    pub last_evaluated_key: Option<String>,
    pub scanned_count: usize,
}

/// Key-value document store with table, index and scan semantics
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Document>>;
    async fn put_item(&self, table: &str, item: Document) -> Result<()>;
    async fn delete_item(&self, table: &str, key: &str) -> Result<()>;

    /// Equality lookup on a (secondary index) attribute, optionally filtered
    async fn query(
        &self,
        table: &str,
        index_attr: &str,
        value: &Value,
        filter: Option<&Condition>,
    ) -> Result<Vec<Document>>;

    /// Read one page of the table in key order
    async fn scan(&self, table: &str, input: ScanInput) -> Result<ScanOutput>;

    /// Set the given attributes on an existing item and return the updated item
    async fn update_item(
        &self,
        table: &str,
        key: &str,
        updates: Vec<(String, Value)>,
    ) -> Result<Document>;

    /// Table-level item count. An estimate; callers treat it as informational.
    async fn item_count(&self, table: &str) -> Result<i64>;
}

/// Scan every page starting after `start_key`, accumulating matches until no
/// continuation key remains.
pub async fn scan_all(
    store: &dyn DocumentStore,
    table: &str,
    filter: Option<Condition>,
    start_key: Option<String>,
) -> Result<Vec<Document>> {
    let mut input = ScanInput {
        filter,
        exclusive_start_key: start_key,
        limit: None,
    };
    let mut items = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = store.scan(table, input.clone()).await?;
        pages += 1;
        items.extend(page.items);
        match page.last_evaluated_key {
            Some(key) => input.exclusive_start_key = Some(key),
            None => break,
        }
    }

    debug!("Scanned {} in {} page(s), {} match(es)", table, pages, items.len());
    Ok(items)
}

/// Read a single page of at most `page_size` matching items. Scans continue
/// until the page is full or the table is exhausted; the returned key resumes
/// right after the last evaluated item.
pub async fn scan_page(
    store: &dyn DocumentStore,
    table: &str,
    filter: Option<Condition>,
    page_size: usize,
    start_key: Option<String>,
) -> Result<(Vec<Document>, Option<String>)> {
    let page_size = page_size.max(1);
    let mut items = Vec::new();
    let mut next_key = start_key;

    loop {
        let page = store
            .scan(
                table,
                ScanInput {
                    filter: filter.clone(),
                    exclusive_start_key: next_key.take(),
                    limit: Some(page_size - items.len()),
                },
            )
            .await?;
        items.extend(page.items);
        next_key = page.last_evaluated_key;
        if next_key.is_none() || items.len() >= page_size {
            break;
        }
    }

    Ok((items, next_key))
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ClaError::storage(format!(
            "expected an object document, got {other}"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

pub fn from_documents<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>> {
    docs.into_iter().map(from_document).collect()
}
