//! Cloud backend seam
//!
//! The capability never talks to Azure directly; it drives a
//! [`CloudBackend`], which makes the plan/execute logic testable against an
//! in-memory fake and keeps SDK/CLI details out of this crate.

use async_trait::async_trait;
use provisio_core::ResourceSpec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;

/// Cloud backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Create failed for {key}: {cause}")]
    CreateFailed { key: String, cause: String },

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Side-effecting backend that realizes resources.
///
/// Implementations must make `create` safe to drive idempotently via the
/// `exists`/`describe` pair: a resource that already exists is never
/// duplicated, only observed.
#[async_trait]
pub trait CloudBackend: Send + Sync {
    /// Whether the resource already exists
    async fn exists(&self, resource: &ResourceSpec) -> Result<bool>;

    /// Create the resource, returning its named outputs (URLs, IDs)
    async fn create(&self, resource: &ResourceSpec) -> Result<HashMap<String, String>>;

    /// Outputs of an existing resource
    async fn describe(&self, resource: &ResourceSpec) -> Result<HashMap<String, String>>;

    /// Delete the resource. Deleting an absent resource is a no-op.
    async fn delete(&self, resource: &ResourceSpec) -> Result<()>;
}

struct StoredResource {
    outputs: HashMap<String, String>,
}

/// In-memory backend tracking resource existence.
///
/// Supports injected failure on a specific resource key so tests can
/// exercise partial execution and rollback.
#[derive(Default)]
pub struct InMemoryBackend {
    resources: Mutex<HashMap<String, StoredResource>>,
    fail_on: Mutex<Option<String>>,
    creates: AtomicUsize,
    deletes: AtomicUsize,
    next_id: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` of the resource with this key fail
    pub async fn fail_on_create(&self, key: impl Into<String>) {
        *self.fail_on.lock().await = Some(key.into());
    }

    /// Total successful creates since construction
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Number of resources currently existing
    pub async fn resource_count(&self) -> usize {
        self.resources.lock().await.len()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.resources.lock().await.contains_key(key)
    }

    fn outputs_for(&self, resource: &ResourceSpec) -> HashMap<String, String> {
        let mut outputs = HashMap::new();
        match resource.kind.as_str() {
            "databricks-workspace" => {
                let id = 7_000_000_000_000_000u64 + self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
                outputs.insert("workspace_id".to_string(), id.to_string());
                outputs.insert(
                    "workspace_url".to_string(),
                    format!("https://adb-{id}.azuredatabricks.net"),
                );
            }
            "resource-group" => {
                outputs.insert("resource_group".to_string(), resource.name.clone());
            }
            "databricks-cluster" => {
                outputs.insert("cluster_name".to_string(), resource.name.clone());
            }
            _ => {}
        }
        outputs
    }
}

#[async_trait]
impl CloudBackend for InMemoryBackend {
    async fn exists(&self, resource: &ResourceSpec) -> Result<bool> {
        Ok(self.resources.lock().await.contains_key(&resource.key()))
    }

    async fn create(&self, resource: &ResourceSpec) -> Result<HashMap<String, String>> {
        let key = resource.key();

        if self.fail_on.lock().await.take_if(|k| *k == key).is_some() {
            return Err(BackendError::CreateFailed {
                key,
                cause: "injected failure".to_string(),
            });
        }

        let mut resources = self.resources.lock().await;
        if let Some(existing) = resources.get(&key) {
            // Existing resource is observed, never duplicated
            return Ok(existing.outputs.clone());
        }

        let outputs = self.outputs_for(resource);
        tracing::debug!("Created {key}");
        resources.insert(
            key,
            StoredResource {
                outputs: outputs.clone(),
            },
        );
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(outputs)
    }

    async fn describe(&self, resource: &ResourceSpec) -> Result<HashMap<String, String>> {
        self.resources
            .lock()
            .await
            .get(&resource.key())
            .map(|r| r.outputs.clone())
            .ok_or_else(|| BackendError::NotFound(resource.key()))
    }

    async fn delete(&self, resource: &ResourceSpec) -> Result<()> {
        if self.resources.lock().await.remove(&resource.key()).is_some() {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Deleted {}", resource.key());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace_spec() -> ResourceSpec {
        ResourceSpec::new("databricks-workspace", "ml-dev", serde_json::json!({}))
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let backend = InMemoryBackend::new();
        let spec = workspace_spec();

        let first = backend.create(&spec).await.unwrap();
        let second = backend.create(&spec).await.unwrap();

        assert_eq!(backend.create_count(), 1);
        assert_eq!(first.get("workspace_id"), second.get("workspace_id"));
        assert!(backend.exists(&spec).await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let backend = InMemoryBackend::new();
        let spec = workspace_spec();
        backend.fail_on_create(spec.key()).await;

        assert!(backend.create(&spec).await.is_err());
        // Failure is one-shot; a retry succeeds
        assert!(backend.create(&spec).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let backend = InMemoryBackend::new();
        backend.delete(&workspace_spec()).await.unwrap();
        assert_eq!(backend.delete_count(), 0);
    }
}
