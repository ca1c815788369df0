use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::{ObjectStore, StoreError};
use crate::crd::DeploymentConfig;

type Key = (String, String);

/// Process-local store used by the API server
pub struct InMemoryStore {
    objects: RwLock<BTreeMap<Key, DeploymentConfig>>,
    revision: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            revision: AtomicU64::new(0),
            clock,
        }
    }

    fn next_resource_version(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key_of(dc: &DeploymentConfig) -> Result<Key, StoreError> {
    let namespace = dc
        .metadata
        .namespace
        .clone()
        .ok_or(StoreError::MissingField("namespace"))?;
    let name = dc
        .metadata
        .name
        .clone()
        .ok_or(StoreError::MissingField("name"))?;
    Ok((namespace, name))
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn create(&self, mut dc: DeploymentConfig) -> Result<DeploymentConfig, StoreError> {
        let key = key_of(&dc)?;
        let mut objects = self.objects.write().await;

        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                namespace: key.0,
                name: key.1,
            });
        }

        dc.metadata.uid = Some(Uuid::new_v4().to_string());
        dc.metadata.resource_version = Some(self.next_resource_version());
        dc.metadata.creation_timestamp = Some(Time(self.clock.now()));
        dc.metadata.generation = Some(1);

        debug!(
            namespace = %key.0,
            name = %key.1,
            resource_version = ?dc.metadata.resource_version,
            "Stored new DeploymentConfig"
        );
        objects.insert(key, dc.clone());
        Ok(dc)
    }

    async fn update(&self, mut dc: DeploymentConfig) -> Result<DeploymentConfig, StoreError> {
        let key = key_of(&dc)?;
        let mut objects = self.objects.write().await;

        let Some(current) = objects.get(&key) else {
            return Err(StoreError::NotFound {
                namespace: key.0,
                name: key.1,
            });
        };

        let current_version = current.metadata.resource_version.clone().unwrap_or_default();
        if let Some(given) = dc.metadata.resource_version.as_deref() {
            if given != current_version {
                return Err(StoreError::Conflict {
                    name: key.1,
                    given: given.to_string(),
                    current: current_version,
                });
            }
        }

        let generation = current.metadata.generation.unwrap_or(1);
        dc.metadata.generation = Some(if current.spec != dc.spec {
            generation + 1
        } else {
            generation
        });
        dc.metadata.uid = current.metadata.uid.clone();
        dc.metadata.creation_timestamp = current.metadata.creation_timestamp.clone();
        dc.metadata.resource_version = Some(self.next_resource_version());
        // Status is owned by the server, never by the writer of the spec
        dc.status = current.status.clone();

        debug!(
            namespace = %key.0,
            name = %key.1,
            generation = ?dc.metadata.generation,
            "Updated DeploymentConfig"
        );
        objects.insert(key, dc.clone());
        Ok(dc)
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<DeploymentConfig, StoreError> {
        let objects = self.objects.read().await;
        objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn list(&self, namespace: &str) -> Result<Vec<DeploymentConfig>, StoreError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, dc)| dc.clone())
            .collect())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<DeploymentConfig, StoreError> {
        let mut objects = self.objects.write().await;
        objects
            .remove(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}
