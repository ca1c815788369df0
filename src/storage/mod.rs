//! Persistence for DeploymentConfig objects
//!
//! The API handlers hand fully defaulted objects to an [`ObjectStore`]. The
//! store owns the server-assigned metadata (uid, resourceVersion,
//! creationTimestamp, generation) and never re-applies defaults.

pub mod clock;
mod memory;

pub use clock::{Clock, SystemClock};
pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::crd::DeploymentConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("deploymentconfigs \"{name}\" already exists in namespace {namespace}")]
    AlreadyExists { namespace: String, name: String },

    #[error("deploymentconfigs \"{name}\" not found in namespace {namespace}")]
    NotFound { namespace: String, name: String },

    #[error("deploymentconfigs \"{name}\": resourceVersion {given} is stale (current {current})")]
    Conflict {
        name: String,
        given: String,
        current: String,
    },

    #[error("object is missing metadata.{0}")]
    MissingField(&'static str),
}

/// Storage seam for DeploymentConfig objects, keyed by (namespace, name)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist a new object, assigning uid, resourceVersion, creationTimestamp
    /// and generation 1
    async fn create(&self, dc: DeploymentConfig) -> Result<DeploymentConfig, StoreError>;

    /// Replace an existing object, bumping generation when the spec changed
    ///
    /// The stored status is kept; the status in `dc` is ignored.
    async fn update(&self, dc: DeploymentConfig) -> Result<DeploymentConfig, StoreError>;

    async fn get(&self, namespace: &str, name: &str) -> Result<DeploymentConfig, StoreError>;

    async fn list(&self, namespace: &str) -> Result<Vec<DeploymentConfig>, StoreError>;

    async fn delete(&self, namespace: &str, name: &str) -> Result<DeploymentConfig, StoreError>;
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_tests;
