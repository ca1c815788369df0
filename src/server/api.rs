//! REST handlers for both DeploymentConfig API surfaces
//!
//! ## Endpoints
//! - `/oapi/v1/namespaces/{namespace}/deploymentconfigs[/{name}]` (legacy)
//! - `/apis/apps.openshift.io/v1/namespaces/{namespace}/deploymentconfigs[/{name}]` (group)
//!
//! Both share one set of handlers. The surface, and with it the defaulting
//! policy, is taken from the request path before the body is looked at.
//!
//! ## Create/update pipeline
//! decode (scheme) -> namespace from path -> defaults -> validation -> store -> encode

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, Uri},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::error::ApiError;
use super::ServerState;
use crate::crd::deployment_config::DeploymentConfigList;
use crate::crd::{set_defaults, validate_deployment_config, ApiSurface, DeploymentConfig};

#[derive(Debug, Deserialize)]
pub struct CollectionPath {
    namespace: String,
}

#[derive(Debug, Deserialize)]
pub struct ObjectPath {
    namespace: String,
    name: String,
}

impl ServerState {
    /// Resolve the surface for a request path, counting rejections
    fn dispatch(&self, uri: &Uri) -> Result<ApiSurface, ApiError> {
        ApiSurface::from_path(uri.path()).map_err(|e| {
            warn!(path = %uri.path(), error = %e, "Rejecting request for unrecognized API surface");
            self.metrics.record_dispatch_rejection();
            ApiError::from(e)
        })
    }

    fn observe<T>(&self, surface: ApiSurface, operation: &str, result: &Result<T, ApiError>) {
        let outcome = match result {
            Ok(_) => "success",
            Err(e) => e.reason(),
        };
        self.metrics.record_request(surface.as_str(), operation, outcome);
    }

    /// Decode, default and validate an incoming object
    fn admit(
        &self,
        surface: ApiSurface,
        namespace: &str,
        path_name: Option<&str>,
        body: &[u8],
    ) -> Result<DeploymentConfig, ApiError> {
        let mut dc = self.scheme.decode(surface, body)?;

        if let Some(path_name) = path_name {
            match dc.metadata.name.as_deref() {
                None => dc.metadata.name = Some(path_name.to_string()),
                Some(body_name) if body_name != path_name => {
                    return Err(ApiError::NameMismatch {
                        body: body_name.to_string(),
                        path: path_name.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        dc.metadata.namespace = Some(namespace.to_string());

        let policy = surface.policy();
        set_defaults(&mut dc, policy);
        self.metrics.record_defaulting(policy);

        validate_deployment_config(&dc)?;
        Ok(dc)
    }

    /// Encode a stored object for `surface`, filling in its selfLink
    fn respond(&self, surface: ApiSurface, mut dc: DeploymentConfig) -> Result<Value, ApiError> {
        if let (Some(namespace), Some(name)) = (&dc.metadata.namespace, &dc.metadata.name) {
            dc.metadata.self_link = Some(surface.object_path(namespace, name));
        }
        Ok(self.scheme.encode(surface, &dc)?)
    }
}

/// POST a new DeploymentConfig
pub async fn create(
    State(state): State<ServerState>,
    uri: Uri,
    Path(path): Path<CollectionPath>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let surface = state.dispatch(&uri)?;

    let result: Result<Value, ApiError> = async {
        let mut dc = state.admit(surface, &path.namespace, None, &body)?;
        dc.status = None;
        let created = state.store.create(dc).await?;
        info!(
            surface = %surface,
            namespace = %path.namespace,
            name = ?created.metadata.name,
            uid = ?created.metadata.uid,
            "Created DeploymentConfig"
        );
        state.respond(surface, created)
    }
    .await;

    state.observe(surface, "create", &result);
    result.map(|value| (StatusCode::CREATED, Json(value)))
}

/// PUT a replacement for an existing DeploymentConfig
pub async fn update(
    State(state): State<ServerState>,
    uri: Uri,
    Path(path): Path<ObjectPath>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let surface = state.dispatch(&uri)?;

    let result: Result<Value, ApiError> = async {
        let dc = state.admit(surface, &path.namespace, Some(&path.name), &body)?;
        let updated = state.store.update(dc).await?;
        info!(
            surface = %surface,
            namespace = %path.namespace,
            name = %path.name,
            generation = ?updated.metadata.generation,
            "Updated DeploymentConfig"
        );
        state.respond(surface, updated)
    }
    .await;

    state.observe(surface, "update", &result);
    result.map(Json)
}

pub async fn get(
    State(state): State<ServerState>,
    uri: Uri,
    Path(path): Path<ObjectPath>,
) -> Result<Json<Value>, ApiError> {
    let surface = state.dispatch(&uri)?;

    let result = match state.store.get(&path.namespace, &path.name).await {
        Ok(dc) => state.respond(surface, dc),
        Err(e) => Err(e.into()),
    };

    state.observe(surface, "get", &result);
    result.map(Json)
}

pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    Path(path): Path<CollectionPath>,
) -> Result<Json<DeploymentConfigList>, ApiError> {
    let surface = state.dispatch(&uri)?;

    let result: Result<DeploymentConfigList, ApiError> = async {
        let items = state
            .store
            .list(&path.namespace)
            .await?
            .into_iter()
            .map(|mut dc| {
                if let Some(name) = &dc.metadata.name {
                    dc.metadata.self_link = Some(surface.object_path(&path.namespace, name));
                }
                dc
            })
            .collect::<Vec<_>>();
        Ok(state.scheme.encode_list(surface, &items)?)
    }
    .await;

    state.observe(surface, "list", &result);
    result.map(Json)
}

pub async fn delete(
    State(state): State<ServerState>,
    uri: Uri,
    Path(path): Path<ObjectPath>,
) -> Result<Json<Value>, ApiError> {
    let surface = state.dispatch(&uri)?;

    let result = match state.store.delete(&path.namespace, &path.name).await {
        Ok(dc) => {
            info!(
                surface = %surface,
                namespace = %path.namespace,
                name = %path.name,
                "Deleted DeploymentConfig"
            );
            state.respond(surface, dc)
        }
        Err(e) => Err(e.into()),
    };

    state.observe(surface, "delete", &result);
    result.map(Json)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
