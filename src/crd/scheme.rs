//! Process-wide type registry and the encoding boundary
//!
//! Each API surface registers the kinds it serves. Decoding checks incoming
//! type information against the registration for the surface the request
//! arrived on, and encoding writes that surface's `apiVersion` back out.
//! The defaulting engine never consults the registry.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::deployment_config::{DeploymentConfig, DeploymentConfigList};
use super::surface::ApiSurface;

pub const DEPLOYMENT_CONFIG_KIND: &str = "DeploymentConfig";
pub const DEPLOYMENT_CONFIG_LIST_KIND: &str = "DeploymentConfigList";

static SCHEME: OnceLock<Scheme> = OnceLock::new();

/// Malformed-object errors raised at the encoding boundary
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("apiVersion must be a string")]
    InvalidApiVersion,

    #[error("kind must be a string")]
    InvalidKind,

    #[error("{kind} in version {api_version:?} is not served by the {surface} surface")]
    UnregisteredKind {
        surface: ApiSurface,
        api_version: String,
        kind: String,
    },

    #[error("object does not match the DeploymentConfig schema: {0}")]
    Schema(String),

    #[error("failed to encode DeploymentConfig: {0}")]
    Encode(String),
}

/// Kinds registered per surface
#[derive(Debug)]
pub struct Scheme {
    kinds: BTreeMap<&'static str, Vec<&'static str>>,
}

/// Register the DeploymentConfig kinds for every surface
///
/// Safe to call any number of times; the registry is built once.
pub fn install() -> &'static Scheme {
    SCHEME.get_or_init(|| {
        let mut kinds = BTreeMap::new();
        for surface in ApiSurface::ALL {
            kinds.insert(
                surface.as_str(),
                vec![DEPLOYMENT_CONFIG_KIND, DEPLOYMENT_CONFIG_LIST_KIND],
            );
        }
        info!(surfaces = kinds.len(), "Installed DeploymentConfig scheme");
        Scheme { kinds }
    })
}

impl Scheme {
    /// Registry for this process, installing it on first use
    pub fn global() -> &'static Scheme {
        install()
    }

    /// Whether `kind` is served by `surface`
    pub fn recognizes(&self, surface: ApiSurface, kind: &str) -> bool {
        self.kinds
            .get(surface.as_str())
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    /// Decode a request body received on `surface`
    pub fn decode(&self, surface: ApiSurface, body: &[u8]) -> Result<DeploymentConfig, CodecError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| CodecError::InvalidJson(e.to_string()))?;
        self.decode_value(surface, value)
    }

    /// Decode an already-parsed JSON value received on `surface`
    ///
    /// Missing `apiVersion`/`kind` are accepted; present ones must match the
    /// surface's registration.
    pub fn decode_value(
        &self,
        surface: ApiSurface,
        value: Value,
    ) -> Result<DeploymentConfig, CodecError> {
        let object = value.as_object().ok_or(CodecError::NotAnObject(json_type(&value)))?;

        let api_version = match object.get("apiVersion") {
            None | Some(Value::Null) => None,
            Some(Value::String(v)) => Some(v.as_str()),
            Some(_) => return Err(CodecError::InvalidApiVersion),
        };
        let kind = match object.get("kind") {
            None | Some(Value::Null) => None,
            Some(Value::String(k)) => Some(k.as_str()),
            Some(_) => return Err(CodecError::InvalidKind),
        };

        let kind_ok = kind.is_none_or(|k| k == DEPLOYMENT_CONFIG_KIND && self.recognizes(surface, k));
        let version_ok = api_version.is_none_or(|v| v == surface.api_version());
        if !kind_ok || !version_ok {
            return Err(CodecError::UnregisteredKind {
                surface,
                api_version: api_version.unwrap_or_default().to_string(),
                kind: kind.unwrap_or(DEPLOYMENT_CONFIG_KIND).to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| CodecError::Schema(e.to_string()))
    }

    /// Encode an object in the representation of `surface`
    pub fn encode(&self, surface: ApiSurface, dc: &DeploymentConfig) -> Result<Value, CodecError> {
        let mut value = serde_json::to_value(dc).map_err(|e| CodecError::Encode(e.to_string()))?;
        if let Some(object) = value.as_object_mut() {
            object.insert("apiVersion".to_string(), Value::String(surface.api_version()));
            object.insert(
                "kind".to_string(),
                Value::String(DEPLOYMENT_CONFIG_KIND.to_string()),
            );
        }
        Ok(value)
    }

    /// Encode a collection in the representation of `surface`
    pub fn encode_list(
        &self,
        surface: ApiSurface,
        items: &[DeploymentConfig],
    ) -> Result<DeploymentConfigList, CodecError> {
        let items = items
            .iter()
            .map(|dc| self.encode(surface, dc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DeploymentConfigList {
            api_version: surface.api_version(),
            kind: DEPLOYMENT_CONFIG_LIST_KIND.to_string(),
            items,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "scheme_test.rs"]
mod tests;
