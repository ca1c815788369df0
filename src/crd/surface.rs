//! API surface dispatch
//!
//! A request reaches a DeploymentConfig through one of two surfaces:
//!
//! | Surface | apiVersion | Path prefix | Policy |
//! |---------|------------|-------------|--------|
//! | Legacy | `v1` | `/oapi/v1` | [`DefaultingPolicy::Legacy`] |
//! | Group | `apps.openshift.io/v1` | `/apis/apps.openshift.io/v1` | [`DefaultingPolicy::Modern`] |
//!
//! The surface is derived from where the request arrived, never from the
//! payload. Anything else is rejected: there is no fallback policy.

use std::fmt;
use thiserror::Error;

/// Legacy surface has no group
pub const LEGACY_GROUP: &str = "";
pub const LEGACY_VERSION: &str = "v1";
pub const LEGACY_PATH_PREFIX: &str = "/oapi";

pub const APPS_GROUP: &str = "apps.openshift.io";
pub const APPS_VERSION: &str = "v1";
pub const GROUP_PATH_PREFIX: &str = "/apis";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unrecognized API surface: group {group:?}, version {version:?}")]
    UnrecognizedSurface { group: String, version: String },

    #[error("unrecognized API path: {0}")]
    UnrecognizedPath(String),
}

/// Which defaulting behavior applies to a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefaultingPolicy {
    /// Frozen behavior of the legacy surface
    Legacy,
    /// Current behavior of the group surface
    Modern,
}

impl DefaultingPolicy {
    /// `revisionHistoryLimit` postdates the legacy freeze
    pub fn defaults_revision_history_limit(self) -> bool {
        matches!(self, DefaultingPolicy::Modern)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DefaultingPolicy::Legacy => "legacy",
            DefaultingPolicy::Modern => "modern",
        }
    }
}

impl fmt::Display for DefaultingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point a DeploymentConfig request arrived through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiSurface {
    Legacy,
    Group,
}

impl ApiSurface {
    pub const ALL: [ApiSurface; 2] = [ApiSurface::Legacy, ApiSurface::Group];

    /// Resolve a surface from an API group and version
    pub fn resolve(group: &str, version: &str) -> Result<Self, DispatchError> {
        match (group, version) {
            (LEGACY_GROUP, LEGACY_VERSION) => Ok(ApiSurface::Legacy),
            (APPS_GROUP, APPS_VERSION) => Ok(ApiSurface::Group),
            _ => Err(DispatchError::UnrecognizedSurface {
                group: group.to_string(),
                version: version.to_string(),
            }),
        }
    }

    /// Resolve a surface from a request path
    ///
    /// Accepts `/oapi/v1/...` and `/apis/apps.openshift.io/v1/...`.
    pub fn from_path(path: &str) -> Result<Self, DispatchError> {
        let mut segments = path.trim_start_matches('/').split('/');
        let unrecognized = || DispatchError::UnrecognizedPath(path.to_string());

        match segments.next() {
            Some("oapi") => {
                let version = segments.next().ok_or_else(unrecognized)?;
                Self::resolve(LEGACY_GROUP, version).map_err(|_| unrecognized())
            }
            Some("apis") => {
                let group = segments.next().ok_or_else(unrecognized)?;
                let version = segments.next().ok_or_else(unrecognized)?;
                Self::resolve(group, version).map_err(|_| unrecognized())
            }
            _ => Err(unrecognized()),
        }
    }

    pub fn policy(self) -> DefaultingPolicy {
        match self {
            ApiSurface::Legacy => DefaultingPolicy::Legacy,
            ApiSurface::Group => DefaultingPolicy::Modern,
        }
    }

    pub fn group(self) -> &'static str {
        match self {
            ApiSurface::Legacy => LEGACY_GROUP,
            ApiSurface::Group => APPS_GROUP,
        }
    }

    pub fn version(self) -> &'static str {
        match self {
            ApiSurface::Legacy => LEGACY_VERSION,
            ApiSurface::Group => APPS_VERSION,
        }
    }

    /// `apiVersion` written on objects served through this surface
    pub fn api_version(self) -> String {
        match self {
            ApiSurface::Legacy => LEGACY_VERSION.to_string(),
            ApiSurface::Group => format!("{}/{}", APPS_GROUP, APPS_VERSION),
        }
    }

    pub fn path_prefix(self) -> String {
        match self {
            ApiSurface::Legacy => format!("{}/{}", LEGACY_PATH_PREFIX, LEGACY_VERSION),
            ApiSurface::Group => format!("{}/{}/{}", GROUP_PATH_PREFIX, APPS_GROUP, APPS_VERSION),
        }
    }

    /// Collection path for a namespace
    pub fn collection_path(self, namespace: &str) -> String {
        format!(
            "{}/namespaces/{}/deploymentconfigs",
            self.path_prefix(),
            namespace
        )
    }

    /// Path of a single object, used as its selfLink
    pub fn object_path(self, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_path(namespace), name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiSurface::Legacy => "legacy",
            ApiSurface::Group => "group",
        }
    }
}

impl fmt::Display for ApiSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "surface_test.rs"]
mod tests;
