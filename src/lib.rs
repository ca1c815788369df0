//! Version-aware DeploymentConfig defaulting
//!
//! DeploymentConfig objects arrive through two API surfaces: the legacy
//! ungrouped `v1` surface and the `apps.openshift.io/v1` group surface. One
//! defaulting engine serves both and takes the surface's policy as input, so
//! the only behavioral difference between them (whether `revisionHistoryLimit`
//! is defaulted) lives in a single place.

pub mod crd;
pub mod server;
pub mod storage;
