//! Tests for API surface dispatch

use super::*;

#[test]
fn test_resolve_legacy_surface() {
    let surface = ApiSurface::resolve("", "v1").unwrap();

    assert_eq!(surface, ApiSurface::Legacy);
    assert_eq!(surface.policy(), DefaultingPolicy::Legacy);
}

#[test]
fn test_resolve_group_surface() {
    let surface = ApiSurface::resolve("apps.openshift.io", "v1").unwrap();

    assert_eq!(surface, ApiSurface::Group);
    assert_eq!(surface.policy(), DefaultingPolicy::Modern);
}

#[test]
fn test_resolve_unknown_group_fails() {
    let err = ApiSurface::resolve("apps", "v1").unwrap_err();

    assert_eq!(
        err,
        DispatchError::UnrecognizedSurface {
            group: "apps".to_string(),
            version: "v1".to_string(),
        }
    );
}

#[test]
fn test_resolve_unknown_version_fails() {
    assert!(ApiSurface::resolve("", "v2").is_err());
    assert!(ApiSurface::resolve("apps.openshift.io", "v1beta1").is_err());
}

#[test]
fn test_resolve_is_deterministic() {
    for _ in 0..3 {
        assert!(ApiSurface::resolve("extensions", "v1beta1").is_err());
        assert_eq!(
            ApiSurface::resolve("apps.openshift.io", "v1"),
            Ok(ApiSurface::Group)
        );
    }
}

#[test]
fn test_from_path_legacy() {
    let surface = ApiSurface::from_path("/oapi/v1/namespaces/default/deploymentconfigs").unwrap();
    assert_eq!(surface, ApiSurface::Legacy);
}

#[test]
fn test_from_path_group() {
    let surface =
        ApiSurface::from_path("/apis/apps.openshift.io/v1/namespaces/default/deploymentconfigs")
            .unwrap();
    assert_eq!(surface, ApiSurface::Group);
}

#[test]
fn test_from_path_rejects_unknown_paths() {
    for path in [
        "",
        "/",
        "/oapi",
        "/oapi/v2/namespaces/default/deploymentconfigs",
        "/apis/apps/v1/namespaces/default/deployments",
        "/apis/apps.openshift.io",
        "/api/v1/namespaces/default/pods",
    ] {
        let err = ApiSurface::from_path(path).unwrap_err();
        assert_eq!(err, DispatchError::UnrecognizedPath(path.to_string()));
    }
}

#[test]
fn test_only_modern_policy_defaults_revision_history_limit() {
    assert!(DefaultingPolicy::Modern.defaults_revision_history_limit());
    assert!(!DefaultingPolicy::Legacy.defaults_revision_history_limit());
}

#[test]
fn test_api_versions() {
    assert_eq!(ApiSurface::Legacy.api_version(), "v1");
    assert_eq!(ApiSurface::Group.api_version(), "apps.openshift.io/v1");
}

#[test]
fn test_paths_round_trip_through_from_path() {
    for surface in ApiSurface::ALL {
        let path = surface.object_path("default", "frontend");
        assert_eq!(ApiSurface::from_path(&path), Ok(surface));
    }
    assert_eq!(
        ApiSurface::Legacy.object_path("ns", "dc"),
        "/oapi/v1/namespaces/ns/deploymentconfigs/dc"
    );
    assert_eq!(
        ApiSurface::Group.collection_path("ns"),
        "/apis/apps.openshift.io/v1/namespaces/ns/deploymentconfigs"
    );
}
