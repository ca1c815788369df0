//! Tests for the mutating admission webhook

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::crd::defaults::DEFAULT_REVISION_HISTORY_LIMIT;
use crate::crd::fixtures::{minimal_dc, with_essential_defaults, NON_DEFAULT_REVISION_HISTORY_LIMIT};
use crate::crd::DeploymentConfig;
use crate::server::testing::TestServer;
use crate::server::{create_metrics, ReadinessState};
use crate::storage::InMemoryStore;
use serde_json::json;
use std::sync::Arc;

fn submitted(dc: &DeploymentConfig, api_version: &str) -> Value {
    let mut value = serde_json::to_value(dc).unwrap();
    value["apiVersion"] = json!(api_version);
    value["kind"] = json!("DeploymentConfig");
    value
}

fn admission_review(group: &str, version: &str, object: Option<Value>) -> Value {
    let mut request = json!({
        "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
        "kind": { "group": group, "version": version, "kind": "DeploymentConfig" },
        "resource": { "group": group, "version": version, "resource": "deploymentconfigs" },
        "name": "frontend",
        "namespace": "default",
        "operation": "CREATE",
        "userInfo": { "username": "admin" },
        "dryRun": false
    });
    match object {
        Some(object) => request["object"] = object,
        None => request["operation"] = json!("DELETE"),
    }
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": request
    })
}

/// Apply the webhook's patch to what was submitted
fn defaulted_through_patch(surface: ApiSurface, dc: &DeploymentConfig) -> DeploymentConfig {
    let mut document = submitted(dc, &surface.api_version());
    let object: DynamicObject = serde_json::from_value(document.clone()).unwrap();

    let patch = test_state().defaulting_patch(surface, &object).unwrap();
    json_patch::patch(&mut document, &patch.0).unwrap();

    serde_json::from_value(document).unwrap()
}

fn patch_for(surface: ApiSurface, document: &Value) -> json_patch::Patch {
    let object: DynamicObject = serde_json::from_value(document.clone()).unwrap();
    test_state().defaulting_patch(surface, &object).unwrap()
}

/// (op, path) pairs of a patch, for asserting on its shape
fn op_paths(patch: &json_patch::Patch) -> Vec<(String, String)> {
    serde_json::to_value(patch)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|op| {
            (
                op["op"].as_str().unwrap().to_string(),
                op["path"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn test_state() -> ServerState {
    ServerState::new(
        Arc::new(InMemoryStore::new()),
        ReadinessState::new(),
        create_metrics().unwrap(),
    )
}

#[test]
fn test_patch_applies_group_defaults() {
    let dc = defaulted_through_patch(ApiSurface::Group, &minimal_dc("frontend", 0));

    let mut expected = with_essential_defaults(minimal_dc("frontend", 0));
    expected.spec.revision_history_limit = Some(DEFAULT_REVISION_HISTORY_LIMIT);
    assert_eq!(dc, expected);
}

#[test]
fn test_patch_applies_legacy_defaults_without_revision_history_limit() {
    let dc = defaulted_through_patch(ApiSurface::Legacy, &minimal_dc("frontend", 0));

    assert_eq!(dc.spec.revision_history_limit, None);
    assert_eq!(dc, with_essential_defaults(minimal_dc("frontend", 0)));
}

#[test]
fn test_patch_preserves_explicit_revision_history_limit() {
    let mut input = minimal_dc("frontend", 0);
    input.spec.revision_history_limit = Some(NON_DEFAULT_REVISION_HISTORY_LIMIT);

    for surface in ApiSurface::ALL {
        let dc = defaulted_through_patch(surface, &input);
        assert_eq!(
            dc.spec.revision_history_limit,
            Some(NON_DEFAULT_REVISION_HISTORY_LIMIT),
            "{} surface must keep the caller's value",
            surface
        );
    }
}

#[test]
fn test_patch_is_empty_for_already_defaulted_object() {
    let state = test_state();
    let mut dc = with_essential_defaults(minimal_dc("frontend", 0));
    dc.spec.revision_history_limit = Some(DEFAULT_REVISION_HISTORY_LIMIT);
    let object: DynamicObject =
        serde_json::from_value(submitted(&dc, "apps.openshift.io/v1")).unwrap();

    let patch = state.defaulting_patch(ApiSurface::Group, &object).unwrap();

    assert!(patch.0.is_empty(), "unexpected ops: {:?}", patch.0);
}

#[test]
fn test_patch_keeps_lifecycle_hooks() {
    let mut document = submitted(&minimal_dc("frontend", 0), "apps.openshift.io/v1");
    let hook = json!({
        "failurePolicy": "Abort",
        "execNewPod": { "containerName": "a", "command": ["/bin/migrate"] }
    });
    document["spec"]["strategy"] = json!({
        "type": "Rolling",
        "rollingParams": { "pre": hook.clone() }
    });

    for surface in ApiSurface::ALL {
        let mut document = document.clone();
        document["apiVersion"] = json!(surface.api_version());
        let patch = patch_for(surface, &document);

        assert!(
            op_paths(&patch).iter().all(|(op, _)| op == "add"),
            "{} surface patch must only add: {:?}",
            surface,
            patch.0
        );
        json_patch::patch(&mut document, &patch.0).unwrap();
        assert_eq!(document["spec"]["strategy"]["rollingParams"]["pre"], hook);
        let dc: DeploymentConfig = serde_json::from_value(document).unwrap();
        let pre = dc.spec.strategy.rolling_params.unwrap().pre.unwrap();
        assert_eq!(pre.exec_new_pod.unwrap().command, vec!["/bin/migrate"]);
    }
}

#[test]
fn test_patch_keeps_unmodeled_and_explicit_zero_fields() {
    let mut document = submitted(&minimal_dc("frontend", 0), "apps.openshift.io/v1");
    document["spec"]["replicas"] = json!(0);
    document["spec"]["paused"] = json!(false);
    document["spec"]["futureField"] = json!({ "enabled": true });
    document["spec"]["strategy"] = json!({
        "recreateParams": {
            "mid": { "failurePolicy": "Ignore", "tagImages": [
                { "containerName": "a", "to": { "kind": "ImageStreamTag", "name": "a:done" } }
            ] },
            "drain": "graceful"
        }
    });
    let submitted_spec = document["spec"].clone();

    let patch = patch_for(ApiSurface::Group, &document);

    assert!(
        op_paths(&patch).iter().all(|(op, _)| op == "add"),
        "unexpected ops: {:?}",
        patch.0
    );
    json_patch::patch(&mut document, &patch.0).unwrap();
    for field in ["replicas", "paused", "futureField"] {
        assert_eq!(document["spec"][field], submitted_spec[field], "{}", field);
    }
    assert_eq!(
        document["spec"]["strategy"]["recreateParams"],
        submitted_spec["strategy"]["recreateParams"]
    );
}

#[test]
fn test_patch_does_not_add_zero_values() {
    let mut document = submitted(&minimal_dc("frontend", 0), "apps.openshift.io/v1");
    document["spec"].as_object_mut().unwrap().remove("selector");

    let paths: Vec<String> = op_paths(&patch_for(ApiSurface::Group, &document))
        .into_iter()
        .map(|(_, path)| path)
        .collect();

    for zero_valued in ["/spec/replicas", "/spec/test", "/spec/paused", "/spec/selector"] {
        assert!(
            !paths.iter().any(|p| p == zero_valued),
            "patch should not touch {}: {:?}",
            zero_valued,
            paths
        );
    }
    assert!(paths.iter().any(|p| p == "/spec/revisionHistoryLimit"));
}

#[test]
fn test_patch_rejects_mismatched_kind() {
    let state = test_state();
    let mut document = submitted(&minimal_dc("frontend", 0), "v1");
    document["kind"] = json!("Deployment");
    let object: DynamicObject = serde_json::from_value(document).unwrap();

    let err = state.defaulting_patch(ApiSurface::Legacy, &object).unwrap_err();

    assert!(matches!(err, ApiError::Codec(_)));
}

#[tokio::test]
async fn test_mutate_endpoint_returns_json_patch() {
    let server = TestServer::start().await;
    let object = submitted(&minimal_dc("frontend", 0), "apps.openshift.io/v1");

    let response: Value = server
        .client
        .post(server.url("/mutate"))
        .json(&admission_review("apps.openshift.io", "v1", Some(object)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let res = &response["response"];
    assert_eq!(res["uid"], "705ab4f5-6393-11e8-b7cc-42010a800002");
    assert_eq!(res["allowed"], true);
    assert_eq!(res["patchType"], "JSONPatch");

    // The review carries the patch as raw JSON bytes
    let bytes: Vec<u8> = serde_json::from_value(res["patch"].clone()).unwrap();
    let patch: json_patch::Patch = serde_json::from_slice(&bytes).unwrap();
    assert!(op_paths(&patch).contains(&(
        "add".to_string(),
        "/spec/revisionHistoryLimit".to_string()
    )));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_mutate_denies_unrecognized_surface() {
    let server = TestServer::start().await;
    let object = submitted(&minimal_dc("frontend", 0), "apps.example.com/v1");

    let response: Value = server
        .client
        .post(server.url("/mutate"))
        .json(&admission_review("apps.example.com", "v1", Some(object)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(response["response"]["allowed"], false);
    assert!(response["response"]["patch"].is_null());
    let metrics = server.state.metrics.encode().unwrap();
    assert!(metrics.contains("deployconfig_dispatch_rejections_total 1"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_mutate_allows_request_without_object() {
    let server = TestServer::start().await;

    let response: Value = server
        .client
        .post(server.url("/mutate"))
        .json(&admission_review("", "v1", None))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(response["response"]["allowed"], true);
    assert!(response["response"]["patch"].is_null());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_mutate_answers_review_without_request() {
    let server = TestServer::start().await;

    let response: Value = server
        .client
        .post(server.url("/mutate"))
        .json(&json!({ "apiVersion": "admission.k8s.io/v1", "kind": "AdmissionReview" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(response["response"]["allowed"], false);

    server.stop().await.unwrap();
}
