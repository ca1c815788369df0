//! Shared DeploymentConfig builders for tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use k8s_openapi::api::core::v1::{Container, PodSecurityContext, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

use super::deployment_config::{
    DeploymentConfig, DeploymentConfigSpec, DeploymentStrategyType, DeploymentTriggerPolicy,
    RollingDeploymentStrategyParams,
};

pub const NON_DEFAULT_REVISION_HISTORY_LIMIT: i32 =
    super::defaults::DEFAULT_REVISION_HISTORY_LIMIT + 42;

fn app_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), name.to_string())])
}

/// Smallest object the API accepts: name, selector and one container
pub fn minimal_dc(name: &str, generation: i64) -> DeploymentConfig {
    DeploymentConfig {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            generation: Some(generation).filter(|g| *g != 0),
            ..Default::default()
        },
        spec: DeploymentConfigSpec {
            selector: app_labels(name),
            template: Some(PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(app_labels(name)),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "a".to_string(),
                        image: Some(" ".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
        status: None,
    }
}

/// Apply, by hand, every default both surfaces share
pub fn with_essential_defaults(mut dc: DeploymentConfig) -> DeploymentConfig {
    let strategy = &mut dc.spec.strategy;
    strategy.type_ = Some(DeploymentStrategyType::Rolling);
    strategy.rolling_params = Some(RollingDeploymentStrategyParams {
        interval_seconds: Some(1),
        update_period_seconds: Some(1),
        timeout_seconds: Some(600),
        max_unavailable: Some(IntOrString::String("25%".to_string())),
        max_surge: Some(IntOrString::String("25%".to_string())),
        ..Default::default()
    });
    strategy.active_deadline_seconds = Some(21600);
    dc.spec.triggers = vec![DeploymentTriggerPolicy::config_change()];

    let pod = dc
        .spec
        .template
        .as_mut()
        .and_then(|t| t.spec.as_mut())
        .expect("fixture has a pod spec");
    let container = &mut pod.containers[0];
    container.termination_message_path = Some("/dev/termination-log".to_string());
    container.termination_message_policy = Some("File".to_string());
    container.image_pull_policy = Some("IfNotPresent".to_string());
    pod.restart_policy = Some("Always".to_string());
    pod.termination_grace_period_seconds = Some(30);
    pod.dns_policy = Some("ClusterFirst".to_string());
    pod.security_context = Some(PodSecurityContext::default());
    pod.scheduler_name = Some("default-scheduler".to_string());

    dc
}
