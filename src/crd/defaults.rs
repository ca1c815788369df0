//! Field defaulting for DeploymentConfig
//!
//! Fills every recognized-but-unset field with its canonical value. Values the
//! caller set are never overwritten, and running the defaulter twice yields the
//! same object as running it once.
//!
//! ## Version fork
//! `revisionHistoryLimit` is the only field whose defaulting depends on the
//! API surface: the group surface defaults it to 10, the legacy surface leaves
//! it unset so frozen clients keep their old behavior.

use k8s_openapi::api::core::v1::{Container, PodSecurityContext, PodSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::debug;

use super::deployment_config::{
    DeploymentConfig, DeploymentConfigSpec, DeploymentStrategy, DeploymentStrategyType,
    DeploymentTriggerPolicy, RollingDeploymentStrategyParams,
};
use super::surface::DefaultingPolicy;

pub const DEFAULT_INTERVAL_SECONDS: i64 = 1;
pub const DEFAULT_UPDATE_PERIOD_SECONDS: i64 = 1;
pub const DEFAULT_TIMEOUT_SECONDS: i64 = 600;
pub const DEFAULT_MAX_UNAVAILABLE: &str = "25%";
pub const DEFAULT_MAX_SURGE: &str = "25%";

/// Six hours
pub const DEFAULT_ACTIVE_DEADLINE_SECONDS: i64 = 21600;

/// Applied by the group surface only
pub const DEFAULT_REVISION_HISTORY_LIMIT: i32 = 10;

pub const DEFAULT_TERMINATION_MESSAGE_PATH: &str = "/dev/termination-log";
pub const DEFAULT_TERMINATION_MESSAGE_POLICY: &str = "File";
pub const DEFAULT_IMAGE_PULL_POLICY: &str = "IfNotPresent";
pub const DEFAULT_RESTART_POLICY: &str = "Always";
pub const DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS: i64 = 30;
pub const DEFAULT_DNS_POLICY: &str = "ClusterFirst";
pub const DEFAULT_SCHEDULER_NAME: &str = "default-scheduler";

/// Default every unset field of a DeploymentConfig in place
pub fn set_defaults(dc: &mut DeploymentConfig, policy: DefaultingPolicy) {
    debug!(
        name = ?dc.metadata.name,
        policy = %policy,
        "Applying DeploymentConfig defaults"
    );
    set_spec_defaults(&mut dc.spec, policy);
}

/// Default a spec in place
///
/// For callers that hold a spec without its object metadata.
pub fn set_spec_defaults(spec: &mut DeploymentConfigSpec, policy: DefaultingPolicy) {
    set_strategy_defaults(&mut spec.strategy);

    if spec.triggers.is_empty() {
        spec.triggers.push(DeploymentTriggerPolicy::config_change());
    }

    if let Some(template) = spec.template.as_mut() {
        set_pod_spec_defaults(template.spec.get_or_insert_with(PodSpec::default));
    }

    if policy.defaults_revision_history_limit() && spec.revision_history_limit.is_none() {
        spec.revision_history_limit = Some(DEFAULT_REVISION_HISTORY_LIMIT);
    }
}

fn set_strategy_defaults(strategy: &mut DeploymentStrategy) {
    let strategy_type = *strategy
        .type_
        .get_or_insert(DeploymentStrategyType::Rolling);

    if strategy_type == DeploymentStrategyType::Rolling {
        set_rolling_params_defaults(
            strategy
                .rolling_params
                .get_or_insert_with(RollingDeploymentStrategyParams::default),
        );
    }

    strategy
        .active_deadline_seconds
        .get_or_insert(DEFAULT_ACTIVE_DEADLINE_SECONDS);
}

fn set_rolling_params_defaults(params: &mut RollingDeploymentStrategyParams) {
    params.interval_seconds.get_or_insert(DEFAULT_INTERVAL_SECONDS);
    params
        .update_period_seconds
        .get_or_insert(DEFAULT_UPDATE_PERIOD_SECONDS);
    params.timeout_seconds.get_or_insert(DEFAULT_TIMEOUT_SECONDS);
    params
        .max_unavailable
        .get_or_insert_with(|| IntOrString::String(DEFAULT_MAX_UNAVAILABLE.to_string()));
    params
        .max_surge
        .get_or_insert_with(|| IntOrString::String(DEFAULT_MAX_SURGE.to_string()));
}

fn set_pod_spec_defaults(pod: &mut PodSpec) {
    for container in pod.containers.iter_mut() {
        set_container_defaults(container);
    }

    default_string(&mut pod.restart_policy, DEFAULT_RESTART_POLICY);
    pod.termination_grace_period_seconds
        .get_or_insert(DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS);
    default_string(&mut pod.dns_policy, DEFAULT_DNS_POLICY);
    // Zero value: no host namespaces, no user/group overrides.
    pod.security_context
        .get_or_insert_with(PodSecurityContext::default);
    default_string(&mut pod.scheduler_name, DEFAULT_SCHEDULER_NAME);
}

fn set_container_defaults(container: &mut Container) {
    default_string(
        &mut container.termination_message_path,
        DEFAULT_TERMINATION_MESSAGE_PATH,
    );
    default_string(
        &mut container.termination_message_policy,
        DEFAULT_TERMINATION_MESSAGE_POLICY,
    );
    default_string(&mut container.image_pull_policy, DEFAULT_IMAGE_PULL_POLICY);
}

/// Empty strings count as unset, the same as an absent field on the wire
fn default_string(field: &mut Option<String>, value: &str) {
    if field.as_deref().is_none_or(str::is_empty) {
        *field = Some(value.to_string());
    }
}

#[cfg(test)]
#[path = "defaults_test.rs"]
mod tests;
