use k8s_openapi::api::core::v1::{EnvVar, ObjectReference, PodTemplateSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// DeploymentConfig describes the desired state of a managed workload
///
/// Served through both the legacy `v1` surface and the `apps.openshift.io/v1`
/// group surface. The wire shape is identical on both; only defaulting differs.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    namespaced,
    status = "DeploymentConfigStatus",
    shortname = "dc",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Revision", "type":"integer", "jsonPath":".status.latestVersion"}"#,
    printcolumn = r#"{"name":"Desired", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Current", "type":"integer", "jsonPath":".status.replicas"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct DeploymentConfigSpec {
    /// How a deployment is executed
    #[serde(default)]
    pub strategy: DeploymentStrategy,

    /// Seconds a new pod must be ready before it counts as available
    #[serde(rename = "minReadySeconds", skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    /// Events that cause a new deployment to be created
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<DeploymentTriggerPolicy>,

    /// Number of desired pods
    #[serde(default, skip_serializing_if = "is_zero")]
    pub replicas: i32,

    /// Number of old replication controllers to retain for rollback
    ///
    /// Only the group surface defaults this field.
    #[serde(
        rename = "revisionHistoryLimit",
        skip_serializing_if = "Option::is_none"
    )]
    pub revision_history_limit: Option<i32>,

    /// Run the deployment as a test and scale it down to zero afterwards
    #[serde(default, skip_serializing_if = "is_false")]
    pub test: bool,

    /// Stop triggers from starting new deployments
    #[serde(default, skip_serializing_if = "is_false")]
    pub paused: bool,

    /// Labels identifying the member pods
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,

    /// Template describes the pods that will be created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,

    /// Fields this server does not model, kept verbatim
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, Value>,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum DeploymentStrategyType {
    Recreate,
    Custom,
    Rolling,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DeploymentStrategy {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<DeploymentStrategyType>,

    #[serde(rename = "customParams", skip_serializing_if = "Option::is_none")]
    pub custom_params: Option<CustomDeploymentStrategyParams>,

    #[serde(rename = "recreateParams", skip_serializing_if = "Option::is_none")]
    pub recreate_params: Option<RecreateDeploymentStrategyParams>,

    #[serde(rename = "rollingParams", skip_serializing_if = "Option::is_none")]
    pub rolling_params: Option<RollingDeploymentStrategyParams>,

    /// Compute resources for the deployer pod
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    /// Labels added to the deployer and hook pods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Annotations added to the deployer and hook pods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Upper bound in seconds on a single deployment attempt
    #[serde(
        rename = "activeDeadlineSeconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub active_deadline_seconds: Option<i64>,

    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters for a user-supplied deployer image
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct CustomDeploymentStrategyParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct RecreateDeploymentStrategyParams {
    #[serde(rename = "timeoutSeconds", skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,

    /// Runs before the old deployment is scaled down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre: Option<LifecycleHook>,

    /// Runs after scale down and before the new deployment scales up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<LifecycleHook>,

    /// Runs after the new deployment is scaled up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<LifecycleHook>,

    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters for the rolling strategy
///
/// `maxUnavailable` and `maxSurge` accept an absolute count or a percentage of
/// the desired replicas (e.g. `"25%"`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct RollingDeploymentStrategyParams {
    /// Seconds between individual scaling steps
    #[serde(
        rename = "updatePeriodSeconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_period_seconds: Option<i64>,

    /// Seconds between polls of the deployment status
    #[serde(rename = "intervalSeconds", skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<i64>,

    /// Seconds to wait for a scaling event before giving up
    #[serde(rename = "timeoutSeconds", skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,

    #[serde(rename = "maxUnavailable", skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,

    #[serde(rename = "maxSurge", skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre: Option<LifecycleHook>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<LifecycleHook>,

    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, Value>,
}

/// What happens to the deployment when a hook fails
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum LifecycleHookFailurePolicy {
    /// Retry the hook until it succeeds
    Retry,
    /// Fail the deployment
    #[default]
    Abort,
    /// Carry on with the deployment
    Ignore,
}

/// Action run at one point of a deployment strategy
///
/// Exactly one of `execNewPod` or `tagImages` is expected.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct LifecycleHook {
    #[serde(rename = "failurePolicy")]
    pub failure_policy: LifecycleHookFailurePolicy,

    #[serde(rename = "execNewPod", skip_serializing_if = "Option::is_none")]
    pub exec_new_pod: Option<ExecNewPodHook>,

    #[serde(rename = "tagImages", default, skip_serializing_if = "Vec::is_empty")]
    pub tag_images: Vec<TagImageHook>,
}

/// Run a command in a new pod built from one of the template's containers
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ExecNewPodHook {
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(rename = "containerName")]
    pub container_name: String,

    /// Template volumes to mount into the hook pod
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
}

/// Tag the image of a template container into an image stream
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct TagImageHook {
    #[serde(rename = "containerName")]
    pub container_name: String,

    pub to: ObjectReference,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum DeploymentTriggerType {
    /// Deploy whenever the pod template changes
    ConfigChange,
    /// Deploy whenever a referenced image stream tag moves
    ImageChange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct DeploymentTriggerPolicy {
    #[serde(rename = "type")]
    pub type_: DeploymentTriggerType,

    #[serde(rename = "imageChangeParams", skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<DeploymentTriggerImageChangeParams>,
}

impl DeploymentTriggerPolicy {
    /// Trigger that fires on pod template changes
    pub fn config_change() -> Self {
        Self {
            type_: DeploymentTriggerType::ConfigChange,
            image_change_params: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DeploymentTriggerImageChangeParams {
    /// Whether a new image automatically triggers a deployment
    #[serde(default)]
    pub automatic: bool,

    /// Containers whose image is replaced when the trigger fires
    #[serde(rename = "containerNames", default, skip_serializing_if = "Vec::is_empty")]
    pub container_names: Vec<String>,

    /// Image stream tag to watch
    pub from: ObjectReference,

    #[serde(
        rename = "lastTriggeredImage",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_triggered_image: Option<String>,
}

/// Status of the DeploymentConfig
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DeploymentConfigStatus {
    /// Revision of the most recent deployment
    #[serde(rename = "latestVersion", default)]
    pub latest_version: i64,

    #[serde(rename = "observedGeneration", default)]
    pub observed_generation: i64,

    #[serde(default)]
    pub replicas: i32,

    #[serde(rename = "updatedReplicas", default)]
    pub updated_replicas: i32,

    #[serde(rename = "availableReplicas", default)]
    pub available_replicas: i32,

    #[serde(rename = "unavailableReplicas", default)]
    pub unavailable_replicas: i32,

    #[serde(rename = "readyReplicas", default)]
    pub ready_replicas: i32,
}

/// List envelope returned by collection reads
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DeploymentConfigList {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub items: Vec<Value>,
}

impl DeploymentConfig {
    /// Reset the fields the server assigns on persistence
    ///
    /// Used when comparing a persisted object against an expected one.
    pub fn clear_transient(&mut self) {
        self.metadata.namespace = None;
        self.metadata.self_link = None;
        self.metadata.uid = None;
        self.metadata.resource_version = None;
        self.metadata.creation_timestamp = None;
    }
}

#[cfg(test)]
#[path = "deployment_config_test.rs"]
mod tests;
