use deployconfig_defaults::crd::DeploymentConfig;
use kube::CustomResourceExt;
use serde_json::{json, Value};

fn main() -> anyhow::Result<()> {
    // Emits a v1 List holding the CRD and the defaulting webhook registration.
    // Pipe through a JSON-to-YAML converter for kubectl-friendly output.
    let crd: Value = serde_json::to_value(DeploymentConfig::crd())?;

    let webhook = json!({
        "apiVersion": "admissionregistration.k8s.io/v1",
        "kind": "MutatingWebhookConfiguration",
        "metadata": { "name": "deployconfig-defaults" },
        "webhooks": [{
            "name": "deploymentconfigs.apps.openshift.io",
            "admissionReviewVersions": ["v1"],
            "sideEffects": "None",
            "failurePolicy": "Fail",
            "clientConfig": {
                "service": {
                    "name": "deployconfig-apiserver",
                    "namespace": "deployconfig-system",
                    "path": "/mutate",
                    "port": 8443
                }
            },
            "rules": [{
                "apiGroups": ["apps.openshift.io"],
                "apiVersions": ["v1"],
                "operations": ["CREATE", "UPDATE"],
                "resources": ["deploymentconfigs"],
                "scope": "Namespaced"
            }]
        }]
    });

    let list = json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": [crd, webhook]
    });

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
