//! Mutating admission webhook for DeploymentConfig objects
//!
//! Lets a cluster API server apply the same defaults the REST surfaces
//! apply. The surface is resolved from the request's group and version, so
//! objects submitted as `apps.openshift.io/v1` get the modern policy and
//! legacy `v1` objects get the legacy one.
//!
//! ## Endpoints
//! - POST /mutate - Kubernetes AdmissionReview webhook
//!
//! The response carries a JSON patch from the submitted object to its
//! defaulted form. Objects are never denied for failing validation here;
//! that stays with the REST handlers.

use axum::{extract::State, Json};
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
    DynamicObject,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::ServerState;
use crate::crd::{set_defaults, ApiSurface};

impl ServerState {
    /// Compute the JSON patch that defaults `object` for `surface`
    fn defaulting_patch(
        &self,
        surface: ApiSurface,
        object: &DynamicObject,
    ) -> Result<json_patch::Patch, ApiError> {
        let submitted =
            serde_json::to_value(object).map_err(|e| ApiError::Internal(e.to_string()))?;

        let mut dc = self.scheme.decode_value(surface, submitted.clone())?;
        let policy = surface.policy();
        set_defaults(&mut dc, policy);
        self.metrics.record_defaulting(policy);

        let defaulted: Value = self.scheme.encode(surface, &dc)?;

        // Defaulting only adds. Layering the defaulted form over the submitted
        // one keeps fields the encoder omits, such as an explicit `replicas: 0`.
        let mut target = submitted.clone();
        json_patch::merge(&mut target, &defaulted);
        Ok(json_patch::diff(&submitted, &target))
    }

    fn review(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        let res = AdmissionResponse::from(req);

        // DELETE and CONNECT carry no object; nothing to default
        let Some(object) = &req.object else {
            debug!(operation = ?req.operation, "No object in admission request");
            return res;
        };

        let surface = match ApiSurface::resolve(&req.kind.group, &req.kind.version) {
            Ok(surface) => surface,
            Err(e) => {
                warn!(error = %e, "Denying admission request for unrecognized API surface");
                self.metrics.record_dispatch_rejection();
                self.metrics.record_request("unknown", "admit", "NotFound");
                return res.deny(e.to_string());
            }
        };

        let patch = match self.defaulting_patch(surface, object) {
            Ok(patch) => patch,
            Err(e) => {
                warn!(surface = %surface, name = %req.name, error = %e, "Denying admission request");
                self.metrics.record_request(surface.as_str(), "admit", e.reason());
                return res.deny(e.to_string());
            }
        };
        let ops = patch.0.len();

        match res.with_patch(patch) {
            Ok(res) => {
                info!(
                    surface = %surface,
                    name = %req.name,
                    namespace = ?req.namespace,
                    operation = ?req.operation,
                    patch_ops = ops,
                    "Defaulted DeploymentConfig via admission"
                );
                self.metrics.record_request(surface.as_str(), "admit", "success");
                res
            }
            Err(e) => {
                warn!(surface = %surface, error = %e, "Failed to serialize defaulting patch");
                self.metrics.record_request(surface.as_str(), "admit", "InternalError");
                AdmissionResponse::from(req).deny(e.to_string())
            }
        }
    }
}

/// Handle an AdmissionReview from the cluster API server
pub async fn mutate(
    State(state): State<ServerState>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "Invalid AdmissionReview");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    Json(state.review(&req).into_review())
}

#[cfg(test)]
#[path = "webhook_test.rs"]
mod tests;
