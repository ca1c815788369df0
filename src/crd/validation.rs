use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use thiserror::Error;

use super::deployment_config::{DeploymentConfig, DeploymentStrategyType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("metadata.name is required")]
    MissingName,

    #[error("spec.selector is required")]
    MissingSelector,

    #[error("spec.template is required")]
    MissingTemplate,

    #[error("spec.template.spec.containers must have at least one container")]
    NoContainers,

    #[error("spec.template.spec.containers[{0}].name is required")]
    MissingContainerName(usize),

    #[error("spec.template.metadata.labels must match spec.selector (missing {0:?})")]
    SelectorMismatch(String),

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: i64 },

    #[error("{field} invalid value '{value}': must be a count or a percentage (e.g. '25%')")]
    InvalidIntOrPercent { field: &'static str, value: String },

    #[error("spec.strategy.rollingParams may only be set for the Rolling strategy")]
    UnexpectedRollingParams,
}

/// Validate required fields and value ranges of a DeploymentConfig
///
/// Runs after defaulting, so it only rejects what the caller must supply
/// (selector, template, containers) or values out of range. Returns the first
/// problem found.
pub fn validate_deployment_config(dc: &DeploymentConfig) -> Result<(), ValidationError> {
    if dc.metadata.name.as_deref().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingName);
    }

    let spec = &dc.spec;

    if spec.selector.is_empty() {
        return Err(ValidationError::MissingSelector);
    }

    non_negative("spec.replicas", spec.replicas.into())?;
    if let Some(limit) = spec.revision_history_limit {
        non_negative("spec.revisionHistoryLimit", limit.into())?;
    }
    if let Some(seconds) = spec.min_ready_seconds {
        non_negative("spec.minReadySeconds", seconds.into())?;
    }

    let template = spec.template.as_ref().ok_or(ValidationError::MissingTemplate)?;

    let labels = template
        .metadata
        .as_ref()
        .and_then(|m| m.labels.as_ref());
    for (key, value) in &spec.selector {
        if labels.and_then(|l| l.get(key)) != Some(value) {
            return Err(ValidationError::SelectorMismatch(format!("{}={}", key, value)));
        }
    }

    let containers = template
        .spec
        .as_ref()
        .map(|s| s.containers.as_slice())
        .unwrap_or_default();
    if containers.is_empty() {
        return Err(ValidationError::NoContainers);
    }
    if let Some(i) = containers.iter().position(|c| c.name.is_empty()) {
        return Err(ValidationError::MissingContainerName(i));
    }

    let strategy = &spec.strategy;
    if let Some(deadline) = strategy.active_deadline_seconds {
        non_negative("spec.strategy.activeDeadlineSeconds", deadline)?;
    }

    if let Some(params) = &strategy.rolling_params {
        if strategy
            .type_
            .is_some_and(|t| t != DeploymentStrategyType::Rolling)
        {
            return Err(ValidationError::UnexpectedRollingParams);
        }
        if let Some(v) = params.interval_seconds {
            non_negative("spec.strategy.rollingParams.intervalSeconds", v)?;
        }
        if let Some(v) = params.update_period_seconds {
            non_negative("spec.strategy.rollingParams.updatePeriodSeconds", v)?;
        }
        if let Some(v) = params.timeout_seconds {
            non_negative("spec.strategy.rollingParams.timeoutSeconds", v)?;
        }
        if let Some(v) = &params.max_unavailable {
            int_or_percent("spec.strategy.rollingParams.maxUnavailable", v)?;
        }
        if let Some(v) = &params.max_surge {
            int_or_percent("spec.strategy.rollingParams.maxSurge", v)?;
        }
    }

    Ok(())
}

fn non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

/// Accepts a non-negative count, or a percentage between 0% and 100%
fn int_or_percent(field: &'static str, value: &IntOrString) -> Result<(), ValidationError> {
    match value {
        IntOrString::Int(n) => non_negative(field, (*n).into()),
        IntOrString::String(s) => {
            if is_valid_int_or_percent(s) {
                Ok(())
            } else {
                Err(ValidationError::InvalidIntOrPercent {
                    field,
                    value: s.clone(),
                })
            }
        }
    }
}

/// Whether a string is a count ("5") or a percentage ("25%")
pub fn is_valid_int_or_percent(value: &str) -> bool {
    match value.strip_suffix('%') {
        Some(percent) => percent.parse::<u32>().is_ok_and(|p| p <= 100),
        None => value.parse::<u32>().is_ok(),
    }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
