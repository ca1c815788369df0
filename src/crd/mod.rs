pub mod defaults;
pub mod deployment_config;
pub mod scheme;
pub mod surface;
pub mod validation;

pub use defaults::{set_defaults, set_spec_defaults};
pub use deployment_config::{DeploymentConfig, DeploymentConfigSpec, DeploymentConfigStatus};
pub use scheme::{CodecError, Scheme};
pub use surface::{ApiSurface, DefaultingPolicy, DispatchError};
pub use validation::{validate_deployment_config, ValidationError};

#[cfg(test)]
pub(crate) mod fixtures;
