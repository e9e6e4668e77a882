//! Common types for RoleBasedGroup workloads: CRDs, errors, and telemetry

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group of the RoleBasedGroup CRD
pub const RBG_API_GROUP: &str = "workloads.x-k8s.io";

/// API version (`group/version`) of the RoleBasedGroup CRD
pub const RBG_API_VERSION: &str = "workloads.x-k8s.io/v1alpha1";

/// Kind of the RoleBasedGroup CRD
pub const RBG_KIND: &str = "RoleBasedGroup";

/// Standard Kubernetes label for resource name
pub const LABEL_NAME: &str = "app.kubernetes.io/name";

/// Standard Kubernetes label for the managing controller
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value of [`LABEL_MANAGED_BY`] for resources created by the RBG controller
pub const LABEL_MANAGED_BY_RBG: &str = "rbgs";

/// Label carrying the owning RoleBasedGroup name on pod templates
pub const GROUP_NAME_LABEL_KEY: &str = "rbg.workloads.x-k8s.io/group-name";

/// Label carrying the role name on pod templates
pub const ROLE_NAME_LABEL_KEY: &str = "rbg.workloads.x-k8s.io/role";

/// Upper bound on replicas summed across roles; PodGroup `minMember` is an int32
pub const MAX_TOTAL_REPLICAS: u32 = i32::MAX as u32;

/// Namespace used when a RoleBasedGroup carries none
pub const DEFAULT_NAMESPACE: &str = "default";
