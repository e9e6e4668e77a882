//! RoleBasedGroup CRD types
//!
//! Defines `RoleBasedGroup`, a set of named roles (e.g. prefill, decode,
//! router) deployed together, optionally gang scheduled as one unit.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::pod_group_policy::PodGroupPolicy;

// =============================================================================
// Role Spec
// =============================================================================

/// A single role within a RoleBasedGroup
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    /// Number of pods for this role
    #[serde(default = "default_one")]
    pub replicas: u32,

    /// Pod template rendered for every replica of this role
    #[serde(default)]
    pub template: PodTemplateSpec,
}

impl RoleSpec {
    /// Role with the given replica count and an empty pod template
    pub fn new(replicas: u32) -> Self {
        Self {
            replicas,
            template: PodTemplateSpec::default(),
        }
    }

    /// Replace the pod template
    pub fn with_template(mut self, template: PodTemplateSpec) -> Self {
        self.template = template;
        self
    }
}

fn default_one() -> u32 {
    1
}

// =============================================================================
// CRD
// =============================================================================

/// Multi-role workload deployed as a single group
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "workloads.x-k8s.io",
    version = "v1alpha1",
    kind = "RoleBasedGroup",
    plural = "rolebasedgroups",
    shortname = "rbg",
    namespaced,
    status = "RoleBasedGroupStatus",
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RoleBasedGroupSpec {
    /// Roles keyed by role name
    #[serde(default)]
    pub roles: BTreeMap<String, RoleSpec>,

    /// Gang-scheduling policy; unset means pods are scheduled independently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_group_policy: Option<PodGroupPolicy>,
}

impl RoleBasedGroupSpec {
    /// Add a role
    pub fn with_role(mut self, name: impl Into<String>, role: RoleSpec) -> Self {
        self.roles.insert(name.into(), role);
        self
    }

    /// Request native coscheduling (or explicitly disable it)
    pub fn with_kube_gang_scheduling(mut self, enabled: bool) -> Self {
        self.pod_group_policy = Some(PodGroupPolicy::kube(enabled));
        self
    }

    /// Request Volcano gang scheduling
    pub fn with_volcano_gang_scheduling(
        mut self,
        priority_class_name: impl Into<String>,
        queue: impl Into<String>,
    ) -> Self {
        self.pod_group_policy = Some(PodGroupPolicy::volcano(priority_class_name, queue));
        self
    }

    /// Sum of replicas across all roles, `None` if it overflows `u32`
    pub fn total_replicas(&self) -> Option<u32> {
        self.roles
            .values()
            .try_fold(0u32, |acc, r| acc.checked_add(r.replicas))
    }

    /// Validate the spec as the admission layer would.
    pub fn validate(&self, group: &str) -> Result<(), crate::Error> {
        if self.roles.is_empty() {
            return Err(crate::Error::validation_for_field(
                group,
                "spec.roles",
                "at least one role is required",
            ));
        }
        if self.roles.keys().any(|name| name.trim().is_empty()) {
            return Err(crate::Error::validation_for_field(
                group,
                "spec.roles",
                "role names must not be empty",
            ));
        }
        match self.total_replicas() {
            Some(total) if total <= crate::MAX_TOTAL_REPLICAS => {}
            _ => {
                return Err(crate::Error::validation_for_field(
                    group,
                    "spec.roles",
                    format!(
                        "total replicas across roles must not exceed {}",
                        crate::MAX_TOTAL_REPLICAS
                    ),
                ));
            }
        }
        if let Some(policy) = &self.pod_group_policy {
            policy.validate(group)?;
        }
        Ok(())
    }
}

// =============================================================================
// Status
// =============================================================================

/// Observed state of a single role
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleStatus {
    /// Role name
    pub name: String,
    /// Desired replicas
    pub replicas: u32,
    /// Replicas that are ready
    pub ready_replicas: u32,
}

/// Status of a RoleBasedGroup
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleBasedGroupStatus {
    /// Generation last processed by the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Per-role readiness
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleStatus>,
}

// =============================================================================
// Tests
// =============================================================================
