//! Gang-scheduling policy for RoleBasedGroups
//!
//! A closed sum type: a group asks for the in-cluster coscheduling plugin or
//! for Volcano, never both. Absence of a policy means no gang scheduling.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which scheduler enforces all-or-nothing placement for the group's pods
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PodGroupPolicy {
    /// Native scheduler-plugins coscheduling (`scheduling.x-k8s.io` PodGroup)
    KubeScheduling(KubeSchedulingPolicy),
    /// Volcano batch scheduler (`scheduling.volcano.sh` PodGroup)
    VolcanoScheduling(VolcanoSchedulingPolicy),
}

/// Native coscheduling settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeSchedulingPolicy {
    /// Whether gang scheduling is requested; `false` behaves as if no policy were set
    #[serde(default)]
    pub enabled: bool,

    /// Seconds the scheduler waits for the whole gang before giving up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_timeout_seconds: Option<i32>,
}

/// Volcano settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolcanoSchedulingPolicy {
    /// PriorityClass the PodGroup is admitted with
    pub priority_class_name: String,

    /// Volcano queue the PodGroup is routed to
    pub queue: String,
}

impl PodGroupPolicy {
    /// Native coscheduling policy, enabled or not
    pub fn kube(enabled: bool) -> Self {
        Self::KubeScheduling(KubeSchedulingPolicy {
            enabled,
            schedule_timeout_seconds: None,
        })
    }

    /// Volcano policy with the given priority class and queue
    pub fn volcano(priority_class_name: impl Into<String>, queue: impl Into<String>) -> Self {
        Self::VolcanoScheduling(VolcanoSchedulingPolicy {
            priority_class_name: priority_class_name.into(),
            queue: queue.into(),
        })
    }

    /// Validate the policy. `group` is used for error context only.
    pub fn validate(&self, group: &str) -> Result<(), crate::Error> {
        match self {
            Self::KubeScheduling(kube) => {
                if let Some(timeout) = kube.schedule_timeout_seconds {
                    if timeout <= 0 {
                        return Err(crate::Error::validation_for_field(
                            group,
                            "spec.podGroupPolicy.kubeScheduling.scheduleTimeoutSeconds",
                            format!("scheduleTimeoutSeconds must be greater than 0, got {timeout}"),
                        ));
                    }
                }
            }
            Self::VolcanoScheduling(volcano) => {
                if volcano.priority_class_name.trim().is_empty() {
                    return Err(crate::Error::validation_for_field(
                        group,
                        "spec.podGroupPolicy.volcanoScheduling.priorityClassName",
                        "priorityClassName must not be empty",
                    ));
                }
                if volcano.queue.trim().is_empty() {
                    return Err(crate::Error::validation_for_field(
                        group,
                        "spec.podGroupPolicy.volcanoScheduling.queue",
                        "queue must not be empty",
                    ));
                }
            }
        }
        Ok(())
    }
}
