//! Scheduler backend classification
//!
//! The one place that decides which scheduler enforces a group's gang
//! semantics. Injection, naming and PodGroup compilation all branch on the
//! value produced here.

use std::fmt;

use rbg_common::crd::{
    KubeSchedulingPolicy, PodGroupPolicy, RoleBasedGroup, VolcanoSchedulingPolicy,
};

use crate::protocol::{KUBE_POD_GROUP_CRD_NAME, VOLCANO_POD_GROUP_CRD_NAME};

/// Scheduler responsible for a group's all-or-nothing placement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerBackend<'a> {
    /// No gang scheduling; pods are scheduled independently
    None,
    /// Native scheduler-plugins coscheduling
    Kube(&'a KubeSchedulingPolicy),
    /// Volcano batch scheduler
    Volcano(&'a VolcanoSchedulingPolicy),
}

impl<'a> SchedulerBackend<'a> {
    /// Classify a gang-scheduling policy.
    ///
    /// Total: an absent or disabled policy is `None`, never an error.
    pub fn select(policy: Option<&'a PodGroupPolicy>) -> Self {
        match policy {
            Some(PodGroupPolicy::KubeScheduling(kube)) if kube.enabled => Self::Kube(kube),
            Some(PodGroupPolicy::VolcanoScheduling(volcano)) => Self::Volcano(volcano),
            Some(PodGroupPolicy::KubeScheduling(_)) | None => Self::None,
        }
    }

    /// Classify a RoleBasedGroup by its spec's policy
    pub fn for_group(rbg: &'a RoleBasedGroup) -> Self {
        Self::select(rbg.spec.pod_group_policy.as_ref())
    }

    /// Whether any backend enforces gang semantics
    pub fn is_gang(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Name of the PodGroup resource backing a group called `group_name`.
    ///
    /// Empty for `None`: nothing must be created or looked up. Both backends
    /// currently use the bare group name; each keeps its own arm so their
    /// conventions can diverge independently.
    pub fn pod_group_name(&self, group_name: &str) -> String {
        match self {
            Self::None => String::new(),
            Self::Kube(_) => group_name.to_string(),
            Self::Volcano(_) => group_name.to_string(),
        }
    }

    /// CRD that must be installed for this backend's PodGroups
    pub fn crd_name(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Kube(_) => Some(KUBE_POD_GROUP_CRD_NAME),
            Self::Volcano(_) => Some(VOLCANO_POD_GROUP_CRD_NAME),
        }
    }

    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Kube(_) => "kube",
            Self::Volcano(_) => "volcano",
        }
    }
}

impl fmt::Display for SchedulerBackend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
