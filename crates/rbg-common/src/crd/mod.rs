//! Custom Resource Definitions for RoleBasedGroup workloads

mod pod_group_policy;
mod role_based_group;

pub use pod_group_policy::{KubeSchedulingPolicy, PodGroupPolicy, VolcanoSchedulingPolicy};
pub use role_based_group::{
    RoleBasedGroup, RoleBasedGroupSpec, RoleBasedGroupStatus, RoleSpec, RoleStatus,
};
