//! Gang-scheduling protocol for RoleBasedGroup workloads
//!
//! Decides which scheduler (none, native coscheduling, Volcano) groups a
//! RoleBasedGroup's pods, writes the matching label or annotations onto pod
//! templates, and names the PodGroup the downstream reconciler must ensure.
//! Pure compilation crate: no controller logic, no API calls.

mod backend;
mod compiler;
pub mod protocol;
mod types;

pub use backend::SchedulerBackend;
pub use compiler::{compile_pod_group, compile_role_templates};
pub use protocol::{inject_pod_group_protocol, pod_group_name, GroupIdentity};
pub use types::{PodGroup, PodGroupSpec, KUBE_POD_GROUP_API_VERSION, VOLCANO_POD_GROUP_API_VERSION};
