//! PodGroup and pod template compilation from RoleBasedGroup specs
//!
//! Maps a RoleBasedGroup onto the PodGroup its scheduler needs and onto the
//! per-role pod templates carrying the matching group reference.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use rbg_common::crd::RoleBasedGroup;
use rbg_common::{
    GROUP_NAME_LABEL_KEY, LABEL_MANAGED_BY, LABEL_MANAGED_BY_RBG, LABEL_NAME,
    MAX_TOTAL_REPLICAS, ROLE_NAME_LABEL_KEY,
};
use tracing::{trace, warn};

use crate::backend::SchedulerBackend;
use crate::protocol::{inject_pod_group_protocol, labels_mut, GroupIdentity};
use crate::types::{
    PodGroup, PodGroupSpec, KUBE_POD_GROUP_API_VERSION, VOLCANO_POD_GROUP_API_VERSION,
};

/// Compile the PodGroup backing a RoleBasedGroup.
///
/// Returns `None` when the group is not gang scheduled or has no name yet.
/// The PodGroup is named by [`crate::pod_group_name`], lives in the group's
/// namespace, requires every replica of every role (capped at
/// [`MAX_TOTAL_REPLICAS`]), and is owned by the RoleBasedGroup.
pub fn compile_pod_group(rbg: &RoleBasedGroup) -> Option<PodGroup> {
    let identity = GroupIdentity::of(rbg);
    let backend = SchedulerBackend::for_group(rbg);
    if !identity.is_named() {
        trace!(group = %identity, %backend, "unnamed group; no PodGroup compiled");
        return None;
    }
    let min_member = min_member(rbg, &identity);

    let (api_version, spec) = match backend {
        SchedulerBackend::None => return None,
        SchedulerBackend::Kube(policy) => (
            KUBE_POD_GROUP_API_VERSION,
            PodGroupSpec {
                min_member,
                schedule_timeout_seconds: policy.schedule_timeout_seconds,
                ..Default::default()
            },
        ),
        SchedulerBackend::Volcano(policy) => (
            VOLCANO_POD_GROUP_API_VERSION,
            PodGroupSpec {
                min_member,
                queue: Some(policy.queue.clone()),
                priority_class_name: Some(policy.priority_class_name.clone()),
                ..Default::default()
            },
        ),
    };

    Some(PodGroup {
        api_version: api_version.to_string(),
        kind: "PodGroup".to_string(),
        metadata: ObjectMeta {
            name: Some(backend.pod_group_name(identity.name)),
            namespace: Some(identity.namespace.to_string()),
            labels: Some(BTreeMap::from([
                (LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_RBG.to_string()),
                (LABEL_NAME.to_string(), identity.name.to_string()),
            ])),
            owner_references: rbg.controller_owner_ref(&()).map(|oref| vec![oref]),
            ..Default::default()
        },
        spec,
    })
}

/// Replicas required for the gang, saturated at the int32 limit of `minMember`
fn min_member(rbg: &RoleBasedGroup, identity: &GroupIdentity<'_>) -> u32 {
    match rbg.spec.total_replicas() {
        Some(total) if total <= MAX_TOTAL_REPLICAS => total,
        _ => {
            warn!(group = %identity, "replica total exceeds PodGroup minMember range; capping");
            MAX_TOTAL_REPLICAS
        }
    }
}

/// Render every role's pod template with group labels and the scheduling protocol.
pub fn compile_role_templates(rbg: &RoleBasedGroup) -> BTreeMap<String, PodTemplateSpec> {
    let identity = GroupIdentity::of(rbg);

    rbg.spec
        .roles
        .iter()
        .map(|(role_name, role)| {
            let mut template = role.template.clone();

            let labels = labels_mut(&mut template);
            labels.insert(GROUP_NAME_LABEL_KEY.to_string(), identity.name.to_string());
            labels.insert(ROLE_NAME_LABEL_KEY.to_string(), role_name.clone());

            inject_pod_group_protocol(rbg, &mut template);
            (role_name.clone(), template)
        })
        .collect()
}
