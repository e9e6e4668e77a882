//! Pod-template gang-scheduling protocol
//!
//! Writes the label or annotations a scheduler uses to recognize a pod as a
//! member of a PodGroup, and resolves the PodGroup name the downstream
//! reconciler must create. Both derive from [`SchedulerBackend::for_group`]
//! so the reference on the pods and the resource name never disagree.

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use rbg_common::crd::RoleBasedGroup;
use rbg_common::DEFAULT_NAMESPACE;
use tracing::{debug, trace};

use crate::backend::SchedulerBackend;

/// Label referencing the coscheduling PodGroup a pod belongs to
pub const KUBE_POD_GROUP_LABEL_KEY: &str = "scheduling.x-k8s.io/pod-group";

/// CRD of the coscheduling PodGroup
pub const KUBE_POD_GROUP_CRD_NAME: &str = "podgroups.scheduling.x-k8s.io";

/// Annotation referencing the Volcano PodGroup a pod belongs to
pub const VOLCANO_POD_GROUP_ANNOTATION_KEY: &str = "scheduling.k8s.io/group-name";

/// Annotation carrying the Volcano priority class hint
pub const VOLCANO_PRIORITY_CLASS_ANNOTATION_KEY: &str = "volcano.sh/priority-class-name";

/// Annotation carrying the Volcano queue hint
pub const VOLCANO_QUEUE_ANNOTATION_KEY: &str = "volcano.sh/queue-name";

/// CRD of the Volcano PodGroup
pub const VOLCANO_POD_GROUP_CRD_NAME: &str = "podgroups.scheduling.volcano.sh";

/// `(name, namespace)` of a RoleBasedGroup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupIdentity<'a> {
    /// Group name, empty if the object has none yet
    pub name: &'a str,
    /// Group namespace, `default` if unset
    pub namespace: &'a str,
}

impl<'a> GroupIdentity<'a> {
    /// Identity of a RoleBasedGroup
    pub fn of(rbg: &'a RoleBasedGroup) -> Self {
        Self {
            name: rbg.metadata.name.as_deref().unwrap_or_default(),
            namespace: rbg
                .metadata
                .namespace
                .as_deref()
                .unwrap_or(DEFAULT_NAMESPACE),
        }
    }

    /// Whether the group has a name a PodGroup can be derived from
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

impl fmt::Display for GroupIdentity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Name of the PodGroup resource to ensure for `rbg`.
///
/// Empty when the group is not gang scheduled; callers must treat the empty
/// string as "nothing to create or look up".
pub fn pod_group_name(rbg: &RoleBasedGroup) -> String {
    let identity = GroupIdentity::of(rbg);
    SchedulerBackend::for_group(rbg).pod_group_name(identity.name)
}

/// Write the gang-scheduling protocol for `rbg` onto a pod template.
///
/// - no gang scheduling: no writes; existing entries stay as they are
/// - kube: sets [`KUBE_POD_GROUP_LABEL_KEY`]
/// - volcano: sets [`VOLCANO_POD_GROUP_ANNOTATION_KEY`] plus the priority
///   class and queue hints
///
/// A group without a name gets no writes either: its PodGroup name would be
/// the empty "nothing to create" value.
///
/// Missing metadata maps are created on demand; entries written by other
/// concerns are preserved. Repeated calls overwrite the same keys with the
/// same values.
pub fn inject_pod_group_protocol(rbg: &RoleBasedGroup, template: &mut PodTemplateSpec) {
    let identity = GroupIdentity::of(rbg);
    let backend = SchedulerBackend::for_group(rbg);

    if backend.is_gang() && !identity.is_named() {
        trace!(group = %identity, %backend, "unnamed group; pod template untouched");
        return;
    }

    match backend {
        SchedulerBackend::None => {
            trace!(group = %identity, "gang scheduling not requested; pod template untouched");
        }
        SchedulerBackend::Kube(_) => {
            let group_name = backend.pod_group_name(identity.name);
            labels_mut(template).insert(KUBE_POD_GROUP_LABEL_KEY.to_string(), group_name.clone());
            debug!(group = %identity, pod_group = %group_name, %backend, "injected pod group label");
        }
        SchedulerBackend::Volcano(policy) => {
            let group_name = backend.pod_group_name(identity.name);
            let annotations = annotations_mut(template);
            annotations.insert(
                VOLCANO_POD_GROUP_ANNOTATION_KEY.to_string(),
                group_name.clone(),
            );
            annotations.insert(
                VOLCANO_PRIORITY_CLASS_ANNOTATION_KEY.to_string(),
                policy.priority_class_name.clone(),
            );
            annotations.insert(
                VOLCANO_QUEUE_ANNOTATION_KEY.to_string(),
                policy.queue.clone(),
            );
            debug!(
                group = %identity,
                pod_group = %group_name,
                queue = %policy.queue,
                %backend,
                "injected pod group annotations"
            );
        }
    }
}

pub(crate) fn labels_mut(template: &mut PodTemplateSpec) -> &mut BTreeMap<String, String> {
    metadata_mut(template)
        .labels
        .get_or_insert_with(BTreeMap::new)
}

fn annotations_mut(template: &mut PodTemplateSpec) -> &mut BTreeMap<String, String> {
    metadata_mut(template)
        .annotations
        .get_or_insert_with(BTreeMap::new)
}

fn metadata_mut(template: &mut PodTemplateSpec) -> &mut ObjectMeta {
    template.metadata.get_or_insert_with(ObjectMeta::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbg_common::crd::RoleBasedGroupSpec;

    fn group(spec: RoleBasedGroupSpec) -> RoleBasedGroup {
        let mut rbg = RoleBasedGroup::new("infer-group", spec);
        rbg.metadata.namespace = Some("default".to_string());
        rbg
    }

    /// Template with both maps present but empty
    fn empty_maps() -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(BTreeMap::new()),
                annotations: Some(BTreeMap::new()),
                ..Default::default()
            }),
            spec: None,
        }
    }

    fn labels(t: &PodTemplateSpec) -> BTreeMap<String, String> {
        t.metadata
            .as_ref()
            .and_then(|m| m.labels.clone())
            .unwrap_or_default()
    }

    fn annotations(t: &PodTemplateSpec) -> BTreeMap<String, String> {
        t.metadata
            .as_ref()
            .and_then(|m| m.annotations.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Injection
    // =========================================================================

    #[test]
    fn kube_gang_scheduling_sets_label() {
        let rbg = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(true));
        let mut template = empty_maps();

        inject_pod_group_protocol(&rbg, &mut template);

        assert_eq!(
            labels(&template),
            BTreeMap::from([(KUBE_POD_GROUP_LABEL_KEY.to_string(), "infer-group".to_string())])
        );
        assert!(annotations(&template).is_empty());
    }

    #[test]
    fn volcano_gang_scheduling_sets_annotations() {
        let rbg = group(
            RoleBasedGroupSpec::default().with_volcano_gang_scheduling("high-priority", "gpu-queue"),
        );
        let mut template = empty_maps();

        inject_pod_group_protocol(&rbg, &mut template);

        assert_eq!(
            annotations(&template),
            BTreeMap::from([
                (
                    VOLCANO_POD_GROUP_ANNOTATION_KEY.to_string(),
                    "infer-group".to_string()
                ),
                (
                    VOLCANO_PRIORITY_CLASS_ANNOTATION_KEY.to_string(),
                    "high-priority".to_string()
                ),
                (VOLCANO_QUEUE_ANNOTATION_KEY.to_string(), "gpu-queue".to_string()),
            ])
        );
        assert!(labels(&template).is_empty());
    }

    #[test]
    fn no_gang_scheduling_writes_nothing() {
        let rbg = group(RoleBasedGroupSpec::default());
        let mut template = empty_maps();

        inject_pod_group_protocol(&rbg, &mut template);

        assert_eq!(template, empty_maps());
        assert_eq!(pod_group_name(&rbg), "");
    }

    #[test]
    fn no_gang_scheduling_leaves_populated_maps_unchanged() {
        let populated = || PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(BTreeMap::from([
                    ("app".to_string(), "llm".to_string()),
                    ("tier".to_string(), "serving".to_string()),
                ])),
                annotations: Some(BTreeMap::from([(
                    "prometheus.io/scrape".to_string(),
                    "true".to_string(),
                )])),
                ..Default::default()
            }),
            spec: None,
        };

        for spec in [
            RoleBasedGroupSpec::default(),
            RoleBasedGroupSpec::default().with_kube_gang_scheduling(false),
        ] {
            let rbg = group(spec);
            let mut template = populated();

            inject_pod_group_protocol(&rbg, &mut template);

            assert_eq!(template, populated());
            assert_eq!(labels(&template).len(), 2);
            assert_eq!(annotations(&template).len(), 1);
            assert!(!labels(&template).contains_key(KUBE_POD_GROUP_LABEL_KEY));
            assert!(!annotations(&template).contains_key(VOLCANO_POD_GROUP_ANNOTATION_KEY));
        }
    }

    #[test]
    fn unnamed_group_gets_no_group_reference() {
        for spec in [
            RoleBasedGroupSpec::default().with_kube_gang_scheduling(true),
            RoleBasedGroupSpec::default().with_volcano_gang_scheduling("high-priority", "gpu-queue"),
        ] {
            let mut rbg = group(spec);
            rbg.metadata.name = None;
            let mut template = empty_maps();

            inject_pod_group_protocol(&rbg, &mut template);

            assert_eq!(template, empty_maps());
            assert_eq!(pod_group_name(&rbg), "");
        }
    }

    #[test]
    fn disabled_kube_behaves_like_no_policy() {
        let rbg = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(false));
        let mut template = empty_maps();

        inject_pod_group_protocol(&rbg, &mut template);

        assert_eq!(template, empty_maps());
        assert_eq!(pod_group_name(&rbg), "");
    }

    #[test]
    fn no_gang_scheduling_does_not_create_metadata() {
        let rbg = group(RoleBasedGroupSpec::default());
        let mut template = PodTemplateSpec::default();

        inject_pod_group_protocol(&rbg, &mut template);

        assert!(template.metadata.is_none());
    }

    #[test]
    fn missing_metadata_is_created_on_demand() {
        let rbg = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(true));
        let mut template = PodTemplateSpec::default();

        inject_pod_group_protocol(&rbg, &mut template);

        let meta = template.metadata.as_ref().unwrap();
        assert!(meta.labels.is_some());
        assert!(meta.annotations.is_none());
        assert_eq!(labels(&template)[KUBE_POD_GROUP_LABEL_KEY], "infer-group");
    }

    #[test]
    fn missing_annotations_map_is_created_on_demand() {
        let rbg = group(
            RoleBasedGroupSpec::default().with_volcano_gang_scheduling("high-priority", "gpu-queue"),
        );
        let mut template = PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(BTreeMap::from([("app".to_string(), "llm".to_string())])),
                ..Default::default()
            }),
            spec: None,
        };

        inject_pod_group_protocol(&rbg, &mut template);

        assert_eq!(annotations(&template).len(), 3);
        assert_eq!(
            labels(&template),
            BTreeMap::from([("app".to_string(), "llm".to_string())])
        );
    }

    #[test]
    fn existing_entries_are_preserved() {
        let rbg = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(true));
        let mut template = PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(BTreeMap::from([("app".to_string(), "llm".to_string())])),
                annotations: Some(BTreeMap::from([(
                    "prometheus.io/scrape".to_string(),
                    "true".to_string(),
                )])),
                ..Default::default()
            }),
            spec: None,
        };

        inject_pod_group_protocol(&rbg, &mut template);

        let labels = labels(&template);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["app"], "llm");
        assert_eq!(labels[KUBE_POD_GROUP_LABEL_KEY], "infer-group");
        assert_eq!(annotations(&template).len(), 1);
    }

    #[test]
    fn injection_is_idempotent() {
        for spec in [
            RoleBasedGroupSpec::default(),
            RoleBasedGroupSpec::default().with_kube_gang_scheduling(true),
            RoleBasedGroupSpec::default().with_volcano_gang_scheduling("high-priority", "gpu-queue"),
        ] {
            let rbg = group(spec);
            let mut once = PodTemplateSpec::default();
            inject_pod_group_protocol(&rbg, &mut once);

            let mut twice = PodTemplateSpec::default();
            inject_pod_group_protocol(&rbg, &mut twice);
            inject_pod_group_protocol(&rbg, &mut twice);

            assert_eq!(once, twice);
        }
    }

    #[test]
    fn stale_metadata_is_left_in_place_when_disabled() {
        let enabled = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(true));
        let disabled = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(false));
        let mut template = PodTemplateSpec::default();

        inject_pod_group_protocol(&enabled, &mut template);
        inject_pod_group_protocol(&disabled, &mut template);

        assert_eq!(labels(&template)[KUBE_POD_GROUP_LABEL_KEY], "infer-group");
    }

    #[test]
    fn priority_and_queue_pass_through_verbatim() {
        let rbg = group(
            RoleBasedGroupSpec::default().with_volcano_gang_scheduling(" Odd Class ", "q/with/slash"),
        );
        let mut template = PodTemplateSpec::default();

        inject_pod_group_protocol(&rbg, &mut template);

        let annotations = annotations(&template);
        assert_eq!(annotations[VOLCANO_PRIORITY_CLASS_ANNOTATION_KEY], " Odd Class ");
        assert_eq!(annotations[VOLCANO_QUEUE_ANNOTATION_KEY], "q/with/slash");
    }

    // =========================================================================
    // Name resolution
    // =========================================================================

    #[test]
    fn pod_group_name_matches_group_for_both_backends() {
        let kube = group(RoleBasedGroupSpec::default().with_kube_gang_scheduling(true));
        let volcano = group(
            RoleBasedGroupSpec::default().with_volcano_gang_scheduling("high-priority", "gpu-queue"),
        );
        assert_eq!(pod_group_name(&kube), "infer-group");
        assert_eq!(pod_group_name(&volcano), "infer-group");
    }

    #[test]
    fn distinct_groups_get_distinct_names() {
        let a = RoleBasedGroup::new(
            "infer-group-a",
            RoleBasedGroupSpec::default().with_kube_gang_scheduling(true),
        );
        let b = RoleBasedGroup::new(
            "infer-group-b",
            RoleBasedGroupSpec::default().with_kube_gang_scheduling(true),
        );
        assert_ne!(pod_group_name(&a), pod_group_name(&b));
    }

    #[test]
    fn identity_defaults_namespace() {
        let rbg = RoleBasedGroup::new("infer-group", RoleBasedGroupSpec::default());
        let identity = GroupIdentity::of(&rbg);
        assert_eq!(identity.namespace, "default");
        assert_eq!(identity.to_string(), "default/infer-group");
    }
}
