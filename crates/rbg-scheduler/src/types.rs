//! PodGroup serialization types
//!
//! Typed representation of the two PodGroup flavours this crate targets:
//! scheduler-plugins `scheduling.x-k8s.io/v1alpha1` and Volcano
//! `scheduling.volcano.sh/v1beta1`. Serialized with serde for server-side apply.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// API version of the coscheduling PodGroup
pub const KUBE_POD_GROUP_API_VERSION: &str = "scheduling.x-k8s.io/v1alpha1";

/// API version of the Volcano PodGroup
pub const VOLCANO_POD_GROUP_API_VERSION: &str = "scheduling.volcano.sh/v1beta1";

/// PodGroup resource (Kind: PodGroup) for either backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodGroup {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PodGroupSpec,
}

/// PodGroup spec. Fields a backend does not understand are left unset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodGroupSpec {
    /// Pods that must be schedulable together before any is bound
    pub min_member: u32,

    /// Volcano queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,

    /// Volcano priority class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    /// Coscheduling wait limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_timeout_seconds: Option<i32>,
}

impl PodGroup {
    /// Serialize to a JSON value suitable for a server-side apply patch
    pub fn to_json(&self) -> rbg_common::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted() {
        let pg = PodGroup {
            api_version: KUBE_POD_GROUP_API_VERSION.to_string(),
            kind: "PodGroup".to_string(),
            metadata: ObjectMeta {
                name: Some("infer-group".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: PodGroupSpec {
                min_member: 3,
                ..Default::default()
            },
        };

        let json = pg.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "apiVersion": "scheduling.x-k8s.io/v1alpha1",
                "kind": "PodGroup",
                "metadata": {"name": "infer-group", "namespace": "default"},
                "spec": {"minMember": 3}
            })
        );
    }
}
