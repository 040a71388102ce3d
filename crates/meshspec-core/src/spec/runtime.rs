//! Deployment, pod and container settings for control plane components

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::values::Values;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultRuntimeConfig>,

    /// Per-component overrides, keyed by component name (`pilot`, `kiali`, ...)
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub components: IndexMap<String, ComponentRuntimeConfig>,
}

/// Settings applied to every component unless overridden
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultRuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<CommonContainerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<CommonPodConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_disruption_budget: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonContainerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_registry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// Container settings for a single component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerConfig {
    #[serde(flatten)]
    pub common: CommonContainerConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub requests: IndexMap<String, String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub limits: IndexMap<String, String>,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.limits.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonPodConfig {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub node_selector: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Values>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentRuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentRuntimeConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodRuntimeConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentRuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<AutoScalerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoScalerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_cpu_utilization_percentage: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodRuntimeConfig {
    #[serde(flatten)]
    pub common: CommonPodConfig,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, String>,
}
