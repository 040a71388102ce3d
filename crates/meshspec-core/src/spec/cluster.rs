//! Cluster-wide and general settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Cluster network plugin mode carried over from the legacy spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_cluster: Option<MultiClusterConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_expansion: Option<MeshExpansionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiClusterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshExpansionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Report configuration analysis results on resource status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_messages: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log level per control plane component, e.g. `default: info`
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub component_levels: IndexMap<String, String>,

    #[serde(rename = "logAsJSON", skip_serializing_if = "Option::is_none")]
    pub log_as_json: Option<bool>,
}
