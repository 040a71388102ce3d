//! Optional add-on components bundled with the control plane

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::values::Values;

string_enum! {
    /// Backing store for trace data
    pub enum JaegerStorageType ("jaeger storage type") {
        Memory => "Memory",
        Elasticsearch => "Elasticsearch",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddonsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusAddonConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grafana: Option<GrafanaAddonConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kiali: Option<KialiAddonConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jaeger: Option<JaegerAddonConfig>,

    #[serde(rename = "3scale", skip_serializing_if = "Option::is_none")]
    pub three_scale: Option<ThreeScaleConfig>,
}

// Prometheus

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrometheusAddonConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Address of an existing Prometheus, used by other add-ons
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<PrometheusInstallConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrometheusInstallConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_interval: Option<String>,

    #[serde(rename = "useTLS", skip_serializing_if = "Option::is_none")]
    pub use_tls: Option<bool>,
}

// Grafana

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrafanaAddonConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<GrafanaInstallConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrafanaInstallConfig {
    /// Environment passed to the Grafana container
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub config: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<GrafanaPersistenceConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<GrafanaSecurityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrafanaPersistenceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrafanaSecurityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase_key: Option<String>,
}

// Kiali

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KialiAddonConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Name of the Kiali resource managed for this mesh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<KialiInstallConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KialiInstallConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<KialiDashboardConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ComponentServiceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KialiDashboardConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_grafana: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_prometheus: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_tracing: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentServiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<ComponentIngressConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentIngressConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_path: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

// Jaeger

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JaegerAddonConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<JaegerInstallConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JaegerInstallConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<JaegerStorageConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<ComponentIngressConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JaegerStorageConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<JaegerStorageType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<JaegerMemoryStorageConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<JaegerElasticsearchStorageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JaegerMemoryStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_traces: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JaegerElasticsearchStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i32>,

    /// Free-form storage settings handed to the Elasticsearch deployment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<Values>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_cleaner: Option<Values>,
}

// 3scale

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreeScaleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_addr: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(rename = "logJSON", skip_serializing_if = "Option::is_none")]
    pub log_json: Option<bool>,

    #[serde(rename = "logGRPC", skip_serializing_if = "Option::is_none")]
    pub log_grpc: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ThreeScaleMetricsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<ThreeScaleSystemConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ThreeScaleClientConfig>,

    #[serde(rename = "grpc", skip_serializing_if = "Option::is_none")]
    pub grpc: Option<ThreeScaleGrpcConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<ThreeScaleBackendConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreeScaleMetricsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<bool>,
}

/// Caching of 3scale system (configuration) lookups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreeScaleSystemConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_max_size: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_refresh_retries: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_refresh_interval: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreeScaleClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_insecure_connections: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreeScaleGrpcConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_conn_timeout: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreeScaleBackendConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_cache: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_flush_interval: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_fail_closed: Option<bool>,
}
