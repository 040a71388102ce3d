//! Sidecar proxy settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::runtime::ContainerConfig;

string_enum! {
    /// How the proxy's traffic redirection is installed
    pub enum ProxyNetworkInitType ("proxy network init type") {
        Cni => "CNI",
        InitContainer => "InitContainer",
    }
}

string_enum! {
    pub enum OutboundTrafficPolicy ("outbound traffic policy") {
        AllowAny => "ALLOW_ANY",
        RegistryOnly => "REGISTRY_ONLY",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// e.g. `misc:error,upstream:debug`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_log_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_logging: Option<ProxyAccessLoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub networking: Option<ProxyNetworkingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<ProxyRuntimeConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub injection: Option<ProxyInjectionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyAccessLoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyNetworkingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialization: Option<ProxyNetworkInitConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_control: Option<ProxyTrafficControlConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProxyNetworkProtocolConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<ProxyDnsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyNetworkInitConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub init_type: Option<ProxyNetworkInitType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyTrafficControlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound: Option<ProxyInboundTrafficControlConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound: Option<ProxyOutboundTrafficControlConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyInboundTrafficControlConfig {
    /// `REDIRECT` or `TPROXY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interception_mode: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_ports: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_ports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyOutboundTrafficControlConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_ip_ranges: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_ip_ranges: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_ports: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<OutboundTrafficPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyNetworkProtocolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_timeout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyDnsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyRuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ProxyReadinessConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyReadinessConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_application_probes: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyInjectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_inject: Option<bool>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub injected_annotations: IndexMap<String, String>,
}
