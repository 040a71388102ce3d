//! Ingress and egress gateway settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

string_enum! {
    pub enum RouterModeType ("router mode") {
        Standard => "standard",
        SniDnat => "sni-dnat",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewaysConfig {
    /// Master switch for every gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_ingress: Option<IngressGatewayConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_egress: Option<GatewayConfig>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub ingress_gateways: IndexMap<String, IngressGatewayConfig>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub egress_gateways: IndexMap<String, GatewayConfig>,

    /// Automatic route creation for the cluster ingress gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openshift_route: Option<OpenShiftRouteConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<GatewayServiceConfig>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub router_mode: Option<RouterModeType>,

    /// Networks visible through this gateway, comma separated in legacy form
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub request_network_view: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngressGatewayConfig {
    #[serde(flatten)]
    pub gateway: GatewayConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sds: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayServiceConfig {
    /// Kubernetes service type, e.g. `ClusterIP`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServicePort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub port: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenShiftRouteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}
