//! Policy enforcement settings

use serde::{Deserialize, Serialize};

string_enum! {
    /// Which component enforces policy checks
    pub enum PolicyType ("policy type") {
        None => "None",
        Mixer => "Mixer",
        Remote => "Remote",
        Istiod => "Istiod",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<PolicyType>,

    /// Settings used when `policy_type` is `Mixer`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixer: Option<MixerPolicyConfig>,

    /// Settings used when `policy_type` is `Remote`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemotePolicyConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixerPolicyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_checks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_open: Option<bool>,
}

/// A policy server running outside this control plane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemotePolicyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Create a local service/endpoints pair for the remote address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_service: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_checks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_open: Option<bool>,
}
