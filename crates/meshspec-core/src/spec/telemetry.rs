//! Telemetry collection settings

use serde::{Deserialize, Serialize};

string_enum! {
    /// Which component collects telemetry
    pub enum TelemetryType ("telemetry type") {
        None => "None",
        Mixer => "Mixer",
        Remote => "Remote",
        Istiod => "Istiod",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub telemetry_type: Option<TelemetryType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixer: Option<MixerTelemetryConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteTelemetryConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub istiod: Option<IstiodTelemetryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixerTelemetryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_affinity: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batching: Option<TelemetryBatchingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapters: Option<MixerTelemetryAdaptersConfig>,
}

/// Report batching shared by the Mixer and Remote collectors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryBatchingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<i32>,

    /// Duration string, e.g. `1s`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixerTelemetryAdaptersConfig {
    #[serde(rename = "useAdapterCRDs", skip_serializing_if = "Option::is_none")]
    pub use_adapter_crds: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetesenv: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdio: Option<MixerTelemetryStdioConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<MixerTelemetryPrometheusConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixerTelemetryStdioConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_as_json: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixerTelemetryPrometheusConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_expiry_duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteTelemetryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_service: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batching: Option<TelemetryBatchingConfig>,
}

/// In-proxy telemetry filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IstiodTelemetryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_exchange: Option<MetadataExchangeConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus_filter: Option<PrometheusFilterConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetadataExchangeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wasm_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrometheusFilterConfig {
    /// Merge application metrics into the proxy's scrape endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wasm_enabled: Option<bool>,
}
