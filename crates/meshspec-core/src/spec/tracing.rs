//! Distributed tracing settings

use serde::{Deserialize, Serialize};

string_enum! {
    pub enum TracerType ("tracer type") {
        None => "None",
        Jaeger => "Jaeger",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TracingConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tracer_type: Option<TracerType>,

    /// Sampling rate in hundredths of a percent (0 to 10000)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<i32>,
}
