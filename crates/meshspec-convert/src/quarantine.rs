//! Error quarantine
//!
//! A legacy spec that fails to convert does not produce a half-populated
//! typed spec. The result instead carries every subsystem block absent and a
//! quarantine document holding the error text plus verbatim copies of the
//! original settings:
//!
//! ```yaml
//! quarantine:
//!   errored:
//!     message: "Unknown version 'v9.9'"
//!     istio: { ... }
//!     3scale: { ... }
//! ```

use meshspec_core::{ControlPlaneSpec, LegacySpec, Map, Value, Values};

use crate::error::Result;

pub const ERRORED_MESSAGE: &str = "errored.message";
pub const ERRORED_ISTIO: &str = "errored.istio";
pub const ERRORED_THREE_SCALE: &str = "errored.3scale";

/// Build the degraded result for a legacy spec whose conversion failed
pub fn quarantined(legacy: &LegacySpec, error: &impl std::fmt::Display) -> ControlPlaneSpec {
    let mut errored = Map::new();
    errored.insert("message".to_string(), Value::String(error.to_string()));
    if let Some(istio) = legacy.istio.as_ref().filter(|v| !v.is_empty()) {
        errored.insert("istio".to_string(), istio.deep_copy().into());
    }
    if let Some(three_scale) = legacy.three_scale.as_ref().filter(|v| !v.is_empty()) {
        errored.insert("3scale".to_string(), three_scale.deep_copy().into());
    }

    let mut quarantine = Map::new();
    quarantine.insert("errored".to_string(), Value::Map(errored));

    let mut spec = ControlPlaneSpec {
        version: legacy.version.clone(),
        profiles: legacy.profile_names(),
        quarantine: Some(Values::from(quarantine)),
        ..Default::default()
    };
    spec.clear_blocks();
    spec
}

/// The error text recorded in a quarantine document
pub fn error_message(quarantine: &Values) -> Result<Option<String>> {
    Ok(quarantine.get(ERRORED_MESSAGE)?)
}

/// Recover the original `(istio, three_scale)` settings from a quarantine document
pub fn restore(quarantine: &Values) -> Result<(Option<Values>, Option<Values>)> {
    let istio = quarantine.get::<Values>(ERRORED_ISTIO)?;
    let three_scale = quarantine.get::<Values>(ERRORED_THREE_SCALE)?;
    Ok((istio, three_scale))
}
