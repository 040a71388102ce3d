//! Control plane specifications
//!
//! Two shapes describe the same control plane:
//!
//! - [`LegacySpec`]: version, profile list and two loosely-typed settings
//!   documents (the mesh settings and the 3scale add-on settings)
//! - [`ControlPlaneSpec`]: version, profile list and one optional, strongly
//!   typed block per subsystem
//!
//! This module only defines the data; converting between the two lives in
//! `meshspec-convert`.

use serde::{Deserialize, Serialize};

use crate::values::Values;

/// Defines a closed set of string-valued settings.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` (failing with
/// [`CoreError::UnknownEnumValue`](crate::error::CoreError::UnknownEnumValue))
/// and string-based serde impls.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(crate::error::CoreError::UnknownEnumValue {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Some(format!("expected one of: {}", [$($text),+].join(", "))),
                    }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

mod addons;
mod cluster;
mod gateways;
mod legacy;
mod policy;
mod proxy;
mod runtime;
mod security;
mod telemetry;
mod tracing;

pub use addons::*;
pub use cluster::*;
pub use gateways::*;
pub use legacy::LegacySpec;
pub use policy::*;
pub use proxy::*;
pub use runtime::*;
pub use security::*;
pub use telemetry::*;
pub use self::tracing::*;

/// The strongly typed control plane specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlPlaneSpec {
    /// Control plane version, e.g. `v2.0`; empty selects the default version
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Profiles applied, in order, beneath this spec
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<GeneralConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetryConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing: Option<TracingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateways: Option<GatewaysConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub addons: Option<AddonsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeConfig>,

    /// Legacy settings with no typed equivalent, carried through unchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_preview: Option<Values>,

    /// Original content and error text of a conversion that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarantine: Option<Values>,
}

impl ControlPlaneSpec {
    /// Whether this spec is the degraded result of a failed conversion
    pub fn is_quarantined(&self) -> bool {
        self.quarantine.is_some()
    }

    /// Reset every subsystem block (and tech preview content) to absent
    pub fn clear_blocks(&mut self) {
        self.cluster = None;
        self.general = None;
        self.policy = None;
        self.proxy = None;
        self.security = None;
        self.telemetry = None;
        self.tracing = None;
        self.gateways = None;
        self.addons = None;
        self.runtime = None;
        self.tech_preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_string_enum_parse_and_display() {
        assert_eq!("Mixer".parse::<PolicyType>().unwrap(), PolicyType::Mixer);
        assert_eq!(PolicyType::Istiod.to_string(), "Istiod");
        assert_eq!(PolicyType::ALL.len(), 4);
    }

    #[test]
    fn test_string_enum_rejects_unknown() {
        let err = "mixer".parse::<PolicyType>().unwrap_err();
        match err {
            CoreError::UnknownEnumValue { kind, value, expected } => {
                assert_eq!(kind, "policy type");
                assert_eq!(value, "mixer");
                assert!(expected.unwrap().contains("Mixer"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_typed_spec_yaml() {
        let spec: ControlPlaneSpec = serde_yaml::from_str(
            r#"
version: v2.0
profiles: [default]
policy:
  type: Remote
  remote:
    address: svc.ns
    createService: true
tracing:
  type: Jaeger
  sampling: 100
"#,
        )
        .unwrap();

        assert_eq!(spec.version, "v2.0");
        let policy = spec.policy.as_ref().unwrap();
        assert_eq!(policy.policy_type, Some(PolicyType::Remote));
        assert_eq!(policy.remote.as_ref().unwrap().address.as_deref(), Some("svc.ns"));
        assert_eq!(spec.tracing.as_ref().unwrap().sampling, Some(100));
        assert!(spec.proxy.is_none());

        let yaml = serde_yaml::to_string(&spec).unwrap();
        let reparsed: ControlPlaneSpec = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(spec, reparsed);
    }

    #[test]
    fn test_unknown_enum_in_yaml_fails() {
        let result: Result<ControlPlaneSpec, _> =
            serde_yaml::from_str("policy:\n  type: Sometimes\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_clear_blocks() {
        let mut spec = ControlPlaneSpec {
            version: "v2.0".into(),
            policy: Some(PolicyConfig::default()),
            tech_preview: Some(Values::new()),
            quarantine: Some(Values::new()),
            ..Default::default()
        };
        spec.clear_blocks();

        assert!(spec.policy.is_none());
        assert!(spec.tech_preview.is_none());
        assert!(spec.is_quarantined());
        assert_eq!(spec.version, "v2.0");
    }
}
