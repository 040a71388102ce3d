//! Per-version conversion strategies
//!
//! A strategy answers the questions whose answer changed between control
//! plane releases. The converter asks; it never branches on a version itself.

use meshspec_core::ControlPlaneSpec;
use meshspec_core::spec::{PolicyType, TelemetryType};

use crate::error::{Result, VersionError};
use crate::version::Version;

/// Charts installed together; members of a group have no ordering between them
pub type ChartGroup = &'static [&'static str];

/// A port exposed for mesh expansion on the cluster ingress gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionPort {
    pub name: &'static str,
    pub port: i64,
    pub target_port: i64,
}

/// Legacy flags consulted when a policy type is not stated explicitly
///
/// `None` means the flag was not set at all, which is different from being
/// set to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyFlags {
    /// `mixer.policy.enabled`
    pub mixer_enabled: Option<bool>,
    /// Whether a remote policy address is configured
    pub remote_configured: bool,
}

/// Legacy flags consulted when a telemetry type is not stated explicitly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryFlags {
    /// `telemetry.enabled`
    pub enabled: Option<bool>,
    /// `mixer.telemetry.enabled`
    pub mixer_enabled: Option<bool>,
    /// `telemetry.v1.enabled`
    pub v1_enabled: Option<bool>,
    /// `telemetry.v2.enabled`
    pub v2_enabled: Option<bool>,
    /// Whether a remote telemetry address is configured
    pub remote_configured: bool,
}

/// Version-specific conversion rules
pub trait VersionStrategy: Send + Sync {
    /// The version this strategy serves
    fn version(&self) -> Version;

    /// Chart groups in install order
    fn chart_install_order(&self) -> &'static [ChartGroup];

    /// Infer the policy type from legacy flags; `None` leaves it unset
    fn infer_policy_type(&self, flags: &PolicyFlags) -> Option<PolicyType>;

    /// Infer the telemetry type from legacy flags; `None` leaves it unset
    fn infer_telemetry_type(&self, flags: &TelemetryFlags) -> Option<TelemetryType>;

    /// Dotted legacy path holding the trust domain
    fn trust_domain_path(&self) -> &'static str;

    /// Ports opened on the cluster ingress gateway for mesh expansion
    fn expansion_ports(&self) -> &'static [ExpansionPort];

    /// Reject settings this version cannot honor
    fn validate(&self, spec: &ControlPlaneSpec) -> Result<()>;
}

const V1_CHARTS: &[ChartGroup] = &[
    &["istio"],
    &["istio/charts/security"],
    &["istio/charts/prometheus"],
    &["istio/charts/galley"],
    &[
        "istio/charts/mixer",
        "istio/charts/pilot",
        "istio/charts/gateways",
        "istio/charts/sidecarInjectorWebhook",
    ],
    &["istio/charts/grafana", "istio/charts/tracing", "istio/charts/kiali"],
    &["maistra-threescale"],
];

const V2_0_CHARTS: &[ChartGroup] = &[
    &["istio-discovery"],
    &["istio-policy", "istio-telemetry"],
    &["istio-ingress", "istio-egress"],
    &["prometheus"],
    &["grafana", "tracing", "kiali"],
    &["maistra-threescale"],
];

const V2_1_CHARTS: &[ChartGroup] = &[
    &["istio-discovery"],
    &["istio-ingress", "istio-egress"],
    &["prometheus"],
    &["grafana", "tracing", "kiali"],
    &["maistra-threescale"],
];

const V1_EXPANSION_PORTS: &[ExpansionPort] = &[
    ExpansionPort {
        name: "tcp-pilot-grpc-tls",
        port: 15011,
        target_port: 15011,
    },
    ExpansionPort {
        name: "tcp-mixer-grpc-tls",
        port: 15004,
        target_port: 15004,
    },
    ExpansionPort {
        name: "tcp-citadel-grpc-tls",
        port: 8060,
        target_port: 8060,
    },
    ExpansionPort {
        name: "tcp-dns-tls",
        port: 853,
        target_port: 853,
    },
];

const V2_EXPANSION_PORTS: &[ExpansionPort] = &[
    ExpansionPort {
        name: "tcp-istiod",
        port: 15012,
        target_port: 15012,
    },
    ExpansionPort {
        name: "tcp-dns-tls",
        port: 853,
        target_port: 8853,
    },
];

/// Strategy for the v1.x line (Mixer based, Citadel CA)
#[derive(Debug, Clone, Copy)]
pub struct V1Strategy {
    version: Version,
}

impl V1Strategy {
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

impl VersionStrategy for V1Strategy {
    fn version(&self) -> Version {
        self.version
    }

    fn chart_install_order(&self) -> &'static [ChartGroup] {
        V1_CHARTS
    }

    fn infer_policy_type(&self, flags: &PolicyFlags) -> Option<PolicyType> {
        match (flags.mixer_enabled, flags.remote_configured) {
            (_, true) => Some(PolicyType::Remote),
            (Some(true), false) => Some(PolicyType::Mixer),
            (Some(false), false) => Some(PolicyType::None),
            (None, false) => None,
        }
    }

    fn infer_telemetry_type(&self, flags: &TelemetryFlags) -> Option<TelemetryType> {
        if flags.enabled == Some(false) {
            return Some(TelemetryType::None);
        }
        match (flags.mixer_enabled, flags.remote_configured) {
            (_, true) => Some(TelemetryType::Remote),
            (Some(true), false) => Some(TelemetryType::Mixer),
            (Some(false), false) => Some(TelemetryType::None),
            (None, false) => None,
        }
    }

    fn trust_domain_path(&self) -> &'static str {
        "global.trustDomain"
    }

    fn expansion_ports(&self) -> &'static [ExpansionPort] {
        V1_EXPANSION_PORTS
    }

    fn validate(&self, spec: &ControlPlaneSpec) -> Result<()> {
        if policy_type(spec) == Some(PolicyType::Istiod) {
            return Err(unsupported(self.version, "Istiod policy"));
        }
        if telemetry_type(spec) == Some(TelemetryType::Istiod) {
            return Err(unsupported(self.version, "Istiod telemetry"));
        }
        Ok(())
    }
}

/// Strategy for v2.0, where Mixer and Istiod telemetry coexist
#[derive(Debug, Default, Clone, Copy)]
pub struct V2_0Strategy;

impl VersionStrategy for V2_0Strategy {
    fn version(&self) -> Version {
        Version::V2_0
    }

    fn chart_install_order(&self) -> &'static [ChartGroup] {
        V2_0_CHARTS
    }

    fn infer_policy_type(&self, flags: &PolicyFlags) -> Option<PolicyType> {
        match (flags.mixer_enabled, flags.remote_configured) {
            (_, true) => Some(PolicyType::Remote),
            (Some(true), false) => Some(PolicyType::Mixer),
            (Some(false), false) => Some(PolicyType::Istiod),
            (None, false) => None,
        }
    }

    fn infer_telemetry_type(&self, flags: &TelemetryFlags) -> Option<TelemetryType> {
        if flags.enabled == Some(false) {
            return Some(TelemetryType::None);
        }
        if flags.remote_configured {
            return Some(TelemetryType::Remote);
        }
        if flags.v2_enabled == Some(true) {
            return Some(TelemetryType::Istiod);
        }
        if flags.mixer_enabled == Some(true) || flags.v1_enabled == Some(true) {
            return Some(TelemetryType::Mixer);
        }
        if flags.mixer_enabled == Some(false) {
            return Some(TelemetryType::Istiod);
        }
        None
    }

    fn trust_domain_path(&self) -> &'static str {
        "meshConfig.trustDomain"
    }

    fn expansion_ports(&self) -> &'static [ExpansionPort] {
        V2_EXPANSION_PORTS
    }

    fn validate(&self, _spec: &ControlPlaneSpec) -> Result<()> {
        Ok(())
    }
}

/// Strategy for v2.1 onwards, where Mixer is gone
#[derive(Debug, Clone, Copy)]
pub struct V2_1Strategy {
    version: Version,
}

impl V2_1Strategy {
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

impl VersionStrategy for V2_1Strategy {
    fn version(&self) -> Version {
        self.version
    }

    fn chart_install_order(&self) -> &'static [ChartGroup] {
        V2_1_CHARTS
    }

    fn infer_policy_type(&self, flags: &PolicyFlags) -> Option<PolicyType> {
        // Mixer is still reported so validation can name it
        match (flags.mixer_enabled, flags.remote_configured) {
            (_, true) => Some(PolicyType::Remote),
            (Some(true), false) => Some(PolicyType::Mixer),
            (Some(false), false) => Some(PolicyType::Istiod),
            (None, false) => None,
        }
    }

    fn infer_telemetry_type(&self, flags: &TelemetryFlags) -> Option<TelemetryType> {
        if flags.enabled == Some(false) {
            return Some(TelemetryType::None);
        }
        if flags.remote_configured {
            return Some(TelemetryType::Remote);
        }
        if flags.mixer_enabled == Some(true) || flags.v1_enabled == Some(true) {
            return Some(TelemetryType::Mixer);
        }
        if flags.v2_enabled == Some(true) || flags.mixer_enabled == Some(false) {
            return Some(TelemetryType::Istiod);
        }
        None
    }

    fn trust_domain_path(&self) -> &'static str {
        "meshConfig.trustDomain"
    }

    fn expansion_ports(&self) -> &'static [ExpansionPort] {
        V2_EXPANSION_PORTS
    }

    fn validate(&self, spec: &ControlPlaneSpec) -> Result<()> {
        if policy_type(spec) == Some(PolicyType::Mixer) {
            return Err(unsupported(self.version, "Mixer policy"));
        }
        if telemetry_type(spec) == Some(TelemetryType::Mixer) {
            return Err(unsupported(self.version, "Mixer telemetry"));
        }
        Ok(())
    }
}

fn policy_type(spec: &ControlPlaneSpec) -> Option<PolicyType> {
    spec.policy.as_ref().and_then(|p| p.policy_type)
}

fn telemetry_type(spec: &ControlPlaneSpec) -> Option<TelemetryType> {
    spec.telemetry.as_ref().and_then(|t| t.telemetry_type)
}

fn unsupported(version: Version, what: &str) -> VersionError {
    VersionError::Unsupported {
        version,
        message: format!("{what} is not supported"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshspec_core::spec::{PolicyConfig, TelemetryConfig};

    fn policy_flags(mixer_enabled: Option<bool>, remote_configured: bool) -> PolicyFlags {
        PolicyFlags {
            mixer_enabled,
            remote_configured,
        }
    }

    #[test]
    fn test_v1_policy_inference() {
        let strategy = V1Strategy::new(Version::V1_1);
        assert_eq!(strategy.infer_policy_type(&policy_flags(Some(true), false)), Some(PolicyType::Mixer));
        assert_eq!(strategy.infer_policy_type(&policy_flags(Some(false), false)), Some(PolicyType::None));
        assert_eq!(strategy.infer_policy_type(&policy_flags(Some(false), true)), Some(PolicyType::Remote));
        assert_eq!(strategy.infer_policy_type(&policy_flags(None, false)), None);
    }

    #[test]
    fn test_v2_policy_inference_prefers_istiod_when_mixer_disabled() {
        let strategy = V2_0Strategy;
        assert_eq!(strategy.infer_policy_type(&policy_flags(Some(false), false)), Some(PolicyType::Istiod));
        assert_eq!(strategy.infer_policy_type(&policy_flags(None, true)), Some(PolicyType::Remote));
        assert_eq!(strategy.infer_policy_type(&policy_flags(None, false)), None);
    }

    #[test]
    fn test_telemetry_inference() {
        let disabled = TelemetryFlags {
            enabled: Some(false),
            mixer_enabled: Some(true),
            ..Default::default()
        };
        assert_eq!(V2_0Strategy.infer_telemetry_type(&disabled), Some(TelemetryType::None));

        let v2 = TelemetryFlags {
            v2_enabled: Some(true),
            mixer_enabled: Some(true),
            ..Default::default()
        };
        assert_eq!(V2_0Strategy.infer_telemetry_type(&v2), Some(TelemetryType::Istiod));
        assert_eq!(
            V2_1Strategy::new(Version::V2_1).infer_telemetry_type(&v2),
            Some(TelemetryType::Mixer)
        );
        assert_eq!(V2_0Strategy.infer_telemetry_type(&TelemetryFlags::default()), None);
    }

    #[test]
    fn test_trust_domain_path_moves_in_v2() {
        assert_eq!(V1Strategy::new(Version::V1_0).trust_domain_path(), "global.trustDomain");
        assert_eq!(V2_0Strategy.trust_domain_path(), "meshConfig.trustDomain");
    }

    #[test]
    fn test_chart_groups_are_non_empty() {
        let strategies: [&dyn VersionStrategy; 3] = [
            &V1Strategy::new(Version::V1_1),
            &V2_0Strategy,
            &V2_1Strategy::new(Version::V2_2),
        ];
        for strategy in strategies {
            assert!(!strategy.chart_install_order().is_empty());
            assert!(strategy.chart_install_order().iter().all(|group| !group.is_empty()));
            assert!(!strategy.expansion_ports().is_empty());
        }
    }

    #[test]
    fn test_validate_rejects_unsupported_types() {
        let istiod_policy = ControlPlaneSpec {
            policy: Some(PolicyConfig {
                policy_type: Some(PolicyType::Istiod),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(V1Strategy::new(Version::V1_1).validate(&istiod_policy).is_err());
        assert!(V2_0Strategy.validate(&istiod_policy).is_ok());

        let mixer_telemetry = ControlPlaneSpec {
            telemetry: Some(TelemetryConfig {
                telemetry_type: Some(TelemetryType::Mixer),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(V2_0Strategy.validate(&mixer_telemetry).is_ok());
        let err = V2_1Strategy::new(Version::V2_1)
            .validate(&mixer_telemetry)
            .unwrap_err();
        assert_eq!(err.to_string(), "Mixer telemetry is not supported (version v2.1)");
    }
}
