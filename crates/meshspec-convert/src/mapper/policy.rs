//! Policy settings

use meshspec_core::Values;
use meshspec_core::spec::{MixerPolicyConfig, PolicyConfig, PolicyType, RemotePolicyConfig};
use meshspec_versions::PolicyFlags;

use super::{FieldMapper, non_empty, set_enum, set_opt, take, take_enum};
use crate::context::MapperContext;
use crate::error::Result;

const IMPLEMENTATION: &str = "policy.implementation";
const MIXER_ENABLED: &str = "mixer.policy.enabled";
const DISABLE_CHECKS: &str = "global.disablePolicyChecks";
const FAIL_OPEN: &str = "global.policyCheckFailOpen";
const REMOTE_ADDRESS: &str = "global.remotePolicyAddress";
const REMOTE_CREATE_SERVICE: &str = "global.createRemoteSvcEndpoints";

pub struct PolicyMapper;

impl FieldMapper for PolicyMapper {
    type Config = PolicyConfig;
    const NAME: &'static str = "policy";

    fn populate_values(config: &PolicyConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        set_enum(values, IMPLEMENTATION, config.policy_type)?;
        match config.policy_type {
            Some(PolicyType::None) => {
                values.set(MIXER_ENABLED, false)?;
                values.set(DISABLE_CHECKS, true)?;
            }
            Some(PolicyType::Mixer) => values.set(MIXER_ENABLED, true)?,
            Some(PolicyType::Remote | PolicyType::Istiod) => values.set(MIXER_ENABLED, false)?,
            None => {}
        }

        if let Some(mixer) = &config.mixer {
            populate_mixer_policy_values(mixer, values)?;
        }
        if let Some(remote) = &config.remote {
            populate_remote_policy_values(remote, values)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, ctx: &MapperContext<'_>) -> Result<Option<PolicyConfig>> {
        let explicit = take_enum::<PolicyType>(values, IMPLEMENTATION)?;
        let mixer_enabled = take::<bool>(values, MIXER_ENABLED)?;
        let remote_configured = values.contains(REMOTE_ADDRESS)?;

        let policy_type = explicit.or_else(|| {
            ctx.strategy.infer_policy_type(&PolicyFlags {
                mixer_enabled,
                remote_configured,
            })
        });

        let mut config = PolicyConfig {
            policy_type,
            ..Default::default()
        };
        match policy_type {
            Some(PolicyType::Mixer) => config.mixer = Some(populate_mixer_policy_config(values)?),
            Some(PolicyType::Remote) => config.remote = Some(populate_remote_policy_config(values)?),
            Some(PolicyType::None) => {
                values.remove(DISABLE_CHECKS);
            }
            Some(PolicyType::Istiod) => {}
            None if remote_configured => {
                config.remote = non_empty(populate_remote_policy_config(values)?);
            }
            None => config.mixer = non_empty(populate_mixer_policy_config(values)?),
        }

        Ok(non_empty(config))
    }
}

fn populate_mixer_policy_values(mixer: &MixerPolicyConfig, values: &mut Values) -> Result<()> {
    set_opt(values, DISABLE_CHECKS, mixer.enable_checks.map(|enabled| !enabled))?;
    set_opt(values, FAIL_OPEN, mixer.fail_open)
}

/// Write a remote policy block into the legacy `global` settings
pub fn populate_remote_policy_values(remote: &RemotePolicyConfig, values: &mut Values) -> Result<()> {
    set_opt(values, REMOTE_ADDRESS, remote.address.as_ref())?;
    set_opt(values, REMOTE_CREATE_SERVICE, remote.create_service)?;
    set_opt(values, DISABLE_CHECKS, remote.enable_checks.map(|enabled| !enabled))?;
    set_opt(values, FAIL_OPEN, remote.fail_open)
}

fn populate_mixer_policy_config(values: &mut Values) -> Result<MixerPolicyConfig> {
    Ok(MixerPolicyConfig {
        enable_checks: take::<bool>(values, DISABLE_CHECKS)?.map(|disabled| !disabled),
        fail_open: take(values, FAIL_OPEN)?,
    })
}

fn populate_remote_policy_config(values: &mut Values) -> Result<RemotePolicyConfig> {
    Ok(RemotePolicyConfig {
        address: take(values, REMOTE_ADDRESS)?,
        create_service: take(values, REMOTE_CREATE_SERVICE)?,
        enable_checks: take::<bool>(values, DISABLE_CHECKS)?.map(|disabled| !disabled),
        fail_open: take(values, FAIL_OPEN)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::test_support::round_trip;
    use meshspec_versions::{V1Strategy, V2_0Strategy, Version};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Values {
        Values::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn test_explicit_mixer_type() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = doc(json!({
            "mixer": {"policy": {"enabled": true}},
            "policy": {"implementation": "Mixer"}
        }));

        let config = PolicyMapper::populate_config(&mut values, &ctx).unwrap().unwrap();

        assert_eq!(config.policy_type, Some(PolicyType::Mixer));
        assert_eq!(config.mixer, Some(MixerPolicyConfig::default()));
        assert!(!values.contains("mixer.policy.enabled").unwrap());
    }

    #[test]
    fn test_remote_policy_values() {
        let remote = RemotePolicyConfig {
            address: Some("svc.ns".into()),
            create_service: Some(true),
            enable_checks: Some(true),
            fail_open: Some(false),
        };
        let mut values = Values::new();
        populate_remote_policy_values(&remote, &mut values).unwrap();

        assert_eq!(
            values,
            doc(json!({
                "global": {
                    "remotePolicyAddress": "svc.ns",
                    "createRemoteSvcEndpoints": true,
                    "disablePolicyChecks": false,
                    "policyCheckFailOpen": false
                }
            }))
        );
    }

    #[test]
    fn test_unknown_implementation_is_rejected() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = doc(json!({"policy": {"implementation": "Envoy"}}));
        assert!(PolicyMapper::populate_config(&mut values, &ctx).is_err());
    }

    #[test]
    fn test_inferred_from_flags() {
        let strategy = V1Strategy::new(Version::V1_1);
        let ctx = MapperContext::new(&strategy);
        let mut values = doc(json!({
            "mixer": {"policy": {"enabled": true}},
            "global": {"disablePolicyChecks": true}
        }));

        let config = PolicyMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        assert_eq!(config.policy_type, Some(PolicyType::Mixer));
        assert_eq!(config.mixer.unwrap().enable_checks, Some(false));

        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = doc(json!({"mixer": {"policy": {"enabled": false}}}));
        let config = PolicyMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        assert_eq!(config.policy_type, Some(PolicyType::Istiod));
    }

    #[test]
    fn test_absent_policy() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = doc(json!({"global": {"hub": "quay.io"}}));
        assert_eq!(PolicyMapper::populate_config(&mut values, &ctx).unwrap(), None);
        assert!(values.contains("global.hub").unwrap());
    }

    #[test]
    fn test_round_trip() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let configs = [
            PolicyConfig {
                policy_type: Some(PolicyType::Mixer),
                mixer: Some(MixerPolicyConfig {
                    enable_checks: Some(true),
                    fail_open: Some(true),
                }),
                ..Default::default()
            },
            PolicyConfig {
                policy_type: Some(PolicyType::Remote),
                remote: Some(RemotePolicyConfig {
                    address: Some("policy.remote".into()),
                    create_service: Some(false),
                    enable_checks: Some(false),
                    fail_open: None,
                }),
                ..Default::default()
            },
            PolicyConfig {
                policy_type: Some(PolicyType::Istiod),
                ..Default::default()
            },
            PolicyConfig {
                policy_type: Some(PolicyType::None),
                ..Default::default()
            },
            PolicyConfig {
                mixer: Some(MixerPolicyConfig {
                    enable_checks: None,
                    fail_open: Some(false),
                }),
                ..Default::default()
            },
        ];

        for config in configs {
            let (_, read) = round_trip::<PolicyMapper>(&config, &ctx);
            assert_eq!(read, Some(config));
        }
    }

    #[test]
    fn test_writes_are_idempotent() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = PolicyConfig {
            policy_type: Some(PolicyType::Remote),
            remote: Some(RemotePolicyConfig {
                address: Some("a.b".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let (first, _) = round_trip::<PolicyMapper>(&config, &ctx);
        let (second, _) = round_trip::<PolicyMapper>(&config, &ctx);
        assert_eq!(first, second);
    }
}
