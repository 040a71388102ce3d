//! Security settings: trust domain, mTLS, identity and certificate authority

use meshspec_core::spec::{
    CertificateAuthorityConfig, CertificateAuthorityType, ControlPlaneCertProviderType,
    ControlPlaneSecurityConfig, CustomCertificateAuthorityConfig, DataPlaneSecurityConfig,
    IdentityConfig, IdentityConfigType, IstioCertificateSignerType,
    IstioPrivateKeyCertificateSignerConfig, IstioSelfSignedCertificateSignerConfig,
    IstiodCertificateAuthorityConfig, SecurityConfig, ThirdPartyIdentityConfig, TrustConfig,
};
use meshspec_core::{CoreError, Value, Values};

use super::{FieldMapper, non_empty, set_duplicated, set_enum, set_opt, take, take_duplicated, take_enum};
use crate::context::MapperContext;
use crate::error::Result;

const TRUST_DOMAIN_ALIASES: (&str, &str) = ("global.trustDomainAliases", "meshConfig.trustDomainAliases");
const CERT_PROVIDER: &str = "global.pilotCertProvider";
const JWT_POLICY: &str = "global.jwtPolicy";
const CA_IMPLEMENTATION: &str = "security.caImplementation";
const CA_ADDRESS: &str = "global.caAddress";
const SELF_SIGNED: &str = "security.selfSigned";

// Istiod CA settings travel as pilot environment variables
const ENV_TOKEN_ISSUER: &str = "pilot.env.TOKEN_ISSUER";
const ENV_DEFAULT_CERT_TTL: &str = "pilot.env.DEFAULT_WORKLOAD_CERT_TTL";
const ENV_MAX_CERT_TTL: &str = "pilot.env.MAX_WORKLOAD_CERT_TTL";
const ENV_CA_CERT_TTL: &str = "pilot.env.CITADEL_SELF_SIGNED_CA_CERT_TTL";
const ENV_GRACE_PERIOD: &str = "pilot.env.CITADEL_SELF_SIGNED_ROOT_CERT_GRACE_PERIOD_PERCENTILE";
const ENV_CHECK_INTERVAL: &str = "pilot.env.CITADEL_SELF_SIGNED_ROOT_CERT_CHECK_INTERVAL";
const ENV_ENABLE_JITTER: &str = "pilot.env.CITADEL_ENABLE_JITTER_FOR_ROOT_CERT_ROTATOR";
const ENV_CA_ORG: &str = "pilot.env.CITADEL_SELF_SIGNED_CA_ORG";
const ENV_ROOT_CA_DIR: &str = "pilot.env.ROOT_CA_DIR";

pub struct SecurityMapper;

impl FieldMapper for SecurityMapper {
    type Config = SecurityConfig;
    const NAME: &'static str = "security";

    fn populate_values(config: &SecurityConfig, values: &mut Values, ctx: &MapperContext<'_>) -> Result<()> {
        if let Some(trust) = &config.trust {
            set_opt(values, ctx.strategy.trust_domain_path(), trust.domain.as_ref())?;
            if !trust.additional_domains.is_empty() {
                let aliases = Value::from(trust.additional_domains.as_slice());
                set_duplicated(values, TRUST_DOMAIN_ALIASES.0, TRUST_DOMAIN_ALIASES.1, Some(aliases))?;
            }
        }

        if let Some(control_plane) = &config.control_plane {
            set_opt(values, "global.controlPlaneSecurityEnabled", control_plane.mtls)?;
            set_opt(values, CERT_PROVIDER, control_plane.cert_provider.map(cert_provider_str))?;
        }

        if let Some(data_plane) = &config.data_plane {
            set_opt(values, "global.mtls.enabled", data_plane.mtls)?;
            set_opt(values, "global.mtls.auto", data_plane.automtls)?;
        }

        if let Some(identity) = &config.identity {
            set_opt(values, JWT_POLICY, identity.identity_type.map(jwt_policy_str))?;
            if let Some(third_party) = &identity.third_party {
                set_opt(values, ENV_TOKEN_ISSUER, third_party.issuer.as_ref())?;
                set_opt(values, "global.sds.token.aud", third_party.audience.as_ref())?;
            }
        }

        if let Some(ca) = &config.certificate_authority {
            populate_ca_values(ca, values)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, ctx: &MapperContext<'_>) -> Result<Option<SecurityConfig>> {
        let trust = non_empty(TrustConfig {
            domain: take(values, ctx.strategy.trust_domain_path())?,
            additional_domains: take_duplicated(values, TRUST_DOMAIN_ALIASES.0, TRUST_DOMAIN_ALIASES.1)?
                .unwrap_or_default(),
        });

        let control_plane = non_empty(ControlPlaneSecurityConfig {
            mtls: take(values, "global.controlPlaneSecurityEnabled")?,
            cert_provider: take::<String>(values, CERT_PROVIDER)?
                .map(|text| parse_cert_provider(&text))
                .transpose()?,
        });

        let data_plane = non_empty(DataPlaneSecurityConfig {
            mtls: take(values, "global.mtls.enabled")?,
            automtls: take(values, "global.mtls.auto")?,
        });

        let identity = non_empty(IdentityConfig {
            identity_type: take::<String>(values, JWT_POLICY)?
                .map(|text| parse_jwt_policy(&text))
                .transpose()?,
            third_party: non_empty(ThirdPartyIdentityConfig {
                issuer: take(values, ENV_TOKEN_ISSUER)?,
                audience: take(values, "global.sds.token.aud")?,
            }),
        });

        Ok(non_empty(SecurityConfig {
            trust,
            control_plane,
            data_plane,
            identity,
            certificate_authority: non_empty(populate_ca_config(values)?),
        }))
    }
}

fn populate_ca_values(ca: &CertificateAuthorityConfig, values: &mut Values) -> Result<()> {
    set_enum(values, CA_IMPLEMENTATION, ca.ca_type)?;

    if let Some(istiod) = &ca.istiod {
        set_opt(
            values,
            SELF_SIGNED,
            istiod
                .signer_type
                .map(|signer| signer == IstioCertificateSignerType::SelfSigned),
        )?;
        set_opt(values, ENV_DEFAULT_CERT_TTL, istiod.workload_cert_ttl_default.as_ref())?;
        set_opt(values, ENV_MAX_CERT_TTL, istiod.workload_cert_ttl_max.as_ref())?;

        if let Some(self_signed) = &istiod.self_signed {
            set_opt(values, ENV_CA_CERT_TTL, self_signed.ttl.as_ref())?;
            set_opt(values, ENV_GRACE_PERIOD, self_signed.grace_period.as_ref())?;
            set_opt(values, ENV_CHECK_INTERVAL, self_signed.check_period.as_ref())?;
            // Environment values are strings
            set_opt(
                values,
                ENV_ENABLE_JITTER,
                self_signed.enable_jitter.map(|jitter| jitter.to_string()),
            )?;
            set_opt(values, ENV_CA_ORG, self_signed.org.as_ref())?;
        }
        if let Some(private_key) = &istiod.private_key {
            set_opt(values, ENV_ROOT_CA_DIR, private_key.root_cert_dir.as_ref())?;
        }
    }

    if let Some(custom) = &ca.custom {
        set_opt(values, CA_ADDRESS, custom.address.as_ref())?;
    }
    Ok(())
}

fn populate_ca_config(values: &mut Values) -> Result<CertificateAuthorityConfig> {
    let explicit = take_enum::<CertificateAuthorityType>(values, CA_IMPLEMENTATION)?;
    let ca_type = match explicit {
        Some(ca_type) => Some(ca_type),
        None if values.contains(CA_ADDRESS)? => Some(CertificateAuthorityType::Custom),
        None => None,
    };

    let mut config = CertificateAuthorityConfig {
        ca_type,
        ..Default::default()
    };
    match ca_type {
        Some(CertificateAuthorityType::Istiod) => config.istiod = Some(populate_istiod_ca_config(values)?),
        Some(CertificateAuthorityType::Custom) => {
            config.custom = Some(CustomCertificateAuthorityConfig {
                address: take(values, CA_ADDRESS)?,
            });
        }
        None => config.istiod = non_empty(populate_istiod_ca_config(values)?),
    }
    Ok(config)
}

fn populate_istiod_ca_config(values: &mut Values) -> Result<IstiodCertificateAuthorityConfig> {
    let signer_type = take::<bool>(values, SELF_SIGNED)?.map(|self_signed| {
        if self_signed {
            IstioCertificateSignerType::SelfSigned
        } else {
            IstioCertificateSignerType::PrivateKey
        }
    });

    let self_signed = non_empty(IstioSelfSignedCertificateSignerConfig {
        ttl: take(values, ENV_CA_CERT_TTL)?,
        grace_period: take(values, ENV_GRACE_PERIOD)?,
        check_period: take(values, ENV_CHECK_INTERVAL)?,
        enable_jitter: take(values, ENV_ENABLE_JITTER)?,
        org: take(values, ENV_CA_ORG)?,
    });
    let private_key = non_empty(IstioPrivateKeyCertificateSignerConfig {
        root_cert_dir: take(values, ENV_ROOT_CA_DIR)?,
    });

    Ok(IstiodCertificateAuthorityConfig {
        signer_type,
        workload_cert_ttl_default: take(values, ENV_DEFAULT_CERT_TTL)?,
        workload_cert_ttl_max: take(values, ENV_MAX_CERT_TTL)?,
        self_signed,
        private_key,
    })
}

fn cert_provider_str(provider: ControlPlaneCertProviderType) -> &'static str {
    match provider {
        ControlPlaneCertProviderType::Istiod => "istiod",
        ControlPlaneCertProviderType::Kubernetes => "kubernetes",
        ControlPlaneCertProviderType::Custom => "custom",
    }
}

fn parse_cert_provider(text: &str) -> Result<ControlPlaneCertProviderType> {
    match text {
        "istiod" => Ok(ControlPlaneCertProviderType::Istiod),
        "kubernetes" => Ok(ControlPlaneCertProviderType::Kubernetes),
        "custom" => Ok(ControlPlaneCertProviderType::Custom),
        _ => Err(unknown("certificate provider", text, "istiod, kubernetes, custom")),
    }
}

fn jwt_policy_str(identity: IdentityConfigType) -> &'static str {
    match identity {
        IdentityConfigType::Kubernetes => "first-party-jwt",
        IdentityConfigType::ThirdParty => "third-party-jwt",
    }
}

fn parse_jwt_policy(text: &str) -> Result<IdentityConfigType> {
    match text {
        "first-party-jwt" => Ok(IdentityConfigType::Kubernetes),
        "third-party-jwt" => Ok(IdentityConfigType::ThirdParty),
        _ => Err(unknown("JWT policy", text, "first-party-jwt, third-party-jwt")),
    }
}

fn unknown(kind: &'static str, value: &str, expected: &str) -> crate::error::ConvertError {
    CoreError::UnknownEnumValue {
        kind,
        value: value.to_string(),
        expected: Some(format!("expected one of: {expected}")),
    }
    .into()
}
