//! Trust, identity and certificate settings

use serde::{Deserialize, Serialize};

string_enum! {
    /// Who provisions the control plane's serving certificates
    pub enum ControlPlaneCertProviderType ("control plane certificate provider") {
        Istiod => "Istiod",
        Kubernetes => "Kubernetes",
        Custom => "Custom",
    }
}

string_enum! {
    /// How workload identity tokens are issued
    pub enum IdentityConfigType ("identity type") {
        Kubernetes => "Kubernetes",
        ThirdParty => "ThirdParty",
    }
}

string_enum! {
    pub enum CertificateAuthorityType ("certificate authority type") {
        Istiod => "Istiod",
        Custom => "Custom",
    }
}

string_enum! {
    pub enum IstioCertificateSignerType ("certificate signer type") {
        SelfSigned => "SelfSigned",
        PrivateKey => "PrivateKey",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust: Option<TrustConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlaneSecurityConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_plane: Option<DataPlaneSecurityConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<CertificateAuthorityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrustConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlPlaneSecurityConfig {
    #[serde(rename = "mtls", skip_serializing_if = "Option::is_none")]
    pub mtls: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_provider: Option<ControlPlaneCertProviderType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataPlaneSecurityConfig {
    #[serde(rename = "mtls", skip_serializing_if = "Option::is_none")]
    pub mtls: Option<bool>,

    #[serde(rename = "automtls", skip_serializing_if = "Option::is_none")]
    pub automtls: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identity_type: Option<IdentityConfigType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_party: Option<ThirdPartyIdentityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThirdPartyIdentityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificateAuthorityConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ca_type: Option<CertificateAuthorityType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub istiod: Option<IstiodCertificateAuthorityConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomCertificateAuthorityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IstiodCertificateAuthorityConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub signer_type: Option<IstioCertificateSignerType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_cert_ttl_default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_cert_ttl_max: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_signed: Option<IstioSelfSignedCertificateSignerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<IstioPrivateKeyCertificateSignerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IstioSelfSignedCertificateSignerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,

    /// Percentage of the root certificate's lifetime left before rotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_period: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_jitter: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IstioPrivateKeyCertificateSignerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cert_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomCertificateAuthorityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
