//! Profile documents
//!
//! A profile file wraps a specification in a small envelope:
//!
//! ```yaml
//! apiVersion: maistra.io/v2
//! kind: ServiceMeshControlPlane
//! spec:
//!   profiles: [base]
//!   tracing:
//!     type: Jaeger
//! ```
//!
//! An `apiVersion` ending in `/v1`, or none at all, holds a legacy spec; one
//! ending in `/v2` holds a typed spec.

use meshspec_core::{ControlPlaneSpec, LegacySpec};
use serde::Deserialize;

use crate::error::{ProfileError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    api_version: Option<String>,
    #[serde(default)]
    spec: serde_yaml::Value,
}

/// The specification held by a profile
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileContent {
    Legacy(LegacySpec),
    Typed(ControlPlaneSpec),
}

impl ProfileContent {
    /// Parse a profile file's text
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let parse_error = |source| ProfileError::Parse {
            name: name.to_string(),
            source,
        };

        let envelope: Envelope = serde_yaml::from_str(text).map_err(parse_error)?;
        let spec = envelope.spec;

        match envelope.api_version.as_deref() {
            None => Self::legacy(name, from_spec(spec).map_err(parse_error)?),
            Some(api) if api.ends_with("/v1") => Self::legacy(name, from_spec(spec).map_err(parse_error)?),
            Some(api) if api.ends_with("/v2") => Ok(Self::Typed(from_spec(spec).map_err(parse_error)?)),
            Some(api) => Err(ProfileError::UnsupportedApiVersion {
                name: name.to_string(),
                api_version: api.to_string(),
            }),
        }
    }

    fn legacy(name: &str, spec: LegacySpec) -> Result<Self> {
        if !spec.template.is_empty() && !spec.profiles.is_empty() {
            return Err(ProfileError::TemplateAndProfiles {
                name: name.to_string(),
            });
        }
        Ok(Self::Legacy(spec))
    }

    /// Profiles this profile builds on
    pub fn children(&self) -> Vec<String> {
        match self {
            Self::Legacy(spec) => spec.profile_names(),
            Self::Typed(spec) => spec.profiles.clone(),
        }
    }
}

fn from_spec<T>(spec: serde_yaml::Value) -> std::result::Result<T, serde_yaml::Error>
where
    T: Default + serde::de::DeserializeOwned,
{
    if spec.is_null() {
        Ok(T::default())
    } else {
        serde_yaml::from_value(spec)
    }
}
