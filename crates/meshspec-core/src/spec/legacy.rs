//! The loosely typed legacy specification

use serde::{Deserialize, Serialize};

use crate::values::Values;

/// Legacy control plane specification
///
/// Everything below the scalar metadata lives in two free-form settings
/// documents: `istio` (mesh settings) and `three_scale` (the 3scale add-on).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Single base template; mutually exclusive with `profiles`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub istio: Option<Values>,

    #[serde(rename = "threeScale", skip_serializing_if = "Option::is_none")]
    pub three_scale: Option<Values>,
}

impl LegacySpec {
    /// Profiles this spec builds on, honoring the single-template form
    pub fn profile_names(&self) -> Vec<String> {
        if !self.profiles.is_empty() {
            self.profiles.clone()
        } else if !self.template.is_empty() {
            vec![self.template.clone()]
        } else {
            Vec::new()
        }
    }

    pub fn istio_or_empty(&self) -> Values {
        self.istio.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_names() {
        let spec = LegacySpec {
            template: "small".into(),
            ..Default::default()
        };
        assert_eq!(spec.profile_names(), vec!["small".to_string()]);

        let spec = LegacySpec {
            profiles: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        assert_eq!(spec.profile_names(), vec!["a".to_string(), "b".to_string()]);
        assert!(LegacySpec::default().profile_names().is_empty());
    }

    #[test]
    fn test_legacy_yaml() {
        let spec: LegacySpec = serde_yaml::from_str(
            r#"
version: v1.1
template: default
istio:
  global:
    hub: quay.io
threeScale:
  enabled: false
"#,
        )
        .unwrap();

        assert_eq!(spec.version, "v1.1");
        assert_eq!(
            spec.istio.unwrap().get::<String>("global.hub").unwrap().as_deref(),
            Some("quay.io")
        );
        assert_eq!(spec.three_scale.unwrap().get::<bool>("enabled").unwrap(), Some(false));
    }
}
