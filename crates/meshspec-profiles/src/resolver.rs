//! Profile resolution
//!
//! Profiles are applied from last to first. Each profile's children are
//! resolved first (same order), the profile's own content is layered over
//! them, and the result is merged into the accumulator. Merging keeps the
//! accumulator's values, so a profile applied earlier cannot be overridden
//! by one applied later, and a profile always overrides its children.
//!
//! A profile reached twice in one resolution is skipped the second time,
//! which also breaks reference cycles.

use std::collections::HashSet;

use meshspec_convert::Converter;
use meshspec_core::{LegacySpec, Values};
use meshspec_versions::{StrategyRegistry, Version};
use tracing::{debug, warn};

use crate::document::ProfileContent;
use crate::error::Result;
use crate::source::{ProfileSource, validate_name};

/// Profile applied when none is requested
pub const DEFAULT_PROFILE: &str = "default";

/// Settings for one resolution
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Version whose profile set is used
    pub version: Version,
    /// Namespace handed to typed profiles when they are converted
    pub namespace: Option<&'a str>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&'a str>) -> Self {
        self.namespace = namespace;
        self
    }
}

/// Resolves profile names into merged legacy specifications
pub struct ProfileResolver<'a> {
    source: &'a dyn ProfileSource,
    registry: &'a StrategyRegistry,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(source: &'a dyn ProfileSource, registry: &'a StrategyRegistry) -> Self {
        Self { source, registry }
    }

    /// Resolve `profiles` into a fresh legacy spec
    pub fn resolve(&self, profiles: &[String], ctx: &ResolveContext<'_>) -> Result<LegacySpec> {
        self.apply(LegacySpec::default(), profiles, ctx)
    }

    /// Merge `profiles` beneath `spec`; values already in `spec` win
    ///
    /// An empty list applies the default profile.
    pub fn apply(&self, spec: LegacySpec, profiles: &[String], ctx: &ResolveContext<'_>) -> Result<LegacySpec> {
        let default = [DEFAULT_PROFILE.to_string()];
        let names = if profiles.is_empty() { &default[..] } else { profiles };

        let mut visited = HashSet::new();
        let mut accumulator = spec;
        for name in names.iter().rev() {
            self.merge_profile(&mut accumulator, name, ctx, &mut visited)?;
        }
        Ok(accumulator)
    }

    fn merge_profile(
        &self,
        accumulator: &mut LegacySpec,
        name: &str,
        ctx: &ResolveContext<'_>,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        validate_name(name)?;
        if !visited.insert(name.to_string()) {
            warn!(profile = name, "profile already applied in this resolution, skipping");
            return Ok(());
        }

        let text = self.source.read(ctx.version, name)?;
        let content = ProfileContent::parse(name, &text)?;
        let children = content.children();

        let mut own = self.to_legacy(content, ctx)?;
        own.template.clear();
        own.profiles.clear();

        let mut resolved_children = LegacySpec::default();
        for child in children.iter().rev() {
            self.merge_profile(&mut resolved_children, child, ctx, visited)?;
        }

        merge_legacy(&mut own, &resolved_children);
        merge_legacy(accumulator, &own);
        debug!(profile = name, children = children.len(), "applied profile");
        Ok(())
    }

    fn to_legacy(&self, content: ProfileContent, ctx: &ResolveContext<'_>) -> Result<LegacySpec> {
        match content {
            ProfileContent::Legacy(spec) => Ok(spec),
            ProfileContent::Typed(mut spec) => {
                let version = std::mem::take(&mut spec.version);
                spec.version = if version.is_empty() {
                    ctx.version.to_string()
                } else {
                    version.clone()
                };

                let converter = Converter::new(self.registry).with_namespace(ctx.namespace);
                let mut legacy = converter.to_legacy(&spec)?;
                legacy.version = version;
                Ok(legacy)
            }
        }
    }
}

impl std::fmt::Debug for ProfileResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileResolver")
            .field("registry", self.registry)
            .finish_non_exhaustive()
    }
}

/// Fill whatever `accumulator` lacks from `incoming`
fn merge_legacy(accumulator: &mut LegacySpec, incoming: &LegacySpec) {
    if accumulator.version.is_empty() {
        accumulator.version = incoming.version.clone();
    }
    if accumulator.network_type.is_none() {
        accumulator.network_type = incoming.network_type.clone();
    }
    merge_values(&mut accumulator.istio, incoming.istio.as_ref());
    merge_values(&mut accumulator.three_scale, incoming.three_scale.as_ref());
}

fn merge_values(accumulator: &mut Option<Values>, incoming: Option<&Values>) {
    let Some(incoming) = incoming else {
        return;
    };
    match accumulator {
        Some(existing) => existing.merge_missing(incoming),
        None => *accumulator = Some(incoming.deep_copy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryProfileSource;

    fn source(profiles: &[(&str, &str)]) -> MemoryProfileSource {
        let mut source = MemoryProfileSource::new();
        for (name, content) in profiles {
            source.insert(Version::V2_0, *name, *content);
        }
        source
    }

    #[test]
    fn test_profile_overrides_its_children() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[
            ("a", "spec:\n  profiles: [b]\n  istio:\n    k: from-a\n"),
            ("b", "spec:\n  istio:\n    k: from-b\n    only-b: true\n"),
        ]);
        let resolver = ProfileResolver::new(&source, &registry);

        let spec = resolver.resolve(&["a".into()], &ResolveContext::new(Version::V2_0)).unwrap();
        let istio = spec.istio.unwrap();

        assert_eq!(istio.get::<String>("k").unwrap().as_deref(), Some("from-a"));
        assert_eq!(istio.get::<bool>("only-b").unwrap(), Some(true));
        assert!(spec.profiles.is_empty());
    }

    #[test]
    fn test_last_listed_profile_wins() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[
            ("first", "spec:\n  istio:\n    k: first\n"),
            ("second", "spec:\n  istio:\n    k: second\n"),
        ]);
        let resolver = ProfileResolver::new(&source, &registry);

        let spec = resolver
            .resolve(&["first".into(), "second".into()], &ResolveContext::new(Version::V2_0))
            .unwrap();

        assert_eq!(spec.istio.unwrap().get::<String>("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_cycle_is_skipped() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[
            ("a", "spec:\n  profiles: [b]\n  istio:\n    from-a: true\n"),
            ("b", "spec:\n  profiles: [a, b]\n  istio:\n    from-b: true\n"),
        ]);
        let resolver = ProfileResolver::new(&source, &registry);

        let spec = resolver.resolve(&["a".into()], &ResolveContext::new(Version::V2_0)).unwrap();
        let istio = spec.istio.unwrap();

        assert_eq!(istio.get::<bool>("from-a").unwrap(), Some(true));
        assert_eq!(istio.get::<bool>("from-b").unwrap(), Some(true));
    }

    #[test]
    fn test_empty_list_applies_default() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[("default", "spec:\n  version: v2.0\n  networkType: subnet\n")]);
        let resolver = ProfileResolver::new(&source, &registry);

        let spec = resolver.resolve(&[], &ResolveContext::new(Version::V2_0)).unwrap();

        assert_eq!(spec.version, "v2.0");
        assert_eq!(spec.network_type.as_deref(), Some("subnet"));
    }

    #[test]
    fn test_apply_keeps_caller_values() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[("default", "spec:\n  version: v2.0\n  istio:\n    k: profile\n    extra: 1\n")]);
        let resolver = ProfileResolver::new(&source, &registry);
        let spec = LegacySpec {
            version: "v2.1".into(),
            profiles: vec!["default".into()],
            istio: Some(Values::from_yaml("k: caller\n").unwrap()),
            ..Default::default()
        };

        let merged = resolver
            .apply(spec, &["default".into()], &ResolveContext::new(Version::V2_0))
            .unwrap();

        assert_eq!(merged.version, "v2.1");
        assert_eq!(merged.profiles, vec!["default".to_string()]);
        let istio = merged.istio.unwrap();
        assert_eq!(istio.get::<String>("k").unwrap().as_deref(), Some("caller"));
        assert_eq!(istio.get::<i64>("extra").unwrap(), Some(1));
    }

    #[test]
    fn test_typed_profile_is_converted() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[(
            "tracing",
            "apiVersion: maistra.io/v2\nspec:\n  tracing:\n    type: Jaeger\n    sampling: 2500\n",
        )]);
        let resolver = ProfileResolver::new(&source, &registry);
        let ctx = ResolveContext::new(Version::V2_0).with_namespace(Some("mesh"));

        let spec = resolver.resolve(&["tracing".into()], &ctx).unwrap();

        assert!(spec.version.is_empty());
        let istio = spec.istio.unwrap();
        assert_eq!(istio.get::<String>("tracing.provider").unwrap().as_deref(), Some("jaeger"));
        assert_eq!(istio.get::<f64>("pilot.traceSampling").unwrap(), Some(25.0));
        assert_eq!(istio.get::<String>("global.istioNamespace").unwrap().as_deref(), Some("mesh"));
    }

    #[test]
    fn test_invalid_name_fails_before_lookup() {
        let registry = StrategyRegistry::builtin();
        let source = source(&[]);
        let resolver = ProfileResolver::new(&source, &registry);

        let err = resolver
            .resolve(&["../secrets".into()], &ResolveContext::new(Version::V2_0))
            .unwrap_err();
        assert!(matches!(err, crate::error::ProfileError::InvalidName { .. }));
    }
}
