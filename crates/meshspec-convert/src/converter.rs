//! Top-level conversion between legacy and typed specifications

use meshspec_core::{ControlPlaneSpec, LegacySpec, Values};
use meshspec_versions::StrategyRegistry;
use tracing::{debug, warn};

use crate::context::MapperContext;
use crate::error::{ConvertError, Result};
use crate::hacks::{self, LEGACY_TO_TYPED, TYPED_TO_LEGACY};
use crate::mapper::addons::THREE_SCALE_ROOT;
use crate::mapper::{
    AddonsMapper, ClusterMapper, FieldMapper, GatewaysMapper, GeneralMapper, PolicyMapper,
    ProxyMapper, RuntimeMapper, SecurityMapper, TelemetryMapper, TracingMapper,
};
use crate::quarantine;

/// Legacy fields derived from the install namespace; written when a
/// namespace is known, discarded when read
const NAMESPACE_PATHS: &[&str] = &[
    "global.istioNamespace",
    "global.configNamespace",
    "global.telemetryNamespace",
    "global.policyNamespace",
    "global.prometheusNamespace",
];

/// Converts specifications in both directions
///
/// ```ignore
/// let registry = StrategyRegistry::builtin();
/// let converter = Converter::new(&registry).with_namespace(Some("istio-system"));
/// let legacy = converter.to_legacy(&spec)?;
/// let typed = converter.to_typed(&legacy);
/// ```
#[derive(Debug, Clone)]
pub struct Converter<'a> {
    registry: &'a StrategyRegistry,
    namespace: Option<String>,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a StrategyRegistry) -> Self {
        Self {
            registry,
            namespace: None,
        }
    }

    /// Set the namespace the control plane is installed into
    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    /// Convert a typed spec to its legacy form
    ///
    /// A quarantined spec converts back to the legacy settings it was
    /// quarantined with.
    pub fn to_legacy(&self, spec: &ControlPlaneSpec) -> Result<LegacySpec> {
        if let Some(quarantine) = &spec.quarantine {
            let (istio, three_scale) = quarantine::restore(quarantine)?;
            return Ok(LegacySpec {
                version: spec.version.clone(),
                profiles: spec.profiles.clone(),
                istio,
                three_scale,
                ..Default::default()
            });
        }

        let strategy = self.registry.strategy_for(&spec.version)?;
        strategy.validate(spec)?;
        let ctx = MapperContext::new(strategy).with_namespace(self.namespace.as_deref());

        let mut values = spec.tech_preview.as_ref().map(Values::deep_copy).unwrap_or_default();

        write_block::<ClusterMapper>(spec.cluster.as_ref(), &mut values, &ctx)?;
        write_block::<GeneralMapper>(spec.general.as_ref(), &mut values, &ctx)?;
        write_block::<PolicyMapper>(spec.policy.as_ref(), &mut values, &ctx)?;
        write_block::<ProxyMapper>(spec.proxy.as_ref(), &mut values, &ctx)?;
        write_block::<SecurityMapper>(spec.security.as_ref(), &mut values, &ctx)?;
        write_block::<TelemetryMapper>(spec.telemetry.as_ref(), &mut values, &ctx)?;
        write_block::<TracingMapper>(spec.tracing.as_ref(), &mut values, &ctx)?;
        write_block::<GatewaysMapper>(spec.gateways.as_ref(), &mut values, &ctx)?;
        write_block::<AddonsMapper>(spec.addons.as_ref(), &mut values, &ctx)?;
        write_block::<RuntimeMapper>(spec.runtime.as_ref(), &mut values, &ctx)?;

        if let Some(namespace) = ctx.namespace {
            for path in NAMESPACE_PATHS {
                values.set(path, namespace)?;
            }
        }

        hacks::run(TYPED_TO_LEGACY, &mut values, &ctx)?;

        let three_scale = values.get_and_remove::<Values>(THREE_SCALE_ROOT)?;
        Ok(LegacySpec {
            version: spec.version.clone(),
            template: String::new(),
            profiles: spec.profiles.clone(),
            network_type: spec.cluster.as_ref().and_then(|c| c.network_type.clone()),
            istio: (!values.is_empty()).then_some(values),
            three_scale,
        })
    }

    /// Convert a legacy spec to its typed form, quarantining on failure
    ///
    /// Never fails: a spec that cannot be converted comes back with every
    /// subsystem block absent and the error recorded in
    /// [`ControlPlaneSpec::quarantine`].
    pub fn to_typed(&self, legacy: &LegacySpec) -> ControlPlaneSpec {
        match self.try_to_typed(legacy) {
            Ok(spec) => spec,
            Err(error) => {
                warn!(version = %legacy.version, error = %error, "conversion failed, quarantining settings");
                quarantine::quarantined(legacy, &error)
            }
        }
    }

    /// Convert a legacy spec to its typed form, returning the first error
    pub fn try_to_typed(&self, legacy: &LegacySpec) -> Result<ControlPlaneSpec> {
        if !legacy.template.is_empty() && !legacy.profiles.is_empty() {
            return Err(ConvertError::InvalidSpec(
                "template and profiles are mutually exclusive".to_string(),
            ));
        }

        let strategy = self.registry.strategy_for(&legacy.version)?;
        let ctx = MapperContext::new(strategy).with_namespace(self.namespace.as_deref());

        let mut values = legacy.istio_or_empty();
        if let Some(three_scale) = legacy.three_scale.as_ref().filter(|v| !v.is_empty()) {
            values.set(THREE_SCALE_ROOT, three_scale.deep_copy())?;
        }

        hacks::run(LEGACY_TO_TYPED, &mut values, &ctx)?;
        for path in NAMESPACE_PATHS {
            values.remove_pruned(path);
        }

        let mut spec = ControlPlaneSpec {
            version: legacy.version.clone(),
            profiles: legacy.profile_names(),
            cluster: read_block::<ClusterMapper>(&mut values, &ctx)?,
            general: read_block::<GeneralMapper>(&mut values, &ctx)?,
            policy: read_block::<PolicyMapper>(&mut values, &ctx)?,
            proxy: read_block::<ProxyMapper>(&mut values, &ctx)?,
            security: read_block::<SecurityMapper>(&mut values, &ctx)?,
            telemetry: read_block::<TelemetryMapper>(&mut values, &ctx)?,
            tracing: read_block::<TracingMapper>(&mut values, &ctx)?,
            gateways: read_block::<GatewaysMapper>(&mut values, &ctx)?,
            addons: read_block::<AddonsMapper>(&mut values, &ctx)?,
            runtime: read_block::<RuntimeMapper>(&mut values, &ctx)?,
            ..Default::default()
        };

        if let Some(network_type) = &legacy.network_type {
            spec.cluster.get_or_insert_with(Default::default).network_type = Some(network_type.clone());
        }

        values.prune_empty();
        if !values.is_empty() {
            debug!(keys = values.len(), "carrying unrecognized settings as tech preview");
            spec.tech_preview = Some(values);
        }

        strategy.validate(&spec)?;
        Ok(spec)
    }
}

fn write_block<M: FieldMapper>(
    config: Option<&M::Config>,
    values: &mut Values,
    ctx: &MapperContext<'_>,
) -> Result<()> {
    if let Some(config) = config {
        M::populate_values(config, values, ctx)?;
        debug!(mapper = M::NAME, "populated legacy settings");
    }
    Ok(())
}

fn read_block<M: FieldMapper>(values: &mut Values, ctx: &MapperContext<'_>) -> Result<Option<M::Config>> {
    let config = M::populate_config(values, ctx)?;
    if config.is_some() {
        debug!(mapper = M::NAME, "populated typed block");
    }
    Ok(config)
}
