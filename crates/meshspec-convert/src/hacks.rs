//! Compatibility hacks
//!
//! Small, named document transforms run around field mapping. Each one is a
//! no-op on documents lacking its target fields, and the pipelines run them
//! strictly in the order listed.
//!
//! Legacy to typed, before mapping:
//! 1. `rename-legacy-fields`
//! 2. `normalize-three-scale`
//! 3. `derive-jaeger-name`
//!
//! Typed to legacy, after mapping:
//! 1. `three-scale-params-as-strings`

use meshspec_core::{Value, Values};
use phf::phf_map;
use tracing::debug;

use crate::context::MapperContext;
use crate::error::Result;
use crate::mapper::addons::THREE_SCALE_ROOT;

/// A single named transform
pub struct Hack {
    pub name: &'static str,
    /// Returns whether the document changed
    apply: fn(&mut Values, &MapperContext<'_>) -> Result<bool>,
}

impl Hack {
    pub fn apply(&self, values: &mut Values, ctx: &MapperContext<'_>) -> Result<bool> {
        (self.apply)(values, ctx)
    }
}

impl std::fmt::Debug for Hack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hack").field("name", &self.name).finish()
    }
}

pub static LEGACY_TO_TYPED: &[Hack] = &[
    Hack {
        name: "rename-legacy-fields",
        apply: rename_legacy_fields,
    },
    Hack {
        name: "normalize-three-scale",
        apply: normalize_three_scale,
    },
    Hack {
        name: "derive-jaeger-name",
        apply: derive_jaeger_name,
    },
];

pub static TYPED_TO_LEGACY: &[Hack] = &[Hack {
    name: "three-scale-params-as-strings",
    apply: three_scale_params_as_strings,
}];

/// Run a pipeline over `values`
pub fn run(hacks: &[Hack], values: &mut Values, ctx: &MapperContext<'_>) -> Result<()> {
    for hack in hacks {
        if hack.apply(values, ctx)? {
            debug!(hack = hack.name, version = %ctx.version, "applied compatibility hack");
        }
    }
    Ok(())
}

/// Renamed fields: old path -> current path
static RENAMED_FIELDS: phf::Map<&'static str, &'static str> = phf_map! {
    "kiali.dashboard.grafanaUrl" => "kiali.dashboard.grafanaURL",
    "tracing.jaeger.name" => "tracing.jaeger.resourceName",
    "gateways.istio-ingressgateway.iorEnabled" => "gateways.istio-ingressgateway.ior_enabled",
};

fn rename_legacy_fields(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<bool> {
    let mut changed = false;
    for (old, current) in RENAMED_FIELDS.entries() {
        let Some(value) = values.remove_pruned(old) else {
            continue;
        };
        changed = true;
        if value.is_null() || values.contains(current)? {
            continue;
        }
        values.set(current, value)?;
    }
    Ok(changed)
}

const PARAM_PREFIX: &str = "PARAM_";

/// Mutable access to the `PARAM_*` entries of the embedded 3scale settings
fn three_scale_params(values: &mut Values) -> impl Iterator<Item = &mut Value> {
    let params = match values.0.get_mut(THREE_SCALE_ROOT) {
        Some(Value::Map(map)) => Some(map),
        _ => None,
    };
    params
        .into_iter()
        .flat_map(|map| map.iter_mut())
        .filter(|(key, _)| key.starts_with(PARAM_PREFIX))
        .map(|(_, value)| value)
}

fn normalize_three_scale(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<bool> {
    let mut changed = false;
    for value in three_scale_params(values) {
        let Value::String(text) = value else {
            continue;
        };
        let parsed = match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => match other.parse::<i64>() {
                Ok(number) => Value::Int(number),
                Err(_) => continue,
            },
        };
        *value = parsed;
        changed = true;
    }
    Ok(changed)
}

const JAEGER_NAME: &str = "tracing.jaeger.resourceName";
const ZIPKIN_ADDRESS: &str = "global.tracer.zipkin.address";
const COLLECTOR_SUFFIX: &str = "-collector";

fn derive_jaeger_name(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<bool> {
    if values.contains(JAEGER_NAME)? {
        return Ok(false);
    }
    let Some(address) = values.get::<String>(ZIPKIN_ADDRESS)? else {
        return Ok(false);
    };

    let host = address.split("://").last().unwrap_or_default();
    let label = host.split(['.', ':']).next().unwrap_or_default();
    match label.strip_suffix(COLLECTOR_SUFFIX) {
        Some(name) if !name.is_empty() => {
            values.set(JAEGER_NAME, name)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn three_scale_params_as_strings(values: &mut Values, ctx: &MapperContext<'_>) -> Result<bool> {
    if ctx.version.at_least(2, 0) {
        return Ok(false);
    }
    let mut changed = false;
    for value in three_scale_params(values) {
        let text = match value {
            Value::Bool(flag) => flag.to_string(),
            Value::Int(number) => number.to_string(),
            _ => continue,
        };
        *value = Value::String(text);
        changed = true;
    }
    Ok(changed)
}
