//! Field mappers
//!
//! Each subsystem of [`ControlPlaneSpec`](meshspec_core::ControlPlaneSpec)
//! has one mapper translating its typed block to and from legacy settings
//! paths. Writers omit unset fields. Readers consume every path they read so
//! the content left over afterwards is exactly what no mapper recognized.
//!
//! # Duplicated legacy locations
//!
//! Some settings may appear in two places. Readers take the subsystem
//! location first and the shared `meshConfig` location second; when both are
//! present the shared value wins. Writers always write both.
//!
//! | Typed field | Subsystem location | Shared location |
//! |-------------|--------------------|-----------------|
//! | `proxy.concurrency` | `global.proxy.concurrency` | `meshConfig.defaultConfig.concurrency` |
//! | `proxy.accessLogging.file` | `global.proxy.accessLogFile` | `meshConfig.accessLogFile` |
//! | `proxy.accessLogging.format` | `global.proxy.accessLogFormat` | `meshConfig.accessLogFormat` |
//! | `proxy.accessLogging.encoding` | `global.proxy.accessLogEncoding` | `meshConfig.accessLogEncoding` |
//! | `proxy.networking.connectionTimeout` | `global.connectTimeout` | `meshConfig.connectTimeout` |
//! | `telemetry.*.batching.maxEntries` | `mixer.telemetry.reportBatchMaxEntries` | `meshConfig.reportBatchMaxEntries` |
//! | `telemetry.*.batching.maxTime` | `mixer.telemetry.reportBatchMaxTime` | `meshConfig.reportBatchMaxTime` |
//! | `security.trust.additionalDomains` | `global.trustDomainAliases` | `meshConfig.trustDomainAliases` |
//! | `tracing.sampling` | `pilot.traceSampling` | `meshConfig.defaultConfig.tracing.sampling` |
//!
//! # Round-trip exclusions
//!
//! Writing a block and reading it back yields the same block, except:
//! - write-only legacy flags derived from a `type` (e.g. `mixer.policy.enabled`)
//!   are consumed and discarded
//! - a block whose `type` is set always reads back with that type's
//!   sub-block present, even if it was written without one
//! - sub-blocks that do not match the block's `type` are not read back
//! - a block with no `type` may read back with a type inferred by the
//!   version strategy
//! - blocks and sub-blocks with every field unset read back as absent

use std::str::FromStr;

use indexmap::IndexMap;
use meshspec_core::{CoreError, FromValue, Value, Values};

use crate::context::MapperContext;
use crate::error::Result;

pub mod addons;
pub mod cluster;
pub mod gateways;
pub mod general;
pub mod policy;
pub mod proxy;
pub mod runtime;
pub mod security;
pub mod telemetry;
pub mod tracer;

pub use addons::AddonsMapper;
pub use cluster::ClusterMapper;
pub use gateways::GatewaysMapper;
pub use general::GeneralMapper;
pub use policy::{PolicyMapper, populate_remote_policy_values};
pub use proxy::ProxyMapper;
pub use runtime::RuntimeMapper;
pub use security::SecurityMapper;
pub use telemetry::TelemetryMapper;
pub use tracer::TracingMapper;

/// Translates one typed block to and from legacy settings
pub trait FieldMapper {
    type Config;

    /// Name used in log output
    const NAME: &'static str;

    /// Write the block's set fields into `values`
    fn populate_values(
        config: &Self::Config,
        values: &mut Values,
        ctx: &MapperContext<'_>,
    ) -> Result<()>;

    /// Read (and consume) the block's fields from `values`
    ///
    /// Returns `None` when none of the block's fields were present.
    fn populate_config(values: &mut Values, ctx: &MapperContext<'_>) -> Result<Option<Self::Config>>;
}

/// `Some(config)` unless every field is unset
pub(crate) fn non_empty<T: Default + PartialEq>(config: T) -> Option<T> {
    if config == T::default() {
        None
    } else {
        Some(config)
    }
}

pub(crate) fn set_opt<T: Into<Value>>(values: &mut Values, path: &str, value: Option<T>) -> Result<()> {
    if let Some(value) = value {
        values.set(path, value)?;
    }
    Ok(())
}

pub(crate) fn set_enum<E: AsEnumStr>(values: &mut Values, path: &str, value: Option<E>) -> Result<()> {
    set_opt(values, path, value.map(|v| v.enum_str()))
}

pub(crate) fn set_strings(values: &mut Values, path: &str, items: &[String]) -> Result<()> {
    if !items.is_empty() {
        values.set(path, items)?;
    }
    Ok(())
}

pub(crate) fn set_string_map(
    values: &mut Values,
    path: &str,
    map: &IndexMap<String, String>,
) -> Result<()> {
    if !map.is_empty() {
        values.set(path, map)?;
    }
    Ok(())
}

/// Write a list as one comma separated string
pub(crate) fn set_joined(values: &mut Values, path: &str, items: &[String]) -> Result<()> {
    if !items.is_empty() {
        values.set(path, items.join(","))?;
    }
    Ok(())
}

/// Write a value to both locations of a duplicated field
pub(crate) fn set_duplicated<T: Into<Value> + Clone>(
    values: &mut Values,
    subsystem: &str,
    shared: &str,
    value: Option<T>,
) -> Result<()> {
    if let Some(value) = value {
        values.set(subsystem, value.clone())?;
        values.set(shared, value)?;
    }
    Ok(())
}

pub(crate) fn take<T: FromValue>(values: &mut Values, path: &str) -> Result<Option<T>> {
    Ok(values.get_and_remove(path)?)
}

pub(crate) fn take_or_default<T: FromValue + Default>(values: &mut Values, path: &str) -> Result<T> {
    Ok(values.get_and_remove(path)?.unwrap_or_default())
}

/// Read a duplicated field; the shared location wins
pub(crate) fn take_duplicated<T: FromValue>(
    values: &mut Values,
    subsystem: &str,
    shared: &str,
) -> Result<Option<T>> {
    let subsystem_value = values.get_and_remove::<T>(subsystem)?;
    let shared_value = values.get_and_remove::<T>(shared)?;
    Ok(shared_value.or(subsystem_value))
}

/// Read an enum-valued string, rejecting unknown values
pub(crate) fn take_enum<E>(values: &mut Values, path: &str) -> Result<Option<E>>
where
    E: FromStr<Err = CoreError>,
{
    match values.get_and_remove::<String>(path)? {
        Some(text) => Ok(Some(text.parse()?)),
        None => Ok(None),
    }
}

/// Read a list stored either as a comma separated string or as a list
pub(crate) fn take_joined(values: &mut Values, path: &str) -> Result<Vec<String>> {
    match values.get_value(path)? {
        Some(Value::String(joined)) => {
            let items = split_list(joined);
            values.remove(path);
            Ok(items)
        }
        _ => take_or_default(values, path),
    }
}

pub(crate) fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bridges the generated string enums into [`set_enum`]
pub(crate) trait AsEnumStr: Copy {
    fn enum_str(self) -> &'static str;
}

macro_rules! as_enum_str {
    ($($ty:ty),+ $(,)?) => {
        $(impl AsEnumStr for $ty {
            fn enum_str(self) -> &'static str {
                self.as_str()
            }
        })+
    };
}

as_enum_str!(
    meshspec_core::spec::PolicyType,
    meshspec_core::spec::TelemetryType,
    meshspec_core::spec::TracerType,
    meshspec_core::spec::ProxyNetworkInitType,
    meshspec_core::spec::OutboundTrafficPolicy,
    meshspec_core::spec::ControlPlaneCertProviderType,
    meshspec_core::spec::IdentityConfigType,
    meshspec_core::spec::CertificateAuthorityType,
    meshspec_core::spec::IstioCertificateSignerType,
    meshspec_core::spec::RouterModeType,
    meshspec_core::spec::JaegerStorageType,
);

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Write `config` into an empty document, then read it back
    ///
    /// Returns the document as written and the block read from it; the
    /// document is checked to be fully consumed by the read.
    pub(crate) fn round_trip<M: FieldMapper>(
        config: &M::Config,
        ctx: &MapperContext<'_>,
    ) -> (Values, Option<M::Config>) {
        let mut values = Values::new();
        M::populate_values(config, &mut values, ctx).unwrap();
        let written = values.deep_copy();

        let read = M::populate_config(&mut values, ctx).unwrap();
        values.prune_empty();
        assert!(values.is_empty(), "unconsumed content: {values:?}");
        (written, read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_duplicated_shared_wins() {
        let mut values = Values::from_yaml(
            r#"
global:
  proxy:
    concurrency: 2
meshConfig:
  defaultConfig:
    concurrency: 4
"#,
        )
        .unwrap();

        let concurrency: Option<i32> = take_duplicated(
            &mut values,
            "global.proxy.concurrency",
            "meshConfig.defaultConfig.concurrency",
        )
        .unwrap();

        assert_eq!(concurrency, Some(4));
        assert!(!values.contains("global.proxy.concurrency").unwrap());
        assert!(!values.contains("meshConfig.defaultConfig.concurrency").unwrap());
    }

    #[test]
    fn test_take_duplicated_falls_back_to_subsystem() {
        let mut values = Values::from_yaml("global:\n  proxy:\n    concurrency: 2\n").unwrap();
        let concurrency: Option<i32> = take_duplicated(
            &mut values,
            "global.proxy.concurrency",
            "meshConfig.defaultConfig.concurrency",
        )
        .unwrap();
        assert_eq!(concurrency, Some(2));
    }

    #[test]
    fn test_take_joined_accepts_string_or_list() {
        let mut values = Values::from_yaml(
            r#"
a: "80, 443,,8080"
b: ["1", "2"]
"#,
        )
        .unwrap();

        assert_eq!(take_joined(&mut values, "a").unwrap(), vec!["80", "443", "8080"]);
        assert_eq!(take_joined(&mut values, "b").unwrap(), vec!["1", "2"]);
        assert!(take_joined(&mut values, "c").unwrap().is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn test_take_enum_rejects_unknown() {
        let mut values = Values::from_yaml("policy:\n  implementation: Sometimes\n").unwrap();
        let result = take_enum::<meshspec_core::spec::PolicyType>(&mut values, "policy.implementation");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(meshspec_core::spec::TracingConfig::default()), None);
        assert!(non_empty(meshspec_core::spec::TracingConfig {
            sampling: Some(1),
            ..Default::default()
        })
        .is_some());
    }
}
