//! Tracing settings

use meshspec_core::spec::{TracerType, TracingConfig};
use meshspec_core::{CoreError, Values};

use super::{FieldMapper, non_empty, set_duplicated, take};
use crate::context::MapperContext;
use crate::error::{ConvertError, Result};

const ENABLED: &str = "tracing.enabled";
const PROVIDER: &str = "tracing.provider";
const GLOBAL_ENABLED: &str = "global.enableTracing";
const SAMPLING: (&str, &str) = ("pilot.traceSampling", "meshConfig.defaultConfig.tracing.sampling");

const JAEGER_PROVIDER: &str = "jaeger";

/// Typed sampling is in hundredths of a percent
const MAX_SAMPLING: i32 = 10000;

pub struct TracingMapper;

impl FieldMapper for TracingMapper {
    type Config = TracingConfig;
    const NAME: &'static str = "tracing";

    fn populate_values(config: &TracingConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        match config.tracer_type {
            Some(TracerType::Jaeger) => {
                values.set(ENABLED, true)?;
                values.set(PROVIDER, JAEGER_PROVIDER)?;
                values.set(GLOBAL_ENABLED, true)?;
            }
            Some(TracerType::None) => {
                values.set(ENABLED, false)?;
                values.set(GLOBAL_ENABLED, false)?;
            }
            None => {}
        }

        let out_of_range = config
            .sampling
            .filter(|sampling| !(0..=MAX_SAMPLING).contains(sampling));
        if let Some(sampling) = out_of_range {
            return Err(ConvertError::InvalidSpec(format!(
                "tracing sampling {sampling} is outside 0..={MAX_SAMPLING}"
            )));
        }

        // Legacy sampling is a percentage
        let percent = config.sampling.map(|sampling| f64::from(sampling) / 100.0);
        set_duplicated(values, SAMPLING.0, SAMPLING.1, percent)
    }

    fn populate_config(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<Option<TracingConfig>> {
        let enabled = take::<bool>(values, ENABLED)?;
        let global_enabled = take::<bool>(values, GLOBAL_ENABLED)?;
        let provider = take::<String>(values, PROVIDER)?;

        let tracer_type = match (enabled.or(global_enabled), provider) {
            (Some(false), _) => Some(TracerType::None),
            (_, Some(provider)) if provider == JAEGER_PROVIDER => Some(TracerType::Jaeger),
            (_, Some(provider)) => {
                return Err(CoreError::UnknownEnumValue {
                    kind: "tracing provider",
                    value: provider,
                    expected: Some(format!("expected one of: {JAEGER_PROVIDER}")),
                }
                .into());
            }
            (Some(true), None) => Some(TracerType::Jaeger),
            (None, None) => None,
        };

        let subsystem = take::<f64>(values, SAMPLING.0)?;
        let shared = take::<f64>(values, SAMPLING.1)?;
        let sampling = match (shared, subsystem) {
            (Some(percent), _) => Some(sampling_from_percent(SAMPLING.1, percent)?),
            (None, Some(percent)) => Some(sampling_from_percent(SAMPLING.0, percent)?),
            (None, None) => None,
        };

        Ok(non_empty(TracingConfig {
            tracer_type,
            sampling,
        }))
    }
}

fn sampling_from_percent(path: &str, percent: f64) -> Result<i32> {
    let found = if !percent.is_finite() {
        "non-finite number"
    } else if !(0.0..=100.0).contains(&percent) {
        "number outside 0..=100"
    } else {
        return Ok((percent * 100.0).round() as i32);
    };

    Err(CoreError::TypeCoercion {
        path: path.to_string(),
        expected: "percentage between 0 and 100",
        found,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::test_support::round_trip;
    use meshspec_versions::V2_0Strategy;

    #[test]
    fn test_round_trip() {
        let ctx = MapperContext::new(&V2_0Strategy);
        for config in [
            TracingConfig {
                tracer_type: Some(TracerType::Jaeger),
                sampling: Some(10000),
            },
            TracingConfig {
                tracer_type: Some(TracerType::None),
                sampling: None,
            },
            TracingConfig {
                tracer_type: None,
                sampling: Some(25),
            },
        ] {
            let (_, read) = round_trip::<TracingMapper>(&config, &ctx);
            assert_eq!(read, Some(config));
        }
    }

    #[test]
    fn test_sampling_is_written_as_percent() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = TracingConfig {
            tracer_type: None,
            sampling: Some(150),
        };
        let (written, _) = round_trip::<TracingMapper>(&config, &ctx);
        assert_eq!(written.get::<f64>("pilot.traceSampling").unwrap(), Some(1.5));
        assert_eq!(
            written.get::<f64>("meshConfig.defaultConfig.tracing.sampling").unwrap(),
            Some(1.5)
        );
    }

    #[test]
    fn test_shared_sampling_wins() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = Values::from_yaml(
            r#"
pilot:
  traceSampling: 1
meshConfig:
  defaultConfig:
    tracing:
      sampling: 0.5
"#,
        )
        .unwrap();

        let config = TracingMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        assert_eq!(config.sampling, Some(50));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = Values::from_yaml("tracing:\n  enabled: true\n  provider: zipkin\n").unwrap();
        assert!(TracingMapper::populate_config(&mut values, &ctx).is_err());
    }

    #[test]
    fn test_out_of_range_sampling_is_rejected() {
        let ctx = MapperContext::new(&V2_0Strategy);
        for yaml in [
            "pilot:\n  traceSampling: 1.0e12\n",
            "pilot:\n  traceSampling: -5\n",
            "pilot:\n  traceSampling: .nan\n",
            "meshConfig:\n  defaultConfig:\n    tracing:\n      sampling: 100.5\n",
        ] {
            let mut values = Values::from_yaml(yaml).unwrap();
            let err = TracingMapper::populate_config(&mut values, &ctx).unwrap_err();
            assert!(
                matches!(err, ConvertError::Core(CoreError::TypeCoercion { .. })),
                "{yaml}: {err}"
            );
        }
    }

    #[test]
    fn test_sampling_bounds_are_accepted() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = Values::from_yaml("pilot:\n  traceSampling: 0\n").unwrap();
        let config = TracingMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        assert_eq!(config.sampling, Some(0));

        let mut values = Values::from_yaml("pilot:\n  traceSampling: 100\n").unwrap();
        let config = TracingMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        assert_eq!(config.sampling, Some(MAX_SAMPLING));
    }

    #[test]
    fn test_typed_sampling_out_of_range_is_rejected() {
        let ctx = MapperContext::new(&V2_0Strategy);
        for sampling in [-1, MAX_SAMPLING + 1] {
            let config = TracingConfig {
                tracer_type: None,
                sampling: Some(sampling),
            };
            let mut values = Values::new();
            let err = TracingMapper::populate_values(&config, &mut values, &ctx).unwrap_err();
            assert!(matches!(err, ConvertError::InvalidSpec(_)));
            assert!(values.is_empty());
        }
    }
}
