//! Telemetry settings

use meshspec_core::Values;
use meshspec_core::spec::{
    IstiodTelemetryConfig, MetadataExchangeConfig, MixerTelemetryAdaptersConfig,
    MixerTelemetryConfig, MixerTelemetryPrometheusConfig, MixerTelemetryStdioConfig,
    PrometheusFilterConfig, RemoteTelemetryConfig, TelemetryBatchingConfig, TelemetryConfig,
    TelemetryType,
};
use meshspec_versions::TelemetryFlags;

use super::{FieldMapper, non_empty, set_duplicated, set_enum, set_opt, take, take_duplicated, take_enum};
use crate::context::MapperContext;
use crate::error::Result;

const IMPLEMENTATION: &str = "telemetry.implementation";
const ENABLED: &str = "telemetry.enabled";
const MIXER_ENABLED: &str = "mixer.telemetry.enabled";
const V1_ENABLED: &str = "telemetry.v1.enabled";
const V2_ENABLED: &str = "telemetry.v2.enabled";
const REMOTE_ADDRESS: &str = "global.remoteTelemetryAddress";
const REMOTE_CREATE_SERVICE: &str = "global.createRemoteTelemetrySvcEndpoints";
const SESSION_AFFINITY: &str = "mixer.telemetry.sessionAffinityEnabled";
const BATCH_MAX_ENTRIES: (&str, &str) = (
    "mixer.telemetry.reportBatchMaxEntries",
    "meshConfig.reportBatchMaxEntries",
);
const BATCH_MAX_TIME: (&str, &str) = (
    "mixer.telemetry.reportBatchMaxTime",
    "meshConfig.reportBatchMaxTime",
);

pub struct TelemetryMapper;

impl FieldMapper for TelemetryMapper {
    type Config = TelemetryConfig;
    const NAME: &'static str = "telemetry";

    fn populate_values(config: &TelemetryConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        set_enum(values, IMPLEMENTATION, config.telemetry_type)?;
        if let Some(telemetry_type) = config.telemetry_type {
            // (telemetry.enabled, mixer.telemetry.enabled, v1, v2)
            let (enabled, mixer, v1, v2) = match telemetry_type {
                TelemetryType::None => (false, false, false, false),
                TelemetryType::Mixer => (true, true, true, false),
                TelemetryType::Remote => (true, false, true, false),
                TelemetryType::Istiod => (true, false, false, true),
            };
            values.set(ENABLED, enabled)?;
            values.set(MIXER_ENABLED, mixer)?;
            values.set(V1_ENABLED, v1)?;
            values.set(V2_ENABLED, v2)?;
        }

        if let Some(mixer) = &config.mixer {
            populate_mixer_values(mixer, values)?;
        }
        if let Some(remote) = &config.remote {
            set_opt(values, REMOTE_ADDRESS, remote.address.as_ref())?;
            set_opt(values, REMOTE_CREATE_SERVICE, remote.create_service)?;
            populate_batching_values(remote.batching.as_ref(), values)?;
        }
        if let Some(istiod) = &config.istiod {
            populate_istiod_values(istiod, values)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, ctx: &MapperContext<'_>) -> Result<Option<TelemetryConfig>> {
        let explicit = take_enum::<TelemetryType>(values, IMPLEMENTATION)?;
        let flags = TelemetryFlags {
            enabled: take(values, ENABLED)?,
            mixer_enabled: take(values, MIXER_ENABLED)?,
            v1_enabled: take(values, V1_ENABLED)?,
            v2_enabled: take(values, V2_ENABLED)?,
            remote_configured: values.contains(REMOTE_ADDRESS)?,
        };
        let telemetry_type = explicit.or_else(|| ctx.strategy.infer_telemetry_type(&flags));

        let mut config = TelemetryConfig {
            telemetry_type,
            ..Default::default()
        };
        match telemetry_type {
            Some(TelemetryType::Mixer) => config.mixer = Some(populate_mixer_config(values)?),
            Some(TelemetryType::Remote) => config.remote = Some(populate_remote_config(values)?),
            Some(TelemetryType::Istiod) => config.istiod = Some(populate_istiod_config(values)?),
            Some(TelemetryType::None) => {}
            None => {
                if flags.remote_configured {
                    config.remote = non_empty(populate_remote_config(values)?);
                } else {
                    config.mixer = non_empty(populate_mixer_config(values)?);
                }
                config.istiod = non_empty(populate_istiod_config(values)?);
            }
        }

        Ok(non_empty(config))
    }
}

fn populate_batching_values(batching: Option<&TelemetryBatchingConfig>, values: &mut Values) -> Result<()> {
    let Some(batching) = batching else {
        return Ok(());
    };
    set_duplicated(values, BATCH_MAX_ENTRIES.0, BATCH_MAX_ENTRIES.1, batching.max_entries)?;
    set_duplicated(values, BATCH_MAX_TIME.0, BATCH_MAX_TIME.1, batching.max_time.clone())
}

fn populate_mixer_values(mixer: &MixerTelemetryConfig, values: &mut Values) -> Result<()> {
    set_opt(values, SESSION_AFFINITY, mixer.session_affinity)?;
    populate_batching_values(mixer.batching.as_ref(), values)?;

    if let Some(adapters) = &mixer.adapters {
        set_opt(values, "mixer.adapters.useAdapterCRDs", adapters.use_adapter_crds)?;
        set_opt(values, "mixer.adapters.kubernetesenv.enabled", adapters.kubernetesenv)?;
        if let Some(stdio) = &adapters.stdio {
            set_opt(values, "mixer.adapters.stdio.enabled", stdio.enabled)?;
            set_opt(values, "mixer.adapters.stdio.outputAsJson", stdio.output_as_json)?;
        }
        if let Some(prometheus) = &adapters.prometheus {
            set_opt(values, "mixer.adapters.prometheus.enabled", prometheus.enabled)?;
            set_opt(
                values,
                "mixer.adapters.prometheus.metricsExpiryDuration",
                prometheus.metrics_expiry_duration.as_ref(),
            )?;
        }
    }
    Ok(())
}

fn populate_istiod_values(istiod: &IstiodTelemetryConfig, values: &mut Values) -> Result<()> {
    if let Some(exchange) = &istiod.metadata_exchange {
        set_opt(values, "telemetry.v2.metadataExchange.wasmEnabled", exchange.wasm_enabled)?;
    }
    if let Some(prometheus) = &istiod.prometheus_filter {
        set_opt(values, "meshConfig.enablePrometheusMerge", prometheus.scrape)?;
        set_opt(values, "telemetry.v2.prometheus.wasmEnabled", prometheus.wasm_enabled)?;
    }
    Ok(())
}

fn populate_batching_config(values: &mut Values) -> Result<Option<TelemetryBatchingConfig>> {
    Ok(non_empty(TelemetryBatchingConfig {
        max_entries: take_duplicated(values, BATCH_MAX_ENTRIES.0, BATCH_MAX_ENTRIES.1)?,
        max_time: take_duplicated(values, BATCH_MAX_TIME.0, BATCH_MAX_TIME.1)?,
    }))
}

fn populate_mixer_config(values: &mut Values) -> Result<MixerTelemetryConfig> {
    let stdio = non_empty(MixerTelemetryStdioConfig {
        enabled: take(values, "mixer.adapters.stdio.enabled")?,
        output_as_json: take(values, "mixer.adapters.stdio.outputAsJson")?,
    });
    let prometheus = non_empty(MixerTelemetryPrometheusConfig {
        enabled: take(values, "mixer.adapters.prometheus.enabled")?,
        metrics_expiry_duration: take(values, "mixer.adapters.prometheus.metricsExpiryDuration")?,
    });
    let adapters = non_empty(MixerTelemetryAdaptersConfig {
        use_adapter_crds: take(values, "mixer.adapters.useAdapterCRDs")?,
        kubernetesenv: take(values, "mixer.adapters.kubernetesenv.enabled")?,
        stdio,
        prometheus,
    });

    Ok(MixerTelemetryConfig {
        session_affinity: take(values, SESSION_AFFINITY)?,
        batching: populate_batching_config(values)?,
        adapters,
    })
}

fn populate_remote_config(values: &mut Values) -> Result<RemoteTelemetryConfig> {
    Ok(RemoteTelemetryConfig {
        address: take(values, REMOTE_ADDRESS)?,
        create_service: take(values, REMOTE_CREATE_SERVICE)?,
        batching: populate_batching_config(values)?,
    })
}

fn populate_istiod_config(values: &mut Values) -> Result<IstiodTelemetryConfig> {
    let metadata_exchange = non_empty(MetadataExchangeConfig {
        wasm_enabled: take(values, "telemetry.v2.metadataExchange.wasmEnabled")?,
    });
    let prometheus_filter = non_empty(PrometheusFilterConfig {
        scrape: take(values, "meshConfig.enablePrometheusMerge")?,
        wasm_enabled: take(values, "telemetry.v2.prometheus.wasmEnabled")?,
    });

    Ok(IstiodTelemetryConfig {
        metadata_exchange,
        prometheus_filter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::test_support::round_trip;
    use meshspec_versions::{V2_0Strategy, V2_1Strategy, Version};

    fn batching() -> TelemetryBatchingConfig {
        TelemetryBatchingConfig {
            max_entries: Some(100),
            max_time: Some("1s".into()),
        }
    }

    #[test]
    fn test_mixer_round_trip() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = TelemetryConfig {
            telemetry_type: Some(TelemetryType::Mixer),
            mixer: Some(MixerTelemetryConfig {
                session_affinity: Some(true),
                batching: Some(batching()),
                adapters: Some(MixerTelemetryAdaptersConfig {
                    use_adapter_crds: Some(false),
                    kubernetesenv: Some(true),
                    stdio: Some(MixerTelemetryStdioConfig {
                        enabled: Some(true),
                        output_as_json: Some(false),
                    }),
                    prometheus: Some(MixerTelemetryPrometheusConfig {
                        enabled: Some(true),
                        metrics_expiry_duration: Some("10m".into()),
                    }),
                }),
            }),
            ..Default::default()
        };

        let (written, read) = round_trip::<TelemetryMapper>(&config, &ctx);

        assert_eq!(read, Some(config));
        assert_eq!(written.get::<i64>("meshConfig.reportBatchMaxEntries").unwrap(), Some(100));
        assert_eq!(written.get::<i64>("mixer.telemetry.reportBatchMaxEntries").unwrap(), Some(100));
        assert_eq!(written.get::<bool>("telemetry.v1.enabled").unwrap(), Some(true));
    }

    #[test]
    fn test_remote_and_istiod_round_trip() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let remote = TelemetryConfig {
            telemetry_type: Some(TelemetryType::Remote),
            remote: Some(RemoteTelemetryConfig {
                address: Some("telemetry.remote".into()),
                create_service: Some(true),
                batching: Some(batching()),
            }),
            ..Default::default()
        };
        let istiod = TelemetryConfig {
            telemetry_type: Some(TelemetryType::Istiod),
            istiod: Some(IstiodTelemetryConfig {
                metadata_exchange: Some(MetadataExchangeConfig {
                    wasm_enabled: Some(false),
                }),
                prometheus_filter: Some(PrometheusFilterConfig {
                    scrape: Some(true),
                    wasm_enabled: Some(false),
                }),
            }),
            ..Default::default()
        };

        for config in [remote, istiod] {
            let (_, read) = round_trip::<TelemetryMapper>(&config, &ctx);
            assert_eq!(read, Some(config));
        }
    }

    #[test]
    fn test_shared_batching_location_wins() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = Values::from_yaml(
            r#"
telemetry:
  implementation: Mixer
mixer:
  telemetry:
    reportBatchMaxTime: 5s
meshConfig:
  reportBatchMaxTime: 2s
"#,
        )
        .unwrap();

        let config = TelemetryMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        let batching = config.mixer.unwrap().batching.unwrap();
        assert_eq!(batching.max_time.as_deref(), Some("2s"));
    }

    #[test]
    fn test_inferred_istiod_on_v2_1() {
        let strategy = V2_1Strategy::new(Version::V2_1);
        let ctx = MapperContext::new(&strategy);
        let mut values = Values::from_yaml(
            r#"
mixer:
  telemetry:
    enabled: false
telemetry:
  v2:
    prometheus:
      wasmEnabled: true
"#,
        )
        .unwrap();

        let config = TelemetryMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        assert_eq!(config.telemetry_type, Some(TelemetryType::Istiod));
        assert_eq!(
            config.istiod.unwrap().prometheus_filter.unwrap().wasm_enabled,
            Some(true)
        );
    }

    #[test]
    fn test_disabled_telemetry() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = TelemetryConfig {
            telemetry_type: Some(TelemetryType::None),
            ..Default::default()
        };
        let (written, read) = round_trip::<TelemetryMapper>(&config, &ctx);
        assert_eq!(read, Some(config));
        assert_eq!(written.get::<bool>("telemetry.enabled").unwrap(), Some(false));
    }
}
