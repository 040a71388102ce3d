//! Add-on components: Prometheus, Grafana, Kiali, Jaeger and 3scale

use meshspec_core::spec::{
    AddonsConfig, ComponentIngressConfig, ComponentServiceConfig, GrafanaAddonConfig,
    GrafanaInstallConfig, GrafanaPersistenceConfig, GrafanaSecurityConfig, JaegerAddonConfig,
    JaegerElasticsearchStorageConfig, JaegerInstallConfig, JaegerMemoryStorageConfig,
    JaegerStorageConfig, JaegerStorageType, KialiAddonConfig, KialiDashboardConfig,
    KialiInstallConfig, PrometheusAddonConfig, PrometheusInstallConfig, ThreeScaleBackendConfig,
    ThreeScaleClientConfig, ThreeScaleConfig, ThreeScaleGrpcConfig, ThreeScaleMetricsConfig,
    ThreeScaleSystemConfig,
};
use meshspec_core::{CoreError, Values};

use super::{FieldMapper, non_empty, set_opt, set_string_map, set_strings, take, take_or_default};
use crate::context::MapperContext;
use crate::error::Result;

/// Root key of the 3scale settings inside the combined document
pub const THREE_SCALE_ROOT: &str = "3scale";

const JAEGER_TEMPLATE: &str = "tracing.jaeger.template";
const TEMPLATE_ALL_IN_ONE: &str = "all-in-one";
const TEMPLATE_ELASTICSEARCH: &str = "production-elasticsearch";

pub struct AddonsMapper;

impl FieldMapper for AddonsMapper {
    type Config = AddonsConfig;
    const NAME: &'static str = "addons";

    fn populate_values(config: &AddonsConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        if let Some(prometheus) = &config.prometheus {
            populate_prometheus_values(prometheus, values)?;
        }
        if let Some(grafana) = &config.grafana {
            populate_grafana_values(grafana, values)?;
        }
        if let Some(kiali) = &config.kiali {
            populate_kiali_values(kiali, values)?;
        }
        if let Some(jaeger) = &config.jaeger {
            populate_jaeger_values(jaeger, values)?;
        }
        if let Some(three_scale) = &config.three_scale {
            populate_three_scale_values(three_scale, values)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<Option<AddonsConfig>> {
        Ok(non_empty(AddonsConfig {
            prometheus: populate_prometheus_config(values)?,
            grafana: populate_grafana_config(values)?,
            kiali: populate_kiali_config(values)?,
            jaeger: populate_jaeger_config(values)?,
            three_scale: populate_three_scale_config(values)?,
        }))
    }
}

// Prometheus

fn populate_prometheus_values(config: &PrometheusAddonConfig, values: &mut Values) -> Result<()> {
    set_opt(values, "prometheus.enabled", config.enabled)?;
    set_opt(values, "kiali.prometheusAddr", config.address.as_ref())?;
    if let Some(install) = &config.install {
        set_opt(values, "prometheus.retention", install.retention.as_ref())?;
        set_opt(values, "prometheus.scrapeInterval", install.scrape_interval.as_ref())?;
        set_opt(values, "prometheus.security.enabled", install.use_tls)?;
    }
    Ok(())
}

fn populate_prometheus_config(values: &mut Values) -> Result<Option<PrometheusAddonConfig>> {
    let install = non_empty(PrometheusInstallConfig {
        retention: take(values, "prometheus.retention")?,
        scrape_interval: take(values, "prometheus.scrapeInterval")?,
        use_tls: take(values, "prometheus.security.enabled")?,
    });
    Ok(non_empty(PrometheusAddonConfig {
        enabled: take(values, "prometheus.enabled")?,
        address: take(values, "kiali.prometheusAddr")?,
        install,
    }))
}

// Grafana

fn populate_grafana_values(config: &GrafanaAddonConfig, values: &mut Values) -> Result<()> {
    set_opt(values, "grafana.enabled", config.enabled)?;
    set_opt(values, "kiali.dashboard.grafanaURL", config.address.as_ref())?;

    let Some(install) = &config.install else {
        return Ok(());
    };
    set_string_map(values, "grafana.env", &install.config)?;
    if let Some(persistence) = &install.persistence {
        set_opt(values, "grafana.persist", persistence.enabled)?;
        set_opt(values, "grafana.storageClassName", persistence.storage_class_name.as_ref())?;
        set_opt(values, "grafana.accessMode", persistence.access_mode.as_ref())?;
        set_opt(values, "grafana.storageCapacity", persistence.capacity.as_ref())?;
    }
    if let Some(security) = &install.security {
        set_opt(values, "grafana.security.enabled", security.enabled)?;
        set_opt(values, "grafana.security.secretName", security.secret_name.as_ref())?;
        set_opt(values, "grafana.security.usernameKey", security.username_key.as_ref())?;
        set_opt(values, "grafana.security.passphraseKey", security.passphrase_key.as_ref())?;
    }
    Ok(())
}

fn populate_grafana_config(values: &mut Values) -> Result<Option<GrafanaAddonConfig>> {
    let persistence = non_empty(GrafanaPersistenceConfig {
        enabled: take(values, "grafana.persist")?,
        storage_class_name: take(values, "grafana.storageClassName")?,
        access_mode: take(values, "grafana.accessMode")?,
        capacity: take(values, "grafana.storageCapacity")?,
    });
    let security = non_empty(GrafanaSecurityConfig {
        enabled: take(values, "grafana.security.enabled")?,
        secret_name: take(values, "grafana.security.secretName")?,
        username_key: take(values, "grafana.security.usernameKey")?,
        passphrase_key: take(values, "grafana.security.passphraseKey")?,
    });
    let install = non_empty(GrafanaInstallConfig {
        config: take_or_default(values, "grafana.env")?,
        persistence,
        security,
    });

    Ok(non_empty(GrafanaAddonConfig {
        enabled: take(values, "grafana.enabled")?,
        address: take(values, "kiali.dashboard.grafanaURL")?,
        install,
    }))
}

// Kiali

fn populate_kiali_values(config: &KialiAddonConfig, values: &mut Values) -> Result<()> {
    set_opt(values, "kiali.enabled", config.enabled)?;
    set_opt(values, "kiali.resourceName", config.name.as_ref())?;

    let Some(install) = &config.install else {
        return Ok(());
    };
    if let Some(dashboard) = &install.dashboard {
        set_opt(values, "kiali.dashboard.viewOnlyMode", dashboard.view_only)?;
        set_opt(values, "kiali.dashboard.enableGrafana", dashboard.enable_grafana)?;
        set_opt(values, "kiali.dashboard.enablePrometheus", dashboard.enable_prometheus)?;
        set_opt(values, "kiali.dashboard.enableTracing", dashboard.enable_tracing)?;
    }
    if let Some(ingress) = install.service.as_ref().and_then(|s| s.ingress.as_ref()) {
        populate_ingress_values(ingress, "kiali", values)?;
    }
    Ok(())
}

fn populate_kiali_config(values: &mut Values) -> Result<Option<KialiAddonConfig>> {
    let dashboard = non_empty(KialiDashboardConfig {
        view_only: take(values, "kiali.dashboard.viewOnlyMode")?,
        enable_grafana: take(values, "kiali.dashboard.enableGrafana")?,
        enable_prometheus: take(values, "kiali.dashboard.enablePrometheus")?,
        enable_tracing: take(values, "kiali.dashboard.enableTracing")?,
    });
    let service = non_empty(ComponentServiceConfig {
        ingress: populate_ingress_config(values, "kiali")?,
    });

    Ok(non_empty(KialiAddonConfig {
        enabled: take(values, "kiali.enabled")?,
        name: take(values, "kiali.resourceName")?,
        install: non_empty(KialiInstallConfig { dashboard, service }),
    }))
}

// Jaeger

fn populate_jaeger_values(config: &JaegerAddonConfig, values: &mut Values) -> Result<()> {
    set_opt(values, "tracing.jaeger.resourceName", config.name.as_ref())?;

    let Some(install) = &config.install else {
        return Ok(());
    };
    if let Some(storage) = &install.storage {
        match storage.storage_type {
            Some(JaegerStorageType::Memory) => {
                values.set(JAEGER_TEMPLATE, TEMPLATE_ALL_IN_ONE)?;
                if let Some(memory) = &storage.memory {
                    set_opt(values, "tracing.jaeger.memory.max_traces", memory.max_traces)?;
                }
            }
            Some(JaegerStorageType::Elasticsearch) => {
                values.set(JAEGER_TEMPLATE, TEMPLATE_ELASTICSEARCH)?;
                if let Some(es) = &storage.elasticsearch {
                    set_opt(values, "tracing.jaeger.elasticsearch.nodeCount", es.node_count)?;
                    set_opt(values, "tracing.jaeger.elasticsearch.storage", es.storage.as_ref())?;
                    set_opt(
                        values,
                        "tracing.jaeger.elasticsearch.redundancyPolicy",
                        es.redundancy_policy.as_ref(),
                    )?;
                    set_opt(values, "tracing.jaeger.elasticsearch.esIndexCleaner", es.index_cleaner.as_ref())?;
                }
            }
            None => {}
        }
    }
    if let Some(ingress) = &install.ingress {
        populate_ingress_values(ingress, "tracing", values)?;
    }
    Ok(())
}

fn populate_jaeger_config(values: &mut Values) -> Result<Option<JaegerAddonConfig>> {
    let storage = match take::<String>(values, JAEGER_TEMPLATE)?.as_deref() {
        Some(TEMPLATE_ALL_IN_ONE) => Some(JaegerStorageConfig {
            storage_type: Some(JaegerStorageType::Memory),
            memory: Some(JaegerMemoryStorageConfig {
                max_traces: take(values, "tracing.jaeger.memory.max_traces")?,
            }),
            elasticsearch: None,
        }),
        Some(TEMPLATE_ELASTICSEARCH) => Some(JaegerStorageConfig {
            storage_type: Some(JaegerStorageType::Elasticsearch),
            memory: None,
            elasticsearch: Some(JaegerElasticsearchStorageConfig {
                node_count: take(values, "tracing.jaeger.elasticsearch.nodeCount")?,
                storage: take(values, "tracing.jaeger.elasticsearch.storage")?,
                redundancy_policy: take(values, "tracing.jaeger.elasticsearch.redundancyPolicy")?,
                index_cleaner: take(values, "tracing.jaeger.elasticsearch.esIndexCleaner")?,
            }),
        }),
        Some(other) => {
            return Err(CoreError::UnknownEnumValue {
                kind: "jaeger template",
                value: other.to_string(),
                expected: Some(format!(
                    "expected one of: {TEMPLATE_ALL_IN_ONE}, {TEMPLATE_ELASTICSEARCH}"
                )),
            }
            .into());
        }
        None => None,
    };
    let ingress = populate_ingress_config(values, "tracing")?;

    Ok(non_empty(JaegerAddonConfig {
        name: take(values, "tracing.jaeger.resourceName")?,
        install: non_empty(JaegerInstallConfig { storage, ingress }),
    }))
}

fn populate_ingress_values(ingress: &ComponentIngressConfig, prefix: &str, values: &mut Values) -> Result<()> {
    set_opt(values, &format!("{prefix}.ingress.enabled"), ingress.enabled)?;
    set_opt(values, &format!("{prefix}.contextPath"), ingress.context_path.as_ref())?;
    set_strings(values, &format!("{prefix}.ingress.hosts"), &ingress.hosts)
}

fn populate_ingress_config(values: &mut Values, prefix: &str) -> Result<Option<ComponentIngressConfig>> {
    Ok(non_empty(ComponentIngressConfig {
        enabled: take(values, &format!("{prefix}.ingress.enabled"))?,
        context_path: take(values, &format!("{prefix}.contextPath"))?,
        hosts: take_or_default(values, &format!("{prefix}.ingress.hosts"))?,
    }))
}

// 3scale

fn param(name: &str) -> String {
    format!("{THREE_SCALE_ROOT}.PARAM_{name}")
}

fn populate_three_scale_values(config: &ThreeScaleConfig, values: &mut Values) -> Result<()> {
    set_opt(values, &format!("{THREE_SCALE_ROOT}.enabled"), config.enabled)?;
    set_opt(values, &param("THREESCALE_LISTEN_ADDR"), config.listen_addr)?;
    set_opt(values, &param("THREESCALE_LOG_LEVEL"), config.log_level.as_ref())?;
    set_opt(values, &param("THREESCALE_LOG_JSON"), config.log_json)?;
    set_opt(values, &param("THREESCALE_LOG_GRPC"), config.log_grpc)?;

    if let Some(metrics) = &config.metrics {
        set_opt(values, &param("THREESCALE_METRICS_PORT"), metrics.port)?;
        set_opt(values, &param("THREESCALE_REPORT_METRICS"), metrics.report)?;
    }
    if let Some(system) = &config.system {
        set_opt(values, &param("THREESCALE_CACHE_ENTRIES_MAX"), system.cache_max_size)?;
        set_opt(values, &param("THREESCALE_CACHE_REFRESH_RETRIES"), system.cache_refresh_retries)?;
        set_opt(values, &param("THREESCALE_CACHE_REFRESH_SECONDS"), system.cache_refresh_interval)?;
        set_opt(values, &param("THREESCALE_CACHE_TTL_SECONDS"), system.cache_ttl)?;
    }
    if let Some(client) = &config.client {
        set_opt(values, &param("THREESCALE_ALLOW_INSECURE_CONN"), client.allow_insecure_connections)?;
        set_opt(values, &param("THREESCALE_CLIENT_TIMEOUT_SECONDS"), client.timeout)?;
    }
    if let Some(grpc) = &config.grpc {
        set_opt(values, &param("THREESCALE_GRPC_CONN_MAX_SECONDS"), grpc.max_conn_timeout)?;
    }
    if let Some(backend) = &config.backend {
        set_opt(values, &param("USE_CACHED_BACKEND"), backend.enable_cache)?;
        set_opt(values, &param("BACKEND_CACHE_FLUSH_INTERVAL_SECONDS"), backend.cache_flush_interval)?;
        set_opt(values, &param("BACKEND_CACHE_POLICY_FAIL_CLOSED"), backend.policy_fail_closed)?;
    }
    Ok(())
}

fn populate_three_scale_config(values: &mut Values) -> Result<Option<ThreeScaleConfig>> {
    let metrics = non_empty(ThreeScaleMetricsConfig {
        port: take(values, &param("THREESCALE_METRICS_PORT"))?,
        report: take(values, &param("THREESCALE_REPORT_METRICS"))?,
    });
    let system = non_empty(ThreeScaleSystemConfig {
        cache_max_size: take(values, &param("THREESCALE_CACHE_ENTRIES_MAX"))?,
        cache_refresh_retries: take(values, &param("THREESCALE_CACHE_REFRESH_RETRIES"))?,
        cache_refresh_interval: take(values, &param("THREESCALE_CACHE_REFRESH_SECONDS"))?,
        cache_ttl: take(values, &param("THREESCALE_CACHE_TTL_SECONDS"))?,
    });
    let client = non_empty(ThreeScaleClientConfig {
        allow_insecure_connections: take(values, &param("THREESCALE_ALLOW_INSECURE_CONN"))?,
        timeout: take(values, &param("THREESCALE_CLIENT_TIMEOUT_SECONDS"))?,
    });
    let grpc = non_empty(ThreeScaleGrpcConfig {
        max_conn_timeout: take(values, &param("THREESCALE_GRPC_CONN_MAX_SECONDS"))?,
    });
    let backend = non_empty(ThreeScaleBackendConfig {
        enable_cache: take(values, &param("USE_CACHED_BACKEND"))?,
        cache_flush_interval: take(values, &param("BACKEND_CACHE_FLUSH_INTERVAL_SECONDS"))?,
        policy_fail_closed: take(values, &param("BACKEND_CACHE_POLICY_FAIL_CLOSED"))?,
    });

    Ok(non_empty(ThreeScaleConfig {
        enabled: take(values, &format!("{THREE_SCALE_ROOT}.enabled"))?,
        listen_addr: take(values, &param("THREESCALE_LISTEN_ADDR"))?,
        log_level: take(values, &param("THREESCALE_LOG_LEVEL"))?,
        log_json: take(values, &param("THREESCALE_LOG_JSON"))?,
        log_grpc: take(values, &param("THREESCALE_LOG_GRPC"))?,
        metrics,
        system,
        client,
        grpc,
        backend,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::test_support::round_trip;
    use indexmap::IndexMap;
    use meshspec_versions::V2_0Strategy;

    fn ingress(path: &str) -> ComponentIngressConfig {
        ComponentIngressConfig {
            enabled: Some(true),
            context_path: Some(path.into()),
            hosts: vec!["mesh.example.com".into()],
        }
    }

    #[test]
    fn test_round_trip_observability_addons() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = AddonsConfig {
            prometheus: Some(PrometheusAddonConfig {
                enabled: Some(true),
                address: Some("http://prometheus:9090".into()),
                install: Some(PrometheusInstallConfig {
                    retention: Some("6h".into()),
                    scrape_interval: Some("15s".into()),
                    use_tls: Some(true),
                }),
            }),
            grafana: Some(GrafanaAddonConfig {
                enabled: Some(true),
                address: Some("https://grafana".into()),
                install: Some(GrafanaInstallConfig {
                    config: IndexMap::from([("GF_AUTH".to_string(), "true".to_string())]),
                    persistence: Some(GrafanaPersistenceConfig {
                        enabled: Some(true),
                        storage_class_name: Some("gp2".into()),
                        access_mode: Some("ReadWriteOnce".into()),
                        capacity: Some("5Gi".into()),
                    }),
                    security: Some(GrafanaSecurityConfig {
                        enabled: Some(true),
                        secret_name: Some("htpasswd".into()),
                        username_key: None,
                        passphrase_key: None,
                    }),
                }),
            }),
            kiali: Some(KialiAddonConfig {
                enabled: Some(true),
                name: Some("kiali".into()),
                install: Some(KialiInstallConfig {
                    dashboard: Some(KialiDashboardConfig {
                        view_only: Some(true),
                        enable_grafana: Some(true),
                        enable_prometheus: None,
                        enable_tracing: Some(false),
                    }),
                    service: Some(ComponentServiceConfig {
                        ingress: Some(ingress("/kiali")),
                    }),
                }),
            }),
            jaeger: None,
            three_scale: None,
        };

        let (written, read) = round_trip::<AddonsMapper>(&config, &ctx);

        assert_eq!(read, Some(config));
        assert_eq!(
            written.get::<String>("kiali.dashboard.grafanaURL").unwrap().as_deref(),
            Some("https://grafana")
        );
        assert_eq!(written.get::<bool>("grafana.persist").unwrap(), Some(true));
        assert_eq!(written.get::<String>("kiali.contextPath").unwrap().as_deref(), Some("/kiali"));
    }

    #[test]
    fn test_round_trip_jaeger_elasticsearch() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = AddonsConfig {
            jaeger: Some(JaegerAddonConfig {
                name: Some("jaeger".into()),
                install: Some(JaegerInstallConfig {
                    storage: Some(JaegerStorageConfig {
                        storage_type: Some(JaegerStorageType::Elasticsearch),
                        memory: None,
                        elasticsearch: Some(JaegerElasticsearchStorageConfig {
                            node_count: Some(3),
                            storage: Some(Values::from_yaml("size: 50Gi\n").unwrap()),
                            redundancy_policy: Some("SingleRedundancy".into()),
                            index_cleaner: None,
                        }),
                    }),
                    ingress: Some(ingress("/jaeger")),
                }),
            }),
            ..Default::default()
        };

        let (written, read) = round_trip::<AddonsMapper>(&config, &ctx);

        assert_eq!(read, Some(config));
        assert_eq!(
            written.get::<String>("tracing.jaeger.template").unwrap().as_deref(),
            Some("production-elasticsearch")
        );
        assert_eq!(
            written.get::<String>("tracing.jaeger.elasticsearch.storage.size").unwrap().as_deref(),
            Some("50Gi")
        );
    }

    #[test]
    fn test_memory_template_materializes_sub_block() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = Values::from_yaml("tracing:\n  jaeger:\n    template: all-in-one\n").unwrap();

        let config = AddonsMapper::populate_config(&mut values, &ctx).unwrap().unwrap();
        let storage = config.jaeger.unwrap().install.unwrap().storage.unwrap();

        assert_eq!(storage.storage_type, Some(JaegerStorageType::Memory));
        assert_eq!(storage.memory, Some(JaegerMemoryStorageConfig::default()));
    }

    #[test]
    fn test_unknown_jaeger_template() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let mut values = Values::from_yaml("tracing:\n  jaeger:\n    template: cassandra\n").unwrap();
        assert!(AddonsMapper::populate_config(&mut values, &ctx).is_err());
    }

    #[test]
    fn test_round_trip_three_scale() {
        let ctx = MapperContext::new(&V2_0Strategy);
        let config = AddonsConfig {
            three_scale: Some(ThreeScaleConfig {
                enabled: Some(true),
                listen_addr: Some(3333),
                log_level: Some("info".into()),
                log_json: Some(true),
                log_grpc: None,
                metrics: Some(ThreeScaleMetricsConfig {
                    port: Some(8080),
                    report: Some(true),
                }),
                system: Some(ThreeScaleSystemConfig {
                    cache_max_size: Some(1000),
                    cache_refresh_retries: Some(1),
                    cache_refresh_interval: Some(180),
                    cache_ttl: Some(300),
                }),
                client: Some(ThreeScaleClientConfig {
                    allow_insecure_connections: Some(false),
                    timeout: Some(10),
                }),
                grpc: Some(ThreeScaleGrpcConfig {
                    max_conn_timeout: Some(60),
                }),
                backend: Some(ThreeScaleBackendConfig {
                    enable_cache: Some(false),
                    cache_flush_interval: Some(15),
                    policy_fail_closed: Some(true),
                }),
            }),
            ..Default::default()
        };

        let (written, read) = round_trip::<AddonsMapper>(&config, &ctx);

        assert_eq!(read, Some(config));
        assert_eq!(
            written.get::<i64>("3scale.PARAM_THREESCALE_LISTEN_ADDR").unwrap(),
            Some(3333)
        );
        assert_eq!(
            written.get::<bool>("3scale.PARAM_BACKEND_CACHE_POLICY_FAIL_CLOSED").unwrap(),
            Some(true)
        );
    }
}
