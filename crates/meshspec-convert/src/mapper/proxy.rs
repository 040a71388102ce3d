//! Sidecar proxy settings

use meshspec_core::spec::{
    OutboundTrafficPolicy, ProxyAccessLoggingConfig, ProxyConfig, ProxyDnsConfig,
    ProxyInboundTrafficControlConfig, ProxyInjectionConfig, ProxyNetworkInitConfig,
    ProxyNetworkInitType, ProxyNetworkProtocolConfig, ProxyNetworkingConfig,
    ProxyOutboundTrafficControlConfig, ProxyReadinessConfig, ProxyRuntimeConfig,
    ProxyTrafficControlConfig,
};
use meshspec_core::{CoreError, Value, Values};

use super::runtime::{populate_container_config, populate_container_values};
use super::{
    FieldMapper, non_empty, set_duplicated, set_enum, set_joined, set_opt, set_string_map, take,
    take_duplicated, take_enum, take_joined, take_or_default,
};
use crate::context::MapperContext;
use crate::error::Result;

const CONCURRENCY: (&str, &str) = (
    "global.proxy.concurrency",
    "meshConfig.defaultConfig.concurrency",
);
const ACCESS_LOG_FILE: (&str, &str) = ("global.proxy.accessLogFile", "meshConfig.accessLogFile");
const ACCESS_LOG_FORMAT: (&str, &str) = ("global.proxy.accessLogFormat", "meshConfig.accessLogFormat");
const ACCESS_LOG_ENCODING: (&str, &str) = (
    "global.proxy.accessLogEncoding",
    "meshConfig.accessLogEncoding",
);
const CONNECT_TIMEOUT: (&str, &str) = ("global.connectTimeout", "meshConfig.connectTimeout");

const CNI_ENABLED: &str = "istio_cni.enabled";
const AUTO_INJECT: &str = "global.proxy.autoInject";
const INJECTED_ANNOTATIONS: &str = "sidecarInjectorWebhook.injectedAnnotations";
const REWRITE_PROBES: &str = "sidecarInjectorWebhook.rewriteAppHTTPProbe";
const OUTBOUND_POLICY: &str = "global.outboundTrafficPolicy.mode";

pub struct ProxyMapper;

impl FieldMapper for ProxyMapper {
    type Config = ProxyConfig;
    const NAME: &'static str = "proxy";

    fn populate_values(config: &ProxyConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        set_opt(values, "global.proxy.logLevel", config.log_level.as_ref())?;
        set_opt(values, "global.proxy.componentLogLevel", config.component_log_level.as_ref())?;
        set_opt(values, "global.proxy.clusterDomain", config.cluster_domain.as_ref())?;
        set_opt(values, "global.proxy.adminPort", config.admin_port)?;
        set_duplicated(values, CONCURRENCY.0, CONCURRENCY.1, config.concurrency)?;

        if let Some(logging) = &config.access_logging {
            set_duplicated(values, ACCESS_LOG_FILE.0, ACCESS_LOG_FILE.1, logging.file.clone())?;
            set_duplicated(values, ACCESS_LOG_FORMAT.0, ACCESS_LOG_FORMAT.1, logging.format.clone())?;
            set_duplicated(
                values,
                ACCESS_LOG_ENCODING.0,
                ACCESS_LOG_ENCODING.1,
                logging.encoding.clone(),
            )?;
        }
        if let Some(networking) = &config.networking {
            populate_networking_values(networking, values)?;
        }
        if let Some(runtime) = &config.runtime {
            populate_runtime_values(runtime, values)?;
        }
        if let Some(injection) = &config.injection {
            set_opt(
                values,
                AUTO_INJECT,
                injection.auto_inject.map(|enabled| if enabled { "enabled" } else { "disabled" }),
            )?;
            set_string_map(values, INJECTED_ANNOTATIONS, &injection.injected_annotations)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<Option<ProxyConfig>> {
        let access_logging = non_empty(ProxyAccessLoggingConfig {
            file: take_duplicated(values, ACCESS_LOG_FILE.0, ACCESS_LOG_FILE.1)?,
            format: take_duplicated(values, ACCESS_LOG_FORMAT.0, ACCESS_LOG_FORMAT.1)?,
            encoding: take_duplicated(values, ACCESS_LOG_ENCODING.0, ACCESS_LOG_ENCODING.1)?,
        });
        let injection = non_empty(ProxyInjectionConfig {
            auto_inject: take_auto_inject(values)?,
            injected_annotations: take_or_default(values, INJECTED_ANNOTATIONS)?,
        });

        Ok(non_empty(ProxyConfig {
            log_level: take(values, "global.proxy.logLevel")?,
            component_log_level: take(values, "global.proxy.componentLogLevel")?,
            cluster_domain: take(values, "global.proxy.clusterDomain")?,
            admin_port: take(values, "global.proxy.adminPort")?,
            concurrency: take_duplicated(values, CONCURRENCY.0, CONCURRENCY.1)?,
            access_logging,
            networking: non_empty(populate_networking_config(values)?),
            runtime: non_empty(populate_runtime_config(values)?),
            injection,
        }))
    }
}

fn populate_networking_values(networking: &ProxyNetworkingConfig, values: &mut Values) -> Result<()> {
    set_duplicated(
        values,
        CONNECT_TIMEOUT.0,
        CONNECT_TIMEOUT.1,
        networking.connection_timeout.clone(),
    )?;

    if let Some(init) = &networking.initialization {
        set_opt(
            values,
            CNI_ENABLED,
            init.init_type.map(|t| t == ProxyNetworkInitType::Cni),
        )?;
    }

    if let Some(traffic) = &networking.traffic_control {
        if let Some(inbound) = &traffic.inbound {
            set_opt(values, "global.proxy.interceptionMode", inbound.interception_mode.as_ref())?;
            set_joined(values, "global.proxy.includeInboundPorts", &inbound.included_ports)?;
            set_joined(values, "global.proxy.excludeInboundPorts", &inbound.excluded_ports)?;
        }
        if let Some(outbound) = &traffic.outbound {
            set_joined(values, "global.proxy.includeIPRanges", &outbound.included_ip_ranges)?;
            set_joined(values, "global.proxy.excludeIPRanges", &outbound.excluded_ip_ranges)?;
            set_joined(values, "global.proxy.excludeOutboundPorts", &outbound.excluded_ports)?;
            set_enum(values, OUTBOUND_POLICY, outbound.policy)?;
        }
    }

    if let Some(protocol) = &networking.protocol {
        set_opt(
            values,
            "global.proxy.protocolDetectionTimeout",
            protocol.detection_timeout.as_ref(),
        )?;
    }
    if let Some(dns) = &networking.dns {
        set_opt(values, "global.proxy.dnsRefreshRate", dns.refresh_rate.as_ref())?;
    }
    Ok(())
}

fn populate_networking_config(values: &mut Values) -> Result<ProxyNetworkingConfig> {
    let initialization = non_empty(ProxyNetworkInitConfig {
        init_type: take::<bool>(values, CNI_ENABLED)?.map(|cni| {
            if cni {
                ProxyNetworkInitType::Cni
            } else {
                ProxyNetworkInitType::InitContainer
            }
        }),
    });

    let inbound = non_empty(ProxyInboundTrafficControlConfig {
        interception_mode: take(values, "global.proxy.interceptionMode")?,
        included_ports: take_joined(values, "global.proxy.includeInboundPorts")?,
        excluded_ports: take_joined(values, "global.proxy.excludeInboundPorts")?,
    });
    let outbound = non_empty(ProxyOutboundTrafficControlConfig {
        included_ip_ranges: take_joined(values, "global.proxy.includeIPRanges")?,
        excluded_ip_ranges: take_joined(values, "global.proxy.excludeIPRanges")?,
        excluded_ports: take_joined(values, "global.proxy.excludeOutboundPorts")?,
        policy: take_enum::<OutboundTrafficPolicy>(values, OUTBOUND_POLICY)?,
    });

    Ok(ProxyNetworkingConfig {
        connection_timeout: take_duplicated(values, CONNECT_TIMEOUT.0, CONNECT_TIMEOUT.1)?,
        initialization,
        traffic_control: non_empty(ProxyTrafficControlConfig { inbound, outbound }),
        protocol: non_empty(ProxyNetworkProtocolConfig {
            detection_timeout: take(values, "global.proxy.protocolDetectionTimeout")?,
        }),
        dns: non_empty(ProxyDnsConfig {
            refresh_rate: take(values, "global.proxy.dnsRefreshRate")?,
        }),
    })
}

fn populate_runtime_values(runtime: &ProxyRuntimeConfig, values: &mut Values) -> Result<()> {
    if let Some(readiness) = &runtime.readiness {
        set_opt(values, REWRITE_PROBES, readiness.rewrite_application_probes)?;
        set_opt(values, "global.proxy.statusPort", readiness.status_port)?;
        set_opt(
            values,
            "global.proxy.readinessInitialDelaySeconds",
            readiness.initial_delay_seconds,
        )?;
        set_opt(values, "global.proxy.readinessPeriodSeconds", readiness.period_seconds)?;
        set_opt(
            values,
            "global.proxy.readinessFailureThreshold",
            readiness.failure_threshold,
        )?;
    }
    if let Some(container) = &runtime.container {
        populate_container_values(container, "global.proxy", values)?;
    }
    Ok(())
}

fn populate_runtime_config(values: &mut Values) -> Result<ProxyRuntimeConfig> {
    let readiness = non_empty(ProxyReadinessConfig {
        rewrite_application_probes: take(values, REWRITE_PROBES)?,
        status_port: take(values, "global.proxy.statusPort")?,
        initial_delay_seconds: take(values, "global.proxy.readinessInitialDelaySeconds")?,
        period_seconds: take(values, "global.proxy.readinessPeriodSeconds")?,
        failure_threshold: take(values, "global.proxy.readinessFailureThreshold")?,
    });

    Ok(ProxyRuntimeConfig {
        readiness,
        container: populate_container_config(values, "global.proxy")?,
    })
}

/// `global.proxy.autoInject` is `enabled`/`disabled`; plain booleans are accepted too
fn take_auto_inject(values: &mut Values) -> Result<Option<bool>> {
    let enabled = match values.get_value(AUTO_INJECT)? {
        None => return Ok(None),
        Some(Value::Bool(enabled)) => *enabled,
        Some(Value::String(text)) if text == "enabled" => true,
        Some(Value::String(text)) if text == "disabled" => false,
        Some(other) => {
            return Err(CoreError::UnknownEnumValue {
                kind: "auto-inject mode",
                value: other.as_str().map(str::to_string).unwrap_or_else(|| other.kind().to_string()),
                expected: Some("expected one of: enabled, disabled".to_string()),
            }
            .into());
        }
    };
    values.remove(AUTO_INJECT);
    Ok(Some(enabled))
}
