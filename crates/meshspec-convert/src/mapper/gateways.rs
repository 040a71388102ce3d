//! Gateway settings

use indexmap::IndexMap;
use meshspec_core::spec::{
    GatewayConfig, GatewayServiceConfig, GatewaysConfig, IngressGatewayConfig,
    OpenShiftRouteConfig, RouterModeType, ServicePort,
};
use meshspec_core::{Value, Values};

use super::{
    FieldMapper, non_empty, set_enum, set_joined, set_opt, set_string_map, take, take_enum,
    take_joined, take_or_default,
};
use crate::context::MapperContext;
use crate::error::{ConvertError, Result};

pub const CLUSTER_INGRESS: &str = "istio-ingressgateway";
pub const CLUSTER_EGRESS: &str = "istio-egressgateway";

const GATEWAY_TYPE: &str = "gatewayType";
const INGRESS: &str = "ingress";
const EGRESS: &str = "egress";

pub struct GatewaysMapper;

impl FieldMapper for GatewaysMapper {
    type Config = GatewaysConfig;
    const NAME: &'static str = "gateways";

    fn populate_values(config: &GatewaysConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        set_opt(values, "gateways.enabled", config.enabled)?;

        if let Some(ingress) = &config.cluster_ingress {
            populate_ingress_values(ingress, &gateway_prefix(CLUSTER_INGRESS), values)?;
        }
        if let Some(egress) = &config.cluster_egress {
            populate_gateway_values(egress, &gateway_prefix(CLUSTER_EGRESS), values)?;
        }
        if let Some(route) = &config.openshift_route {
            set_opt(values, &format!("gateways.{CLUSTER_INGRESS}.ior_enabled"), route.enabled)?;
        }

        for (name, gateway) in &config.ingress_gateways {
            let prefix = additional_gateway_prefix(name)?;
            values.set(&format!("{prefix}.{GATEWAY_TYPE}"), INGRESS)?;
            populate_ingress_values(gateway, &prefix, values)?;
        }
        for (name, gateway) in &config.egress_gateways {
            let prefix = additional_gateway_prefix(name)?;
            values.set(&format!("{prefix}.{GATEWAY_TYPE}"), EGRESS)?;
            populate_gateway_values(gateway, &prefix, values)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<Option<GatewaysConfig>> {
        let mut config = GatewaysConfig {
            enabled: take(values, "gateways.enabled")?,
            openshift_route: non_empty(OpenShiftRouteConfig {
                enabled: take(values, &format!("gateways.{CLUSTER_INGRESS}.ior_enabled"))?,
            }),
            ..Default::default()
        };
        config.cluster_ingress = non_empty(populate_ingress_config(values, &gateway_prefix(CLUSTER_INGRESS))?);
        config.cluster_egress = non_empty(populate_gateway_config(values, &gateway_prefix(CLUSTER_EGRESS))?);

        let names: Vec<String> = match values.get::<Values>("gateways")? {
            Some(gateways) => gateways
                .as_map()
                .iter()
                .filter(|(name, value)| {
                    value.as_map().is_some()
                        && name.as_str() != CLUSTER_INGRESS
                        && name.as_str() != CLUSTER_EGRESS
                        && !name.contains('.')
                })
                .map(|(name, _)| name.clone())
                .collect(),
            None => Vec::new(),
        };

        for name in names {
            let prefix = gateway_prefix(&name);
            let gateway_type = take::<String>(values, &format!("{prefix}.{GATEWAY_TYPE}"))?;
            match gateway_type.as_deref() {
                None | Some(INGRESS) => {
                    if let Some(gateway) = non_empty(populate_ingress_config(values, &prefix)?) {
                        config.ingress_gateways.insert(name, gateway);
                    }
                }
                Some(EGRESS) => {
                    if let Some(gateway) = non_empty(populate_gateway_config(values, &prefix)?) {
                        config.egress_gateways.insert(name, gateway);
                    }
                }
                Some(other) => {
                    return Err(ConvertError::InvalidSpec(format!(
                        "gateway '{name}' has unknown {GATEWAY_TYPE} '{other}'"
                    )));
                }
            }
        }

        Ok(non_empty(config))
    }
}

fn gateway_prefix(name: &str) -> String {
    format!("gateways.{name}")
}

fn additional_gateway_prefix(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('.') {
        return Err(ConvertError::InvalidSpec(format!(
            "gateway name '{name}' must be non-empty and must not contain '.'"
        )));
    }
    if name == CLUSTER_INGRESS || name == CLUSTER_EGRESS || name == "enabled" {
        return Err(ConvertError::InvalidSpec(format!(
            "gateway name '{name}' is reserved"
        )));
    }
    Ok(gateway_prefix(name))
}

fn populate_ingress_values(ingress: &IngressGatewayConfig, prefix: &str, values: &mut Values) -> Result<()> {
    populate_gateway_values(&ingress.gateway, prefix, values)?;
    set_opt(values, &format!("{prefix}.sds.enabled"), ingress.sds)
}

fn populate_gateway_values(gateway: &GatewayConfig, prefix: &str, values: &mut Values) -> Result<()> {
    let key = |name: &str| format!("{prefix}.{name}");

    set_opt(values, &key("enabled"), gateway.enabled)?;
    set_opt(values, &key("namespace"), gateway.namespace.as_ref())?;
    if let Some(service) = &gateway.service {
        set_opt(values, &key("type"), service.service_type.as_ref())?;
        if !service.ports.is_empty() {
            let ports: Vec<Value> = service.ports.iter().map(port_value).collect::<Result<_>>()?;
            values.set(&key("ports"), ports)?;
        }
    }
    set_string_map(values, &key("labels"), &gateway.labels)?;
    set_enum(values, &key("env.ISTIO_META_ROUTER_MODE"), gateway.router_mode)?;
    set_joined(
        values,
        &key("env.ISTIO_META_REQUESTED_NETWORK_VIEW"),
        &gateway.request_network_view,
    )
}

fn populate_ingress_config(values: &mut Values, prefix: &str) -> Result<IngressGatewayConfig> {
    Ok(IngressGatewayConfig {
        sds: take(values, &format!("{prefix}.sds.enabled"))?,
        gateway: populate_gateway_config(values, prefix)?,
    })
}

fn populate_gateway_config(values: &mut Values, prefix: &str) -> Result<GatewayConfig> {
    let key = |name: &str| format!("{prefix}.{name}");

    let ports = take_or_default::<Vec<Values>>(values, &key("ports"))?
        .iter()
        .map(|port| read_port(port, prefix))
        .collect::<Result<Vec<_>>>()?;
    let service = non_empty(GatewayServiceConfig {
        service_type: take(values, &key("type"))?,
        ports,
    });

    Ok(GatewayConfig {
        enabled: take(values, &key("enabled"))?,
        namespace: take(values, &key("namespace"))?,
        service,
        labels: take_or_default::<IndexMap<String, String>>(values, &key("labels"))?,
        router_mode: take_enum::<RouterModeType>(values, &key("env.ISTIO_META_ROUTER_MODE"))?,
        request_network_view: take_joined(values, &key("env.ISTIO_META_REQUESTED_NETWORK_VIEW"))?,
    })
}

fn port_value(port: &ServicePort) -> Result<Value> {
    let mut values = Values::new();
    set_opt(&mut values, "name", port.name.as_ref())?;
    values.set("port", port.port)?;
    set_opt(&mut values, "targetPort", port.target_port)?;
    set_opt(&mut values, "protocol", port.protocol.as_ref())?;
    Ok(values.into())
}

fn read_port(port: &Values, prefix: &str) -> Result<ServicePort> {
    let number = port.get::<i32>("port")?.ok_or_else(|| {
        ConvertError::InvalidSpec(format!("a port of {prefix} has no port number"))
    })?;

    Ok(ServicePort {
        name: port.get("name")?,
        port: number,
        target_port: port.get("targetPort")?,
        protocol: port.get("protocol")?,
    })
}
