//! Runtime settings: images, resources, scheduling and scaling

use indexmap::IndexMap;
use meshspec_core::spec::{
    AutoScalerConfig, CommonContainerConfig, CommonPodConfig, ComponentRuntimeConfig,
    ContainerConfig, DefaultRuntimeConfig, DeploymentRuntimeConfig, PodRuntimeConfig,
    ResourceRequirements, RuntimeConfig,
};
use meshspec_core::{Value, Values};

use super::{FieldMapper, non_empty, set_opt, set_string_map, set_strings, take, take_or_default};
use crate::context::MapperContext;
use crate::error::{ConvertError, Result};

/// Runtime component names and the legacy prefix holding their settings
pub const COMPONENTS: &[(&str, &str)] = &[
    ("pilot", "pilot"),
    ("mixer.policy", "mixer.policy"),
    ("mixer.telemetry", "mixer.telemetry"),
    ("sidecarInjectorWebhook", "sidecarInjectorWebhook"),
    ("prometheus", "prometheus"),
    ("grafana", "grafana"),
    ("kiali", "kiali"),
    ("tracing", "tracing.jaeger"),
    ("3scale", "3scale"),
];

pub struct RuntimeMapper;

impl FieldMapper for RuntimeMapper {
    type Config = RuntimeConfig;
    const NAME: &'static str = "runtime";

    fn populate_values(config: &RuntimeConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        if let Some(defaults) = &config.defaults {
            populate_defaults_values(defaults, values)?;
        }

        for (name, component) in &config.components {
            let prefix = component_prefix(name)?;
            populate_component_values(component, prefix, values)?;
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<Option<RuntimeConfig>> {
        let defaults = non_empty(populate_defaults_config(values)?);

        let mut components = IndexMap::new();
        for (name, prefix) in COMPONENTS {
            if let Some(component) = non_empty(populate_component_config(values, prefix)?) {
                components.insert(name.to_string(), component);
            }
        }

        Ok(non_empty(RuntimeConfig {
            defaults,
            components,
        }))
    }
}

fn component_prefix(name: &str) -> Result<&'static str> {
    COMPONENTS
        .iter()
        .find(|(component, _)| *component == name)
        .map(|(_, prefix)| *prefix)
        .ok_or_else(|| ConvertError::UnknownComponent {
            name: name.to_string(),
            expected: Some(format!(
                "expected one of: {}",
                COMPONENTS.iter().map(|(c, _)| *c).collect::<Vec<_>>().join(", ")
            )),
        })
}

fn populate_defaults_values(defaults: &DefaultRuntimeConfig, values: &mut Values) -> Result<()> {
    if let Some(container) = &defaults.container {
        set_opt(values, "global.hub", container.image_registry.as_ref())?;
        set_opt(values, "global.tag", container.image_tag.as_ref())?;
        set_opt(values, "global.imagePullPolicy", container.image_pull_policy.as_ref())?;
        set_strings(values, "global.imagePullSecrets", &container.image_pull_secrets)?;
        populate_resources_values(container.resources.as_ref(), "global.defaultResources", values)?;
    }
    if let Some(pod) = &defaults.pod {
        set_string_map(values, "global.defaultNodeSelector", &pod.node_selector)?;
        set_tolerations(values, "global.defaultTolerations", &pod.tolerations)?;
        set_opt(values, "global.priorityClassName", pod.priority_class_name.as_ref())?;
    }
    set_opt(
        values,
        "global.defaultPodDisruptionBudget.enabled",
        defaults.pod_disruption_budget,
    )
}

fn populate_defaults_config(values: &mut Values) -> Result<DefaultRuntimeConfig> {
    let container = non_empty(CommonContainerConfig {
        image_registry: take(values, "global.hub")?,
        image_tag: take(values, "global.tag")?,
        image_pull_policy: take(values, "global.imagePullPolicy")?,
        image_pull_secrets: take_or_default(values, "global.imagePullSecrets")?,
        resources: populate_resources_config(values, "global.defaultResources")?,
    });
    let pod = non_empty(CommonPodConfig {
        node_selector: take_or_default(values, "global.defaultNodeSelector")?,
        tolerations: take_or_default(values, "global.defaultTolerations")?,
        priority_class_name: take(values, "global.priorityClassName")?,
    });

    Ok(DefaultRuntimeConfig {
        container,
        pod,
        pod_disruption_budget: take(values, "global.defaultPodDisruptionBudget.enabled")?,
    })
}

fn populate_component_values(
    component: &ComponentRuntimeConfig,
    prefix: &str,
    values: &mut Values,
) -> Result<()> {
    let key = |name: &str| format!("{prefix}.{name}");

    if let Some(deployment) = &component.deployment {
        set_opt(values, &key("replicaCount"), deployment.replicas)?;
        if let Some(autoscaling) = &deployment.autoscaling {
            set_opt(values, &key("autoscaleEnabled"), autoscaling.enabled)?;
            set_opt(values, &key("autoscaleMin"), autoscaling.min_replicas)?;
            set_opt(values, &key("autoscaleMax"), autoscaling.max_replicas)?;
            set_opt(
                values,
                &key("cpu.targetAverageUtilization"),
                autoscaling.target_cpu_utilization_percentage,
            )?;
        }
    }

    if let Some(pod) = &component.pod {
        set_string_map(values, &key("nodeSelector"), &pod.common.node_selector)?;
        set_tolerations(values, &key("tolerations"), &pod.common.tolerations)?;
        set_opt(values, &key("priorityClassName"), pod.common.priority_class_name.as_ref())?;
        set_string_map(values, &key("podAnnotations"), &pod.annotations)?;
    }

    if let Some(container) = &component.container {
        populate_container_values(container, prefix, values)?;
    }
    Ok(())
}

fn populate_component_config(values: &mut Values, prefix: &str) -> Result<ComponentRuntimeConfig> {
    let key = |name: &str| format!("{prefix}.{name}");

    let autoscaling = non_empty(AutoScalerConfig {
        enabled: take(values, &key("autoscaleEnabled"))?,
        min_replicas: take(values, &key("autoscaleMin"))?,
        max_replicas: take(values, &key("autoscaleMax"))?,
        target_cpu_utilization_percentage: take(values, &key("cpu.targetAverageUtilization"))?,
    });
    let deployment = non_empty(DeploymentRuntimeConfig {
        replicas: take(values, &key("replicaCount"))?,
        autoscaling,
    });
    let pod = non_empty(PodRuntimeConfig {
        common: CommonPodConfig {
            node_selector: take_or_default(values, &key("nodeSelector"))?,
            tolerations: take_or_default(values, &key("tolerations"))?,
            priority_class_name: take(values, &key("priorityClassName"))?,
        },
        annotations: take_or_default(values, &key("podAnnotations"))?,
    });

    Ok(ComponentRuntimeConfig {
        deployment,
        pod,
        container: populate_container_config(values, prefix)?,
    })
}

/// Write container image and resource settings under `prefix`
pub(crate) fn populate_container_values(
    container: &ContainerConfig,
    prefix: &str,
    values: &mut Values,
) -> Result<()> {
    let key = |name: &str| format!("{prefix}.{name}");
    let common = &container.common;

    set_opt(values, &key("image"), container.image_name.as_ref())?;
    set_opt(values, &key("hub"), common.image_registry.as_ref())?;
    set_opt(values, &key("tag"), common.image_tag.as_ref())?;
    set_opt(values, &key("imagePullPolicy"), common.image_pull_policy.as_ref())?;
    set_strings(values, &key("imagePullSecrets"), &common.image_pull_secrets)?;
    populate_resources_values(common.resources.as_ref(), &key("resources"), values)
}

/// Read container image and resource settings from under `prefix`
pub(crate) fn populate_container_config(values: &mut Values, prefix: &str) -> Result<Option<ContainerConfig>> {
    let key = |name: &str| format!("{prefix}.{name}");

    Ok(non_empty(ContainerConfig {
        common: CommonContainerConfig {
            image_registry: take(values, &key("hub"))?,
            image_tag: take(values, &key("tag"))?,
            image_pull_policy: take(values, &key("imagePullPolicy"))?,
            image_pull_secrets: take_or_default(values, &key("imagePullSecrets"))?,
            resources: populate_resources_config(values, &key("resources"))?,
        },
        image_name: take(values, &key("image"))?,
    }))
}

fn populate_resources_values(
    resources: Option<&ResourceRequirements>,
    path: &str,
    values: &mut Values,
) -> Result<()> {
    let Some(resources) = resources else {
        return Ok(());
    };
    set_string_map(values, &format!("{path}.requests"), &resources.requests)?;
    set_string_map(values, &format!("{path}.limits"), &resources.limits)
}

fn populate_resources_config(values: &mut Values, path: &str) -> Result<Option<ResourceRequirements>> {
    let resources = ResourceRequirements {
        requests: take_or_default(values, &format!("{path}.requests"))?,
        limits: take_or_default(values, &format!("{path}.limits"))?,
    };
    Ok((!resources.is_empty()).then_some(resources))
}

fn set_tolerations(values: &mut Values, path: &str, tolerations: &[Values]) -> Result<()> {
    if !tolerations.is_empty() {
        let list: Vec<Value> = tolerations.iter().map(Value::from).collect();
        values.set(path, list)?;
    }
    Ok(())
}
