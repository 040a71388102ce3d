//! Cluster settings: identity, network, multi-cluster and mesh expansion

use meshspec_core::spec::{ClusterConfig, MeshExpansionConfig, MultiClusterConfig};
use meshspec_core::{Value, Values};
use meshspec_versions::VersionStrategy;

use super::gateways::CLUSTER_INGRESS;
use super::{FieldMapper, non_empty, set_opt, take};
use crate::context::MapperContext;
use crate::error::Result;

const MESH_EXPANSION_ENABLED: &str = "global.meshExpansion.enabled";

pub struct ClusterMapper;

impl FieldMapper for ClusterMapper {
    type Config = ClusterConfig;
    const NAME: &'static str = "cluster";

    fn populate_values(config: &ClusterConfig, values: &mut Values, ctx: &MapperContext<'_>) -> Result<()> {
        set_opt(values, "global.multiCluster.clusterName", config.name.as_ref())?;
        set_opt(values, "global.network", config.network.as_ref())?;

        if let Some(multi_cluster) = &config.multi_cluster {
            set_opt(values, "global.multiCluster.enabled", multi_cluster.enabled)?;
        }
        if let Some(expansion) = &config.mesh_expansion {
            set_opt(values, MESH_EXPANSION_ENABLED, expansion.enabled)?;
            if expansion.enabled == Some(true) {
                values.set(&expansion_ports_path(), expansion_ports(ctx.strategy))?;
            }
        }
        Ok(())
    }

    fn populate_config(values: &mut Values, ctx: &MapperContext<'_>) -> Result<Option<ClusterConfig>> {
        // Ports derived from the strategy carry no information of their own
        let ports_path = expansion_ports_path();
        if values.get_value(&ports_path)? == Some(&expansion_ports(ctx.strategy)) {
            values.remove(&ports_path);
        }

        Ok(non_empty(ClusterConfig {
            name: take(values, "global.multiCluster.clusterName")?,
            network: take(values, "global.network")?,
            network_type: None,
            multi_cluster: non_empty(MultiClusterConfig {
                enabled: take(values, "global.multiCluster.enabled")?,
            }),
            mesh_expansion: non_empty(MeshExpansionConfig {
                enabled: take(values, MESH_EXPANSION_ENABLED)?,
            }),
        }))
    }
}

fn expansion_ports_path() -> String {
    format!("gateways.{CLUSTER_INGRESS}.meshExpansionPorts")
}

fn expansion_ports(strategy: &dyn VersionStrategy) -> Value {
    let ports = strategy
        .expansion_ports()
        .iter()
        .map(|port| {
            let mut entry = meshspec_core::Map::new();
            entry.insert("name".to_string(), port.name.into());
            entry.insert("port".to_string(), port.port.into());
            entry.insert("targetPort".to_string(), port.target_port.into());
            Value::Map(entry)
        })
        .collect();
    Value::List(ports)
}
