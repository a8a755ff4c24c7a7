use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Top-level structure that mirrors the inventory-style YAML layout,
/// where every topology field lives under the `all:` root key
#[derive(Debug, Serialize, Deserialize)]
pub struct Inventory {
    /// Cluster-wide topology settings
    pub all: ClusterTopology,
}

/// Cluster topology loaded from config.yaml
#[derive(Debug, Serialize, Deserialize)]
pub struct ClusterTopology {
    /// VLAN id carrying the overlay/infra network
    pub infra_vlan: u16,
    /// VLAN id carrying cluster service traffic
    pub service_vlan: u16,
    /// VLAN id carrying Kubernetes API traffic
    pub kubeapi_vlan: u16,
    /// Number of control-plane nodes
    pub os_cp_nodes_number: u32,
    /// Number of worker nodes
    pub os_compute_nodes_number: u32,
    /// MTU settings per network role
    pub network_interfaces: NetworkInterfaces,
    /// Ordered node-network interface names shared by all roles
    pub node_network_interface: Vec<String>,
    /// Ordered infra-network interface names
    pub aci_infra_network_interface: Vec<String>,
    /// (Optional) node-network interfaces specific to control-plane nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp_node_network_interface: Option<Vec<String>>,
    /// (Optional) node-network interfaces specific to worker nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_node_network_interface: Option<Vec<String>>,
}

/// MTU settings for the node and opflex (infra) networks
#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkInterfaces {
    /// Node network settings
    pub node: InterfaceMtu,
    /// Opflex/infra network settings
    pub opflex: InterfaceMtu,
}

/// MTU value for one network
#[derive(Debug, Serialize, Deserialize)]
pub struct InterfaceMtu {
    pub mtu: u32,
}

/// Node roles within the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Bootstrap,
    Master,
    Worker,
}

impl NodeRole {
    /// Role segment used in hostnames and output filenames
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Bootstrap => "bootstrap",
            NodeRole::Master => "master",
            NodeRole::Worker => "worker",
        }
    }

    /// Ignition template file consumed for this role
    pub fn template_file(&self) -> &'static str {
        match self {
            NodeRole::Bootstrap => "bootstrap.ign",
            NodeRole::Master => "master.ign",
            NodeRole::Worker => "worker.ign",
        }
    }
}

/// Topology validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {0}: VLAN id {1} is outside 1-4094")]
    InvalidVlan(&'static str, u16),
    #[error("invalid {0} network MTU: must be nonzero")]
    InvalidMtu(&'static str),
    #[error("invalid interface configuration: {0}")]
    InvalidInterfaces(String),
}

impl ClusterTopology {
    /// Validate the topology
    pub fn validate(&self) -> Result<(), ValidationError> {
        let vlans = [
            ("infra_vlan", self.infra_vlan),
            ("service_vlan", self.service_vlan),
            ("kubeapi_vlan", self.kubeapi_vlan),
        ];
        for (field, vlan) in vlans {
            if vlan == 0 || vlan > 4094 {
                return Err(ValidationError::InvalidVlan(field, vlan));
            }
        }

        if self.network_interfaces.node.mtu == 0 {
            return Err(ValidationError::InvalidMtu("node"));
        }
        if self.network_interfaces.opflex.mtu == 0 {
            return Err(ValidationError::InvalidMtu("opflex"));
        }

        if self.aci_infra_network_interface.is_empty() {
            return Err(ValidationError::InvalidInterfaces(
                "aci_infra_network_interface cannot be empty".to_string(),
            ));
        }

        // Interface names come straight from the inventory; blank entries
        // would silently produce broken ifcfg fragments
        let all_names = self
            .node_network_interface
            .iter()
            .chain(self.aci_infra_network_interface.iter())
            .chain(self.cp_node_network_interface.iter().flatten())
            .chain(self.compute_node_network_interface.iter().flatten());
        for name in all_names {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidInterfaces(
                    "interface names cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Node-network interfaces for a role, honoring per-role overrides
    pub fn node_interfaces_for(&self, role: NodeRole) -> &[String] {
        let role_specific = match role {
            NodeRole::Master => self.cp_node_network_interface.as_ref(),
            NodeRole::Worker => self.compute_node_network_interface.as_ref(),
            NodeRole::Bootstrap => None,
        };
        role_specific
            .map(Vec::as_slice)
            .unwrap_or(&self.node_network_interface)
    }
}

/// Load and validate the cluster topology from a YAML file
pub fn load_config(config_path: &Path) -> Result<ClusterTopology> {
    info!("Loading cluster topology from: {:?}", config_path);

    // Open the topology file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open topology file '{}'", config_path.display()))?;

    // Parse the YAML content
    let inventory: Inventory = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse topology file '{}'", config_path.display()))?;

    let topology = inventory.all;
    topology.validate()?;

    info!(
        "Topology: {} control-plane and {} worker nodes, infra VLAN {}",
        topology.os_cp_nodes_number, topology.os_compute_nodes_number, topology.infra_vlan
    );

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_yaml() -> &'static str {
        r#"
all:
  infra_vlan: 4093
  service_vlan: 1022
  kubeapi_vlan: 1021
  os_cp_nodes_number: 3
  os_compute_nodes_number: 2
  network_interfaces:
    node:
      mtu: 1500
    opflex:
      mtu: 1700
  node_network_interface: [ens2, ens3]
  aci_infra_network_interface: [ens4, ens5]
"#
    }

    #[test]
    fn test_load_valid_topology() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", sample_yaml()).unwrap();

        let topology = load_config(temp_file.path()).unwrap();
        assert_eq!(topology.infra_vlan, 4093);
        assert_eq!(topology.os_cp_nodes_number, 3);
        assert_eq!(topology.os_compute_nodes_number, 2);
        assert_eq!(topology.network_interfaces.opflex.mtu, 1700);
        assert_eq!(topology.aci_infra_network_interface, vec!["ens4", "ens5"]);
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let yaml = r#"
all:
  infra_vlan: 4093
  service_vlan: 1022
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_vlan_out_of_range() {
        let config: Inventory = serde_yaml::from_str(sample_yaml()).unwrap();
        let mut topology = config.all;
        topology.infra_vlan = 0;
        assert!(matches!(
            topology.validate(),
            Err(ValidationError::InvalidVlan("infra_vlan", 0))
        ));
    }

    #[test]
    fn test_zero_mtu_rejected() {
        let config: Inventory = serde_yaml::from_str(sample_yaml()).unwrap();
        let mut topology = config.all;
        topology.network_interfaces.node.mtu = 0;
        assert!(matches!(
            topology.validate(),
            Err(ValidationError::InvalidMtu("node"))
        ));
    }

    #[test]
    fn test_empty_infra_interfaces_rejected() {
        let config: Inventory = serde_yaml::from_str(sample_yaml()).unwrap();
        let mut topology = config.all;
        topology.aci_infra_network_interface.clear();
        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_node_interfaces_per_role_override() {
        let config: Inventory = serde_yaml::from_str(sample_yaml()).unwrap();
        let mut topology = config.all;
        assert_eq!(topology.node_interfaces_for(NodeRole::Master), ["ens2", "ens3"]);

        topology.cp_node_network_interface = Some(vec!["ens6".to_string(), "ens7".to_string()]);
        assert_eq!(topology.node_interfaces_for(NodeRole::Master), ["ens6", "ens7"]);
        // Workers keep the shared list
        assert_eq!(topology.node_interfaces_for(NodeRole::Worker), ["ens2", "ens3"]);
    }
}
