use crate::config::{ClusterTopology, NodeRole};
use std::fmt;
use std::str::FromStr;

/// Directory where RHCOS network scripts live on the node filesystem
pub const NETWORK_SCRIPTS_DIR: &str = "/etc/sysconfig/network-scripts";

/// Closed set of supported interface topologies, selected by number 1-4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceMode {
    /// Single interface for the node network, bonded infra interfaces
    SingleNodeBondedInfra,
    /// Bonded interfaces for both the node and infra networks
    BondedBoth,
    /// Bonded node interfaces, single infra interface
    BondedNodeSingleInfra,
    /// Single interface for both the node and infra networks
    SingleBoth,
}

impl InterfaceMode {
    /// All modes in menu order
    pub fn all() -> [InterfaceMode; 4] {
        [
            InterfaceMode::SingleNodeBondedInfra,
            InterfaceMode::BondedBoth,
            InterfaceMode::BondedNodeSingleInfra,
            InterfaceMode::SingleBoth,
        ]
    }
}

impl FromStr for InterfaceMode {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<InterfaceMode, NetworkError> {
        match s.trim() {
            "1" => Ok(InterfaceMode::SingleNodeBondedInfra),
            "2" => Ok(InterfaceMode::BondedBoth),
            "3" => Ok(InterfaceMode::BondedNodeSingleInfra),
            "4" => Ok(InterfaceMode::SingleBoth),
            other => Err(NetworkError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for InterfaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InterfaceMode::SingleNodeBondedInfra => {
                "Single interface for node network and bond interface for infra network"
            }
            InterfaceMode::BondedBoth => "Bond interface for both node and infra networks",
            InterfaceMode::BondedNodeSingleInfra => {
                "Bond interface for node network and single interface for infra network"
            }
            InterfaceMode::SingleBoth => "Single interface for both node and infra networks",
        };
        write!(f, "{}", text)
    }
}

/// Interface selection errors
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid interface mode selection '{0}', expected a number from 1 to 4")]
    InvalidMode(String),
    #[error(
        "mode '{mode}' requires {needed} {network} network interface(s) for {role} nodes, \
         but only {got} configured"
    )]
    NotEnoughInterfaces {
        mode: InterfaceMode,
        network: &'static str,
        role: &'static str,
        needed: usize,
        got: usize,
    },
}

/// A named network-script fragment destined for the node filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFragment {
    /// Fragment name, e.g. `ifcfg-bond0`
    pub name: String,
    /// Absolute target path under the network-scripts directory
    pub path: String,
    /// Raw sysconfig `KEY=value` content, newline-terminated
    pub content: String,
}

impl NetworkFragment {
    fn new(name: &str, lines: Vec<String>) -> NetworkFragment {
        let mut content = lines.join("\n");
        content.push('\n');
        NetworkFragment {
            name: name.to_string(),
            path: format!("{}/{}", NETWORK_SCRIPTS_DIR, name),
            content,
        }
    }
}

fn bond_fragment(bond_name: &str, mtu: u32) -> NetworkFragment {
    let lines = vec![
        format!("NAME={}", bond_name),
        format!("DEVICE={}", bond_name),
        "ONBOOT=yes".to_string(),
        "NETBOOT=yes".to_string(),
        "BOOTPROTO=none".to_string(),
        "BONDING_MASTER=yes".to_string(),
        "BONDING_OPTS=\"mode=4 miimon=100 lacp_rate=1\"".to_string(),
        "TYPE=Bond".to_string(),
        format!("MTU={}", mtu),
    ];
    NetworkFragment::new(&format!("ifcfg-{}", bond_name), lines)
}

fn slave_fragment(interface: &str, bond_name: &str, mtu: u32) -> NetworkFragment {
    let lines = vec![
        format!("NAME={}", interface),
        "TYPE=Ethernet".to_string(),
        "ONBOOT=yes".to_string(),
        "NETBOOT=yes".to_string(),
        "SLAVE=yes".to_string(),
        format!("MASTER={}", bond_name),
        format!("DEVICE={}", interface),
        format!("MTU={}", mtu),
    ];
    NetworkFragment::new(&format!("ifcfg-{}", interface), lines)
}

fn interface_fragment(interface: &str, mtu: u32) -> NetworkFragment {
    let lines = vec![
        format!("NAME={}", interface),
        "TYPE=Ethernet".to_string(),
        "ONBOOT=yes".to_string(),
        "NETBOOT=yes".to_string(),
        format!("DEVICE={}", interface),
        format!("MTU={}", mtu),
    ];
    NetworkFragment::new(&format!("ifcfg-{}", interface), lines)
}

/// The opflex VLAN sub-interface, tagged with the infra VLAN and layered
/// over either a bond or a raw physical interface
fn opflex_vlan_fragment(anchor: &str, bonded: bool, vlan: u16, mtu: u32) -> NetworkFragment {
    let mut lines = vec!["VLAN=yes".to_string(), "TYPE=Vlan".to_string()];
    if bonded {
        lines.push(format!("PHYSDEV={}", anchor));
    }
    lines.extend([
        format!("VLAN_ID={}", vlan),
        "REORDER_HDR=yes".to_string(),
        "GVRP=no".to_string(),
        "MVRP=no".to_string(),
        "PROXY_METHOD=none".to_string(),
        "BROWSER_ONLY=no".to_string(),
        "BOOTPROTO=dhcp".to_string(),
        "DEFROUTE=yes".to_string(),
        "IPV4_FAILURE_FATAL=no".to_string(),
        "IPV6INIT=no".to_string(),
        "NAME=opflex-conn".to_string(),
        format!("DEVICE={}.{}", anchor, vlan),
        "ONBOOT=yes".to_string(),
        format!("MTU={}", mtu),
    ]);
    NetworkFragment::new("ifcfg-opflex-conn", lines)
}

/// Static multicast route for the opflex control-plane protocol; identical
/// for every mode and every node
fn multicast_route_fragment() -> NetworkFragment {
    let lines = vec![
        "ADDRESS0=224.0.0.0".to_string(),
        "NETMASK0=240.0.0.0".to_string(),
        "METRIC0=1000".to_string(),
    ];
    NetworkFragment::new("route-opflex-conn", lines)
}

fn require_interfaces(
    mode: InterfaceMode,
    role: NodeRole,
    network: &'static str,
    interfaces: &[String],
    needed: usize,
) -> Result<(), NetworkError> {
    if interfaces.len() < needed {
        return Err(NetworkError::NotEnoughInterfaces {
            mode,
            network,
            role: role.as_str(),
            needed,
            got: interfaces.len(),
        });
    }
    Ok(())
}

/// Build the network-script fragment set for one node of the given role.
///
/// Fragments come back in a fixed order (bonds, slaves, plain interface,
/// VLAN sub-interface, multicast route) so generated documents are
/// deterministic. Interface lists are length-checked against the mode
/// before anything is built.
pub fn build_fragments(
    mode: InterfaceMode,
    topology: &ClusterTopology,
    role: NodeRole,
) -> Result<Vec<NetworkFragment>, NetworkError> {
    let node_interfaces = topology.node_interfaces_for(role);
    let infra_interfaces = &topology.aci_infra_network_interface;
    let node_mtu = topology.network_interfaces.node.mtu;
    let infra_mtu = topology.network_interfaces.opflex.mtu;
    let vlan = topology.infra_vlan;

    let mut fragments = Vec::new();
    match mode {
        InterfaceMode::SingleNodeBondedInfra => {
            require_interfaces(mode, role, "infra", infra_interfaces, 2)?;
            fragments.push(bond_fragment("bond0", infra_mtu));
            fragments.push(slave_fragment(&infra_interfaces[0], "bond0", infra_mtu));
            fragments.push(slave_fragment(&infra_interfaces[1], "bond0", infra_mtu));
            fragments.push(opflex_vlan_fragment("bond0", true, vlan, infra_mtu));
        }
        InterfaceMode::BondedBoth => {
            require_interfaces(mode, role, "node", node_interfaces, 2)?;
            require_interfaces(mode, role, "infra", infra_interfaces, 2)?;
            fragments.push(bond_fragment("bond0", node_mtu));
            fragments.push(slave_fragment(&node_interfaces[0], "bond0", node_mtu));
            fragments.push(slave_fragment(&node_interfaces[1], "bond0", node_mtu));
            fragments.push(bond_fragment("bond1", infra_mtu));
            fragments.push(slave_fragment(&infra_interfaces[0], "bond1", infra_mtu));
            fragments.push(slave_fragment(&infra_interfaces[1], "bond1", infra_mtu));
            fragments.push(opflex_vlan_fragment("bond1", true, vlan, infra_mtu));
        }
        InterfaceMode::BondedNodeSingleInfra => {
            require_interfaces(mode, role, "node", node_interfaces, 2)?;
            require_interfaces(mode, role, "infra", infra_interfaces, 1)?;
            fragments.push(bond_fragment("bond0", node_mtu));
            fragments.push(slave_fragment(&node_interfaces[0], "bond0", node_mtu));
            fragments.push(slave_fragment(&node_interfaces[1], "bond0", node_mtu));
            fragments.push(interface_fragment(&infra_interfaces[0], infra_mtu));
            // VLAN rides directly on the raw infra interface, no bond
            fragments.push(opflex_vlan_fragment(&infra_interfaces[0], false, vlan, infra_mtu));
        }
        InterfaceMode::SingleBoth => {
            require_interfaces(mode, role, "infra", infra_interfaces, 1)?;
            fragments.push(interface_fragment(&infra_interfaces[0], infra_mtu));
            fragments.push(opflex_vlan_fragment(&infra_interfaces[0], false, vlan, infra_mtu));
        }
    }
    fragments.push(multicast_route_fragment());

    Ok(fragments)
}
