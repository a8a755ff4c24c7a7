//! # IgnitionGen - Per-node ignition file generator for bare-metal OpenShift clusters
//!
//! This library generates the boot-time configuration artifacts (ignition
//! files) consumed by RHCOS nodes during a bare-metal user-provisioned
//! install with ACI networking.
//!
//! ## Overview
//!
//! For every node in the cluster topology, the generator derives a hostname
//! and a set of sysconfig network-script fragments (bonds, slave interfaces,
//! the opflex VLAN sub-interface, and the multicast route), then injects
//! them into the per-role ignition template as base64 data-URI file entries.
//!
//! ## Architecture
//!
//! The library is organized into a few small modules:
//!
//! - `config`: Type-safe cluster topology structures and YAML loading
//! - `network`: Interface topology modes and network-script fragment builders
//! - `ignition`: Ignition document mutation and data-URI encoding
//! - `generate`: High-level driver producing one output per node
//!
//! ## Configuration Format
//!
//! Topologies use the inventory-style YAML layout with an `all:` root key:
//!
//! ```yaml
//! all:
//!   infra_vlan: 4093
//!   service_vlan: 1022
//!   kubeapi_vlan: 1021
//!   os_cp_nodes_number: 3
//!   os_compute_nodes_number: 2
//!   network_interfaces:
//!     node:
//!       mtu: 1500
//!     opflex:
//!       mtu: 1700
//!   node_network_interface: [ens2, ens3]
//!   aci_infra_network_interface: [ens4, ens5]
//! ```
//!
//! ## Error Handling
//!
//! The library uses `color_eyre` for error reporting with context. Topology
//! validation and interface selection failures carry typed errors so callers
//! can tell a bad config apart from an I/O fault.

pub mod config;
pub mod generate;
pub mod ignition;
pub mod network;
