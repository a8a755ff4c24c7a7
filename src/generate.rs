use crate::config::{ClusterTopology, NodeRole};
use crate::ignition;
use crate::network::{self, InterfaceMode, NetworkFragment};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Fallback cluster identifier when INFRA_ID is not set
pub const DEFAULT_INFRA_ID: &str = "openshift";

/// Generate every per-node ignition file into `dir`.
///
/// The bootstrap template is rewritten in place with its hostname entry
/// only; each control-plane and worker index gets its own output file,
/// built from a fresh read of the role template so the append-only
/// mutation never compounds. Outputs written before a failure are left
/// on disk.
pub fn generate_cluster_ignitions(
    topology: &ClusterTopology,
    mode: InterfaceMode,
    infra_id: &str,
    dir: &Path,
) -> Result<()> {
    // Resolve both fragment sets before touching any template so a short
    // interface list aborts the run with nothing written
    let master_fragments = network::build_fragments(mode, topology, NodeRole::Master)?;
    let worker_fragments = network::build_fragments(mode, topology, NodeRole::Worker)?;

    let bootstrap_path = dir.join(NodeRole::Bootstrap.template_file());
    let mut document = read_template(&bootstrap_path)?;
    let hostname = format!("{}-{}", infra_id, NodeRole::Bootstrap.as_str());
    // Bootstrap gets the hostname only, never interface fragments
    ignition::append_node_files(&mut document, &hostname, &[])?;
    write_document(&bootstrap_path, &document)?;
    info!("Updated bootstrap ignition in place: {:?}", bootstrap_path);

    for index in 0..topology.os_cp_nodes_number {
        write_node_ignition(dir, infra_id, NodeRole::Master, index, &master_fragments)?;
    }
    for index in 0..topology.os_compute_nodes_number {
        write_node_ignition(dir, infra_id, NodeRole::Worker, index, &worker_fragments)?;
    }

    info!(
        "Generated ignition files for {} master and {} worker nodes",
        topology.os_cp_nodes_number, topology.os_compute_nodes_number
    );

    Ok(())
}

/// Read the role template fresh, append the node's entries, and write the
/// per-node output file
fn write_node_ignition(
    dir: &Path,
    infra_id: &str,
    role: NodeRole,
    index: u32,
    fragments: &[NetworkFragment],
) -> Result<()> {
    let template_path = dir.join(role.template_file());
    let mut document = read_template(&template_path)?;

    let hostname = format!("{}-{}-{}", infra_id, role.as_str(), index);
    ignition::append_node_files(&mut document, &hostname, fragments)?;

    let output_path = dir.join(format!("{}-{}-{}-ignition.json", infra_id, role.as_str(), index));
    write_document(&output_path, &document)?;
    info!("Generated {:?} for host {}", output_path, hostname);

    Ok(())
}

fn read_template(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read ignition template '{}'", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse ignition template '{}'", path.display()))
}

fn write_document(path: &Path, document: &Value) -> Result<()> {
    let serialized = serde_json::to_string(document)?;
    fs::write(path, serialized)
        .wrap_err_with(|| format!("Failed to write ignition file '{}'", path.display()))
}
