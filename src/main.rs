use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ignitiongen::config;
use ignitiongen::generate::{self, DEFAULT_INFRA_ID};
use ignitiongen::network::InterfaceMode;

/// Per-node ignition file generator for bare-metal OpenShift clusters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the cluster topology YAML file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Interface topology mode (1-4); prompts interactively when omitted
    #[arg(short, long)]
    mode: Option<InterfaceMode>,

    /// Cluster identifier; overrides the INFRA_ID environment variable
    #[arg(long)]
    infra_id: Option<String>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting ignition generation");
    info!("Configuration file: {:?}", args.config);

    let topology = config::load_config(&args.config)?;

    let mode = match args.mode {
        Some(mode) => mode,
        None => prompt_mode()?,
    };

    let infra_id = args
        .infra_id
        .or_else(|| env::var("INFRA_ID").ok())
        .unwrap_or_else(|| DEFAULT_INFRA_ID.to_string());

    info!("Cluster id: {}", infra_id);
    info!("Interface topology: {}", mode);

    generate::generate_cluster_ignitions(&topology, mode, &infra_id, Path::new("."))?;

    info!("Ignition generation completed successfully");
    Ok(())
}

/// Interactive fallback when --mode is not given. Any answer outside 1-4
/// is a hard error, not a silent fallthrough.
fn prompt_mode() -> Result<InterfaceMode> {
    println!("Available interface topologies:");
    for (number, mode) in InterfaceMode::all().iter().enumerate() {
        println!("  {}. {}", number + 1, mode);
    }
    print!("Which option would you like to choose? ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let mode = answer.trim().parse()?;

    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(&["ignitiongen", "--config", "test.yaml"]);

        assert_eq!(args.config, PathBuf::from("test.yaml"));
        assert_eq!(args.mode, None);
        assert_eq!(args.infra_id, None);
    }

    #[test]
    fn test_cli_mode_selection() {
        let args = Args::parse_from(&[
            "ignitiongen",
            "--mode", "2",
            "--infra-id", "mycluster",
        ]);

        assert_eq!(args.mode, Some(InterfaceMode::BondedBoth));
        assert_eq!(args.infra_id, Some("mycluster".to_string()));
        assert_eq!(args.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn test_cli_rejects_invalid_mode() {
        let result = Args::try_parse_from(&["ignitiongen", "--mode", "7"]);
        assert!(result.is_err());
    }
}
