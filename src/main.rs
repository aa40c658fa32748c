//! termux-bootstrap - command line entry point

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use termux_bootstrap::cli::{Cli, Commands};
use termux_bootstrap::{
    BootstrapState, CanonicalName, HostContext, ManagerKind, ResolvedBootstrap, verify_taxonomy,
};

/// Initialize tracing with appropriate settings
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    debug!("CLI arguments parsed");

    // A broken taxonomy is a build defect; refuse to run with it
    verify_taxonomy().context("Package taxonomy is inconsistent")?;

    let state = BootstrapState::global();

    match cli.command {
        Commands::Resolve { variant } => {
            let resolved = state
                .resolve_and_store(Some(&variant))
                .with_context(|| format!("Failed to resolve package variant {variant:?}"))?;
            info!(%resolved, "Bootstrap resolved");
            print_resolved(Some(resolved), cli.json)?;
        }
        Commands::FromHost {
            build_config,
            package,
            config,
        } => {
            let mut host = match config {
                Some(path) => HostContext::load_from_file(&path)
                    .with_context(|| format!("Failed to load host context from {path:?}"))?,
                None => HostContext::default(),
            };
            if let Some(path) = build_config {
                host.build_config_path = path;
            }
            if let Some(package) = package {
                host.package_name = package;
            }

            let resolved = state.resolve_from_host(&host);
            print_resolved(resolved, cli.json)?;
        }
        Commands::List => print_taxonomy(cli.json)?,
        Commands::Check => {
            // Already verified above
            println!("Package taxonomy is consistent");
        }
    }

    Ok(())
}

fn print_resolved(resolved: Option<ResolvedBootstrap>, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&resolved).context("Failed to serialize result")?
        );
        return Ok(());
    }

    match resolved {
        Some(resolved) => {
            println!("manager: {}", resolved.manager);
            println!("variant: {}", resolved.variant);
        }
        None => println!("bootstrap metadata unavailable"),
    }
    Ok(())
}

fn print_taxonomy(json: bool) -> Result<()> {
    if json {
        let taxonomy: serde_json::Map<String, serde_json::Value> = ManagerKind::ALL
            .iter()
            .map(|manager| {
                let variants: Vec<&str> = manager.variants().map(|v| v.name()).collect();
                (manager.name().to_string(), serde_json::json!(variants))
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&taxonomy).context("Failed to serialize taxonomy")?
        );
        return Ok(());
    }

    for manager in ManagerKind::ALL {
        println!("{}", manager.name());
        for variant in manager.variants() {
            println!("  {}", variant.name());
        }
    }
    Ok(())
}
