//! pubmon - find, name and tail telemetry publishers

use chassis_telemetry::discovery::{DEFAULT_PORT_RANGE, DEFAULT_PROBE_TIMEOUT, DiscoveryScanner};
use chassis_telemetry::error::{Error, Result};
use chassis_telemetry::monitor::{StreamMonitor, Target, resolve_target};
use chassis_telemetry::registry::{DEFAULT_HOST, DEFAULT_REGISTRY_PATH, PublisherRegistry};
use chassis_telemetry::report::{
    added_message, discovery_table, registry_table, removed_message, unknown_publisher_message,
};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pubmon")]
#[command(version)]
#[command(about = "Discover, register and monitor telemetry publishers")]
struct Cli {
    /// Publisher registry file
    #[arg(long, global = true, env = "PUBMON_REGISTRY", default_value = DEFAULT_REGISTRY_PATH)]
    registry: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a port range for active publishers
    List {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT_RANGE.start)]
        start_port: u16,
        /// First port not scanned
        #[arg(long, default_value_t = DEFAULT_PORT_RANGE.end)]
        end_port: u16,
        /// Per-port wait for a first message
        #[arg(
            long,
            default_value_t = DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout_ms: u64,
    },
    /// Show registered publishers
    Registry,
    /// Register a publisher under a name
    Add {
        name: String,
        port: u16,
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value = "")]
        desc: String,
    },
    /// Remove a registered publisher
    Remove { name: String },
    /// Print messages from a publisher as they arrive
    Monitor {
        /// Registered name or literal port
        target: String,
        /// Host for a literal port
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        // Help goes to stdout; nothing useful to do if that fails
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    match run(&cli.registry, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::PublisherNotFound(name)) => {
            print!("{}", unknown_publisher_message(&name));
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(registry_path: &str, command: Commands) -> Result<()> {
    match command {
        Commands::List {
            host,
            start_port,
            end_port,
            timeout_ms,
        } => {
            let registry = PublisherRegistry::open(registry_path)?;
            let scanner = DiscoveryScanner::new(
                &host,
                start_port..end_port,
                Duration::from_millis(timeout_ms),
            );
            println!("Scanning for active publishers...");
            println!();
            let results = scanner.scan(&registry);
            print!("{}", discovery_table(&results));
        }
        Commands::Registry => {
            let registry = PublisherRegistry::open(registry_path)?;
            print!("{}", registry_table(registry.list_all()));
        }
        Commands::Add {
            name,
            port,
            host,
            desc,
        } => {
            let mut registry = PublisherRegistry::open(registry_path)?;
            registry.add(&name, port, &host, &desc)?;
            print!("{}", added_message(&name, &host, port));
        }
        Commands::Remove { name } => {
            let mut registry = PublisherRegistry::open(registry_path)?;
            let removed = registry.remove(&name)?;
            print!("{}", removed_message(&name, removed));
        }
        Commands::Monitor { target, host } => {
            let registry = PublisherRegistry::open(registry_path)?;
            let endpoint = resolve_target(&Target::parse(&target)?, &host, &registry)?;
            monitor(StreamMonitor::connect(endpoint)?)?;
        }
    }
    Ok(())
}

fn monitor(mut monitor: StreamMonitor) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    println!("Monitoring {}", monitor.endpoint());
    println!("Press Ctrl+C to stop");
    println!();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let received = monitor.run(&mut out, &running)?;
    drop(monitor);

    writeln!(out, "\nStopped monitoring.")?;
    log::debug!("{} messages received", received);
    Ok(())
}
