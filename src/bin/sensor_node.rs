//! Sensor node - streams chassis encoder/IMU frames to TCP subscribers
//!
//! Reads 12-byte frames from the serial link and broadcasts each one as a
//! timestamped JSON message on the configured publisher port.

use chassis_telemetry::config::{DEFAULT_CONFIG_PATH, SensorConfig};
use chassis_telemetry::error::{Error, Result};
use chassis_telemetry::node::SensorNode;
use chassis_telemetry::streaming::TelemetryPublisher;
use chassis_telemetry::transport::SerialTransport;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser)]
#[command(name = "sensor-node")]
#[command(version)]
#[command(about = "Stream chassis encoder and IMU frames to TCP subscribers")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Serial device, overrides the config file
    #[arg(long)]
    serial_port: Option<String>,

    /// Publisher port, overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Print each decoded sample
    #[arg(long)]
    echo: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    log::info!("Sensor node v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = SensorConfig::load(&cli.config)?;
    if let Some(serial_port) = cli.serial_port {
        config.serial.port = serial_port;
    }
    if let Some(port) = cli.port {
        config.publisher.port = port;
    }
    config.log_summary();

    let transport = SerialTransport::open(
        &config.serial.port,
        config.serial.baud_rate,
        config.serial.read_timeout(),
    )?;
    let publisher = TelemetryPublisher::bind(&config.publisher.bind_address())?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut node = SensorNode::new(transport, publisher).with_echo(cli.echo);
    let outcome = node.run(&running);
    drop(node);

    log::info!("Exiting...");
    outcome.map(|_| ())
}
