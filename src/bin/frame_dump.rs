//! Serial frame dumper
//!
//! Opens the chassis serial link and prints every decoded frame without
//! publishing anything. Useful for checking wiring and baud rate before
//! running the sensor node.

use chassis_telemetry::config::{DEFAULT_CONFIG_PATH, SensorConfig};
use chassis_telemetry::error::{Error, Result};
use chassis_telemetry::frame::FrameReader;
use chassis_telemetry::transport::SerialTransport;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "frame-dump")]
#[command(about = "Print decoded chassis frames from the serial link")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Serial device, overrides the config file
    #[arg(long)]
    serial_port: Option<String>,

    /// Baud rate, overrides the config file
    #[arg(long)]
    baud: Option<u32>,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    count: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = SensorConfig::load(&cli.config)?;
    if let Some(serial_port) = cli.serial_port {
        config.serial.port = serial_port;
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }

    log::info!(
        "Opening serial port {} at {} baud...",
        config.serial.port,
        config.serial.baud_rate
    );
    let transport = SerialTransport::open(
        &config.serial.port,
        config.serial.baud_rate,
        config.serial.read_timeout(),
    )?;
    let mut reader = FrameReader::new(transport);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::Relaxed))
        .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let start = Instant::now();
    let mut printed = 0u64;
    while running.load(Ordering::Relaxed) && cli.count.is_none_or(|n| printed < n) {
        if let Some(sample) = reader.read_frame()? {
            printed += 1;
            println!(
                "[{:9.3}s] #{:<6} {}",
                start.elapsed().as_secs_f64(),
                printed,
                sample.summary()
            );
        }
    }

    let stats = reader.stats();
    log::info!(
        "{} frames decoded, {} short reads discarded, {} idle reads in {:.1}s",
        stats.decoded,
        stats.discarded,
        stats.idle,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
