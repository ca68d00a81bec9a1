mod collector;
mod config;
mod ports;
mod prober;
mod scheduler;

use config::ScanConfig;
use prober::ProbeOutcome;
use scheduler::Scheduler;

use std::time::Instant;
use tracing::info;

/// Fixed for this version; not read from config.
const TARGET: &str = "scanme.nmap.org";

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ScanConfig::load().await;
    let log_level = config.get_tracing_level()?;

    // stdout is reserved for port status lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
                         .add_directive(format!("port_probe={}", log_level.as_str().to_lowercase()).parse()?))
        .init();

    let ports = ports::load_ports(&config.ports_file).await;
    info!("probing {} ports on {} from {}", ports.len(), TARGET, config.ports_file);

    let scheduler = Scheduler::new(TARGET, config.workers, prober::CONNECT_TIMEOUT)?;
    let started = Instant::now();

    let tally = scheduler
        .run(ports, |port| println!("{}", ProbeOutcome::Open(port)))
        .await;

    info!("scan finished in {:?}, {} open", started.elapsed(), tally.open());
    println!("{}", tally);

    Ok(())
}
