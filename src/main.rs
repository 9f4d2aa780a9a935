//! UDP relay with simulated packet loss.
//!
//! Binds a single datagram socket and forwards everything it receives to
//! a fixed destination, discarding a configurable percentage of packets
//! on the way. Useful for exercising retransmission logic in protocols
//! built on top of UDP.

use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use udp_relay::config::RelayConfig;
use udp_relay::loss::LossModel;
use udp_relay::relay::Relay;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match RelayConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            usage();
            process::exit(1);
        }
    };

    log::info!("UDP relay starting...");
    log::info!("  Source:    {}:{} (bind uses loopback)", config.src_ip, config.src_port);
    log::info!("  Listen:    {}", config.listen_addr());
    log::info!("  Dest:      {}", config.dest);
    log::info!("  Loss rate: {}%", config.loss_rate);

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn usage() {
    println!("Usage: relay <srcIP> <srcPort> <destIP> <destPort> <lossRate>");
}

fn run(config: &RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Shutdown flag, raised from signal context and polled by the relay
    // loop once per iteration. Repeat signals are no-ops once it is set.
    let shutdown = Arc::new(AtomicBool::new(false));
    flag::register(SIGINT, Arc::clone(&shutdown))?;
    flag::register(SIGTERM, Arc::clone(&shutdown))?;

    let relay = Relay::bind(
        config.listen_addr(),
        config.dest,
        LossModel::new(config.loss_rate),
        shutdown,
    )?;

    relay.run()?;
    Ok(())
}
