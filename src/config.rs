//! Command line configuration for the relay.
//!
//! Arguments are positional:
//! `relay <srcIP> <srcPort> <destIP> <destPort> <lossRate>`

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Number of positional arguments the relay expects (after the program name)
pub const ARG_COUNT: usize = 5;

/// Immutable relay configuration, fixed at startup from the command line.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Source IP given on the command line. Carried for display only; the
    /// listening socket binds to loopback regardless (see `listen_addr`).
    pub src_ip: Ipv4Addr,
    /// Port the relay listens on
    pub src_port: u16,
    /// Fixed forwarding destination
    pub dest: SocketAddr,
    /// Percentage chance of dropping a received datagram, intended 0-100.
    /// Values outside that range are accepted: negative never drops,
    /// anything above 100 always drops.
    pub loss_rate: i32,
}

impl RelayConfig {
    /// Parse the five positional arguments (program name already stripped).
    pub fn from_args(args: &[String]) -> Result<Self, Box<dyn std::error::Error>> {
        if args.len() != ARG_COUNT {
            return Err(format!(
                "expected {} arguments, got {}",
                ARG_COUNT,
                args.len()
            )
            .into());
        }

        let src_ip: Ipv4Addr = args[0].parse().map_err(|_| "invalid source IP")?;
        let src_port: u16 = args[1].parse().map_err(|_| "invalid source port")?;
        let dest_ip: Ipv4Addr = args[2].parse().map_err(|_| "invalid destination IP")?;
        let dest_port: u16 = args[3].parse().map_err(|_| "invalid destination port")?;
        let loss_rate: i32 = args[4].parse().map_err(|_| "invalid loss rate")?;

        Ok(RelayConfig {
            src_ip,
            src_port,
            dest: SocketAddr::V4(SocketAddrV4::new(dest_ip, dest_port)),
            loss_rate,
        })
    }

    /// Address the relay binds for receiving: loopback on the source port.
    /// `src_ip` is informational and not consulted here.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, self.src_port))
    }
}
