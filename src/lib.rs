//! UDP Loss Relay
//!
//! A single-socket UDP relay that:
//! - Binds one datagram socket on the loopback source port
//! - Forwards every received datagram, unaltered, to a fixed destination
//! - Drops a configurable percentage of packets to emulate lossy links
//! - Shuts down cleanly when an interrupt flag is raised
//!
//! The binary lives in `main.rs`; the modules are exported so integration
//! tests can drive a relay in-process.

pub mod config;
pub mod loss;
pub mod relay;
