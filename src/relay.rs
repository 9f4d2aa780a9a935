//! The relay proper: one UDP socket, one poll loop.
//!
//! Datagrams received on the bound socket are forwarded to the fixed
//! destination unless the loss model discards them. The loop never waits
//! unboundedly: every wait goes through a short poll timeout, so the
//! shutdown flag is rechecked even when the link is idle.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token};
use socket2::{Domain, Socket, Type};

use crate::loss::{LossModel, PacketAction};

/// Fixed capacity of the receive buffer; larger datagrams are truncated
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// mio token for the relay socket
const SOCKET_TOKEN: Token = Token(0);

/// Upper bound on any single wait, so the shutdown flag gets rechecked
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Transfer counters, reported once in the shutdown log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelayStats {
    /// Datagrams received on the bound socket
    pub received: u64,
    /// Datagrams sent on to the destination
    pub forwarded: u64,
    /// Datagrams discarded by the loss model
    pub dropped: u64,
    /// Receive or send failures that were logged and skipped
    pub io_errors: u64,
}

/// A bound relay, ready to run its receive-decide-forward loop.
pub struct Relay {
    poll: Poll,
    socket: UdpSocket,
    dest: SocketAddr,
    loss: LossModel,
    shutdown: Arc<AtomicBool>,
    recv_buf: [u8; MAX_DATAGRAM_SIZE],
    stats: RelayStats,
}

impl Relay {
    /// Create, configure and bind the relay socket.
    ///
    /// The socket is created through `socket2` so SO_REUSEADDR can be set
    /// before the bind, letting a restarted relay reclaim its port
    /// immediately. Any failure here is fatal to the caller.
    pub fn bind(
        listen: SocketAddr,
        dest: SocketAddr,
        loss: LossModel,
        shutdown: Arc<AtomicBool>,
    ) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, None)?;
        log::info!("Socket created");

        socket.set_reuse_address(true)?;
        socket.bind(&listen.into())?;
        log::info!("Socket bound to {}", listen);

        // The poll loop needs a non-blocking socket
        socket.set_nonblocking(true)?;
        let mut socket = UdpSocket::from_std(socket.into());

        let poll = Poll::new()?;
        poll.registry()
            .register(&mut socket, SOCKET_TOKEN, Interest::READABLE)?;

        Ok(Relay {
            poll,
            socket,
            dest,
            loss,
            shutdown,
            recv_buf: [0u8; MAX_DATAGRAM_SIZE],
            stats: RelayStats::default(),
        })
    }

    /// Address the socket actually bound to (tests bind port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Drive the receive-decide-forward loop until the shutdown flag is
    /// observed, then close the socket and return the transfer counters.
    pub fn run(mut self) -> io::Result<RelayStats> {
        let mut events = Events::with_capacity(1024);

        log::info!(
            "Listening on {}, forwarding to {}",
            self.socket.local_addr()?,
            self.dest
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                Ok(()) => {}
                // Signal delivery during the wait is not an error; the
                // flag check at the top of the loop picks it up
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            // Drain regardless of what woke us; a timeout wakeup with a
            // quiet socket falls straight through on WouldBlock
            self.drain_socket();
        }

        log::info!("Shutdown requested, closing socket");
        let stats = self.stats;
        drop(self.socket);
        log::info!(
            "Socket closed ({} received, {} forwarded, {} dropped, {} I/O errors)",
            stats.received,
            stats.forwarded,
            stats.dropped,
            stats.io_errors
        );
        Ok(stats)
    }

    /// Receive until the socket runs dry, forwarding whatever the loss
    /// model lets through.
    fn drain_socket(&mut self) {
        loop {
            let (len, from) = match self.socket.recv_from(&mut self.recv_buf) {
                Ok(v) => v,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Transient failure on one datagram; the next receive
                    // starts a fresh cycle
                    self.stats.io_errors += 1;
                    log::warn!("Receive failed: {}", e);
                    continue;
                }
            };

            self.stats.received += 1;

            match self.loss.decide() {
                PacketAction::Drop => {
                    self.stats.dropped += 1;
                    log::debug!("Dropped {} bytes from {}", len, from);
                }
                PacketAction::Forward => {
                    match self.socket.send_to(&self.recv_buf[..len], self.dest) {
                        Ok(sent) => {
                            self.stats.forwarded += 1;
                            log::trace!("Forwarded {} bytes from {} to {}", sent, from, self.dest);
                        }
                        Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            self.stats.io_errors += 1;
                            log::warn!("Send to {} failed: {}", self.dest, e);
                        }
                    }
                }
            }
        }
    }
}
