//! Diagnostic record listener
//!
//! Consumer side of the stream: accepts a single client at a time and
//! decodes `x,y,z` records. Used by the `listen` command to check what an
//! injector actually puts on the wire, and by loopback tests.

use crate::error::{Error, Result};
use crate::streaming::wire::decode_record;
use crate::types::Vector3;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// How often a blocked accept/read re-checks the running flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Longest accepted record, terminator included
pub const MAX_RECORD_LEN: usize = 256;

/// Counters for one served client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerStats {
    /// Client served, `None` if stopped before anyone connected
    pub client: Option<SocketAddr>,
    /// Records decoded and handed to the callback
    pub records: u64,
    /// Lines that failed to decode
    pub rejected: u64,
}

/// Single-client TCP record listener
pub struct RecordListener {
    listener: TcpListener,
}

impl RecordListener {
    /// Bind to `bind_address` (e.g. `0.0.0.0:16384`)
    pub fn bind(bind_address: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_address).map_err(|e| {
            warn!("Failed to bind {}: {}", bind_address, e);
            Error::Bind {
                addr: bind_address.to_string(),
                source: e,
            }
        })?;
        listener.set_nonblocking(true)?;
        info!("Listening for records on {}", bind_address);
        Ok(Self { listener })
    }

    /// Bound address (useful after binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve one client until it disconnects or `running` is cleared.
    ///
    /// Every decoded record is passed to `on_sample`. Malformed lines are
    /// logged and skipped without dropping the connection.
    pub fn serve<F: FnMut(Vector3)>(
        &self,
        running: &AtomicBool,
        mut on_sample: F,
    ) -> Result<ListenerStats> {
        let mut stats = ListenerStats::default();

        let (stream, addr) = loop {
            if !running.load(Ordering::Relaxed) {
                return Ok(stats);
            }
            match self.listener.accept() {
                Ok(accepted) => break accepted,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(e) => return Err(e.into()),
            }
        };

        info!("Client connected: {}", addr);
        stats.client = Some(addr);
        Self::read_records(stream, running, &mut stats, &mut on_sample)?;
        info!(
            "Client {} done: {} records, {} rejected",
            addr, stats.records, stats.rejected
        );
        Ok(stats)
    }

    fn read_records<F: FnMut(Vector3)>(
        stream: TcpStream,
        running: &AtomicBool,
        stats: &mut ListenerStats,
        on_sample: &mut F,
    ) -> Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(POLL_INTERVAL))?;
        let mut reader = BufReader::new(stream);
        // Invariant: line.len() < MAX_RECORD_LEN before every read
        let mut line = Vec::with_capacity(MAX_RECORD_LEN);
        // Skipping the rest of an oversized record
        let mut discarding = false;

        loop {
            let limit = (MAX_RECORD_LEN - line.len()) as u64;
            match reader.by_ref().take(limit).read_until(b'\n', &mut line) {
                Ok(0) => {
                    if !discarding {
                        Self::handle_line(&line, stats, on_sample);
                    }
                    return Ok(());
                }
                Ok(_) => {
                    if line.last() == Some(&b'\n') {
                        if !discarding {
                            Self::handle_line(&line, stats, on_sample);
                        }
                        discarding = false;
                    } else if line.len() >= MAX_RECORD_LEN {
                        if !discarding {
                            stats.rejected += 1;
                            warn!(
                                "Discarding record longer than {} bytes",
                                MAX_RECORD_LEN
                            );
                        }
                        discarding = true;
                    } else {
                        // Unterminated tail, the peer closed the stream
                        if !discarding {
                            Self::handle_line(&line, stats, on_sample);
                        }
                        return Ok(());
                    }
                    line.clear();
                }
                // Partial data stays in `line` until the rest arrives
                Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    if !running.load(Ordering::Relaxed) {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn handle_line<F: FnMut(Vector3)>(line: &[u8], stats: &mut ListenerStats, on_sample: &mut F) {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                stats.rejected += 1;
                warn!("Discarding record that is not UTF-8: {}", e);
                return;
            }
        };
        if text.trim().is_empty() {
            return;
        }
        match decode_record(text) {
            Ok(sample) => {
                stats.records += 1;
                debug!("Received {}", sample);
                on_sample(sample);
            }
            Err(e) => {
                stats.rejected += 1;
                warn!("Discarding malformed record: {}", e);
            }
        }
    }
}
