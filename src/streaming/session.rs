//! Streaming session: one TCP connection to the target app's socket server.
//!
//! Lifecycle is Disconnected → Connected → Disconnected. The session owns at
//! most one stream and releases it on `disconnect` or drop, so every exit
//! path of an enclosing scope closes the descriptor.
//!
//! No timeouts are set on connect or write. A hung peer blocks the caller;
//! callers needing bounded latency should wrap the socket themselves.

use crate::delivery::Delivery;
use crate::error::{Error, Result};
use crate::streaming::wire::encode_record;
use crate::types::Vector3;
use log::{debug, error, info, warn};
use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream};

/// TCP session to a GyroHook socket server
#[derive(Debug, Default)]
pub struct StreamSession {
    stream: Option<TcpStream>,
    peer: Option<SocketAddr>,
    /// Reusable record buffer
    buffer: Vec<u8>,
    sent: u64,
}

impl StreamSession {
    /// Create a disconnected session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and connect it in one step
    pub fn open(address: &str, port: u16) -> Result<Self> {
        let mut session = Self::new();
        session.connect(address, port)?;
        Ok(session)
    }

    /// Connect to `address:port`.
    ///
    /// An existing connection is closed first. On failure the session is
    /// left Disconnected and the cause is logged and returned.
    pub fn connect(&mut self, address: &str, port: u16) -> Result<()> {
        self.disconnect();

        let stream = match TcpStream::connect((address, port)) {
            Ok(stream) => stream,
            Err(e) => {
                error!("Connection to {}:{} failed: {}", address, port, e);
                return Err(Error::Connection {
                    addr: format!("{}:{}", address, port),
                    source: e,
                });
            }
        };

        // One record per write; don't let Nagle batch samples
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        self.peer = stream.peer_addr().ok();
        self.stream = Some(stream);
        self.sent = 0;
        info!("Connected to {}:{}", address, port);
        Ok(())
    }

    /// Close the connection if one is held. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            match self.peer.take() {
                Some(peer) => info!("Disconnected from {} ({} samples sent)", peer, self.sent),
                None => info!("Disconnected ({} samples sent)", self.sent),
            }
        }
    }

    /// Whether a connection is currently held
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Remote address of the current connection
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Samples successfully written on the current connection
    pub fn samples_sent(&self) -> u64 {
        self.sent
    }

    /// Send one sample as a `x,y,z\n` record.
    ///
    /// Fails fast with [`Error::NotConnected`] when disconnected, without
    /// touching any socket. A write failure does not change state; the
    /// caller decides whether to disconnect.
    pub fn send_vector(&mut self, sample: Vector3) -> Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            error!("Cannot send sample: not connected");
            return Err(Error::NotConnected);
        };

        encode_record(&sample, &mut self.buffer);
        if let Err(e) = stream.write_all(&self.buffer) {
            error!("Failed to send sample {}: {}", sample, e);
            return Err(Error::Send(e));
        }

        self.sent += 1;
        debug!("Sent {}", sample);
        Ok(())
    }
}

impl Delivery for StreamSession {
    fn deliver(&mut self, sample: Vector3) -> Result<()> {
        self.send_vector(sample)
    }

    fn is_ready(&self) -> bool {
        self.is_connected()
    }

    fn close(&mut self) {
        self.disconnect();
    }

    fn describe(&self) -> String {
        match self.peer {
            Some(peer) => format!("stream to {}", peer),
            None => "stream (disconnected)".to_string(),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn test_new_session_is_disconnected() {
        let session = StreamSession::new();
        assert!(!session.is_connected());
        assert!(session.peer_addr().is_none());
        assert!(!session.is_ready());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut session = StreamSession::new();
        session.disconnect();
        assert!(!session.is_connected());
        session.disconnect();
        assert!(!session.is_connected());
    }

    #[test]
    fn test_send_when_disconnected_fails_fast() {
        let mut session = StreamSession::new();
        let result = session.send_vector(Vector3::new(1.0, 2.0, 3.0));
        assert!(matches!(result, Err(Error::NotConnected)));
        assert_eq!(session.samples_sent(), 0);
    }

    #[test]
    fn test_connect_refused_stays_disconnected() {
        // Bind then drop to get a port nobody is listening on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut session = StreamSession::new();
        let result = session.connect("127.0.0.1", port);
        assert!(matches!(result, Err(Error::Connection { .. })));
        assert!(!session.is_connected());
    }

    #[test]
    fn test_send_and_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut session = StreamSession::open("127.0.0.1", port).unwrap();
        let (mut peer, _) = listener.accept().unwrap();
        assert!(session.is_connected());
        assert_eq!(session.describe(), format!("stream to 127.0.0.1:{}", port));

        session.send_vector(Vector3::new(1.0, 2.5, -3.25)).unwrap();
        session.send_vector(Vector3::new(0.5, 0.0, 4.0)).unwrap();
        assert_eq!(session.samples_sent(), 2);

        session.disconnect();
        session.disconnect();
        assert!(!session.is_connected());

        let mut received = String::new();
        peer.read_to_string(&mut received).unwrap();
        assert_eq!(received, "1,2.5,-3.25\n0.5,0,4\n");
    }

    #[test]
    fn test_drop_closes_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        {
            let mut session = StreamSession::open("127.0.0.1", port).unwrap();
            session.send_vector(Vector3::new(1.0, 1.0, 1.0)).unwrap();
        }

        let (mut peer, _) = listener.accept().unwrap();
        let mut received = String::new();
        // Returns only once the session side has closed
        peer.read_to_string(&mut received).unwrap();
        assert_eq!(received, "1,1,1\n");
    }
}
