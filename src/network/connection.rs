//! Connection Handler
//!
//! Handles individual client connections: a strictly sequential loop of
//! read frame, execute, write reply. A frame that fails to decode is logged
//! and skipped; the session continues.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{NimbusError, Result};
use crate::protocol::{read_value, write_value, Value};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the shared engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and sends replies. Returns when the client
    /// disconnects or an unrecoverable error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let frame = match read_value(&mut self.reader) {
                Ok(frame) => frame,
                Err(NimbusError::Io(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(NimbusError::Io(ref e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(NimbusError::Protocol(e)) => {
                    // Skip the malformed frame and keep reading
                    tracing::warn!("Undecodable frame from {}: {}", self.peer_addr, e);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!("Received frame from {}: {:?}", self.peer_addr, frame);
            let reply = self.engine.execute_frame(frame);

            if let Err(e) = self.send_reply(&reply) {
                if let NimbusError::Io(ref io_err) = e {
                    if matches!(
                        io_err.kind(),
                        std::io::ErrorKind::ConnectionAborted
                            | std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::BrokenPipe
                    ) {
                        tracing::debug!(
                            "Client {} disconnected before reply could be sent",
                            self.peer_addr
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send an encoded reply to the client
    fn send_reply(&mut self, reply: &Value) -> Result<()> {
        write_value(&mut self.writer, reply)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
