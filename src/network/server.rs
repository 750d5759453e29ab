//! TCP Server
//!
//! Accepts connections repeatedly and serves each one on its own worker
//! thread; all workers share the same engine under the store's locking
//! discipline.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::network::Connection;
use crate::protocol::{write_value, Value};

/// TCP server for NimbusKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start the server (blocking accept loop)
    pub fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        tracing::info!("Listening on {}", self.config.listen_addr);

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            if self.active_connections.load(Ordering::Acquire) >= self.config.max_connections {
                tracing::warn!("Connection limit reached, refusing client");
                refuse(stream);
                continue;
            }

            self.active_connections.fetch_add(1, Ordering::AcqRel);
            let engine = Arc::clone(&self.engine);
            let active = Arc::clone(&self.active_connections);

            thread::spawn(move || {
                match Connection::new(stream, engine) {
                    Ok(mut connection) => {
                        if let Err(e) = connection.handle() {
                            tracing::warn!(
                                "Connection from {} ended with error: {}",
                                connection.peer_addr(),
                                e
                            );
                        }
                    }
                    Err(e) => tracing::warn!("Failed to set up connection: {}", e),
                }
                active.fetch_sub(1, Ordering::AcqRel);
            });
        }

        Ok(())
    }
}

/// Answer an over-limit client with an error frame and drop the stream
fn refuse(stream: TcpStream) {
    let mut stream = stream;
    let _ = write_value(
        &mut stream,
        &Value::error("ERR max number of clients reached"),
    );
}
