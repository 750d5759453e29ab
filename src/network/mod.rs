//! Network Module
//!
//! TCP server and per-connection handling.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One worker thread per connection
//! - Requests routed through a shared `Engine`

mod server;
mod connection;

pub use server::Server;
pub use connection::Connection;
