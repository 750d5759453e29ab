//! # NimbusKV
//!
//! An in-memory key-value server with:
//! - A RESP-style line-oriented binary wire protocol
//! - String, hash, and sorted-set data types
//! - A rank-indexed treap backing each sorted set
//! - Append-only command logging with startup replay
//! - On-demand binary snapshots
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ RESP frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Command Dispatcher                           │
//! │          (arity checks, handler routing)                     │
//! └──────────┬──────────────────────────┬───────────────────────┘
//!            │                          │ mutations
//!            ▼                          ▼
//!     ┌─────────────┐           ┌──────────────┐
//!     │    Store    │           │  Append-Only │
//!     │ strings     │           │     Log      │
//!     │ hashes      │           └──────────────┘
//!     │ sorted sets │
//!     └──────┬──────┘
//!            │ SAVE / load
//!            ▼
//!     ┌─────────────┐
//!     │  Snapshot   │
//!     └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod persist;
pub mod network;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NimbusError, Result};
pub use config::Config;
pub use engine::Engine;
pub use protocol::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of NimbusKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
