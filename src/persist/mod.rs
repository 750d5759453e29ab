//! Persistence Module
//!
//! Two complementary mechanisms:
//!
//! - **Append-only log (AOF)**: every accepted mutating command is appended
//!   in its original wire-encoded array form, with no additional framing. At
//!   startup the log is replayed through the live dispatch table before any
//!   client is served.
//! - **Snapshot**: a point-in-time binary serialization of the string and
//!   hash stores with a fixed little-endian layout, written by `SAVE` and
//!   read back by [`snapshot::load`].

pub mod aof;
pub mod snapshot;

pub use aof::{AofWriter, ReplayResult};
