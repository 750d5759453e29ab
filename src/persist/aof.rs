//! Append-only command log
//!
//! The log is a sequence of complete wire-protocol array frames, one per
//! mutating command, in execution order. Replay decodes the file
//! sequentially and re-dispatches each command through the same handler
//! table used for live traffic; a malformed record aborts replay of the
//! remaining log region.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{NimbusError, Result};
use crate::protocol::{self, Value};

/// Appends wire frames to the log file
pub struct AofWriter {
    writer: BufWriter<File>,
}

impl AofWriter {
    /// Open the log for appending, creating it if absent
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one encoded frame and flush it to the file
    pub fn append(&mut self, frame: &Value) -> Result<()> {
        self.writer.write_all(&protocol::encode(frame))?;
        self.writer.flush()?;
        Ok(())
    }

    /// Force the log contents to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}

/// Outcome of a log replay
#[derive(Debug)]
pub struct ReplayResult {
    /// Number of command frames applied
    pub frames_applied: u64,

    /// Byte offset of the malformed record that aborted replay, if any
    pub aborted_at: Option<u64>,
}

/// Replay the log at `path`, dispatching each command through `apply`.
///
/// `apply` receives the upper-cased command name and its arguments and
/// returns the reply value; error replies are logged but do not stop replay.
/// A record that fails to decode aborts the remaining region. I/O failures
/// propagate and must be treated as fatal by the caller.
pub fn replay<F>(path: &Path, mut apply: F) -> Result<ReplayResult>
where
    F: FnMut(&str, &[Value]) -> Value,
{
    let data = fs::read(path)?;
    let mut offset = 0usize;
    let mut result = ReplayResult {
        frames_applied: 0,
        aborted_at: None,
    };

    while offset < data.len() {
        let (frame, consumed) = match protocol::decode(&data[offset..]) {
            Ok(decoded) => decoded,
            Err(NimbusError::Protocol(e)) => {
                tracing::warn!(
                    "Malformed log record at byte {}: {}; aborting replay of the remaining region",
                    offset,
                    e
                );
                result.aborted_at = Some(offset as u64);
                break;
            }
            Err(e) => return Err(e),
        };

        let (name, args) = match command_parts(&frame) {
            Some(parts) => parts,
            None => {
                tracing::warn!(
                    "Log record at byte {} is not an array of bulk strings; aborting replay",
                    offset
                );
                result.aborted_at = Some(offset as u64);
                break;
            }
        };

        let reply = apply(&name, args);
        if reply.is_error() {
            tracing::warn!("Replayed command {} was rejected: {:?}", name, reply);
        }
        result.frames_applied += 1;
        offset += consumed;
    }

    Ok(result)
}

/// Split a request frame into its upper-cased command name and arguments
fn command_parts(frame: &Value) -> Option<(String, &[Value])> {
    match frame {
        Value::Array(items) if !items.is_empty() => {
            let name = items[0].as_bulk()?.to_ascii_uppercase();
            Some((name, &items[1..]))
        }
        _ => None,
    }
}
