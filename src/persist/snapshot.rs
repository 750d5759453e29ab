//! Binary snapshot
//!
//! Serializes the string and hash stores into one file and reconstructs
//! them from it. Sorted sets are rebuilt from the append-only log instead.
//!
//! ## File Layout (little-endian, all lengths 4-byte signed integers)
//!
//! ```text
//! int32 stringEntryCount
//!   { int32 keyLen, keyLen bytes, int32 valLen, valLen bytes } × stringEntryCount
//! int32 hashKeyCount
//!   { int32 hkeyLen, hkeyLen bytes, int32 fieldCount,
//!     { int32 fieldLen, fieldLen bytes, int32 valLen, valLen bytes } × fieldCount
//!   } × hashKeyCount
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{NimbusError, Result};
use crate::store::Store;

/// Serialize both stores to `path`, replacing any prior contents.
///
/// The whole snapshot is built in memory first, then written in one
/// truncate/write/sync pass so a reader never observes a byte-level mix of
/// old and new content. Each store is serialized under its own read lock;
/// no global quiescence is established across the two.
pub fn save(path: &Path, store: &Store) -> Result<()> {
    let strings = store.dump_strings();
    let hashes = store.dump_hashes();

    let mut buf = Vec::new();
    put_count(&mut buf, strings.len())?;
    for (key, value) in &strings {
        put_str(&mut buf, key)?;
        put_str(&mut buf, value)?;
    }

    put_count(&mut buf, hashes.len())?;
    for (hash, fields) in &hashes {
        put_str(&mut buf, hash)?;
        put_count(&mut buf, fields.len())?;
        for (field, value) in fields {
            put_str(&mut buf, field)?;
            put_str(&mut buf, value)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(&buf)?;
    file.sync_all()?;

    tracing::info!(
        "Snapshot written: {} string keys, {} hash keys, {} bytes",
        strings.len(),
        hashes.len(),
        buf.len()
    );
    Ok(())
}

/// Reconstruct both stores from the snapshot at `path`, replacing their
/// current contents.
pub fn load(path: &Path, store: &Store) -> Result<()> {
    let data = fs::read(path)?;
    let mut reader = SnapshotReader { data: &data, pos: 0 };

    let string_count = reader.read_count()?;
    let mut strings = HashMap::with_capacity(string_count);
    for _ in 0..string_count {
        let key = reader.read_str()?;
        let value = reader.read_str()?;
        strings.insert(key, value);
    }

    let hash_count = reader.read_count()?;
    let mut hashes = HashMap::with_capacity(hash_count);
    for _ in 0..hash_count {
        let hash = reader.read_str()?;
        let field_count = reader.read_count()?;
        let mut fields = HashMap::with_capacity(field_count);
        for _ in 0..field_count {
            let field = reader.read_str()?;
            let value = reader.read_str()?;
            fields.insert(field, value);
        }
        hashes.insert(hash, fields);
    }

    if reader.pos != data.len() {
        tracing::warn!(
            "Snapshot has {} trailing bytes past the hash section",
            data.len() - reader.pos
        );
    }

    store.restore_strings(strings);
    store.restore_hashes(hashes);
    tracing::info!("Snapshot loaded: {} string keys, {} hash keys", string_count, hash_count);
    Ok(())
}

// =============================================================================
// Encoding helpers
// =============================================================================

fn put_count(buf: &mut Vec<u8>, count: usize) -> Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| NimbusError::Snapshot(format!("count {} exceeds int32", count)))?;
    buf.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    put_count(buf, s.len())?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

// =============================================================================
// Decoding helpers
// =============================================================================

struct SnapshotReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SnapshotReader<'a> {
    fn read_count(&mut self) -> Result<usize> {
        let bytes = self.take(4)?;
        let count = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        usize::try_from(count)
            .map_err(|_| NimbusError::Snapshot(format!("negative length field: {}", count)))
    }

    fn read_str(&mut self) -> Result<String> {
        let len = self.read_count()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| NimbusError::Snapshot("string field is not valid UTF-8".to_string()))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.len() - self.pos < len {
            return Err(NimbusError::Snapshot(format!(
                "truncated at byte {}: wanted {} more bytes",
                self.pos, len
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}
