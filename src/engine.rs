//! Engine Module
//!
//! The command dispatcher and persistence coordinator.
//!
//! ## Responsibilities
//! - Route each command name to its handler
//! - Validate arity before touching shared state
//! - Append accepted mutating commands to the log
//! - Replay the log on startup, before any client is served
//!
//! ## Handler Contract
//!
//! Every handler validates its argument count first; a wrong-arity call
//! returns an error reply and performs zero mutation. Lookup misses are not
//! errors: they reply null (GET/HGET), zero (ZCARD), or an empty array
//! (ZRANGE).

use std::fs;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::persist::{aof, snapshot, AofWriter};
use crate::protocol::Value;
use crate::store::Store;

/// The command names whose accepted executions are appended to the log
const MUTATING_COMMANDS: [&str; 4] = ["SET", "HSET", "DEL", "ZADD"];

/// The main engine: store + dispatcher + persistence
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// In-memory stores (string, hash, sorted-set)
    store: Store,

    /// Append-only log writer, present when `appendonly` is enabled
    aof: Option<Mutex<AofWriter>>,
}

impl Engine {
    /// Open an engine with the given config.
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Replay the append-only log, if enabled and present
    /// 3. Open the log for appending
    ///
    /// An I/O failure during replay is fatal: the engine must not serve
    /// traffic with partially-reconstructed state.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let mut engine = Self {
            config,
            store: Store::new(),
            aof: None,
        };

        if engine.config.append_only {
            let path = engine.config.aof_path();
            if path.exists() {
                let result =
                    aof::replay(&path, |name, args| engine.dispatch_unlogged(name, args))?;
                tracing::info!(
                    "Log replay: {} commands applied{}",
                    result.frames_applied,
                    match result.aborted_at {
                        Some(offset) => format!(", aborted at byte {}", offset),
                        None => String::new(),
                    }
                );
            }
            engine.aof = Some(Mutex::new(AofWriter::open(&path)?));
        }

        Ok(engine)
    }

    /// The in-memory stores
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Execute a decoded request frame.
    ///
    /// A well-formed request is an array of bulk strings whose first element,
    /// upper-cased, selects the command.
    pub fn execute_frame(&self, frame: Value) -> Value {
        match frame {
            Value::Array(items) if !items.is_empty() => match items[0].as_bulk() {
                Some(name) => {
                    let name = name.to_ascii_uppercase();
                    self.dispatch(&name, &items[1..])
                }
                None => Value::error("ERR command name must be a bulk string"),
            },
            _ => Value::error("ERR expected an array of bulk strings"),
        }
    }

    /// Dispatch a command by upper-cased name, logging accepted mutations
    pub fn dispatch(&self, name: &str, args: &[Value]) -> Value {
        self.dispatch_inner(name, args, true)
    }

    /// Dispatch without appending to the log (used during replay)
    fn dispatch_unlogged(&self, name: &str, args: &[Value]) -> Value {
        self.dispatch_inner(name, args, false)
    }

    fn dispatch_inner(&self, name: &str, args: &[Value], log: bool) -> Value {
        let reply = match name {
            "PING" => self.ping(args),
            "SET" => self.set(args),
            "GET" => self.get(args),
            "HSET" => self.hset(args),
            "HGET" => self.hget(args),
            "DEL" => self.del(args),
            "ZADD" => self.zadd(args),
            "ZCARD" => self.zcard(args),
            "ZRANGE" => self.zrange(args),
            "SAVE" => self.save(args),
            _ => {
                tracing::warn!("Unknown command: {}", name);
                Value::error(format!("ERR unknown command '{}'", name))
            }
        };

        // Accepted mutations are appended in their original array form,
        // immediately after successful execution.
        if log && !reply.is_error() && MUTATING_COMMANDS.contains(&name) {
            if let Some(writer) = &self.aof {
                let frame = request_frame(name, args);
                if let Err(e) = writer.lock().append(&frame) {
                    tracing::error!("Failed to append {} to the log: {}", name, e);
                    return Value::error(format!("ERR log append failed: {}", e));
                }
            }
        }

        reply
    }

    // =========================================================================
    // Connection / keyspace commands
    // =========================================================================

    /// PING [message]: echo the argument, or answer PONG
    fn ping(&self, args: &[Value]) -> Value {
        match args {
            [] => Value::Simple("PONG".to_string()),
            [message] => match message.as_bulk() {
                Some(text) => Value::Simple(text.to_string()),
                None => Value::error("ERR argument must be a bulk string"),
            },
            _ => wrong_arity("ping"),
        }
    }

    /// SET key value
    fn set(&self, args: &[Value]) -> Value {
        let [key, value] = args else {
            return wrong_arity("set");
        };
        let (Some(key), Some(value)) = (key.as_bulk(), value.as_bulk()) else {
            return Value::error("ERR arguments must be bulk strings");
        };
        self.store.set(key, value);
        Value::ok()
    }

    /// GET key
    fn get(&self, args: &[Value]) -> Value {
        let [key] = args else {
            return wrong_arity("get");
        };
        let Some(key) = key.as_bulk() else {
            return Value::error("ERR arguments must be bulk strings");
        };
        match self.store.get(key) {
            Some(value) => Value::Bulk(value),
            None => Value::Null,
        }
    }

    /// HSET hash field value
    fn hset(&self, args: &[Value]) -> Value {
        let [hash, field, value] = args else {
            return wrong_arity("hset");
        };
        let (Some(hash), Some(field), Some(value)) =
            (hash.as_bulk(), field.as_bulk(), value.as_bulk())
        else {
            return Value::error("ERR arguments must be bulk strings");
        };
        self.store.hset(hash, field, value);
        Value::ok()
    }

    /// HGET hash field
    fn hget(&self, args: &[Value]) -> Value {
        let [hash, field] = args else {
            return wrong_arity("hget");
        };
        let (Some(hash), Some(field)) = (hash.as_bulk(), field.as_bulk()) else {
            return Value::error("ERR arguments must be bulk strings");
        };
        match self.store.hget(hash, field) {
            Some(value) => Value::Bulk(value),
            None => Value::Null,
        }
    }

    /// DEL key: removes the key from the string and hash stores
    fn del(&self, args: &[Value]) -> Value {
        let [key] = args else {
            return wrong_arity("del");
        };
        let Some(key) = key.as_bulk() else {
            return Value::error("ERR arguments must be bulk strings");
        };
        self.store.del(key);
        Value::ok()
    }

    // =========================================================================
    // Sorted-set commands
    // =========================================================================

    /// ZADD key score member [score member ...]
    ///
    /// A member that already exists has its score replaced (erase old node,
    /// insert new). Replies with the number of pairs processed.
    fn zadd(&self, args: &[Value]) -> Value {
        if args.len() < 3 || args.len() % 2 == 0 {
            return wrong_arity("zadd");
        }
        let Some(key) = args[0].as_bulk() else {
            return Value::error("ERR arguments must be bulk strings");
        };

        // Validate every pair before mutating anything
        let mut pairs = Vec::with_capacity((args.len() - 1) / 2);
        for pair in args[1..].chunks(2) {
            let (Some(score), Some(member)) = (pair[0].as_bulk(), pair[1].as_bulk()) else {
                return Value::error("ERR arguments must be bulk strings");
            };
            let Ok(score) = score.parse::<i64>() else {
                return Value::error("ERR value is not an integer or out of range");
            };
            pairs.push((score, member.to_string()));
        }

        let set = self.store.zset_entry(key);
        let processed = set.add(&pairs);
        Value::Integer(processed as i64)
    }

    /// ZCARD key: member count; an absent key counts as an empty set
    fn zcard(&self, args: &[Value]) -> Value {
        let [key] = args else {
            return wrong_arity("zcard");
        };
        let Some(key) = key.as_bulk() else {
            return Value::error("ERR arguments must be bulk strings");
        };
        match self.store.zset(key) {
            Some(set) => Value::Integer(set.card() as i64),
            None => Value::Integer(0),
        }
    }

    /// ZRANGE key start stop: inclusive rank slice, negative offsets count
    /// from the end; an absent key replies with an empty array
    fn zrange(&self, args: &[Value]) -> Value {
        let [key, start, stop] = args else {
            return wrong_arity("zrange");
        };
        let (Some(key), Some(start), Some(stop)) =
            (key.as_bulk(), start.as_bulk(), stop.as_bulk())
        else {
            return Value::error("ERR arguments must be bulk strings");
        };
        let (Ok(start), Ok(stop)) = (start.parse::<i64>(), stop.parse::<i64>()) else {
            return Value::error("ERR value is not an integer or out of range");
        };

        let Some(set) = self.store.zset(key) else {
            return Value::Array(Vec::new());
        };
        match set.range(start, stop) {
            Some(members) => Value::Array(members.into_iter().map(Value::Bulk).collect()),
            None => Value::error("ERR invalid range: start is past stop"),
        }
    }

    // =========================================================================
    // Persistence commands
    // =========================================================================

    /// SAVE: write a point-in-time snapshot of the string and hash stores
    fn save(&self, args: &[Value]) -> Value {
        if !args.is_empty() {
            return wrong_arity("save");
        }
        match snapshot::save(&self.config.snapshot_path(), &self.store) {
            Ok(()) => Value::ok(),
            Err(e) => Value::error(format!("ERR save failed: {}", e)),
        }
    }

    /// Reconstruct the string and hash stores from the snapshot file
    pub fn load_snapshot(&self) -> Result<()> {
        snapshot::load(&self.config.snapshot_path(), &self.store)
    }
}

/// Rebuild the wire-form array frame for a command, for the log
fn request_frame(name: &str, args: &[Value]) -> Value {
    let mut items = Vec::with_capacity(1 + args.len());
    items.push(Value::Bulk(name.to_string()));
    items.extend_from_slice(args);
    Value::Array(items)
}

fn wrong_arity(command: &str) -> Value {
    Value::error(format!(
        "ERR wrong number of arguments for '{}' command",
        command
    ))
}
