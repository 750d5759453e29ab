//! Engine Tests
//!
//! Dispatch behavior: command contracts, arity checking, and concurrent
//! access through the shared store.

use std::sync::Arc;
use std::thread;

use nimbuskv::{Config, Engine, Value};
use tempfile::TempDir;

fn test_engine() -> (Engine, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config::builder().data_dir(dir.path()).build();
    (Engine::open(config).unwrap(), dir)
}

fn bulk_args(args: &[&str]) -> Vec<Value> {
    args.iter().map(|a| Value::bulk(*a)).collect()
}

fn frame(words: &[&str]) -> Value {
    Value::Array(bulk_args(words))
}

// =============================================================================
// Basic Commands
// =============================================================================

#[test]
fn test_ping_without_argument_pongs() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        engine.dispatch("PING", &[]),
        Value::Simple("PONG".to_string())
    );
}

#[test]
fn test_ping_echoes_argument() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        engine.dispatch("PING", &bulk_args(&["hello"])),
        Value::Simple("hello".to_string())
    );
}

#[test]
fn test_set_then_get() {
    let (engine, _dir) = test_engine();
    assert_eq!(engine.dispatch("SET", &bulk_args(&["k", "v"])), Value::ok());
    assert_eq!(engine.dispatch("GET", &bulk_args(&["k"])), Value::bulk("v"));
}

#[test]
fn test_get_missing_key_is_null() {
    let (engine, _dir) = test_engine();
    assert_eq!(engine.dispatch("GET", &bulk_args(&["nope"])), Value::Null);
}

#[test]
fn test_set_overwrites() {
    let (engine, _dir) = test_engine();
    engine.dispatch("SET", &bulk_args(&["k", "old"]));
    engine.dispatch("SET", &bulk_args(&["k", "new"]));
    assert_eq!(engine.dispatch("GET", &bulk_args(&["k"])), Value::bulk("new"));
}

#[test]
fn test_hset_then_hget_with_lazy_outer_map() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        engine.dispatch("HSET", &bulk_args(&["h", "f", "v"])),
        Value::ok()
    );
    assert_eq!(
        engine.dispatch("HGET", &bulk_args(&["h", "f"])),
        Value::bulk("v")
    );
    assert_eq!(engine.dispatch("HGET", &bulk_args(&["h", "g"])), Value::Null);
    assert_eq!(engine.dispatch("HGET", &bulk_args(&["x", "f"])), Value::Null);
}

#[test]
fn test_del_removes_from_both_stores() {
    let (engine, _dir) = test_engine();
    engine.dispatch("SET", &bulk_args(&["k", "v"]));
    engine.dispatch("HSET", &bulk_args(&["k", "f", "v"]));

    assert_eq!(engine.dispatch("DEL", &bulk_args(&["k"])), Value::ok());
    assert_eq!(engine.dispatch("GET", &bulk_args(&["k"])), Value::Null);
    assert_eq!(engine.dispatch("HGET", &bulk_args(&["k", "f"])), Value::Null);
}

// =============================================================================
// Sorted-Set Commands
// =============================================================================

#[test]
fn test_zadd_reports_pairs_processed() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        engine.dispatch("ZADD", &bulk_args(&["z", "1", "a", "2", "b"])),
        Value::Integer(2)
    );
    assert_eq!(engine.dispatch("ZCARD", &bulk_args(&["z"])), Value::Integer(2));
}

#[test]
fn test_zadd_update_in_place_semantics() {
    let (engine, _dir) = test_engine();
    engine.dispatch("ZADD", &bulk_args(&["z", "1", "a"]));
    engine.dispatch("ZADD", &bulk_args(&["z", "2", "a"]));

    assert_eq!(engine.dispatch("ZCARD", &bulk_args(&["z"])), Value::Integer(1));
    let set = engine.store().zset("z").unwrap();
    assert_eq!(set.score("a"), Some(2));
}

#[test]
fn test_zadd_rejects_non_numeric_score_without_mutation() {
    let (engine, _dir) = test_engine();
    let reply = engine.dispatch("ZADD", &bulk_args(&["z", "1", "a", "x", "b"]));
    assert!(reply.is_error());
    // The whole call is rejected before any pair is applied
    assert_eq!(engine.dispatch("ZCARD", &bulk_args(&["z"])), Value::Integer(0));
}

#[test]
fn test_zcard_absent_key_is_zero() {
    let (engine, _dir) = test_engine();
    assert_eq!(engine.dispatch("ZCARD", &bulk_args(&["nope"])), Value::Integer(0));
}

#[test]
fn test_zrange_slices_by_rank() {
    let (engine, _dir) = test_engine();
    engine.dispatch(
        "ZADD",
        &bulk_args(&["z", "1", "a", "2", "b", "3", "c", "4", "d"]),
    );

    assert_eq!(
        engine.dispatch("ZRANGE", &bulk_args(&["z", "1", "2"])),
        Value::Array(vec![Value::bulk("b"), Value::bulk("c")])
    );
    assert_eq!(
        engine.dispatch("ZRANGE", &bulk_args(&["z", "-2", "-1"])),
        Value::Array(vec![Value::bulk("c"), Value::bulk("d")])
    );
}

#[test]
fn test_zrange_invalid_range_is_an_error() {
    let (engine, _dir) = test_engine();
    engine.dispatch("ZADD", &bulk_args(&["z", "1", "a", "2", "b", "3", "c", "4", "d"]));
    assert!(engine.dispatch("ZRANGE", &bulk_args(&["z", "2", "1"])).is_error());
}

#[test]
fn test_zrange_absent_key_is_empty_array() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        engine.dispatch("ZRANGE", &bulk_args(&["nope", "0", "-1"])),
        Value::Array(Vec::new())
    );
}

// =============================================================================
// Arity and Unknown Commands
// =============================================================================

#[test]
fn test_wrong_arity_is_an_error_with_zero_mutation() {
    let (engine, _dir) = test_engine();

    assert!(engine.dispatch("SET", &bulk_args(&["only-key"])).is_error());
    assert!(engine.dispatch("GET", &bulk_args(&["a", "b"])).is_error());
    assert!(engine.dispatch("HSET", &bulk_args(&["h", "f"])).is_error());
    assert!(engine.dispatch("DEL", &[]).is_error());
    assert!(engine.dispatch("ZADD", &bulk_args(&["z", "1"])).is_error());
    assert!(engine.dispatch("ZADD", &bulk_args(&["z", "1", "a", "2"])).is_error());
    assert!(engine.dispatch("ZRANGE", &bulk_args(&["z", "0"])).is_error());
    assert!(engine.dispatch("SAVE", &bulk_args(&["x"])).is_error());

    assert_eq!(engine.dispatch("GET", &bulk_args(&["only-key"])), Value::Null);
    assert_eq!(engine.dispatch("ZCARD", &bulk_args(&["z"])), Value::Integer(0));
}

#[test]
fn test_unknown_command_is_an_error_not_a_crash() {
    let (engine, _dir) = test_engine();
    assert!(engine.dispatch("FLUSHALL", &[]).is_error());
    // The engine still serves afterwards
    assert_eq!(engine.dispatch("PING", &[]), Value::Simple("PONG".to_string()));
}

// =============================================================================
// Frame-level Dispatch
// =============================================================================

#[test]
fn test_execute_frame_uppercases_command_name() {
    let (engine, _dir) = test_engine();
    assert_eq!(engine.execute_frame(frame(&["set", "k", "v"])), Value::ok());
    assert_eq!(engine.execute_frame(frame(&["GeT", "k"])), Value::bulk("v"));
}

#[test]
fn test_execute_frame_rejects_non_array_requests() {
    let (engine, _dir) = test_engine();
    assert!(engine.execute_frame(Value::bulk("PING")).is_error());
    assert!(engine.execute_frame(Value::Array(Vec::new())).is_error());
    assert!(engine
        .execute_frame(Value::Array(vec![Value::Integer(1)]))
        .is_error());
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_get_sees_pre_or_post_value_never_garbage() {
    let (engine, _dir) = test_engine();
    let engine = Arc::new(engine);
    engine.dispatch("SET", &bulk_args(&["k", "before"]));

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..1000 {
                engine.dispatch("SET", &bulk_args(&["k", "after"]));
                engine.dispatch("SET", &bulk_args(&["k", "before"]));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..1000 {
                    match engine.dispatch("GET", &bulk_args(&["k"])) {
                        Value::Bulk(v) => assert!(v == "before" || v == "after"),
                        other => panic!("unexpected reply: {:?}", other),
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_concurrent_zadd_keeps_one_node_per_member() {
    let (engine, _dir) = test_engine();
    let engine = Arc::new(engine);

    let writers: Vec<_> = (0..4i64)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..250i64 {
                    let score = (t * 1000 + i).to_string();
                    engine.dispatch("ZADD", &bulk_args(&["z", &score, "shared"]));
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(engine.dispatch("ZCARD", &bulk_args(&["z"])), Value::Integer(1));
}
