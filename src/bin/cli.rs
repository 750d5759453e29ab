//! NimbusKV CLI Client
//!
//! Interactive client: each input line becomes an array-of-bulks request
//! frame; the decoded reply is printed.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;

use clap::Parser;
use nimbuskv::protocol::{read_value, write_value, Value};

/// NimbusKV CLI
#[derive(Parser, Debug)]
#[command(name = "nimbuskv-cli")]
#[command(about = "Interactive client for NimbusKV")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    server: String,
}

fn main() {
    let args = Args::parse();

    let stream = match TcpStream::connect(&args.server) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };
    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(clone) => clone,
        Err(e) => {
            eprintln!("Failed to clone connection: {}", e);
            std::process::exit(1);
        }
    });
    let mut writer = BufWriter::new(stream);

    let stdin = io::stdin();
    print!("{}> ", args.server);
    let _ = io::stdout().flush();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            print!("{}> ", args.server);
            let _ = io::stdout().flush();
            continue;
        }
        if words[0].eq_ignore_ascii_case("quit") {
            break;
        }

        let frame = Value::Array(words.iter().map(|w| Value::bulk(*w)).collect());
        if let Err(e) = write_value(&mut writer, &frame) {
            eprintln!("Send failed: {}", e);
            break;
        }

        match read_value(&mut reader) {
            Ok(reply) => print_reply(&reply, 0),
            Err(e) => {
                eprintln!("Read failed: {}", e);
                break;
            }
        }

        print!("{}> ", args.server);
        let _ = io::stdout().flush();
    }
}

fn print_reply(reply: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match reply {
        Value::Simple(text) => println!("{}{}", indent, text),
        Value::Error(message) => println!("{}(error) {}", indent, message),
        Value::Integer(n) => println!("{}(integer) {}", indent, n),
        Value::Bulk(payload) => println!("{}\"{}\"", indent, payload),
        Value::Null => println!("{}(nil)", indent),
        Value::Array(items) => {
            if items.is_empty() {
                println!("{}(empty array)", indent);
            }
            for (i, item) in items.iter().enumerate() {
                print!("{}{}) ", indent, i + 1);
                print_reply(item, 0);
            }
        }
    }
}
