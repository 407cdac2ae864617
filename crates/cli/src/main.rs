//! # CLI - interactive reftable stack shell
//!
//! A REPL over an in-memory stack of reftables. Tables are assembled with
//! `BEGIN ... COMMIT` and pushed on top of the stack; reads go through the
//! merged view, so newer tables shadow older ones. Reads commands from stdin
//! and prints results to stdout, which makes it scriptable (pipe commands in).
//!
//! ## Commands
//!
//! ```text
//! BEGIN min max        Start a pending table covering update indices [min, max]
//! SET name oid         Add a ref (hex oid) to the pending table
//! SYMREF name target   Add a symbolic ref, peeled to the target's current oid
//! DEL name             Add a deletion to the pending table
//! COMMIT               Validate the pending table and push it onto the stack
//! GET name             Read one ref through the stack (prints "(nil)" if absent)
//! SEEK [name]          List live refs from name onwards
//! REFS oid             List refs whose value or peeled target is oid
//! LOG name             Show the reflog of name, newest first
//! STACK                Print the stack layout
//! EXIT / QUIT          Leave
//! ```
//!
//! ## Configuration
//!
//! ```text
//! REFTABLE_HASH_SIZE      object id length, 20 or 32  (default: 20)
//! REFTABLE_INDEX_OBJECTS  oid -> ref index per table  (default: true)
//! REFTABLE_LOG            log level for stderr        (default: info)
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! reftable shell (hash_size=20, index_objects=true)
//! > BEGIN 1 1
//! OK
//! > SET refs/heads/main 1111111111111111111111111111111111111111
//! OK
//! > COMMIT
//! OK (tables=1, update_index=1..1)
//! > GET refs/heads/main
//! refs/heads/main -> 1111111111111111111111111111111111111111
//! ```

mod shell;

use anyhow::Result;
use config::Config;
use shell::{format_ref, Shell};
use std::io::{self, BufRead, Write};
use table::Table;

fn main() -> Result<()> {
    let cfg = Config::from_env();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(cfg.log_level)
        .init();

    let mut shell = Shell::new(&cfg)?;

    println!(
        "reftable shell (hash_size={}, index_objects={})",
        cfg.hash_size, cfg.index_objects
    );
    println!("Commands: BEGIN min max | SET name oid | SYMREF name target | DEL name | COMMIT");
    println!("          GET name | SEEK [name] | REFS oid | LOG name | STACK | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            let args: Vec<&str> = parts.collect();
            match cmd.to_uppercase().as_str() {
                "BEGIN" => match args.as_slice() {
                    [min, max] => match (min.parse::<u64>(), max.parse::<u64>()) {
                        (Ok(min), Ok(max)) => match shell.begin(min, max) {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR begin failed: {:#}", e),
                        },
                        _ => println!("ERR update indices must be integers"),
                    },
                    _ => println!("ERR usage: BEGIN min max"),
                },
                "SET" => match args.as_slice() {
                    [name, oid] => match shell.set(name, oid) {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR set failed: {:#}", e),
                    },
                    _ => println!("ERR usage: SET name oid"),
                },
                "SYMREF" => match args.as_slice() {
                    [name, target] => match shell.symref(name, target) {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR symref failed: {:#}", e),
                    },
                    _ => println!("ERR usage: SYMREF name target"),
                },
                "DEL" => match args.as_slice() {
                    [name] => match shell.del(name) {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR del failed: {:#}", e),
                    },
                    _ => println!("ERR usage: DEL name"),
                },
                "COMMIT" => match shell.commit() {
                    Ok(()) => {
                        let stack = shell.stack();
                        println!(
                            "OK (tables={}, update_index={}..{})",
                            stack.len(),
                            stack.min_update_index(),
                            stack.max_update_index()
                        );
                    }
                    Err(e) => println!("ERR commit failed: {:#}", e),
                },
                "GET" => match args.as_slice() {
                    [name] => match shell.get(name) {
                        Ok(Some(r)) => println!("{}", format_ref(&r)),
                        Ok(None) => println!("(nil)"),
                        Err(e) => println!("ERR read failed: {:#}", e),
                    },
                    _ => println!("ERR usage: GET name"),
                },
                "SEEK" => {
                    let start = args.first().copied().unwrap_or("");
                    match shell.seek(start) {
                        Ok(refs) if refs.is_empty() => println!("(empty)"),
                        Ok(refs) => {
                            for r in &refs {
                                println!("{}", format_ref(r));
                            }
                            println!("({} refs)", refs.len());
                        }
                        Err(e) => println!("ERR seek failed: {:#}", e),
                    }
                }
                "REFS" => match args.as_slice() {
                    [oid] => match shell.refs(oid) {
                        Ok(refs) if refs.is_empty() => println!("(empty)"),
                        Ok(refs) => {
                            for r in &refs {
                                println!("{}", r.ref_name);
                            }
                            println!("({} refs)", refs.len());
                        }
                        Err(e) => println!("ERR refs failed: {:#}", e),
                    },
                    _ => println!("ERR usage: REFS oid"),
                },
                "LOG" => match args.as_slice() {
                    [name] => match shell.log(name) {
                        Ok(logs) if logs.is_empty() => println!("(empty)"),
                        Ok(logs) => {
                            for l in &logs {
                                println!(
                                    "{} {} -> {} {}",
                                    l.update_index,
                                    l.old_hash.as_deref().map_or("-".into(), hex::encode),
                                    l.new_hash.as_deref().map_or("-".into(), hex::encode),
                                    l.message
                                );
                            }
                        }
                        Err(e) => println!("ERR log failed: {:#}", e),
                    },
                    _ => println!("ERR usage: LOG name"),
                },
                "STACK" => {
                    let stack = shell.stack();
                    for (i, t) in stack.tables().iter().enumerate() {
                        println!(
                            "[{}] update_index={}..{}",
                            i,
                            t.min_update_index(),
                            t.max_update_index()
                        );
                    }
                    println!(
                        "({} tables, update_index={}..{})",
                        stack.len(),
                        stack.min_update_index(),
                        stack.max_update_index()
                    );
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
