/// Integration tests for the reftable shell, driving the binary over stdin.
use std::io::Write;
use std::process::{Command, Stdio};

fn run_cli_with_env(env: &[(&str, &str)], commands: &str) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_reftable-cli"))
        .envs(env.iter().copied())
        .env("REFTABLE_LOG", "error")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin
            .write_all(commands.as_bytes())
            .expect("Failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("Failed to write EXIT");
    }

    let output = child.wait_with_output().expect("Failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn run_cli(commands: &str) -> String {
    run_cli_with_env(&[], commands)
}

fn oid(b: char) -> String {
    b.to_string().repeat(40)
}

#[test]
fn test_banner_and_exit() {
    let output = run_cli("");
    assert!(output.contains("reftable shell (hash_size=20, index_objects=true)"));
    assert!(output.contains("bye"));
}

#[test]
fn test_set_commit_get() {
    let commands = format!(
        "BEGIN 1 1\nSET refs/heads/main {}\nCOMMIT\nGET refs/heads/main\nGET refs/heads/none\n",
        oid('1')
    );
    let output = run_cli(&commands);

    assert!(output.contains("OK (tables=1, update_index=1..1)"));
    assert!(output.contains(&format!("refs/heads/main -> {}", oid('1'))));
    assert!(output.contains("(nil)"));
}

#[test]
fn test_newer_table_shadows_older() {
    let commands = format!(
        "BEGIN 1 1\nSET a {x}\nCOMMIT\nBEGIN 2 2\nSET a {y}\nSET b {x}\nCOMMIT\nSEEK\n",
        x = oid('a'),
        y = oid('b')
    );
    let output = run_cli(&commands);

    assert!(output.contains(&format!("a -> {}", oid('b'))));
    assert!(output.contains(&format!("b -> {}", oid('a'))));
    assert!(!output.contains(&format!("a -> {}", oid('a'))));
    assert!(output.contains("(2 refs)"));
}

#[test]
fn test_refs_skips_shadowed_refs() {
    let commands = format!(
        "BEGIN 1 1\nSET a {x}\nCOMMIT\nBEGIN 2 2\nSET a {y}\nSET b {x}\nCOMMIT\nREFS {x}\n",
        x = oid('a'),
        y = oid('b')
    );
    let output = run_cli(&commands);

    let listed: Vec<&str> = output
        .lines()
        .map(|l| l.trim_start_matches("> "))
        .filter(|l| *l == "a" || *l == "b")
        .collect();
    assert_eq!(listed, ["b"]);
    assert!(output.contains("(1 refs)"));
}

#[test]
fn test_delete_hides_ref() {
    let commands = format!(
        "BEGIN 1 1\nSET a {x}\nCOMMIT\nBEGIN 2 2\nDEL a\nCOMMIT\nGET a\nSEEK\n",
        x = oid('c')
    );
    let output = run_cli(&commands);

    assert!(output.contains("(nil)"));
    assert!(output.contains("(empty)"));
}

#[test]
fn test_overlapping_table_is_rejected() {
    let commands = format!(
        "BEGIN 0 10\nSET a {x}\nCOMMIT\nBEGIN 5 15\nSET b {x}\nCOMMIT\nSTACK\n",
        x = oid('d')
    );
    let output = run_cli(&commands);

    assert!(output.contains(
        "ERR commit failed: table 1 has min 5, table 0 has max 10; indices must be increasing"
    ));
    assert!(output.contains("(1 tables, update_index=0..10)"));
}

#[test]
fn test_symref_and_log() {
    let commands = format!(
        "BEGIN 1 1\nSET refs/heads/main {x}\nSYMREF HEAD refs/heads/main\nCOMMIT\n\
         BEGIN 2 2\nSET refs/heads/main {y}\nCOMMIT\nGET HEAD\nLOG refs/heads/main\n",
        x = oid('e'),
        y = oid('f')
    );
    let output = run_cli(&commands);

    assert!(output.contains(&format!("HEAD -> ref: refs/heads/main ({})", oid('e'))));
    assert!(output.contains(&format!("2 {} -> {} set", oid('e'), oid('f'))));
    assert!(output.contains(&format!("1 - -> {} set", oid('e'))));
}

#[test]
fn test_name_conflict_is_rejected() {
    let commands = format!(
        "BEGIN 1 1\nSET refs/heads/a {x}\nCOMMIT\nBEGIN 2 2\nSET refs/heads/a/b {x}\nCOMMIT\n",
        x = oid('1')
    );
    let output = run_cli(&commands);

    assert!(output.contains("ERR commit failed: ref name \"refs/heads/a/b\" conflicts with \"refs/heads/a\""));
}

#[test]
fn test_usage_errors() {
    let output = run_cli("SET a\nBEGIN 1\nBEGIN x y\nSET a 00\nCOMMIT\nFROB\n");

    assert!(output.contains("ERR usage: SET name oid"));
    assert!(output.contains("ERR usage: BEGIN min max"));
    assert!(output.contains("ERR update indices must be integers"));
    assert!(output.contains("ERR set failed: no open table"));
    assert!(output.contains("ERR commit failed: no open table"));
    assert!(output.contains("unknown command: FROB"));
}

#[test]
fn test_sha256_hash_size() {
    let commands = format!(
        "BEGIN 1 1\nSET a {short}\nSET a {long}\nCOMMIT\nGET a\n",
        short = oid('1'),
        long = "2".repeat(64)
    );
    let output = run_cli_with_env(&[("REFTABLE_HASH_SIZE", "32")], &commands);

    assert!(output.contains("hash_size=32"));
    assert!(output.contains("ERR set failed: object id has 20 bytes, expected 32"));
    assert!(output.contains(&format!("a -> {}", "2".repeat(64))));
}

#[test]
fn test_refs_without_object_index() {
    let commands = format!(
        "BEGIN 1 1\nSET a {x}\nSET c {x}\nCOMMIT\nBEGIN 2 2\nSET a {y}\nCOMMIT\nREFS {x}\n",
        x = oid('7'),
        y = oid('8')
    );
    let output = run_cli_with_env(&[("REFTABLE_INDEX_OBJECTS", "false")], &commands);

    assert!(output.contains("index_objects=false"));
    assert!(output.contains("(1 refs)"));
}

#[test]
fn test_symref_to_deleted_ref_is_unpeeled() {
    let commands = format!(
        "BEGIN 1 1\nSET refs/heads/main {x}\nCOMMIT\n\
         BEGIN 2 2\nDEL refs/heads/main\nSYMREF HEAD refs/heads/main\nCOMMIT\nGET HEAD\nREFS {x}\n",
        x = oid('4')
    );
    let output = run_cli(&commands);

    assert!(output.contains("HEAD -> ref: refs/heads/main\n"));
    assert!(output.contains("(empty)"));
}
