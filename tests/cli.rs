use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Command with HOME pointed at a scratch dir so no user config leaks in.
fn kwsearch(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kwsearch"));
    cmd.env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("KWSEARCH_SNIPPET_RADIUS")
        .env_remove("KWSEARCH_MAX_FILE_SIZE");
    cmd
}

fn rpc(id: i64, method: &str, params: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string()
}

#[test]
fn mcp_session_over_stdio() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("notes.txt");
    write_file(&file, "first line\nthe Needle is here\n\nneedle needle\n");
    let path = file.to_str().unwrap();

    let input = [
        rpc(1, "initialize", json!({ "protocolVersion": "2024-11-05" })),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        rpc(2, "tools/list", json!({})),
        rpc(
            3,
            "tools/call",
            json!({ "name": "search_file", "arguments": { "keyword": "needle", "path": path } }),
        ),
        rpc(4, "resources/read", json!({ "uri": format!("file://{}", path) })),
    ]
    .join("\n");

    let assert = kwsearch(&temp)
        .arg("-vvv")
        .arg("mcp-server")
        .write_stdin(input + "\n")
        .assert()
        .success();

    let responses = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(
        responses[0]["result"]["serverInfo"]["name"],
        "keyword_search_mcp"
    );

    assert_eq!(responses[1]["result"]["tools"][0]["name"], "search_file");

    let result = &responses[2]["result"]["structuredContent"];
    assert_eq!(result["file"], path);
    assert_eq!(result["keyword"], "needle");
    assert_eq!(result["total_occurrences"], 3);
    let positions: Vec<(u64, u64, u64)> = result["occurrences"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| {
            (
                o["line_number"].as_u64().unwrap(),
                o["start"].as_u64().unwrap(),
                o["end"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(positions, vec![(2, 4, 10), (4, 0, 6), (4, 7, 13)]);

    assert_eq!(
        responses[3]["result"]["contents"][0]["text"],
        "first line\nthe Needle is here\n\nneedle needle\n"
    );
}

#[test]
fn search_json_output() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("data.txt");
    write_file(&file, "aaaa\naxb a.b\n");

    let assert = kwsearch(&temp)
        .arg("search")
        .arg("a.b")
        .arg(&file)
        .arg("--json")
        .assert()
        .success();

    let result: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(result["total_occurrences"], 1);
    assert_eq!(result["occurrences"][0]["line_number"], 2);
    assert_eq!(result["occurrences"][0]["start"], 4);
    assert_eq!(result["occurrences"][0]["end"], 7);
    assert_eq!(result["occurrences"][0]["snippet"], "axb a.b");
}

#[test]
fn search_case_sensitive_flag() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("greeting.txt");
    write_file(&file, "hello world\n");

    let assert = kwsearch(&temp)
        .args(["search", "Hello"])
        .arg(&file)
        .args(["--case-sensitive", "--json"])
        .assert()
        .success();
    let result: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(result["total_occurrences"], 0);
    assert_eq!(result["occurrences"], json!([]));
}

#[test]
fn search_missing_file_fails() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing.txt");

    kwsearch(&temp)
        .arg("search")
        .arg("x")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found:"))
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn search_blank_keyword_fails() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("data.txt");
    write_file(&file, "content\n");

    kwsearch(&temp)
        .arg("search")
        .arg("   ")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Keyword cannot be empty or whitespace only.",
        ));
}

#[test]
fn read_prints_file_contents() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("doc.txt");
    write_file(&file, "alpha\r\nbeta\rgamma\n");

    kwsearch(&temp)
        .arg("read")
        .arg(&file)
        .assert()
        .success()
        .stdout("alpha\nbeta\ngamma\n");
}

#[test]
fn configured_snippet_radius_is_used() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("data.txt");
    write_file(&file, "0123456789KEY9876543210\n");

    kwsearch(&temp)
        .args(["config", "--snippet-radius", "3"])
        .assert()
        .success();
    assert!(temp.path().join(".kwsearch/config.json").exists());

    let assert = kwsearch(&temp)
        .args(["search", "key"])
        .arg(&file)
        .arg("--json")
        .assert()
        .success();
    let result: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(result["occurrences"][0]["snippet"], "789KEY987");
}

#[test]
fn max_file_size_rejects_large_files() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("big.txt");
    write_file(&file, &"x".repeat(100));

    kwsearch(&temp)
        .arg("read")
        .arg(&file)
        .env("KWSEARCH_MAX_FILE_SIZE", "10")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File too large"));
}

#[test]
fn zero_max_file_size_means_unlimited() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("big.txt");
    write_file(&file, &"x".repeat(100));

    kwsearch(&temp)
        .arg("read")
        .arg(&file)
        .env("KWSEARCH_MAX_FILE_SIZE", "0")
        .assert()
        .success()
        .stdout(predicate::str::diff("x".repeat(100)));
}

#[test]
fn malformed_input_gets_parse_error() {
    let temp = tempdir().unwrap();

    let assert = kwsearch(&temp)
        .arg("mcp-server")
        .write_stdin("this is not json\n")
        .assert()
        .success();

    let responses = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert!(responses[0]["id"].is_null());
}
