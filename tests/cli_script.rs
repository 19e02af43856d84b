//! Script-driven CLI tests.
//!
//! Each test runs the `questree` binary in a scratch directory with the
//! user config dir and language env var isolated, and parses the JSON lines
//! it prints.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn questree(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_questree"))
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("config-home"))
        .env_remove("QUESTREE_LANGUAGE")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run questree")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

fn write_script(dir: &Path, body: &str) -> String {
    let path = dir.join("script.qt");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_branch_link_and_breadcrumbs() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        r#"
# build a small decision tree
text "Do you like travel?"
answer-text 1 Yes
add-answer
answer-text 2 "Not really"
branch 1
text Where to?
back
link 2 existing-1
push existing-1
breadcrumbs
"#,
    );

    let output = questree(dir.path(), &["--yes", "run", &script]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|line| line["status"] == "ok"));

    let branch = &lines[4];
    assert_eq!(branch["command"], "branch");
    assert_eq!(branch["data"]["question"], "q-1");
    assert_eq!(branch["navigation"], serde_json::json!(["root", "q-1"]));

    let crumbs = &lines[9]["data"];
    assert_eq!(crumbs[0]["label"], "Main Question");
    assert_eq!(crumbs[1]["id"], "existing-1");
    assert_eq!(crumbs[1]["label"], "Not really");
    assert_eq!(crumbs[1]["is_last"], true);
}

#[test]
fn test_failure_stops_script_with_exit_code() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "remove-answer 1\ntext unreachable\n");

    let output = questree(dir.path(), &["run", &script]);
    assert_eq!(output.status.code(), Some(4));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "error");
    assert_eq!(lines[0]["error"]["kind"], "invalid-mutation");
}

#[test]
fn test_delete_without_tty_or_yes_is_refused() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "branch 1\ndelete q-1\n");

    let output = questree(dir.path(), &["run", &script]);
    assert_eq!(output.status.code(), Some(5));
    let lines = json_lines(&output);
    assert_eq!(lines[1]["error"]["kind"], "interaction");
}

#[test]
fn test_type_collapse_flow() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "branch 1\nhome\ntype multiple-choice\nconfirm\nshow\nexport\n",
    );

    let output = questree(dir.path(), &["run", &script]);
    assert!(output.status.success());
    let lines = json_lines(&output);

    assert_eq!(lines[2]["data"]["outcome"], "awaiting-confirmation");
    assert_eq!(lines[3]["data"]["declared_type"], "multiple-choice");
    assert_eq!(lines[4]["data"]["branch_count"], 0);
    // The orphaned child is still in the store.
    assert!(lines[5]["data"]["q-1"].is_object());
}

#[test]
fn test_config_precedence() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("questree.toml");
    fs::write(&config, "[editor]\ndefault_language = \"is\"\n").unwrap();
    let config = config.to_string_lossy().into_owned();

    let output = questree(dir.path(), &["--config", &config, "config"]);
    let lines = json_lines(&output);
    assert_eq!(lines[0]["data"]["language"]["value"], "is");
    assert_eq!(lines[0]["data"]["language"]["source"], "config-file");

    let output = questree(dir.path(), &["--config", &config, "--language", "fr", "config"]);
    let lines = json_lines(&output);
    assert_eq!(lines[0]["data"]["language"]["value"], "fr");
    assert_eq!(lines[0]["data"]["language"]["source"], "cli-flag");
}

#[test]
fn test_catalog_search_from_file() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.json");
    fs::write(
        &catalog,
        r#"{
  "planets-1": {
    "id": "planets-1",
    "text": {"en": "Which planet is largest?"},
    "category": "Science",
    "tags": ["space"],
    "answers": [{"id": 1, "text": {"en": "Jupiter"}, "correctness": "correct"}]
  }
}"#,
    )
    .unwrap();
    let catalog = catalog.to_string_lossy().into_owned();

    let output = questree(dir.path(), &["--catalog", &catalog, "catalog", "search", "SPACE"]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines[0]["data"][0]["id"], "planets-1");
    assert_eq!(lines[0]["data"][0]["category"], "Science");
}

#[test]
fn test_add_answer_after_maximum_order_is_refused() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "order 1 9223372036854775807\nadd-answer\n");

    let output = questree(dir.path(), &["run", &script]);
    assert_eq!(output.status.code(), Some(4));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["status"], "ok");
    assert_eq!(lines[1]["command"], "add-answer");
    assert_eq!(lines[1]["error"]["kind"], "invalid-mutation");
}
