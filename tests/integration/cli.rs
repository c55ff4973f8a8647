use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pubmon(registry: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pubmon"))
        .arg("--registry")
        .arg(registry)
        .args(args)
        .env_remove("PUBMON_REGISTRY")
        .output()
        .expect("run pubmon")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_add_registry_remove() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("publishers.json");

    let out = pubmon(
        &registry,
        &["add", "chassis", "5555", "--host", "10.0.0.7", "--desc", "main"],
    );
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Added publisher 'chassis' -> 10.0.0.7:5555\n");

    let out = pubmon(&registry, &["registry"]);
    assert!(out.status.success());
    let listing = stdout(&out);
    assert!(listing.starts_with("Name "), "{}", listing);
    assert!(listing.contains("chassis              5555     10.0.0.7        main"));

    let out = pubmon(&registry, &["remove", "chassis"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Removed publisher 'chassis'\n");

    let out = pubmon(&registry, &["registry"]);
    assert_eq!(stdout(&out), "No registered publishers.\n");
}

#[test]
fn test_remove_absent_name() {
    let dir = TempDir::new().unwrap();
    let out = pubmon(&dir.path().join("publishers.json"), &["remove", "ghost"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "Publisher 'ghost' not found\n");
}

#[test]
fn test_monitor_unknown_name_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let out = pubmon(&dir.path().join("publishers.json"), &["monitor", "ghost"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        stdout(&out),
        "Publisher 'ghost' not found in database\n\
         Use 'list' to see registered publishers or 'add' to register a new one\n"
    );
}

#[test]
fn test_no_subcommand_prints_help() {
    let dir = TempDir::new().unwrap();
    let out = pubmon(&dir.path().join("publishers.json"), &[]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("Usage"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let dir = TempDir::new().unwrap();
    let out = pubmon(
        &dir.path().join("publishers.json"),
        &["list", "--timeout-ms", "0"],
    );
    assert!(!out.status.success());
}
