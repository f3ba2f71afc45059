// tests/cli.rs

//! Command-line behavior that is decided before any sandbox is built.

use std::process::{Command, Output};

fn pkgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pkgen"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_invalid_recipe_name_is_usage_error() {
    // app/../escape exists and is executable, the name is still refused
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app");
    std::fs::create_dir(&app).unwrap();
    std::fs::write(dir.path().join("escape"), "#!/bin/sh\nexit 0\n").unwrap();

    let app = app.to_str().unwrap();
    let out = pkgen(&["-a", app, "-d", app, "-t", app, "../escape"]);

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Invalid recipe name ../escape"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn test_hidden_recipe_rejected() {
    let out = pkgen(&["-a", "/a", "-d", "/d", "-t", "/t", "build", ".hidden"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains(".hidden"));
}

#[test]
fn test_missing_data_directory() {
    let out = pkgen(&["-a", "/a", "-t", "/t", "build"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn test_missing_recipes() {
    let out = pkgen(&["-a", "/a", "-d", "/d", "-t", "/t"]);
    assert_eq!(out.status.code(), Some(2));
}
