//! CLI integration tests.
//!
//! These tests run the `archpatch` binary against fixture archives.

#![cfg(feature = "cli")]

use std::fs;
use std::process::{Command, Output};

mod common;

use common::{Workspace, file_names, read_tree};

fn archpatch(ws: &Workspace, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_archpatch"))
        .current_dir(ws.root())
        .args(args)
        .output()
        .expect("Failed to run archpatch")
}

#[test]
fn test_patch_with_flags() {
    let ws = Workspace::new();
    ws.zip("compiler-1.3.jar", &[("A", "a"), ("native/libjansi.so", "old")]);
    ws.zip("jansi-2.4.jar", &[("native/libjansi.so", "new"), ("B", "b")]);
    ws.file("extra.txt", "extra");

    let output = archpatch(
        &ws,
        &[
            "--quiet",
            "patch",
            "--base-prefix",
            "compiler-",
            "--candidate",
            "compiler-1.3.jar",
            "--candidate",
            "jansi-2.4.jar",
            "--secondary",
            "jansi-2.4.jar",
            "--include",
            "jansi-=native/**",
            "--add",
            "extra.txt=docs/extra.txt",
            "--output",
            "out",
        ],
    );

    assert!(output.status.success(), "{:?}", output);
    let tree = read_tree(&ws.path("out"));
    assert_eq!(tree["native/libjansi.so"], b"new");
    assert_eq!(tree["docs/extra.txt"], b"extra");
    assert!(!tree.contains_key("B"));
}

#[test]
fn test_patch_with_config_resolves_relative_paths() {
    let ws = Workspace::new();
    ws.zip("project/libs/base.jar", &[("A", "a"), ("drop/me.txt", "x")]);
    ws.file("project/patches/A", "patched");
    ws.file(
        "project/patch.json",
        r#"{
            "base_archive": "libs/base.jar",
            "excludes": ["drop/**"],
            "additional_files": [{ "source": "patches/A", "dest": "A" }],
            "output_dir": "build/out"
        }"#,
    );

    let output = archpatch(&ws, &["--format", "json", "patch", "--config", "project/patch.json"]);

    assert!(output.status.success(), "{:?}", output);
    let out = ws.path("project/build/out");
    assert_eq!(file_names(&out), ["A"]);
    assert_eq!(fs::read(out.join("A")).unwrap(), b"patched");

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["base_entries_excluded"], 1);
    assert_eq!(summary["loose_files_copied"], 1);
}

#[test]
fn test_patch_missing_base_exit_code() {
    let ws = Workspace::new();
    ws.file("out/keep.txt", "keep");

    let output = archpatch(&ws, &["patch", "--base", "missing.jar", "--output", "out"]);

    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.jar"));
    assert!(ws.path("out/keep.txt").exists());
}

#[test]
fn test_patch_without_output_is_bad_args() {
    let ws = Workspace::new();
    ws.zip("base.jar", &[("A", "a")]);

    let output = archpatch(&ws, &["patch", "--base", "base.jar"]);

    assert_eq!(output.status.code(), Some(255));
}

#[test]
fn test_clean_command() {
    let ws = Workspace::new();
    ws.file("build/out/x.txt", "x");

    let output = archpatch(&ws, &["--format", "json", "clean", "build/out"]);

    assert!(output.status.success(), "{:?}", output);
    assert!(!ws.path("build/out").exists());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["deleted"][0], "build/out");
}
