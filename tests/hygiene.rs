//! Hygiene: enforces coding standards at test time
//!
//! These tests scan the slot engine's source tree for antipatterns that
//! violate project standards. Each budget is zero: layout passes must never
//! crash the host or drop an error on the floor.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

// Panics: these crash the process.
const MAX_UNWRAP: usize = 0;
const MAX_EXPECT: usize = 0;
const MAX_PANIC: usize = 0;
const MAX_UNREACHABLE: usize = 0;
const MAX_TODO: usize = 0;
const MAX_UNIMPLEMENTED: usize = 0;

// Silent loss: discards errors without inspecting.
const MAX_SILENT_DISCARD: usize = 0;
const MAX_DOT_OK: usize = 0;

// Output: the library reports through `tracing`, never stdout/stderr.
const MAX_PRINT: usize = 0;
const MAX_DBG: usize = 0;

// Style / structure.
const MAX_ALLOW_DEAD_CODE: usize = 0;

struct SourceFile {
    path: String,
    content: String,
}

/// Collect production `.rs` files from `src/`, excluding `*_test.rs` files.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            if name == "target" || name == "tests" {
                continue;
            }
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn count_in_source(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn total(hits: &[(String, usize)]) -> usize {
    hits.iter().map(|(_, c)| c).sum()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_budget(patterns: &[&str], max: usize, label: &str) {
    let files = source_files();
    let hits: Vec<(String, usize)> = patterns.iter().flat_map(|p| count_in_source(&files, p)).collect();
    let count = total(&hits);
    assert!(count <= max, "{label} budget exceeded: found {count}, max {max}.\n{}", format_hits(&hits));
}

#[test]
fn sources_are_found() {
    assert!(!source_files().is_empty(), "no production sources under src/");
}

#[test]
fn unwrap_budget() {
    assert_budget(&[".unwrap()"], MAX_UNWRAP, ".unwrap()");
}

#[test]
fn expect_budget() {
    assert_budget(&[".expect("], MAX_EXPECT, ".expect()");
}

#[test]
fn panic_budget() {
    assert_budget(&["panic!("], MAX_PANIC, "panic!()");
}

#[test]
fn unreachable_budget() {
    assert_budget(&["unreachable!("], MAX_UNREACHABLE, "unreachable!()");
}

#[test]
fn todo_budget() {
    assert_budget(&["todo!("], MAX_TODO, "todo!()");
}

#[test]
fn unimplemented_budget() {
    assert_budget(&["unimplemented!("], MAX_UNIMPLEMENTED, "unimplemented!()");
}

#[test]
fn silent_discard_budget() {
    assert_budget(&["let _ ="], MAX_SILENT_DISCARD, "let _ =");
}

#[test]
fn dot_ok_budget() {
    assert_budget(&[".ok()"], MAX_DOT_OK, ".ok()");
}

#[test]
fn print_budget() {
    assert_budget(&["println!(", "eprintln!("], MAX_PRINT, "println!/eprintln!");
}

#[test]
fn dbg_budget() {
    assert_budget(&["dbg!("], MAX_DBG, "dbg!()");
}

#[test]
fn allow_dead_code_budget() {
    assert_budget(&["#[allow(dead_code)]"], MAX_ALLOW_DEAD_CODE, "#[allow(dead_code)]");
}
