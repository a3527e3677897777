mod common;

use common::h2_mechanism;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    mechanism_path: PathBuf,
    build_dir: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mechanism_path = dir.path().join("mechanism.json");
        let build_dir = dir.path().join("out");
        h2_mechanism().save_to_file(&mechanism_path).unwrap();
        Self {
            dir,
            mechanism_path,
            build_dir,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        let mut final_args = vec![
            "--mechanism",
            self.mechanism_path.to_str().unwrap(),
            "--build-dir",
            self.build_dir.to_str().unwrap(),
        ];
        final_args.extend_from_slice(args);
        Command::new(env!("CARGO_BIN_EXE_mechorder"))
            .args(&final_args)
            .output()
            .expect("Failed to execute binary")
    }
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

const FAST: [&str; 8] = [
    "--threads",
    "2",
    "--search-epochs",
    "20",
    "--search-steps",
    "1000",
    "--seed",
    "42",
];

#[test]
fn test_cli_optimize_then_reuse_checkpoint() {
    let ctx = TestContext::new();

    let mut args = vec!["optimize"];
    args.extend_from_slice(&FAST);
    let first = ctx.run(&args);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout_of(&first).contains("Result: optimized"));
    assert!(ctx.build_dir.join("optimized.json").exists());

    let second = ctx.run(&args);
    assert!(second.status.success());
    assert!(stdout_of(&second).contains("Result: checkpoint"));

    args.push("--force-optimize");
    let forced = ctx.run(&args);
    assert!(stdout_of(&forced).contains("Result: optimized"));
}

#[test]
fn test_cli_without_solver_keeps_original() {
    let ctx = TestContext::new();
    let output = ctx.run(&["optimize", "--no-solver"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Result: original ordering"));
    assert!(!ctx.build_dir.join("optimized.json").exists());
}

#[test]
fn test_cli_export_writes_csv() {
    let ctx = TestContext::new();
    let export = ctx.dir.path().join("orders.csv");

    let mut args = vec!["optimize", "--export", export.to_str().unwrap()];
    args.extend_from_slice(&FAST);
    let output = ctx.run(&args);
    assert!(output.status.success());

    let content = fs::read_to_string(&export).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("kind,position,original,name"));

    let mech = h2_mechanism();
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), mech.species.len() + mech.reactions.len());
    assert_eq!(rows.iter().filter(|r| r.starts_with("species,")).count(), 8);
    assert_eq!(rows.iter().filter(|r| r.starts_with("reaction,")).count(), 7);
}

#[test]
fn test_cli_score_reports_identity_cost() {
    let ctx = TestContext::new();
    let output = ctx.run(&["score", "--reaction-order", "6,5,4,3,2,1,0"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    let re = Regex::new(r"reaction identity cost: (\d+)").unwrap();
    let caps = re.captures(&stdout).expect("missing reaction cost line");
    let cost: usize = caps[1].parse().unwrap();
    assert!(cost > 0);
    assert!(Regex::new(r"species identity cost: \d+").unwrap().is_match(&stdout));
}

#[test]
fn test_cli_score_rejects_bad_order() {
    let ctx = TestContext::new();
    let output = ctx.run(&["score", "--reaction-order", "0,0,1,2,3,4,5"]);
    assert!(!output.status.success());

    let output = ctx.run(&["score", "--species-order", "1,0"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_missing_mechanism_fails() {
    let ctx = TestContext::new();
    let output = Command::new(env!("CARGO_BIN_EXE_mechorder"))
        .args([
            "--mechanism",
            ctx.dir.path().join("nope.json").to_str().unwrap(),
            "score",
        ])
        .output()
        .expect("Failed to execute binary");
    assert!(!output.status.success());
}
