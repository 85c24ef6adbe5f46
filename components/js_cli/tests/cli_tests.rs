//! CLI argument parsing tests
//!
//! Tests for verifying clap argument parsing works correctly

use clap::Parser as ClapParser;
use js_cli::Cli;
use std::path::PathBuf;
use std::time::Duration;

/// No arguments means an interactive session with default configuration
#[test]
fn cli_parse_no_args() {
    let cli = Cli::try_parse_from(["sandbox-repl"]).unwrap();

    assert!(cli.is_interactive());
    assert_eq!(cli.recover, None);
    assert_eq!(cli.verbose, 0);
    assert_eq!(cli.session_config(), orchestrator::SessionConfig::default());
}

#[test]
fn cli_parse_eval() {
    let cli = Cli::try_parse_from(["sandbox-repl", "-e", "1 + 1"]).unwrap();

    assert_eq!(cli.eval.as_deref(), Some("1 + 1"));
    assert!(!cli.is_interactive());
}

#[test]
fn cli_parse_file_and_history() {
    let cli = Cli::try_parse_from([
        "sandbox-repl",
        "--file",
        "script.ts",
        "--recover",
        "saved.json",
        "--save",
        "out.json",
    ])
    .unwrap();

    assert_eq!(cli.file, Some(PathBuf::from("script.ts")));
    assert_eq!(cli.recover, Some(PathBuf::from("saved.json")));
    assert_eq!(cli.save, Some(PathBuf::from("out.json")));
}

/// --eval and --file are alternatives
#[test]
fn cli_eval_conflicts_with_file() {
    assert!(Cli::try_parse_from(["sandbox-repl", "-e", "1", "-f", "a.js"]).is_err());
}

#[test]
fn cli_verbose_counts() {
    let cli = Cli::try_parse_from(["sandbox-repl", "-vv"]).unwrap();
    assert_eq!(cli.verbose, 2);
}

#[test]
fn cli_config_overrides() {
    let cli = Cli::try_parse_from([
        "sandbox-repl",
        "--no-probe",
        "--cdn-host",
        "cdn.example",
        "--mirror-host",
        "mirror.example",
        "--grace-ms",
        "250",
        "--inspect-depth",
        "5",
    ])
    .unwrap();

    let config = cli.session_config();

    assert!(!config.cdn.probe);
    assert_eq!(config.cdn.primary_host, "cdn.example");
    assert_eq!(config.cdn.mirror_host, "mirror.example");
    assert_eq!(config.grace_period, Duration::from_millis(250));
    assert_eq!(config.inspect_depth, 5);
}

#[test]
fn cli_rejects_bad_numbers() {
    assert!(Cli::try_parse_from(["sandbox-repl", "--grace-ms", "soon"]).is_err());
}
