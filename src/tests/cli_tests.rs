// Tests for command-line parsing and one-shot runs
use clap::error::ErrorKind;
use clap::Parser;
use std::path::Path;

use crate::cli::Cli;

#[test]
fn test_no_arguments_means_interactive() {
    let cli = Cli::try_parse_from(["vagrant-tray"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.id.is_none());
    assert!(cli.config.is_none());
}

#[test]
fn test_command_and_id() {
    let cli = Cli::try_parse_from(["vagrant-tray", "up", "1a2b3c4"]).unwrap();
    assert_eq!(cli.command.as_deref(), Some("up"));
    assert_eq!(cli.id.as_deref(), Some("1a2b3c4"));
}

#[test]
fn test_command_without_id_is_a_usage_error() {
    let err = Cli::try_parse_from(["vagrant-tray", "up"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_extra_argument_is_a_usage_error() {
    let err = Cli::try_parse_from(["vagrant-tray", "up", "1a2b3c4", "extra"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

#[test]
fn test_help_is_generated() {
    let err = Cli::try_parse_from(["vagrant-tray", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    let help = err.to_string();
    assert!(help.contains("[COMMAND]"));
    assert!(help.contains("--config"));
}

#[test]
fn test_config_path() {
    let cli = Cli::try_parse_from(["vagrant-tray", "--config", "/tmp/tray.json"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/tray.json")));
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use tempfile::TempDir;

    use crate::cli::run_once;
    use crate::config::ManagerConfig;
    use crate::process::Elevation;

    use super::super::test_helpers::fake_vagrant;

    fn config_for(dir: &TempDir) -> ManagerConfig {
        let log = dir.path().join("calls.log");
        let bin = fake_vagrant(
            dir.path(),
            &format!("echo \"$@\" >> '{}'; exit 3", log.display()),
        );
        ManagerConfig {
            vagrant_bin: bin,
            elevation: Elevation::Never,
            ..ManagerConfig::default()
        }
    }

    #[test]
    fn test_run_once_runs_only_the_command() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);

        let status = run_once(&config, "halt", "1a2b3c4").unwrap();
        assert_eq!(status.code, Some(3));

        // No global-status query follows a one-shot command
        let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
        assert_eq!(calls, "halt 1a2b3c4\n");
    }

    #[test]
    fn test_run_once_rejects_unknown_command() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);

        let err = run_once(&config, "destroy", "1a2b3c4").unwrap_err();
        assert!(err.is_rejected());
        assert!(!dir.path().join("calls.log").exists());
    }
}
