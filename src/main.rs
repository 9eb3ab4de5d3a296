use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use vagrant_tray_lib::cli::{self, Cli};
use vagrant_tray_lib::{logging, LogAlertSink, ManagerConfig, VagrantManager};

fn main() -> ExitCode {
    let args = Cli::parse();
    let _ = logging::init();

    let config = match ManagerConfig::load_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match (args.command, args.id) {
        (Some(command), Some(id)) => run_once(&config, &command, &id),
        _ => run_interactive(&config),
    }
}

/// Run a single lifecycle command and exit with its exit code.
fn run_once(config: &ManagerConfig, command: &str, id: &str) -> ExitCode {
    match cli::run_once(config, command, id) {
        Ok(status) => {
            let code = status.code.unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Keep the cache fresh in the background and answer line commands on stdin.
fn run_interactive(config: &ManagerConfig) -> ExitCode {
    let manager = Arc::new_cyclic(|weak: &std::sync::Weak<VagrantManager>| {
        let weak = weak.clone();
        let subscriber = move || {
            if let Some(manager) = weak.upgrade() {
                log::info!("Vagrant status changed: {} instance(s)", manager.list().len());
            }
        };
        VagrantManager::from_config(config, Arc::new(subscriber), Arc::new(LogAlertSink))
    });
    manager.start();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let reply = match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["list"] => {
                let mut ids = manager.list();
                ids.sort();
                ids.iter()
                    .map(|id| {
                        let status = manager.get_status(id);
                        format!(
                            "{}\t{}\t{}\t{}\t{}",
                            status.id, status.name, status.provider, status.state, status.cwd
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            ["status", id] => {
                let status = manager.get_status(id);
                serde_json::to_string(&status).unwrap_or_default()
            }
            ["refresh"] => format!("{:?}", manager.refresh()),
            [command, id] => match manager.run(command, id) {
                Ok(status) => format!("exit code {:?}", status.code),
                Err(err) => err.to_string(),
            },
            _ => "commands: list | status <id> | refresh | <up|halt|reload|suspend|resume> <id> | quit".to_string(),
        };
        if writeln!(stdout, "{}", reply).is_err() {
            break;
        }
    }

    manager.stop();
    ExitCode::SUCCESS
}
