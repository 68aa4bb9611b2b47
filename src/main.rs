/*
 * Copyright (c):
 * 2026 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-crane.
 *
 * setup-crane is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-crane is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-crane. If not, see <https://www.gnu.org/licenses/>.
 */

mod deploy;
mod echo_server;
mod settings;

use std::env;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use assetto_corsa::setup::{export_setups, verify_export, ExportOutcome};
use crate::deploy::cargo_build::CargoReleaseBuilder;
use crate::deploy::remote::OpenSshHost;
use crate::deploy::version::read_version;
use crate::echo_server::EchoServer;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "setup-crane", version, about = "Publishes setups and updates for the AVN PRO engineer")]
struct Cli {
    /// Settings file to use instead of setup-crane-conf.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the json setup database from the setups directory
    Export {
        #[arg(long)]
        setups_dir: Option<String>,
        #[arg(long)]
        export_dir: Option<String>
    },
    /// Check that an exported manifest matches its car documents
    Check {
        #[arg(long)]
        export_dir: Option<String>
    },
    /// Upload the current release build and version.json
    Deploy {
        /// Release notes, prompted for when omitted
        #[arg(long)]
        notes: Option<String>,
        /// Don't rewrite the nginx site for the update directory
        #[arg(long)]
        skip_web_server: bool
    },
    /// Build, export setups and deploy
    Release {
        #[arg(long)]
        notes: Option<String>,
        /// Also rewrite the nginx site for the update directory
        #[arg(long)]
        configure_web_server: bool
    },
    /// Run the connectivity test server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>
    },
    /// Write the default settings to a file
    InitConfig {
        #[arg(default_value = "setup-crane-conf.toml")]
        path: PathBuf
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    match env::current_dir() {
        Ok(current_dir) => {
            let file_appender = tracing_appender::rolling::never(current_dir, "setup_crane.log");
            let subscriber = tracing_subscriber::fmt()
                .with_writer(std::io::stdout.and(file_appender))
                .with_max_level(level)
                .with_ansi(false)
                .compact()
                .finish();
            match tracing::subscriber::set_global_default(subscriber) {
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Failed to init logging. {}", e.to_string());
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to init logging. Couldn't determine current dir {}", e.to_string());
        }
    }
}

/// Ask for release notes on an interactive terminal, an empty answer means the default
fn prompt_notes() -> String {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return String::new();
    }
    print!("Release notes (Enter = Update): ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(_) => line.trim().to_string(),
        Err(_) => String::new()
    }
}

fn run_export(settings: &Settings) -> Result<(), String> {
    info!("Generating setup database in {}", &settings.export_dir);
    let outcome = export_setups(&settings.setups_path(),
                                &settings.export_path(),
                                &settings.path_classifier())
        .map_err(|e| e.to_string())?;
    match outcome {
        ExportOutcome::NoSetups => info!("No setups found in {}", &settings.setups_dir),
        ExportOutcome::Exported(summary) => {
            info!("Setup database created: {} cars, {} setups", summary.num_cars, summary.num_setups)
        }
    }
    Ok(())
}

fn run_check(settings: &Settings) -> Result<(), String> {
    let problems = verify_export(&settings.export_path()).map_err(|e| e.to_string())?;
    if problems.is_empty() {
        info!("{} is consistent", &settings.export_dir);
        return Ok(());
    }
    for problem in &problems {
        warn!("{}", problem);
    }
    Err(format!("{} problems found in {}", problems.len(), &settings.export_dir))
}

fn print_publish_reminder(export_dir: &Path) {
    let absolute = export_dir.canonicalize().unwrap_or_else(|_| export_dir.to_path_buf());
    info!("Remember to publish the setups to GitHub:");
    info!("1. Open {}", absolute.display());
    info!("2. Upload every file in it to the setups repository");
    info!("3. Commit the changes");
}

fn run(cli: Cli) -> Result<(), String> {
    if let Command::InitConfig { path } = &cli.command {
        Settings::default().write(path).map_err(|e| e.to_string())?;
        info!("Default settings written to {}", path.display());
        return Ok(());
    }

    let mut settings = Settings::load(cli.config.as_deref()).map_err(|e| {
        format!("Failed to load settings. {}", e.to_string())
    })?;

    match cli.command {
        Command::Export { setups_dir, export_dir } => {
            if let Some(dir) = setups_dir { settings.setups_dir = dir; }
            if let Some(dir) = export_dir { settings.export_dir = dir; }
            run_export(&settings)
        }
        Command::Check { export_dir } => {
            if let Some(dir) = export_dir { settings.export_dir = dir; }
            run_check(&settings)
        }
        Command::Deploy { notes, skip_web_server } => {
            let version = read_version(&settings.cargo_toml_path()).map_err(|e| e.to_string())?;
            info!("Detected version {}", &version);
            let notes = notes.unwrap_or_else(prompt_notes);
            let mut remote = OpenSshHost::from_settings(&settings).map_err(|e| e.to_string())?;
            deploy::deploy(&mut remote, &settings, &version, &notes, !skip_web_server)
                .map_err(|e| e.to_string())?;
            info!("Deploy complete");
            Ok(())
        }
        Command::Release { notes, configure_web_server } => {
            let notes = notes.unwrap_or_else(prompt_notes);
            let builder = CargoReleaseBuilder::for_manifest(&settings.cargo_toml_path());
            let mut remote = OpenSshHost::from_settings(&settings).map_err(|e| e.to_string())?;
            let report = deploy::release(&builder, &mut remote, &settings, &notes, configure_web_server)
                .map_err(|e| e.to_string())?;
            info!("Release {} complete", &report.version_info.version);
            match report.export {
                Some(ExportOutcome::Exported(summary)) => print_publish_reminder(&summary.export_dir),
                _ => info!("Setups weren't updated, nothing to publish")
            }
            Ok(())
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or(settings.echo_host);
            let port = port.unwrap_or(settings.echo_port);
            let server = EchoServer::bind(&host, port).map_err(|e| e.to_string())?;
            server.serve().map_err(|e| e.to_string())
        }
        Command::InitConfig { .. } => Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("setup-crane v{}", env!("CARGO_PKG_VERSION"));
    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use crate::{Cli, Command};

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["setup-crane", "-v", "export", "--setups-dir", "in"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Export { setups_dir, export_dir } => {
                assert_eq!(setups_dir.as_deref(), Some("in"));
                assert_eq!(export_dir, None);
            }
            other => panic!("unexpected {:?}", other)
        }

        let cli = Cli::try_parse_from(["setup-crane", "serve", "--port", "7000", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
        match cli.command {
            Command::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(7000));
            }
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn deploy_configures_web_server_unless_skipped() {
        let cli = Cli::try_parse_from(["setup-crane", "deploy", "--skip-web-server", "--notes", "hi"]).unwrap();
        match cli.command {
            Command::Deploy { notes, skip_web_server } => {
                assert!(skip_web_server);
                assert_eq!(notes.as_deref(), Some("hi"));
            }
            other => panic!("unexpected {:?}", other)
        }
    }
}
