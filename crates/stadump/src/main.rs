use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use stadump_netlink::{dump_stations, DumpReport, NetlinkError, StationRecord};

mod cli;
mod config;
mod logging;

use cli::{Cli, OutputFormat};
use config::DumpConfig;

/// Same code coreutils `timeout` uses.
const EXIT_TIMEOUT: i32 = 124;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.log_level) {
        eprintln!("failed to init logging: {err}");
    }
    let config = DumpConfig::from_env().apply_cli(&cli);
    tracing::debug!("config: {:?}", config);

    if let Err(err) = run(&config) {
        emit_error(&err);
        std::process::exit(exit_code(&err));
    }
}

fn run(config: &DumpConfig) -> Result<()> {
    match config.output {
        OutputFormat::Text => run_text(config),
        OutputFormat::Json => run_json(config),
    }
}

fn run_text(config: &DumpConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_err: Option<io::Error> = None;

    dump_stations(&config.dump_options(), |station| {
        if write_err.is_none() {
            write_err = writeln!(out, "{station}").err();
        }
    })
    .with_context(|| format!("Station dump on '{}' failed", config.interface))?;

    if let Some(err) = write_err {
        return Err(err).context("Failed to write station list");
    }
    out.flush().context("Failed to write station list")
}

fn run_json(config: &DumpConfig) -> Result<()> {
    let mut stations: Vec<StationRecord> = Vec::new();
    let report = dump_stations(&config.dump_options(), |station| stations.push(*station))
        .with_context(|| format!("Station dump on '{}' failed", config.interface))?;

    let payload = json_report(&report, &stations);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn json_report(report: &DumpReport, stations: &[StationRecord]) -> serde_json::Value {
    json!({
        "interface": report.interface,
        "ifindex": report.ifindex,
        "stations": stations,
        "skipped": report.summary.skipped,
    })
}

fn emit_error(err: &anyhow::Error) {
    eprintln!("Error: {}", err);
    for cause in err.chain().skip(1) {
        eprintln!("  -> {}", cause);
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<NetlinkError>() {
        Some(e) if e.is_timeout() => EXIT_TIMEOUT,
        _ => 1,
    }
}
