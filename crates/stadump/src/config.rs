use std::env;
use std::time::Duration;

use clap::ValueEnum;
use stadump_netlink::DumpOptions;

use crate::cli::{Cli, OutputFormat};

pub const DEFAULT_INTERFACE: &str = "wlan0";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    pub interface: String,
    pub timeout: Option<Duration>,
    pub output: OutputFormat,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            timeout: timeout_from_ms(DEFAULT_TIMEOUT_MS),
            output: OutputFormat::Text,
        }
    }
}

impl DumpConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let interface = lookup("STADUMP_INTERFACE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.interface);
        let timeout = lookup("STADUMP_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(timeout_from_ms)
            .unwrap_or(defaults.timeout);
        let output = lookup("STADUMP_OUTPUT")
            .and_then(|v| OutputFormat::from_str(v.trim(), true).ok())
            .unwrap_or(defaults.output);

        Self {
            interface,
            timeout,
            output,
        }
    }

    /// Command line values win over the environment.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(interface) = &cli.interface {
            self.interface = interface.clone();
        }
        if let Some(ms) = cli.timeout_ms {
            self.timeout = timeout_from_ms(ms);
        }
        if let Some(output) = cli.output_format {
            self.output = output;
        }
        self
    }

    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            interface: self.interface.clone(),
            timeout: self.timeout,
        }
    }
}

fn timeout_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
