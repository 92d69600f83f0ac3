use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "stadump",
    author,
    version,
    about = "Print the stations associated with a wireless interface via nl80211"
)]
pub struct Cli {
    /// Wireless interface to query (defaults to $STADUMP_INTERFACE, then wlan0)
    pub interface: Option<String>,

    /// Give up waiting for the kernel after this many milliseconds (0 waits forever)
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Output format for the station list
    #[arg(long = "output", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Log level for diagnostics on stderr
    #[arg(long, default_value_t = tracing::Level::WARN)]
    pub log_level: tracing::Level,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
