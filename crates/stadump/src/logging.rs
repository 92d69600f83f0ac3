use anyhow::Result;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Install a stderr subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: tracing::Level) -> Result<()> {
    let debug = level >= tracing::Level::DEBUG;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(level).into())
                .from_env()?,
        )
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
