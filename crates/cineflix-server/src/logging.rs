use anyhow::Result;
use cineflix_config::LoggingConfig;
use std::io;
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Pick the filter: `--quiet` wins, then `-v`/`-vv`, then `RUST_LOG`, then the configured level
fn build_filter(verbose_level: u8, quiet: bool, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let fallback = match verbose_level {
        0 => format!("{},hyper=warn", default_level),
        // -v: debug without connection-level noise
        1 => "debug,hyper=warn,hyper_util=warn,h2=warn".to_string(),
        _ => "trace".to_string(),
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn use_json(config: &LoggingConfig) -> bool {
    if let Ok(value) = std::env::var("RUST_LOG_JSON") {
        return value == "true";
    }
    config.json.unwrap_or_else(|| !io::stdout().is_terminal())
}

/// Daily-rotated appender; `cineflix.log` becomes `cineflix.<date>` files
fn file_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;

    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
    let log_prefix = log_filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(log_filename);

    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix))
}

pub fn init_logging(verbose_level: u8, quiet: bool, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, &config.level);
    let json = use_json(config);
    let registry = Registry::default().with(filter);

    match &config.file {
        Some(log_path) => {
            let appender = file_appender(log_path)?;
            if json {
                let layer = fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(appender);
                registry.with(layer).try_init()?;
            } else {
                let layer = fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender);
                registry.with(layer).try_init()?;
            }
        }
        None => {
            if json {
                let layer = fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
                registry.with(layer).try_init()?;
            } else {
                let layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
                registry.with(layer).try_init()?;
            }
        }
    }

    Ok(())
}
