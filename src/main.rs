use clap::Parser;
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::io;
use std::path::Path;

use llamachat::core::config::{self, CliOverrides, EnvOverrides, LlamaChatConfig};

#[derive(Parser)]
#[command(name = "llamachat", about = "Terminal chat client for a local LLaMA.cpp backend")]
struct Args {
    /// Backend base URL (overrides config and LLAMACHAT_BASE_URL)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Install the file logger at `level`. The terminal belongs to the UI, so
/// records only go to `path`.
///
/// The logger itself accepts every record; the effective level is the
/// global max level, which can be tightened later with `log::set_max_level`.
fn init_logging(path: &Path, level: LevelFilter) -> io::Result<()> {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let log_file = File::create(path)?;
    WriteLogger::init(LevelFilter::Trace, log_config, log_file).map_err(io::Error::other)?;
    log::set_max_level(level);
    Ok(())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let cli = CliOverrides {
        base_url: args.base_url,
        log_level: args.log_level,
    };
    let env = EnvOverrides::from_env();

    // Logger goes up before the config file is read, at the level env and
    // CLI ask for, so config loading is logged too.
    let early = config::resolve(&LlamaChatConfig::default(), &env, &cli);
    if let Err(e) = init_logging(Path::new("llamachat.log"), early.log_level) {
        eprintln!("Warning: could not start logging to llamachat.log: {e}");
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Config not loaded ({}), using defaults", e);
        eprintln!("Warning: {e}; using defaults");
        LlamaChatConfig::default()
    });
    let resolved = config::resolve(&file_config, &env, &cli);
    log::set_max_level(resolved.log_level);

    log::info!("llamachat starting up against {}", resolved.base_url);

    llamachat::tui::run(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_records_at_configured_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llamachat.log");
        init_logging(&path, LevelFilter::Info).unwrap();

        log::debug!("hidden before config");
        log::warn!("config warning");
        log::set_max_level(LevelFilter::Debug);
        log::debug!("visible after config");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("config warning"), "{contents}");
        assert!(!contents.contains("hidden before config"));
        assert!(contents.contains("visible after config"));

        // Only one logger per process
        assert!(init_logging(&dir.path().join("second.log"), LevelFilter::Info).is_err());
    }
}
