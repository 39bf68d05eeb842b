use background_service::{
    console_echo, interrupt_channel, InterruptHandle, SessionConfig, SessionDriver,
};
use clap::Parser;
use feed_client::{ItemFeed, ReplayFeed};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subwatch_core::{
    AppConfig, ConfigError, CoreError, ErrorExt, ErrorReporter, DEFAULT_LOG_FILTER,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "subwatch")]
#[command(about = "Streams new subreddit posts or comments and keeps running stats")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Item kind to watch: post or comment
    #[arg(short, long)]
    kind: Option<String>,

    /// Subreddit to watch; repeat for several
    #[arg(short = 's', long = "subreddit")]
    subreddits: Vec<String>,

    /// Directory holding `<subreddit>.jsonl` listing captures
    #[arg(long, env = "SUBWATCH_REPLAY_DIR")]
    replay_dir: Option<PathBuf>,

    /// Seconds between quick-stat reports
    #[arg(long)]
    quick_stats_secs: Option<u64>,

    /// Seconds between replayed batches
    #[arg(long, default_value_t = 2)]
    delivery_secs: u64,
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, CoreError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_env_overrides()?;

    let subreddits = (!cli.subreddits.is_empty()).then(|| cli.subreddits.join(","));
    config.apply_overrides(subreddits.as_deref(), cli.kind.as_deref())?;
    if let Some(dir) = &cli.replay_dir {
        config.replay_dir = Some(dir.clone());
    }
    if let Some(secs) = cli.quick_stats_secs {
        config.quick_stats_interval_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Configured filter, or the workspace default when no config could be loaded.
fn log_directives(config: Option<&AppConfig>) -> &str {
    config.map_or(DEFAULT_LOG_FILTER, |config| config.log_filter.as_str())
}

fn init_logging(config: Option<&AppConfig>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(config)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn forward_ctrl_c(handle: InterruptHandle) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C");
            handle.trigger();
        }
        tracing::error!("Failed to listen for Ctrl+C");
    });
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging(None);
            return Err(e);
        }
    };
    init_logging(Some(&config));

    tracing::info!(
        "Starting subwatch for {} on {:?}",
        config.kind.plural(),
        config.subreddits
    );

    let replay_dir = config.replay_dir.clone().ok_or_else(|| ConfigError::MissingField {
        field: "replay_dir".to_string(),
    })?;
    let delivery_interval = Duration::from_secs(cli.delivery_secs.max(1));

    let mut feeds: Vec<Arc<dyn ItemFeed>> = Vec::with_capacity(config.subreddits.len());
    for subreddit in &config.subreddits {
        let feed = ReplayFeed::open(&replay_dir, subreddit, delivery_interval).await?;
        feeds.push(Arc::new(feed));
    }

    let (handle, mut interrupt) = interrupt_channel();
    forward_ctrl_c(handle);

    println!(
        "Watching new {} in {}. Press Ctrl+C for final stats.",
        config.kind.plural(),
        config
            .subreddits
            .iter()
            .map(|name| format!("r/{}", name))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut driver = SessionDriver::new(
        SessionConfig::from(&config),
        feeds,
        console_echo(config.preview_chars),
    )?;
    let mut stdout = std::io::stdout();
    driver.run(&mut interrupt, &mut stdout).await
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage problems are reported but still exit cleanly.
            let _ = e.print();
            return;
        }
    };

    if let Err(e) = run(cli).await {
        ErrorReporter::new().report_error(&e);
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file_falls_back_to_default_logging() {
        let cli = Cli::try_parse_from(["subwatch", "--config", "/nonexistent/subwatch.toml"])
            .unwrap();
        let result = resolve_config(&cli);
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::FileNotFound { .. }))
        ));
        assert_eq!(log_directives(None), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "subwatch",
            "--kind",
            "comment",
            "-s",
            "rust",
            "-s",
            "r/golang",
            "--quick-stats-secs",
            "15",
            "--replay-dir",
            "captures",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.kind.plural(), "comments");
        assert_eq!(config.subreddits, vec!["rust", "golang"]);
        assert_eq!(config.quick_stats_interval_secs, 15);
        assert_eq!(config.replay_dir, Some(PathBuf::from("captures")));
        assert_eq!(log_directives(Some(&config)), config.log_filter);
    }
}
