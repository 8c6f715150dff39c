use clap::Parser;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use std::{
    path::PathBuf,
    time::Duration,
};
use web_board::{
    app,
    config::{
        self,
        BoardConfig,
        Endpoints,
        LogConfig,
    },
    logging,
};

#[derive(Parser, Debug)]
#[command(version, about = "Referee panel for the Chainball scoreboard", long_about = None)]
struct Args {
    /// Scoreboard web server
    #[arg(short, long, default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    #[arg(long, default_value_t = 800)]
    request_timeout_ms: u64,

    /// JSON file overriding endpoint paths
    #[arg(long)]
    endpoints: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log view changes instead of drawing the terminal UI
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn board_config(&self) -> Result<BoardConfig> {
        let endpoints = match &self.endpoints {
            Some(path) => Endpoints::from_json_file(path)
                .wrap_err_with(|| format!("loading endpoints from {}", path.display()))?,
            None => Endpoints::default(),
        };
        Ok(BoardConfig {
            base_url: self.base_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            endpoints,
        })
    }

    fn log_config(&self) -> LogConfig {
        LogConfig {
            directory: self.log_dir.clone(),
            level: self.log_level.clone(),
            ..LogConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _log_guard = logging::init_tracing(&args.log_config(), args.headless)
        .wrap_err("failed to set up logging")?;
    let config = args.board_config()?;
    app::run_app(config, args.headless).await
}
