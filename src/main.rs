use anyhow::{Context, Result};
use calcfx::api::HttpRateSource;
use calcfx::config::{self, Config, DEFAULT_CONFIG_FILE};
use calcfx::terminal::{self, Session, TerminalUi};
use calcfx::{refresh_channel, AppState, Currency, FetchSettings, RateRefresher, RefreshInbox};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "calcfx",
    version,
    about = "Four-function calculator with a live currency converter"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "CALCFX_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Never contact the rate endpoints
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive calculator and converter (default)
    Interactive,
    /// Evaluate a run of calculator keys, e.g. "12+8="
    Calc { keys: String },
    /// Convert an amount between two currencies
    Convert {
        amount: String,
        from: String,
        to: String,
        /// Fetch live rates first
        #[arg(long)]
        live: bool,
    },
    /// Print the rate table
    Rates {
        /// Fetch live rates first
        #[arg(long)]
        live: bool,
    },
    /// Write a config file with the default settings
    InitConfig { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let (refresher, inbox) = build_refresher(&config)?;
            let session = Session::new(AppState::new(), refresher);
            terminal::run_interactive(session, inbox, config.refresh_on_startup && !cli.offline)
                .await?;
        }
        Commands::Calc { keys } => {
            let mut app = AppState::new();
            let mut ui = TerminalUi;
            for label in terminal::key_labels(&keys)? {
                app.press(&label, &mut ui)?;
            }
        }
        Commands::Convert {
            amount,
            from,
            to,
            live,
        } => {
            let mut app = AppState::new();
            app.select_from(Some(from.parse::<Currency>()?));
            app.select_to(Some(to.parse::<Currency>()?));
            if live && !cli.offline {
                refresh_once(&mut app, &config).await?;
            }
            let conversion = app.convert(&amount)?;
            println!("{} {} = {}", amount.trim(), conversion.from, conversion);
        }
        Commands::Rates { live } => {
            let mut app = AppState::new();
            if live && !cli.offline {
                refresh_once(&mut app, &config).await?;
            } else {
                app.show_rate_status(&mut TerminalUi);
            }
            println!("{}", terminal::render_rates(app.rates()));
        }
        Commands::InitConfig { path } => {
            let path = path.unwrap_or_else(config::default_config_path);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            config::save_config(&Config::default(), &path)?;
            println!("✅ Wrote default config to {}", path.display());
        }
    }

    Ok(())
}

fn build_refresher(config: &Config) -> Result<(RateRefresher, RefreshInbox)> {
    let source = HttpRateSource::new(config.timeout(), &config.user_agent)
        .context("Failed to set up rate source")?;
    Ok(refresh_channel(Arc::new(source), FetchSettings::from(config)))
}

/// Run a single refresh to completion and apply whatever it delivered.
async fn refresh_once(app: &mut AppState, config: &Config) -> Result<()> {
    let (refresher, mut inbox) = build_refresher(config)?;
    let mut ui = TerminalUi;

    let handle = app.begin_refresh(&refresher, &mut ui);
    handle.finished().await.context("Rate refresh task failed")?;
    for report in inbox.drain() {
        app.apply_refresh(report, &mut ui);
    }
    Ok(())
}
