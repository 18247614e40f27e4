use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use face_core::{DisplayAwareTicker, TickerDeps, ZonedClock};
use shared::domain::DisplayId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod config;
mod platform;

use config::{load_settings, Settings};
use platform::{parse_command, Command, SimulatedPlatform, TerminalSink, HELP};

#[derive(Parser, Debug)]
#[command(about = "Analog watch face driven by a simulated display")]
struct Args {
    #[arg(long, default_value = "watchface.toml")]
    config: PathBuf,
    /// IANA timezone name or `local`.
    #[arg(long)]
    timezone: Option<String>,
    #[arg(long)]
    display_id: Option<i64>,
    #[arg(long)]
    tick_interval_ms: Option<u64>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.timezone {
            settings.timezone = v.clone();
        }
        if let Some(v) = self.display_id {
            settings.display_id = v;
        }
        if let Some(v) = self.tick_interval_ms {
            settings.tick_interval_ms = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    args.apply(&mut settings);

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(io::stderr)
        .init();

    let timezone = settings.timezone_setting()?;
    let ticker_config = settings.ticker_config()?;
    let display_id = DisplayId(settings.display_id);

    let platform = SimulatedPlatform::new(display_id).await;
    let ticker = DisplayAwareTicker::start(
        ticker_config,
        TickerDeps {
            clock: Arc::new(ZonedClock::new(timezone)),
            displays: Arc::new(platform.displays().clone()),
            sink: Arc::new(TerminalSink::new(io::stdout())),
        },
        platform.registry(),
    )
    .await?;
    info!(%timezone, display_id = display_id.0, "watch face running; {HELP}");

    let mut power = ticker.watch_power();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line, display_id) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        platform.apply(command).await;
                    }
                    Ok(None) => {}
                    Err(err) => warn!("{err:#}"),
                }
            }
            _ = power.wait_for(|state| state.is_terminal()) => {
                info!("watch face removed");
                break;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    ticker.stop().await?;
    Ok(())
}
