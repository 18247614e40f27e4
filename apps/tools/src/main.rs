use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use face_core::{clock::DEFAULT_TIMEZONE, hand_angles, TimezoneSetting, WallClock, ZonedClock};
use serde::Serialize;
use shared::domain::{ClockReading, HandAngles};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print hand angles for an explicit time, or for now in `--timezone`.
    Angles {
        #[arg(long)]
        hour: Option<u32>,
        #[arg(long)]
        minute: Option<u32>,
        #[arg(long, default_value_t = 0)]
        second: u32,
        #[arg(long, default_value = DEFAULT_TIMEZONE)]
        timezone: String,
    },
}

#[derive(Debug, Serialize)]
struct AnglesReport {
    reading: ClockReading,
    angles: HandAngles,
}

fn reading_for(
    hour: Option<u32>,
    minute: Option<u32>,
    second: u32,
    timezone: &str,
) -> Result<ClockReading> {
    match (hour, minute) {
        (Some(hour), Some(minute)) => Ok(ClockReading::new(hour, minute, second)),
        (None, None) => {
            let timezone: TimezoneSetting = timezone.parse()?;
            Ok(ZonedClock::new(timezone).reading())
        }
        _ => bail!("--hour and --minute must be given together"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Angles {
            hour,
            minute,
            second,
            timezone,
        } => {
            let reading = reading_for(hour, minute, second, &timezone)?;
            let report = AnglesReport {
                reading,
                angles: hand_angles(reading),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
