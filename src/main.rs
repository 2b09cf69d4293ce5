use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ohlc_intervals_rs::config::Config;
use ohlc_intervals_rs::fetch::{self, FetchOptions};
use ohlc_intervals_rs::interval::{parse_interval, CalendarInterval};

#[derive(Debug, Parser)]
#[command(author, version, about = "Fetch daily OHLCV history and analyze recurring calendar intervals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch history for the configured tickers and write interval reports
    Fetch {
        /// Recurring interval, 'MM-DD,MM-DD' (e.g. 10-01,10-15)
        #[arg(long, value_parser = parse_interval)]
        interval: CalendarInterval,
        /// Number of past calendar years to fetch
        #[arg(long, default_value = "5", value_parser = clap::value_parser!(i32).range(1..))]
        years: i32,
        /// Base name for output files
        #[arg(long)]
        output: String,
        /// Write one CSV per company instead of a combined file
        #[arg(long)]
        separate: bool,
        /// Skip the interval performance analysis
        #[arg(long)]
        no_analysis: bool,
    },
    /// Re-run the interval analysis over a previously exported combined CSV
    Analyze {
        /// Combined observation CSV written by a previous fetch
        #[arg(long)]
        input: PathBuf,
        /// Recurring interval, 'MM-DD,MM-DD'
        #[arg(long, value_parser = parse_interval)]
        interval: CalendarInterval,
        /// Base name for the analysis output file
        #[arg(long)]
        output: String,
    },
    /// Print the configured ticker universe
    ListTickers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            interval,
            years,
            output,
            separate,
            no_analysis,
        } => {
            fetch::run_fetch(FetchOptions {
                interval,
                past_years: years,
                file_name: output,
                save_separate: separate,
                run_analysis: !no_analysis,
            })
            .await?;
        }
        Commands::Analyze {
            input,
            interval,
            output,
        } => {
            fetch::run_analyze_csv(&input, &interval, &output)?;
        }
        Commands::ListTickers => {
            let config = Config::default();
            for ticker in &config.tickers {
                println!("{}: {}", ticker.name, ticker.symbol);
            }
        }
    }

    Ok(())
}
