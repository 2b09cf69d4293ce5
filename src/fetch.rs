//! Fetch-and-report pipeline: pulls daily history for the configured ticker
//! universe, runs the interval analysis, and writes the run's reports into a
//! timestamped folder under `data/`.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::analyze;
use crate::config::{Config, Ticker};
use crate::interval::CalendarInterval;
use crate::models::PriceObservation;
use crate::report;
use crate::yahoo::YahooClient;

/// Courtesy pause between per-ticker requests.
const FETCH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub interval: CalendarInterval,
    pub past_years: i32,
    pub file_name: String,
    pub save_separate: bool,
    pub run_analysis: bool,
}

/// Makes a unique output folder for this run, `data/run_<timestamp>`.
fn create_run_folder() -> Result<PathBuf> {
    let run_timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
    let folder = Path::new("data").join(format!("run_{}", run_timestamp));
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create output folder: {}", folder.display()))?;
    Ok(folder)
}

async fn fetch_ticker_history(
    client: &YahooClient,
    ticker: &Ticker,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceObservation>> {
    let bars = client
        .get_daily_history(&ticker.symbol, start, end)
        .await
        .with_context(|| format!("Fetch failed for {} ({})", ticker.name, ticker.symbol))?;

    Ok(bars
        .into_iter()
        .map(|bar| PriceObservation {
            company: ticker.name.clone(),
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect())
}

pub async fn run_fetch(options: FetchOptions) -> Result<()> {
    if options.file_name.trim().is_empty() {
        anyhow::bail!("output file name cannot be empty");
    }

    let config = Config::default();
    if config.tickers.is_empty() {
        anyhow::bail!("no tickers configured; add [[tickers]] entries to config.toml");
    }

    let output_folder = create_run_folder()?;
    println!(
        "\nAll output files will be saved in: '{}'",
        output_folder.display()
    );

    let current_year = Local::now().year();
    let start_date = NaiveDate::from_ymd_opt(current_year - options.past_years, 1, 1)
        .context("lookback window underflows the calendar")?;
    let end_date = NaiveDate::from_ymd_opt(current_year, 1, 1).unwrap();

    println!("\nConfiguration:");
    println!(" - Data Period: {} to {}", start_date, end_date);
    println!(" - Analysis Interval: {}", options.interval);
    println!("{}", "-".repeat(20));

    let client = YahooClient::new();
    let progress = ProgressBar::new(config.tickers.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut observations: Vec<PriceObservation> = Vec::new();
    for ticker in &config.tickers {
        progress.set_message(format!("{} ({})", ticker.name, ticker.symbol));
        match fetch_ticker_history(&client, ticker, start_date, end_date).await {
            Ok(rows) if rows.is_empty() => {
                eprintln!(
                    "  - No data found for {} for the given period.",
                    ticker.name
                );
            }
            Ok(rows) => observations.extend(rows),
            // A failed ticker must not abort the rest of the universe.
            Err(e) => eprintln!("  - Error fetching {}: {:#}", ticker.name, e),
        }
        progress.inc(1);
        tokio::time::sleep(FETCH_DELAY).await;
    }
    progress.finish_and_clear();

    if observations.is_empty() {
        println!("\nCould not fetch data for any stocks. Exiting.");
        return Ok(());
    }

    // Only completed calendar years take part in the analysis.
    observations.retain(|obs| obs.year() < current_year);
    observations.sort_by(|a, b| a.company.cmp(&b.company).then(a.date.cmp(&b.date)));

    if options.run_analysis {
        run_analysis(&observations, &options.interval, &options.file_name, &output_folder)?;
    }

    println!(
        "\nFiltering all data to the interval: {} for each year...",
        options.interval
    );
    let interval_rows: Vec<PriceObservation> = observations
        .iter()
        .filter(|obs| options.interval.contains(obs.date))
        .cloned()
        .collect();

    report::save_data_csv(
        &interval_rows,
        &options.file_name,
        options.save_separate,
        &output_folder,
    )?;

    println!("\nProgram finished successfully.");
    Ok(())
}

/// Runs the analyzer and, when it produced anything, prints and saves the
/// result. The Empty outcome only suppresses the report, it is not an error.
fn run_analysis(
    observations: &[PriceObservation],
    interval: &CalendarInterval,
    file_name: &str,
    output_folder: &Path,
) -> Result<()> {
    println!("\n--- Interval Performance Analysis ---");
    match analyze(observations, interval) {
        Some(analysis) => {
            println!("\nPercentage Change (%) within Interval per Year:");
            print!("{}", report::render_pivot(&analysis));
            println!("\n--- Aggregate Results ---");
            print!("{}", report::render_aggregates(&analysis));
            report::save_analysis(&analysis, file_name, output_folder)?;
        }
        None => {
            println!("Could not compute analysis. Not enough data in the specified intervals.");
        }
    }
    Ok(())
}

/// Re-runs the analyzer over a previously exported combined CSV, writing the
/// analysis file next to the input.
pub fn run_analyze_csv(input: &Path, interval: &CalendarInterval, file_name: &str) -> Result<()> {
    let observations = report::read_observations_csv(input)?;
    if observations.is_empty() {
        println!("No observations found in {}.", input.display());
        return Ok(());
    }

    let output_folder = input.parent().unwrap_or_else(|| Path::new("."));
    run_analysis(&observations, interval, file_name, output_folder)
}
