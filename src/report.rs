//! Report rendering: interval CSV exports plus the analysis text file.
//!
//! Formatting lives here and only here. The analyzer hands over exact
//! floats; the two-decimal rounding and the `%` suffix are applied at this
//! boundary.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{Reader, Writer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

use crate::models::{AnalysisReport, PriceObservation};

const CSV_HEADERS: [&str; 8] = [
    "Date", "Year", "Company", "Open", "High", "Low", "Close", "Volume",
];

/// Filesystem-safe token for a company name: spaces become underscores,
/// remaining non-word characters are stripped.
pub fn sanitize_company_name(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => String::new(),
    }
}

fn format_volume(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn write_observation_csv(path: &Path, observations: &[&PriceObservation]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(CSV_HEADERS)?;
    for obs in observations {
        writer.write_record(&[
            obs.date.format("%Y-%m-%d").to_string(),
            obs.year().to_string(),
            obs.company.clone(),
            format_price(obs.open),
            format_price(obs.high),
            format_price(obs.low),
            format_price(obs.close),
            format_volume(obs.volume),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the interval-filtered observations as CSV under `output_dir`,
/// either one combined file or one file per company.
pub fn save_data_csv(
    observations: &[PriceObservation],
    file_name: &str,
    save_separate: bool,
    output_dir: &Path,
) -> Result<()> {
    if observations.is_empty() {
        println!("\nNo data within the specified interval to save.");
        return Ok(());
    }

    if save_separate {
        println!("\nSaving separate CSV files in '{}'...", output_dir.display());
        let mut by_company: BTreeMap<&str, Vec<&PriceObservation>> = BTreeMap::new();
        for obs in observations {
            by_company.entry(obs.company.as_str()).or_default().push(obs);
        }

        for (company, rows) in by_company {
            let safe_name = sanitize_company_name(company);
            let path = output_dir.join(format!("{}_{}.csv", file_name, safe_name));
            write_observation_csv(&path, &rows)?;
            println!(" - Saved data to {}", path.display());
        }
    } else {
        let path = output_dir.join(format!("{}.csv", file_name));
        println!("\nSaving combined data to {}...", path.display());
        let rows: Vec<&PriceObservation> = observations.iter().collect();
        write_observation_csv(&path, &rows)?;
        println!("✅ CSV saved successfully.");
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ObservationRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<u64>,
}

/// Reads a combined observation CSV back into memory, the inverse of
/// [`save_data_csv`]. The `Year` column is derived from the date again.
pub fn read_observations_csv(path: &Path) -> Result<Vec<PriceObservation>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut reader = Reader::from_reader(file);

    let mut observations = Vec::new();
    for result in reader.deserialize() {
        let record: ObservationRecord = result?;
        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d")
            .with_context(|| format!("Bad date '{}' in {}", record.date, path.display()))?;
        observations.push(PriceObservation {
            company: record.company,
            date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }
    Ok(observations)
}

/// Renders the pivot table: a year index column plus one right-aligned
/// column per company, blanks for absent cells, `%.2f%%` values.
pub fn render_pivot(report: &AnalysisReport) -> String {
    let pivot = &report.pivot;
    let year_width = "Year".len().max(4);

    let mut widths: Vec<usize> = Vec::with_capacity(pivot.companies.len());
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(pivot.years.len());
    for company in &pivot.companies {
        widths.push(company.len());
    }
    for year in &pivot.years {
        let mut row = Vec::with_capacity(pivot.companies.len());
        for (i, company) in pivot.companies.iter().enumerate() {
            let text = match pivot.get(*year, company) {
                Some(value) => format!("{:.2}%", value),
                None => String::new(),
            };
            widths[i] = widths[i].max(text.len());
            row.push(text);
        }
        cells.push(row);
    }

    let mut out = String::new();
    out.push_str(&format!("{:<year_width$}", "Year"));
    for (i, company) in pivot.companies.iter().enumerate() {
        out.push_str(&format!("  {:>width$}", company, width = widths[i]));
    }
    out.push('\n');
    for (year, row) in pivot.years.iter().zip(&cells) {
        out.push_str(&format!("{:<year_width$}", year));
        for (i, text) in row.iter().enumerate() {
            out.push_str(&format!("  {:>width$}", text, width = widths[i]));
        }
        out.push('\n');
    }
    out
}

/// Renders the aggregate table: `Company  Avg_Pct_Change  Trend`, no index.
pub fn render_aggregates(report: &AnalysisReport) -> String {
    let mut company_width = "Company".len();
    let mut change_width = "Avg_Pct_Change".len();
    let rows: Vec<(String, String, String)> = report
        .aggregates
        .iter()
        .map(|row| {
            (
                row.company.clone(),
                format!("{:.2}%", row.avg_pct_change),
                row.trend.to_string(),
            )
        })
        .collect();
    for (company, change, _) in &rows {
        company_width = company_width.max(company.len());
        change_width = change_width.max(change.len());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<company_width$}  {:>change_width$}  Trend\n",
        "Company", "Avg_Pct_Change"
    ));
    for (company, change, trend) in &rows {
        out.push_str(&format!(
            "{:<company_width$}  {:>change_width$}  {}\n",
            company, change, trend
        ));
    }
    out
}

/// Writes `<file_name>_analysis.txt` with the pivot and aggregate tables.
pub fn save_analysis(report: &AnalysisReport, file_name: &str, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(format!("{}_analysis.txt", file_name));
    println!("\nSaving analysis to {}...", path.display());

    let mut file = File::create(&path)
        .with_context(|| format!("Failed to create analysis file: {}", path.display()))?;
    writeln!(file, "--- Interval Performance Analysis ---\n")?;
    writeln!(file, "Percentage Change (%) within Interval per Year:")?;
    file.write_all(render_pivot(report).as_bytes())?;
    writeln!(file, "\n--- Aggregate Results ---\n")?;
    file.write_all(render_aggregates(report).as_bytes())?;

    println!("✅ Analysis file saved successfully.");
    Ok(())
}
