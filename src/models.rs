use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One daily bar for one company. Providers routinely leave holes in the
/// quote arrays, so every price field is optional.
#[derive(Debug, Clone)]
pub struct PriceObservation {
    pub company: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceObservation {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Percentage change for one (company, year) pair within the interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyChangeRecord {
    pub company: String,
    pub year: i32,
    pub pct_change: f64,
}

/// Year x company matrix of percentage changes. Rows are years ascending,
/// columns are companies in first-seen order among the emitted records.
/// Absent cells stay absent, they are never zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub years: Vec<i32>,
    pub companies: Vec<String>,
    cells: HashMap<(i32, String), f64>,
}

impl PivotTable {
    pub fn from_records(records: &[YearlyChangeRecord]) -> Self {
        let mut years = Vec::new();
        let mut companies = Vec::new();
        let mut cells = HashMap::new();

        for record in records {
            if !years.contains(&record.year) {
                years.push(record.year);
            }
            if !companies.contains(&record.company) {
                companies.push(record.company.clone());
            }
            cells.insert((record.year, record.company.clone()), record.pct_change);
        }
        years.sort_unstable();

        Self {
            years,
            companies,
            cells,
        }
    }

    pub fn get(&self, year: i32, company: &str) -> Option<f64> {
        self.cells.get(&(year, company.to_string())).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Increased,
    Decreased,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Increased => write!(f, "Increased"),
            Trend::Decreased => write!(f, "Decreased"),
        }
    }
}

/// Per-company mean percentage change plus a direction label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub company: String,
    pub avg_pct_change: f64,
    pub trend: Trend,
}

/// Everything the analyzer produces for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub records: Vec<YearlyChangeRecord>,
    pub pivot: PivotTable,
    pub aggregates: Vec<AggregateRow>,
}
