use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// One entry of the ticker universe: a display name plus the
/// provider-specific symbol (`.NS` suffix for NSE listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub tickers: Vec<Ticker>,
}

impl Default for Config {
    fn default() -> Self {
        // Try to read from config.toml first
        if let Ok(config) = load_config() {
            return config;
        }

        // Fallback to hardcoded defaults
        Self {
            tickers: default_tickers(),
        }
    }
}

fn ticker(name: &str, symbol: &str) -> Ticker {
    Ticker {
        name: name.to_string(),
        symbol: symbol.to_string(),
    }
}

fn default_tickers() -> Vec<Ticker> {
    vec![
        ticker("National Alum", "NATIONALUM.NS"),
        ticker("Adani Green", "ADANIGREEN.NS"),
        ticker("Devyani", "DEVYANI.NS"),
        ticker("Coal India", "COALINDIA.NS"),
        ticker("Adani Wilmar", "AWL.NS"),
        ticker("Rel Power", "RPOWER.NS"),
        ticker("SW Solar", "SWSOLAR.NS"),
        ticker("Adani Power", "ADANIPOWER.NS"),
        ticker("Jio Fin", "JIOFIN.NS"),
        ticker("Central Bank", "CENTRALBK.NS"),
        ticker("Bharti Airtel", "BHARTIARTL.NS"),
        ticker("Brookfield REIT", "BIRET.NS"),
    ]
}

fn get_config_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("config.toml");
    path
}

pub fn load_config() -> anyhow::Result<Config> {
    let config_path = get_config_path();
    match fs::read_to_string(&config_path) {
        Ok(config_str) => match toml::from_str(&config_str) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("Failed to parse config.toml: {}", e);
                Err(e.into())
            }
        },
        Err(e) => Err(e.into()),
    }
}

#[allow(dead_code)]
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let config_path = get_config_path();
    let config_str = toml::to_string_pretty(config)?;
    fs::write(config_path, config_str)?;
    Ok(())
}
