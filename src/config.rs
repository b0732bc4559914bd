use std::env;
use std::path::PathBuf;

use crate::logging::LoggingConfig;
use crate::state::{FilterCriteria, PredictionWeights};

pub const BOOKMAKERS: [&str; 5] = ["1xBet", "888sport", "Bet365", "William Hill", "Betway"];
pub const LEAGUES: [&str; 4] = ["Premier League", "La Liga", "Bundesliga", "Champions League"];

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub odds_min: f64,
    pub odds_max: f64,
    pub form_weight: u8,
    pub fixture_count: usize,
    pub seed: Option<u64>,
    pub fixtures_file: Option<PathBuf>,
    pub repredict_on_weight_change: bool,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            odds_min: 1.2,
            odds_max: 3.0,
            form_weight: 60,
            fixture_count: 20,
            seed: None,
            fixtures_file: None,
            repredict_on_weight_change: false,
            logging: LoggingConfig {
                file: Some(PathBuf::from("betscore.log")),
                ..LoggingConfig::default()
            },
        }
    }
}

impl AppConfig {
    /// Reads `.env.local`, then `.env`, then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let parsed = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let logging = LoggingConfig {
            level: parsed("BETSCORE_LOG_LEVEL").unwrap_or(d.logging.level),
            format: parsed("BETSCORE_LOG_FORMAT")
                .map(|v| v.to_lowercase())
                .unwrap_or(d.logging.format),
            file: match parsed("BETSCORE_LOG_FILE") {
                Some(v) if v.is_empty() || v == "-" => None,
                Some(v) => Some(PathBuf::from(v)),
                None => d.logging.file,
            },
        };

        Self {
            odds_min: parsed("BETSCORE_ODDS_MIN")
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(d.odds_min),
            odds_max: parsed("BETSCORE_ODDS_MAX")
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(d.odds_max),
            form_weight: parsed("BETSCORE_FORM_WEIGHT")
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(d.form_weight)
                .min(100),
            fixture_count: parsed("BETSCORE_FIXTURE_COUNT")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(d.fixture_count)
                .clamp(1, 200),
            seed: parsed("BETSCORE_SEED").and_then(|v| v.parse::<u64>().ok()),
            fixtures_file: parsed("BETSCORE_FIXTURES_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            repredict_on_weight_change: parsed("BETSCORE_REPREDICT_ON_WEIGHTS")
                .map(|v| parse_bool(&v))
                .unwrap_or(d.repredict_on_weight_change),
            logging,
        }
    }

    pub fn weights(&self) -> PredictionWeights {
        PredictionWeights::from_form(self.form_weight).unwrap_or_default()
    }

    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            odds_min: Some(self.odds_min),
            odds_max: Some(self.odds_max),
            weights: self.weights(),
            ..FilterCriteria::default()
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
