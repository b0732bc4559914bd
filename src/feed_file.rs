use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::config::AppConfig;
use crate::fake_feed;
use crate::state::{FixtureInput, Match, PredictionWeights};

/// Fixture universe for `config`: the JSON feed when one is configured,
/// otherwise demo fixtures (seeded when `seed` is set).
pub fn fixture_universe(config: &AppConfig, now: DateTime<Utc>) -> Result<Vec<Match>> {
    let weights = config.weights();
    if let Some(path) = &config.fixtures_file {
        let fixtures = load_fixtures(path, weights)?;
        info!(path = %path.display(), count = fixtures.len(), "fixtures loaded from file");
        return Ok(fixtures);
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(fake_feed::generate_fixtures(config.fixture_count, now, weights, &mut rng))
}

/// Loads a JSON array of fixtures (no prediction field) and runs the model
/// over each one. Output is sorted by kickoff.
pub fn load_fixtures(path: &Path, weights: PredictionWeights) -> Result<Vec<Match>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read fixtures file {}", path.display()))?;
    parse_fixtures_json(&raw, weights).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_fixtures_json(raw: &str, weights: PredictionWeights) -> Result<Vec<Match>> {
    let inputs: Vec<FixtureInput> = serde_json::from_str(raw).context("decode fixture list")?;
    let mut fixtures = inputs
        .into_iter()
        .map(|input| {
            let id = input.id.clone();
            input
                .into_match(weights)
                .with_context(|| format!("fixture {id}"))
        })
        .collect::<Result<Vec<_>>>()?;
    fixtures.sort_by_key(|m| m.kickoff);
    Ok(fixtures)
}
