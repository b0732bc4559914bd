use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{BOOKMAKERS, LEAGUES};
use crate::state::{
    BttsOdds, FixtureInput, FormResult, H2hResult, HeadToHead, Match, MatchOdds, Odds,
    PredictionWeights, RESULT_WINDOW, Team, TeamForm, TotalsOdds,
};

const TEAMS: [(&str, &str, &str); 15] = [
    ("1", "Liverpool", "LIV"),
    ("2", "Arsenal", "ARS"),
    ("3", "Manchester City", "MCI"),
    ("4", "Manchester United", "MUN"),
    ("5", "Chelsea", "CHE"),
    ("6", "Tottenham", "TOT"),
    ("7", "Newcastle", "NEW"),
    ("8", "Aston Villa", "AVL"),
    ("9", "Brighton", "BHA"),
    ("10", "West Ham", "WHU"),
    ("11", "Barcelona", "BAR"),
    ("12", "Real Madrid", "RMA"),
    ("13", "Atletico Madrid", "ATM"),
    ("14", "Bayern Munich", "BAY"),
    ("15", "Borussia Dortmund", "BVB"),
];

/// Demo fixture universe: `count` fixtures kicking off within a week of
/// `now`, predicted with `weights` and sorted by kickoff.
pub fn generate_fixtures<R: Rng>(
    count: usize,
    now: DateTime<Utc>,
    weights: PredictionWeights,
    rng: &mut R,
) -> Vec<Match> {
    let mut fixtures = (0..count)
        .map(|i| Match::predicted(fixture_input(i, now, rng), weights))
        .collect::<Vec<_>>();
    fixtures.sort_by_key(|m| m.kickoff);
    fixtures
}

fn fixture_input<R: Rng>(i: usize, now: DateTime<Utc>, rng: &mut R) -> FixtureInput {
    let home_idx = rng.gen_range(0..TEAMS.len());
    let mut away_idx = rng.gen_range(0..TEAMS.len());
    while away_idx == home_idx {
        away_idx = rng.gen_range(0..TEAMS.len());
    }

    let day = rng.gen_range(0..7);
    let hour = rng.gen_range(15..20);
    let kickoff = (now.date_naive() + ChronoDuration::days(day))
        .and_hms_opt(hour, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);

    let offered = 2 + rng.gen_range(0..3);

    FixtureInput {
        id: format!("match-{}", i + 1),
        home_team: team(home_idx),
        away_team: team(away_idx),
        kickoff,
        league: LEAGUES[rng.gen_range(0..LEAGUES.len())].to_string(),
        odds: random_odds(rng),
        bookmakers: BOOKMAKERS[..offered].iter().map(|b| b.to_string()).collect(),
        home_form: random_form(rng),
        away_form: random_form(rng),
        h2h: random_h2h(rng),
    }
}

fn team(idx: usize) -> Team {
    let (id, name, short_name) = TEAMS[idx];
    Team {
        id: id.to_string(),
        name: name.to_string(),
        short_name: short_name.to_string(),
    }
}

fn random_odds<R: Rng>(rng: &mut R) -> Odds {
    let mut price = |base: f64, spread: f64| round2(base + rng.gen_range(0.0..spread));
    Odds {
        h2h: Some(MatchOdds {
            home: price(1.5, 3.0),
            draw: price(3.0, 2.0),
            away: price(2.0, 4.0),
        }),
        ou25: Some(TotalsOdds {
            over: price(1.5, 1.0),
            under: price(1.8, 1.0),
        }),
        btts: Some(BttsOdds {
            yes: price(1.4, 0.8),
            no: price(1.9, 1.0),
        }),
    }
}

fn random_form<R: Rng>(rng: &mut R) -> TeamForm {
    let games = RESULT_WINDOW as u32;
    let wins = rng.gen_range(0..=games);
    let draws = rng.gen_range(0..=games - wins);
    let losses = games - wins - draws;

    let mut results = Vec::with_capacity(RESULT_WINDOW);
    results.extend(std::iter::repeat_n(FormResult::Win, wins as usize));
    results.extend(std::iter::repeat_n(FormResult::Draw, draws as usize));
    results.extend(std::iter::repeat_n(FormResult::Loss, losses as usize));
    results.shuffle(rng);

    TeamForm {
        results,
        games_played: games,
        wins,
        draws,
        losses,
        goals_scored: wins * 2 + draws + rng.gen_range(0..3),
        goals_conceded: losses * 2 + draws + rng.gen_range(0..3),
    }
}

fn random_h2h<R: Rng>(rng: &mut R) -> HeadToHead {
    let home_wins = rng.gen_range(0..4);
    let away_wins = rng.gen_range(0..4);
    let draws = rng.gen_range(0..3);

    let mut results = Vec::new();
    results.extend(std::iter::repeat_n(H2hResult::Home, home_wins as usize));
    results.extend(std::iter::repeat_n(H2hResult::Away, away_wins as usize));
    results.extend(std::iter::repeat_n(H2hResult::Draw, draws as usize));
    results.shuffle(rng);
    results.truncate(RESULT_WINDOW);

    HeadToHead {
        total_meetings: home_wins + away_wins + draws,
        home_wins,
        away_wins,
        draws,
        last_results: results,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
