#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use betscore::state::{
    FixtureInput, HeadToHead, Match, MatchOdds, Odds, PredictionWeights, Team, TeamForm,
    TotalsOdds,
};

pub fn kickoff(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

pub fn team(short: &str) -> Team {
    Team {
        id: short.to_lowercase(),
        name: format!("{short} FC"),
        short_name: short.to_string(),
    }
}

pub fn form(wins: u32, draws: u32, losses: u32) -> TeamForm {
    TeamForm {
        results: Vec::new(),
        games_played: wins + draws + losses,
        wins,
        draws,
        losses,
        goals_scored: wins * 2,
        goals_conceded: losses * 2,
    }
}

pub fn h2h(home_wins: u32, away_wins: u32, draws: u32) -> HeadToHead {
    HeadToHead {
        total_meetings: home_wins + away_wins + draws,
        home_wins,
        away_wins,
        draws,
        last_results: Vec::new(),
    }
}

pub fn h2h_odds(home: f64, draw: f64, away: f64) -> Odds {
    Odds {
        h2h: Some(MatchOdds { home, draw, away }),
        ..Odds::default()
    }
}

pub fn with_totals(mut odds: Odds, over: f64, under: f64) -> Odds {
    odds.ou25 = Some(TotalsOdds { over, under });
    odds
}

pub fn input(id: &str, league: &str, odds: Odds, bookmakers: &[&str]) -> FixtureInput {
    FixtureInput {
        id: id.to_string(),
        home_team: team("LIV"),
        away_team: team("ARS"),
        kickoff: kickoff(1, 15),
        league: league.to_string(),
        odds,
        bookmakers: bookmakers.iter().map(|b| b.to_string()).collect(),
        home_form: form(3, 1, 1),
        away_form: form(2, 1, 2),
        h2h: h2h(3, 1, 1),
    }
}

pub fn fixture(id: &str, league: &str, odds: Odds, bookmakers: &[&str]) -> Match {
    Match::predicted(input(id, league, odds, bookmakers), PredictionWeights::default())
}

pub fn simple_fixture(id: &str) -> Match {
    fixture(id, "Premier League", h2h_odds(2.10, 3.40, 3.00), &["Bet365"])
}
