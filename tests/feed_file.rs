use std::fs;

use betscore::feed_file::{load_fixtures, parse_fixtures_json};
use betscore::state::{Confidence, FormResult, H2hResult, PredictionWeights};

const FEED: &str = r#"[
  {
    "id": "late",
    "home_team": {"id": "rma", "name": "Real Madrid", "short_name": "RMA"},
    "away_team": {"id": "bar", "name": "Barcelona", "short_name": "BAR"},
    "kickoff": "2026-03-02T20:00:00Z",
    "league": "La Liga",
    "odds": {
      "h2h": {"home": 2.3, "draw": 3.4, "away": 2.9},
      "ou25": {"over": 1.7, "under": 2.1}
    },
    "bookmakers": ["Bet365", "Betway"],
    "home_form": {"results": ["W", "W", "D", "L", "W"], "games_played": 5, "wins": 3, "draws": 1, "losses": 1, "goals_scored": 10, "goals_conceded": 5},
    "away_form": {"results": ["W", "D", "L", "L", "W"], "games_played": 5, "wins": 2, "draws": 1, "losses": 2},
    "h2h": {"total_meetings": 5, "home_wins": 3, "away_wins": 1, "draws": 1, "last_results": ["H", "H", "D", "A", "H"]}
  },
  {
    "id": "early",
    "home_team": {"id": "bay", "name": "Bayern Munich", "short_name": "BAY"},
    "away_team": {"id": "bvb", "name": "Borussia Dortmund", "short_name": "BVB"},
    "kickoff": "2026-03-01T15:30:00Z",
    "league": "Bundesliga",
    "home_form": {"games_played": 0, "wins": 0, "draws": 0, "losses": 0},
    "away_form": {"games_played": 0, "wins": 0, "draws": 0, "losses": 0},
    "h2h": {"total_meetings": 0, "home_wins": 0, "away_wins": 0, "draws": 0}
  }
]"#;

#[test]
fn feed_is_predicted_and_sorted_by_kickoff() {
    let fixtures = parse_fixtures_json(FEED, PredictionWeights::default()).unwrap();
    let ids = fixtures.iter().map(|m| m.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["early", "late"]);

    let late = &fixtures[1];
    assert_eq!(late.label(), "RMA vs BAR");
    assert_eq!(late.home_form.results[2], FormResult::Draw);
    assert_eq!(late.h2h.last_results[3], H2hResult::Away);
    assert_eq!(late.home_form.form_string(), "WWDLW");
    assert_eq!(late.prediction.home_win, 55.2);
    assert_eq!(late.prediction.confidence, Confidence::High);

    let early = &fixtures[0];
    assert!(early.odds.h2h.is_none());
    assert!(early.bookmakers.is_empty());
    assert_eq!(early.prediction.confidence, Confidence::Low);
}

#[test]
fn inconsistent_form_is_rejected_with_fixture_context() {
    let broken = FEED.replace(
        r#""games_played": 5, "wins": 2"#,
        r#""games_played": 6, "wins": 2"#,
    );
    let err = parse_fixtures_json(&broken, PredictionWeights::default()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("fixture late"), "{chain}");
    assert!(chain.contains("Barcelona"), "{chain}");
}

#[test]
fn overflowing_form_counts_are_rejected() {
    let broken = FEED.replace(
        r#""wins": 2, "draws": 1, "losses": 2}"#,
        r#""wins": 4294967295, "draws": 6, "losses": 0}"#,
    );
    let err = parse_fixtures_json(&broken, PredictionWeights::default()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("fixture late"), "{chain}");
    assert!(chain.contains("overflows"), "{chain}");
}

#[test]
fn overflowing_meeting_counts_are_rejected() {
    let broken = FEED.replace(
        r#""total_meetings": 5, "home_wins": 3"#,
        r#""total_meetings": 5, "home_wins": 4294967295"#,
    );
    let err = parse_fixtures_json(&broken, PredictionWeights::default()).unwrap_err();
    assert!(format!("{err:#}").contains("overflows"));
}

#[test]
fn prices_below_one_are_rejected_with_fixture_context() {
    let broken = FEED.replace(
        r#"{"home": 2.3, "draw": 3.4, "away": 2.9}"#,
        r#"{"home": -3.0, "draw": 0.2, "away": 0.0}"#,
    );
    let err = parse_fixtures_json(&broken, PredictionWeights::default()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("fixture late"), "{chain}");
    assert!(chain.contains("odds must be"), "{chain}");

    let btts = FEED.replace(
        r#""ou25": {"over": 1.7, "under": 2.1}"#,
        r#""ou25": {"over": 1.7, "under": 2.1}, "btts": {"yes": 1.8, "no": 0.9}"#,
    );
    assert!(parse_fixtures_json(&btts, PredictionWeights::default()).is_err());
}

#[test]
fn inconsistent_head_to_head_is_rejected() {
    let broken = FEED.replace(r#""total_meetings": 5"#, r#""total_meetings": 4"#);
    assert!(parse_fixtures_json(&broken, PredictionWeights::default()).is_err());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(parse_fixtures_json("{not json", PredictionWeights::default()).is_err());
}

#[test]
fn loads_from_disk() {
    let path = std::env::temp_dir().join(format!("betscore-feed-{}.json", std::process::id()));
    fs::write(&path, FEED).unwrap();
    let fixtures = load_fixtures(&path, PredictionWeights::from_form(100).unwrap()).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[1].prediction.breakdown.weights.form(), 100);

    let missing = load_fixtures(&path, PredictionWeights::default()).unwrap_err();
    assert!(format!("{missing:#}").contains("read fixtures file"));
}
