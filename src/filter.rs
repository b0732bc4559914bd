use crate::state::{FilterCriteria, Match};

/// Order-preserving subsequence of `fixtures` that satisfies every configured
/// clause of `criteria`. Empty clause sets never exclude.
pub fn apply(fixtures: &[Match], criteria: &FilterCriteria) -> Vec<Match> {
    fixtures
        .iter()
        .filter(|m| matches(m, criteria))
        .cloned()
        .collect()
}

pub fn matches(fixture: &Match, criteria: &FilterCriteria) -> bool {
    odds_in_range(fixture, criteria)
        && offered_by_bookmaker(fixture, criteria)
        && in_league(fixture, criteria)
        && offers_market(fixture, criteria)
        && kicks_off_in_window(fixture, criteria)
}

// Draw and BTTS prices are deliberately left out of the range check.
fn odds_in_range(fixture: &Match, criteria: &FilterCriteria) -> bool {
    let (Some(min), Some(max)) = (criteria.odds_min, criteria.odds_max) else {
        return true;
    };
    let candidates = [
        fixture.odds.h2h.map(|o| o.home),
        fixture.odds.h2h.map(|o| o.away),
        fixture.odds.ou25.map(|o| o.over),
    ];
    candidates
        .into_iter()
        .flatten()
        .any(|price| price >= min && price <= max)
}

fn offered_by_bookmaker(fixture: &Match, criteria: &FilterCriteria) -> bool {
    criteria.bookmakers.is_empty()
        || fixture
            .bookmakers
            .iter()
            .any(|b| criteria.bookmakers.contains(b))
}

fn in_league(fixture: &Match, criteria: &FilterCriteria) -> bool {
    criteria.leagues.is_empty() || criteria.leagues.contains(&fixture.league)
}

fn offers_market(fixture: &Match, criteria: &FilterCriteria) -> bool {
    criteria.markets.is_empty() || criteria.markets.iter().any(|m| fixture.odds.offers(*m))
}

fn kicks_off_in_window(fixture: &Match, criteria: &FilterCriteria) -> bool {
    let after_start = criteria
        .kickoff_from
        .map(|from| fixture.kickoff >= from)
        .unwrap_or(true);
    let before_end = criteria
        .kickoff_to
        .map(|to| fixture.kickoff <= to)
        .unwrap_or(true);
    after_start && before_end
}
