use crate::state::{
    Confidence, HeadToHead, Prediction, PredictionBreakdown, PredictionWeights, SidePair, TeamForm,
};

const HOME_ADVANTAGE: f64 = 5.0;
const DRAW_ALLOWANCE: f64 = 20.0;
const NEUTRAL_H2H_SCORE: f64 = 50.0;

const HIGH_CONFIDENCE_MEETINGS: u32 = 5;
const LOW_CONFIDENCE_MEETINGS: u32 = 3;
const MIN_FORM_GAMES: u32 = 5;

/// Converts form and head-to-head history into H/D/A percentages.
///
/// Home and away are rounded to one decimal first and the draw takes the
/// remainder, so the three always add up to 100.0 at one-decimal precision.
/// Weights are applied as given; callers validate complementarity.
pub fn predict(
    home_form: &TeamForm,
    away_form: &TeamForm,
    h2h: &HeadToHead,
    weights: PredictionWeights,
) -> Prediction {
    let home_form_score = form_score(home_form);
    let away_form_score = form_score(away_form);
    let (home_h2h_score, away_h2h_score) = h2h_scores(h2h);

    let w_form = f64::from(weights.form()) / 100.0;
    let w_h2h = f64::from(weights.h2h()) / 100.0;

    let home_raw = w_form * home_form_score + w_h2h * home_h2h_score + HOME_ADVANTAGE;
    let away_raw = w_form * away_form_score + w_h2h * away_h2h_score;

    // Never below DRAW_ALLOWANCE, so the division is always defined.
    let total = home_raw + away_raw + DRAW_ALLOWANCE;
    let home_win = round1(home_raw / total * 100.0);
    let away_win = round1(away_raw / total * 100.0);
    let draw = round1(100.0 - home_win - away_win);

    Prediction {
        home_win,
        draw,
        away_win,
        confidence: classify_confidence(h2h, home_form),
        breakdown: PredictionBreakdown {
            form: SidePair {
                home: round1(home_form_score),
                away: round1(away_form_score),
            },
            h2h: SidePair {
                home: round1(home_h2h_score),
                away: round1(away_h2h_score),
            },
            weights,
        },
    }
}

/// Points per game on a 0-100 scale; 0 when no games were played.
pub fn form_score(form: &TeamForm) -> f64 {
    if form.games_played == 0 {
        return 0.0;
    }
    let points = 3.0 * f64::from(form.wins) + f64::from(form.draws);
    let max_points = 3.0 * f64::from(form.games_played);
    (points / max_points * 100.0).clamp(0.0, 100.0)
}

/// Share of meetings won by each side, neutral 50/50 with no history.
pub fn h2h_scores(h2h: &HeadToHead) -> (f64, f64) {
    if h2h.total_meetings == 0 {
        return (NEUTRAL_H2H_SCORE, NEUTRAL_H2H_SCORE);
    }
    let total = f64::from(h2h.total_meetings);
    (
        f64::from(h2h.home_wins) / total * 100.0,
        f64::from(h2h.away_wins) / total * 100.0,
    )
}

pub fn classify_confidence(h2h: &HeadToHead, home_form: &TeamForm) -> Confidence {
    if h2h.total_meetings >= HIGH_CONFIDENCE_MEETINGS && home_form.games_played >= MIN_FORM_GAMES {
        Confidence::High
    } else if h2h.total_meetings < LOW_CONFIDENCE_MEETINGS || home_form.games_played < MIN_FORM_GAMES
    {
        Confidence::Low
    } else {
        Confidence::Medium
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(wins: u32, draws: u32, losses: u32) -> TeamForm {
        TeamForm {
            results: Vec::new(),
            games_played: wins + draws + losses,
            wins,
            draws,
            losses,
            goals_scored: 0,
            goals_conceded: 0,
        }
    }

    fn h2h(home_wins: u32, away_wins: u32, draws: u32) -> HeadToHead {
        HeadToHead {
            total_meetings: home_wins + away_wins + draws,
            home_wins,
            away_wins,
            draws,
            last_results: Vec::new(),
        }
    }

    #[test]
    fn form_score_is_points_per_game_scaled() {
        assert!((form_score(&form(3, 1, 1)) - 66.666_666).abs() < 1e-3);
        assert_eq!(form_score(&form(5, 0, 0)), 100.0);
        assert_eq!(form_score(&form(0, 0, 5)), 0.0);
    }

    #[test]
    fn form_score_without_games_is_zero() {
        assert_eq!(form_score(&form(0, 0, 0)), 0.0);
    }

    #[test]
    fn no_meetings_gives_neutral_h2h() {
        assert_eq!(h2h_scores(&h2h(0, 0, 0)), (50.0, 50.0));
    }

    #[test]
    fn identical_sides_favour_home_by_advantage() {
        let p = predict(&form(2, 1, 2), &form(2, 1, 2), &h2h(1, 1, 1), PredictionWeights::default());
        assert!(p.home_win > p.away_win);
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let big = form(1_500_000_000, 0, 0);
        assert_eq!(form_score(&big), 100.0);
        let max = form(u32::MAX, 0, 0);
        assert_eq!(form_score(&max), 100.0);
    }

    #[test]
    fn form_only_weights_ignore_meetings() {
        let weights = PredictionWeights::from_form(100).unwrap();
        let a = predict(&form(2, 1, 2), &form(2, 1, 2), &h2h(5, 0, 0), weights);
        let b = predict(&form(2, 1, 2), &form(2, 1, 2), &h2h(0, 5, 0), weights);
        assert_eq!((a.home_win, a.draw, a.away_win), (b.home_win, b.draw, b.away_win));
    }
}
