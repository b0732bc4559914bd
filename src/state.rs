use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::booking::{self, CodeClock};
use crate::config::AppConfig;
use crate::error::{EngineError, Result};
use crate::filter;
use crate::ledger::SelectionLedger;
use crate::win_prob;

/// Trailing window for form strings and head-to-head result lists.
pub const RESULT_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(Self::Win),
            'D' => Some(Self::Draw),
            'L' => Some(Self::Loss),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Win => 'W',
            Self::Draw => 'D',
            Self::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum H2hResult {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "A")]
    Away,
    #[serde(rename = "D")]
    Draw,
}

impl H2hResult {
    pub fn symbol(self) -> char {
        match self {
            Self::Home => 'H',
            Self::Away => 'A',
            Self::Draw => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    #[serde(default)]
    pub results: Vec<FormResult>,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub goals_conceded: u32,
}

impl TeamForm {
    /// Builds a form summary whose counts are derived from the result symbols.
    pub fn from_results(
        results: Vec<FormResult>,
        goals_scored: u32,
        goals_conceded: u32,
    ) -> Result<Self> {
        let count = |r: FormResult| results.iter().filter(|x| **x == r).count() as u32;
        let form = Self {
            games_played: results.len() as u32,
            wins: count(FormResult::Win),
            draws: count(FormResult::Draw),
            losses: count(FormResult::Loss),
            results,
            goals_scored,
            goals_conceded,
        };
        form.validate("team")?;
        Ok(form)
    }

    pub fn parse(form: &str, goals_scored: u32, goals_conceded: u32) -> Result<Self> {
        let results = form
            .chars()
            .map(|c| {
                FormResult::from_char(c).ok_or_else(|| EngineError::InvalidForm {
                    team: "team".to_string(),
                    reason: format!("unknown form symbol {c:?}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_results(results, goals_scored, goals_conceded)
    }

    pub fn validate(&self, team: &str) -> Result<()> {
        if self.results.len() > RESULT_WINDOW {
            return Err(EngineError::InvalidForm {
                team: team.to_string(),
                reason: format!(
                    "{} results exceed the {RESULT_WINDOW}-game window",
                    self.results.len()
                ),
            });
        }
        let sum = self
            .wins
            .checked_add(self.draws)
            .and_then(|n| n.checked_add(self.losses))
            .ok_or_else(|| EngineError::InvalidForm {
                team: team.to_string(),
                reason: "wins+draws+losses overflows".to_string(),
            })?;
        if sum != self.games_played {
            return Err(EngineError::InvalidForm {
                team: team.to_string(),
                reason: format!(
                    "wins+draws+losses = {sum} but games_played = {}",
                    self.games_played
                ),
            });
        }
        Ok(())
    }

    pub fn form_string(&self) -> String {
        self.results.iter().map(|r| r.symbol()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub total_meetings: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
    #[serde(default)]
    pub last_results: Vec<H2hResult>,
}

impl HeadToHead {
    pub fn new(
        home_wins: u32,
        away_wins: u32,
        draws: u32,
        last_results: Vec<H2hResult>,
    ) -> Result<Self> {
        let total_meetings = home_wins
            .checked_add(away_wins)
            .and_then(|n| n.checked_add(draws))
            .ok_or_else(|| EngineError::InvalidHeadToHead {
                reason: "meeting count overflows".to_string(),
            })?;
        let h2h = Self {
            total_meetings,
            home_wins,
            away_wins,
            draws,
            last_results,
        };
        h2h.validate()?;
        Ok(h2h)
    }

    pub fn validate(&self) -> Result<()> {
        if self.last_results.len() > RESULT_WINDOW {
            return Err(EngineError::InvalidHeadToHead {
                reason: format!(
                    "{} recent results exceed the {RESULT_WINDOW}-meeting window",
                    self.last_results.len()
                ),
            });
        }
        let sum = self
            .home_wins
            .checked_add(self.away_wins)
            .and_then(|n| n.checked_add(self.draws))
            .ok_or_else(|| EngineError::InvalidHeadToHead {
                reason: "home_wins+away_wins+draws overflows".to_string(),
            })?;
        if sum != self.total_meetings {
            return Err(EngineError::InvalidHeadToHead {
                reason: format!(
                    "home_wins+away_wins+draws = {sum} but total_meetings = {}",
                    self.total_meetings
                ),
            });
        }
        Ok(())
    }

    pub fn results_string(&self) -> String {
        self.last_results.iter().map(|r| r.symbol()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "h2h")]
    H2h,
    #[serde(rename = "ou25")]
    OverUnder25,
    #[serde(rename = "btts")]
    Btts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
    Over,
    Under,
    Yes,
    No,
}

impl Outcome {
    pub fn market(self) -> Market {
        match self {
            Self::Home | Self::Draw | Self::Away => Market::H2h,
            Self::Over | Self::Under => Market::OverUnder25,
            Self::Yes | Self::No => Market::Btts,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Draw => "draw",
            Self::Away => "away",
            Self::Over => "over 2.5",
            Self::Under => "under 2.5",
            Self::Yes => "btts yes",
            Self::No => "btts no",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalsOdds {
    pub over: f64,
    pub under: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BttsOdds {
    pub yes: f64,
    pub no: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    #[serde(default)]
    pub h2h: Option<MatchOdds>,
    #[serde(default)]
    pub ou25: Option<TotalsOdds>,
    #[serde(default)]
    pub btts: Option<BttsOdds>,
}

impl Odds {
    pub fn price(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.h2h.map(|o| o.home),
            Outcome::Draw => self.h2h.map(|o| o.draw),
            Outcome::Away => self.h2h.map(|o| o.away),
            Outcome::Over => self.ou25.map(|o| o.over),
            Outcome::Under => self.ou25.map(|o| o.under),
            Outcome::Yes => self.btts.map(|o| o.yes),
            Outcome::No => self.btts.map(|o| o.no),
        }
    }

    pub fn offers(&self, market: Market) -> bool {
        match market {
            Market::H2h => self.h2h.is_some(),
            Market::OverUnder25 => self.ou25.is_some(),
            Market::Btts => self.btts.is_some(),
        }
    }

    /// Every quoted price must be a finite decimal of at least 1.0.
    pub fn validate(&self) -> Result<()> {
        let prices = [
            self.h2h.map(|o| [o.home, o.draw, o.away].to_vec()),
            self.ou25.map(|o| [o.over, o.under].to_vec()),
            self.btts.map(|o| [o.yes, o.no].to_vec()),
        ];
        match prices
            .into_iter()
            .flatten()
            .flatten()
            .find(|p| !is_valid_price(*p))
        {
            Some(bad) => Err(EngineError::InvalidOdds(bad)),
            None => Ok(()),
        }
    }
}

pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price >= 1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Form/H2H weight pair, in percent. Always sums to 100; deserializing
/// goes through [`PredictionWeights::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct PredictionWeights {
    form: u8,
    h2h: u8,
}

#[derive(Deserialize)]
struct RawWeights {
    form: u8,
    h2h: u8,
}

impl TryFrom<RawWeights> for PredictionWeights {
    type Error = EngineError;

    fn try_from(raw: RawWeights) -> Result<Self> {
        Self::new(raw.form, raw.h2h)
    }
}

impl Default for PredictionWeights {
    fn default() -> Self {
        Self { form: 60, h2h: 40 }
    }
}

impl PredictionWeights {
    pub fn new(form: u8, h2h: u8) -> Result<Self> {
        if u16::from(form) + u16::from(h2h) != 100 {
            return Err(EngineError::InvalidWeights { form, h2h });
        }
        Ok(Self { form, h2h })
    }

    pub fn from_form(form: u8) -> Result<Self> {
        Self::new(form, 100u8.saturating_sub(form))
    }

    pub fn from_h2h(h2h: u8) -> Result<Self> {
        Self::new(100u8.saturating_sub(h2h), h2h)
    }

    pub fn form(self) -> u8 {
        self.form
    }

    pub fn h2h(self) -> u8 {
        self.h2h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidePair {
    pub home: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionBreakdown {
    pub form: SidePair,
    pub h2h: SidePair,
    pub weights: PredictionWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub confidence: Confidence,
    pub breakdown: PredictionBreakdown,
}

impl Prediction {
    /// Home, draw and away in tenths of a percent. These always add up to
    /// exactly 1000; the `f64` fields may miss 100.0 by an ulp.
    pub fn tenths(&self) -> (i64, i64, i64) {
        let t = |x: f64| (x * 10.0).round() as i64;
        (t(self.home_win), t(self.draw), t(self.away_win))
    }

    /// Outcome that strictly beats both others, if any.
    pub fn favourite(&self) -> Option<Outcome> {
        if self.home_win > self.away_win && self.home_win > self.draw {
            Some(Outcome::Home)
        } else if self.away_win > self.home_win && self.away_win > self.draw {
            Some(Outcome::Away)
        } else if self.draw > self.home_win && self.draw > self.away_win {
            Some(Outcome::Draw)
        } else {
            None
        }
    }
}

/// Raw fixture as supplied by a data feed, before the model has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureInput {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub kickoff: DateTime<Utc>,
    pub league: String,
    #[serde(default)]
    pub odds: Odds,
    #[serde(default)]
    pub bookmakers: Vec<String>,
    pub home_form: TeamForm,
    pub away_form: TeamForm,
    pub h2h: HeadToHead,
}

impl FixtureInput {
    /// Validates form and H2H invariants, then predicts.
    pub fn into_match(self, weights: PredictionWeights) -> Result<Match> {
        self.home_form.validate(&self.home_team.name)?;
        self.away_form.validate(&self.away_team.name)?;
        self.h2h.validate()?;
        self.odds.validate()?;
        Ok(Match::predicted(self, weights))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub kickoff: DateTime<Utc>,
    pub league: String,
    pub odds: Odds,
    pub bookmakers: Vec<String>,
    pub prediction: Prediction,
    pub home_form: TeamForm,
    pub away_form: TeamForm,
    pub h2h: HeadToHead,
}

impl Match {
    /// Runs the model over already-consistent input.
    pub fn predicted(input: FixtureInput, weights: PredictionWeights) -> Self {
        let prediction = win_prob::predict(&input.home_form, &input.away_form, &input.h2h, weights);
        Self {
            id: input.id,
            home_team: input.home_team,
            away_team: input.away_team,
            kickoff: input.kickoff,
            league: input.league,
            odds: input.odds,
            bookmakers: input.bookmakers,
            prediction,
            home_form: input.home_form,
            away_form: input.away_form,
            h2h: input.h2h,
        }
    }

    pub fn repredicted(&self, weights: PredictionWeights) -> Self {
        Self {
            prediction: win_prob::predict(&self.home_form, &self.away_form, &self.h2h, weights),
            ..self.clone()
        }
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team.short_name, self.away_team.short_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingSelection {
    pub fixture_id: String,
    pub fixture: Match,
    pub market: Market,
    pub outcome: Outcome,
    pub odds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCode {
    pub code: String,
    pub bookmaker: String,
    pub selections: Vec<BettingSelection>,
    /// Full-precision product of the selections' odds.
    pub total_odds: f64,
    pub created_at: DateTime<Utc>,
}

impl BookingCode {
    pub fn total_odds_display(&self) -> String {
        format!("{:.2}", self.total_odds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub odds_min: Option<f64>,
    pub odds_max: Option<f64>,
    #[serde(default)]
    pub bookmakers: Vec<String>,
    #[serde(default)]
    pub leagues: Vec<String>,
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub kickoff_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kickoff_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub weights: PredictionWeights,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            odds_min: Some(1.2),
            odds_max: Some(3.0),
            bookmakers: Vec::new(),
            leagues: Vec::new(),
            markets: Vec::new(),
            kickoff_from: None,
            kickoff_to: None,
            weights: PredictionWeights::default(),
        }
    }
}

/// Partial criteria update. `None` keeps the current value; the nested
/// options on bounds allow clearing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub odds_min: Option<Option<f64>>,
    pub odds_max: Option<Option<f64>>,
    pub bookmakers: Option<Vec<String>>,
    pub leagues: Option<Vec<String>>,
    pub markets: Option<Vec<Market>>,
    pub kickoff_from: Option<Option<DateTime<Utc>>>,
    pub kickoff_to: Option<Option<DateTime<Utc>>>,
    pub form_weight: Option<u8>,
    pub h2h_weight: Option<u8>,
}

impl FilterCriteria {
    /// Returns the merged criteria without touching `self`.
    pub fn merged(&self, update: FilterUpdate) -> Result<Self> {
        let weights = match (update.form_weight, update.h2h_weight) {
            (Some(form), Some(h2h)) => PredictionWeights::new(form, h2h)?,
            (Some(form), None) => PredictionWeights::from_form(form)?,
            (None, Some(h2h)) => PredictionWeights::from_h2h(h2h)?,
            (None, None) => self.weights,
        };
        Ok(Self {
            odds_min: update.odds_min.unwrap_or(self.odds_min),
            odds_max: update.odds_max.unwrap_or(self.odds_max),
            bookmakers: update.bookmakers.unwrap_or_else(|| self.bookmakers.clone()),
            leagues: update.leagues.unwrap_or_else(|| self.leagues.clone()),
            markets: update.markets.unwrap_or_else(|| self.markets.clone()),
            kickoff_from: update.kickoff_from.unwrap_or(self.kickoff_from),
            kickoff_to: update.kickoff_to.unwrap_or(self.kickoff_to),
            weights,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub selected: usize,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub repredict_on_weight_change: bool,
    fixtures: Vec<Match>,
    filtered: Vec<Match>,
    criteria: FilterCriteria,
    ledger: SelectionLedger,
    booking: Option<BookingCode>,
    clock: CodeClock,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_criteria(FilterCriteria::default())
    }

    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            selected: 0,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
            repredict_on_weight_change: false,
            fixtures: Vec::with_capacity(32),
            filtered: Vec::with_capacity(32),
            criteria,
            ledger: SelectionLedger::new(),
            booking: None,
            clock: CodeClock::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut state = Self::with_criteria(config.default_criteria());
        state.repredict_on_weight_change = config.repredict_on_weight_change;
        state
    }

    pub fn fixtures(&self) -> &[Match] {
        &self.fixtures
    }

    pub fn filtered_fixtures(&self) -> &[Match] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selections(&self) -> &[BettingSelection] {
        self.ledger.snapshot()
    }

    pub fn selection_for(&self, fixture_id: &str) -> Option<&BettingSelection> {
        self.ledger.get(fixture_id)
    }

    pub fn is_selected(&self, fixture_id: &str) -> bool {
        self.ledger.contains(fixture_id)
    }

    /// Combined odds of the current slip, `None` while it is empty.
    pub fn total_odds(&self) -> Option<f64> {
        if self.ledger.is_empty() {
            None
        } else {
            Some(self.ledger.total_odds())
        }
    }

    pub fn booking_code(&self) -> Option<&BookingCode> {
        self.booking.as_ref()
    }

    /// Replaces the fixture universe and re-derives the filtered view.
    pub fn set_fixtures(&mut self, fixtures: Vec<Match>) {
        info!(count = fixtures.len(), "fixture universe replaced");
        self.fixtures = fixtures;
        self.refilter();
    }

    pub fn upsert_fixture(&mut self, fixture: Match) {
        match self.fixtures.iter_mut().find(|m| m.id == fixture.id) {
            Some(existing) => *existing = fixture,
            None => self.fixtures.push(fixture),
        }
        self.refilter();
    }

    pub fn update_filter_criteria(&mut self, update: FilterUpdate) -> Result<()> {
        let next = match self.criteria.merged(update) {
            Ok(next) => next,
            Err(err) => {
                warn!(%err, "filter update rejected");
                self.push_log(format!("[WARN] Filter update rejected: {err}"));
                return Err(err);
            }
        };
        let weights_changed = next.weights != self.criteria.weights;
        self.criteria = next;
        if weights_changed && self.repredict_on_weight_change {
            let weights = self.criteria.weights;
            self.fixtures = self
                .fixtures
                .iter()
                .map(|m| m.repredicted(weights))
                .collect();
            info!(form = weights.form(), h2h = weights.h2h(), "fixtures re-predicted");
        }
        self.refilter();
        Ok(())
    }

    pub fn toggle_bookmaker(&mut self, bookmaker: &str) -> Result<()> {
        let bookmakers = toggled(&self.criteria.bookmakers, bookmaker);
        self.update_filter_criteria(FilterUpdate {
            bookmakers: Some(bookmakers),
            ..FilterUpdate::default()
        })
    }

    pub fn toggle_league(&mut self, league: &str) -> Result<()> {
        let leagues = toggled(&self.criteria.leagues, league);
        self.update_filter_criteria(FilterUpdate {
            leagues: Some(leagues),
            ..FilterUpdate::default()
        })
    }

    pub fn select_outcome(
        &mut self,
        fixture_id: &str,
        fixture: &Match,
        market: Market,
        outcome: Outcome,
        odds: f64,
    ) -> Result<()> {
        let checked = check_selection(fixture_id, fixture, market, outcome, odds);
        if let Err(err) = checked {
            warn!(%err, fixture_id, "selection rejected");
            self.push_log(format!("[WARN] Selection rejected: {err}"));
            return Err(err);
        }
        let replaced = self.ledger.select(BettingSelection {
            fixture_id: fixture_id.to_string(),
            fixture: fixture.clone(),
            market,
            outcome,
            odds,
        });
        debug!(fixture_id, ?outcome, odds, replaced = replaced.is_some(), "outcome selected");
        self.push_log(format!(
            "[INFO] {} {} @ {odds:.2}",
            fixture.label(),
            outcome.label()
        ));
        Ok(())
    }

    pub fn deselect_outcome(&mut self, fixture_id: &str) {
        if self.ledger.deselect(fixture_id).is_some() {
            debug!(fixture_id, "outcome deselected");
        }
    }

    pub fn clear_selections(&mut self) {
        self.ledger.clear();
    }

    pub fn generate_booking_code(&mut self, bookmaker: &str) -> Result<&BookingCode> {
        self.generate_booking_code_at(bookmaker, Utc::now())
    }

    pub fn generate_booking_code_at(
        &mut self,
        bookmaker: &str,
        now: DateTime<Utc>,
    ) -> Result<&BookingCode> {
        if let Some(active) = &self.booking {
            let err = EngineError::BookingCodeActive(active.code.clone());
            warn!(%err, "booking code generation rejected");
            return Err(err);
        }
        self.regenerate_booking_code_at(bookmaker, now)
    }

    /// Explicitly replaces any active booking code with a fresh one.
    pub fn regenerate_booking_code(&mut self, bookmaker: &str) -> Result<&BookingCode> {
        self.regenerate_booking_code_at(bookmaker, Utc::now())
    }

    pub fn regenerate_booking_code_at(
        &mut self,
        bookmaker: &str,
        now: DateTime<Utc>,
    ) -> Result<&BookingCode> {
        let stamp = self.clock.peek(now);
        let code = match booking::generate_stamped(self.ledger.snapshot(), bookmaker, stamp, now) {
            Ok(code) => code,
            Err(err) => {
                warn!(%err, bookmaker, "booking code generation rejected");
                self.push_log(format!("[WARN] Booking code not generated: {err}"));
                return Err(err);
            }
        };
        self.clock.commit(stamp);
        info!(
            code = %code.code,
            bookmaker = %code.bookmaker,
            selections = code.selections.len(),
            total_odds = code.total_odds,
            "booking code generated"
        );
        self.push_log(format!(
            "[INFO] Booking code {} ({} @ {})",
            code.code,
            code.bookmaker,
            code.total_odds_display()
        ));
        Ok(&*self.booking.insert(code))
    }

    pub fn clear_booking_code(&mut self) {
        self.booking = None;
    }

    /// Drops the booking code and the slip behind it.
    pub fn start_new_slip(&mut self) {
        self.clear_booking_code();
        self.clear_selections();
    }

    pub fn selected_fixture(&self) -> Option<&Match> {
        self.filtered.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(self.filtered.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered.len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter::apply(&self.fixtures, &self.criteria);
        self.clamp_selection();
        debug!(
            total = self.fixtures.len(),
            shown = self.filtered.len(),
            "fixtures re-filtered"
        );
    }
}

fn check_selection(
    fixture_id: &str,
    fixture: &Match,
    market: Market,
    outcome: Outcome,
    odds: f64,
) -> Result<()> {
    if fixture.id != fixture_id {
        return Err(EngineError::FixtureMismatch {
            id: fixture_id.to_string(),
            fixture: fixture.id.clone(),
        });
    }
    if outcome.market() != market {
        return Err(EngineError::OutcomeMarketMismatch { market, outcome });
    }
    if !is_valid_price(odds) {
        return Err(EngineError::InvalidOdds(odds));
    }
    Ok(())
}

fn toggled(values: &[String], value: &str) -> Vec<String> {
    if values.iter().any(|v| v == value) {
        values.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut out = values.to_vec();
        out.push(value.to_string());
        out
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetFixtures(Vec<Match>),
    UpsertFixture(Match),
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFixtures(fixtures) => {
            let count = fixtures.len();
            state.set_fixtures(fixtures);
            state.push_log(format!("[INFO] Loaded {count} fixtures"));
        }
        Delta::UpsertFixture(fixture) => state.upsert_fixture(fixture),
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::Low => "LOW",
        Confidence::Medium => "MEDIUM",
        Confidence::High => "HIGH",
    }
}

pub fn market_label(market: Market) -> &'static str {
    match market {
        Market::H2h => "Match Winner",
        Market::OverUnder25 => "Over/Under 2.5",
        Market::Btts => "Both Teams To Score",
    }
}
