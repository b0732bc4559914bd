use std::io;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use betscore::config::{AppConfig, BOOKMAKERS, LEAGUES};
use betscore::state::{
    AppState, BettingSelection, Delta, FilterUpdate, Market, Outcome, Prediction, apply_delta,
    confidence_label, market_label,
};
use betscore::{feed_file, logging};

const ODDS_STEP: f64 = 0.1;
const WEIGHT_STEP: u8 = 5;

struct App {
    state: AppState,
    should_quit: bool,
    // Bookmaker the slip is booked with.
    booking_bookmaker: usize,
    // Position in the "all, then each entry" filter cycles.
    league_filter: usize,
    bookmaker_filter: usize,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
            booking_bookmaker: 0,
            league_filter: 0,
            bookmaker_filter: 0,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('1') => self.pick(Outcome::Home),
            KeyCode::Char('2') => self.pick(Outcome::Draw),
            KeyCode::Char('3') => self.pick(Outcome::Away),
            KeyCode::Char('o') => self.pick(Outcome::Over),
            KeyCode::Char('u') => self.pick(Outcome::Under),
            KeyCode::Char('y') => self.pick(Outcome::Yes),
            KeyCode::Char('n') => self.pick(Outcome::No),
            KeyCode::Char('x') => {
                if let Some(id) = self.state.selected_fixture().map(|m| m.id.clone()) {
                    self.state.deselect_outcome(&id);
                }
            }
            KeyCode::Char('c') => self.state.clear_selections(),
            KeyCode::Char('b') => {
                self.booking_bookmaker = (self.booking_bookmaker + 1) % BOOKMAKERS.len();
            }
            KeyCode::Char('g') => self.generate(false),
            KeyCode::Char('G') => self.generate(true),
            KeyCode::Char('X') => self.state.clear_booking_code(),
            KeyCode::Char('N') => self.state.start_new_slip(),
            KeyCode::Char('l') => self.cycle_league_filter(),
            KeyCode::Char('m') => self.cycle_bookmaker_filter(),
            KeyCode::Char('[') => self.nudge_odds_min(-ODDS_STEP),
            KeyCode::Char(']') => self.nudge_odds_min(ODDS_STEP),
            KeyCode::Char('{') => self.nudge_odds_max(-ODDS_STEP),
            KeyCode::Char('}') => self.nudge_odds_max(ODDS_STEP),
            KeyCode::Char('-') => self.nudge_form_weight(false),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_form_weight(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    // Picking the outcome already on the slip removes it; any other outcome
    // replaces the fixture's entry.
    fn pick(&mut self, outcome: Outcome) {
        let Some(fixture) = self.state.selected_fixture().cloned() else {
            self.state.push_log("[INFO] No fixture selected");
            return;
        };
        let already = self
            .state
            .selection_for(&fixture.id)
            .is_some_and(|s| s.outcome == outcome);
        if already {
            self.state.deselect_outcome(&fixture.id);
            return;
        }
        let Some(odds) = fixture.odds.price(outcome) else {
            self.state
                .push_log(format!("[INFO] {} not priced for {}", outcome.label(), fixture.label()));
            return;
        };
        let _ = self
            .state
            .select_outcome(&fixture.id, &fixture, outcome.market(), outcome, odds);
    }

    fn generate(&mut self, replace: bool) {
        let bookmaker = BOOKMAKERS[self.booking_bookmaker];
        let _ = if replace {
            self.state.regenerate_booking_code(bookmaker).map(|_| ())
        } else {
            self.state.generate_booking_code(bookmaker).map(|_| ())
        };
    }

    fn cycle_league_filter(&mut self) {
        self.league_filter = (self.league_filter + 1) % (LEAGUES.len() + 1);
        let leagues = match self.league_filter {
            0 => Vec::new(),
            n => vec![LEAGUES[n - 1].to_string()],
        };
        let _ = self.state.update_filter_criteria(FilterUpdate {
            leagues: Some(leagues),
            ..FilterUpdate::default()
        });
    }

    fn cycle_bookmaker_filter(&mut self) {
        self.bookmaker_filter = (self.bookmaker_filter + 1) % (BOOKMAKERS.len() + 1);
        let bookmakers = match self.bookmaker_filter {
            0 => Vec::new(),
            n => vec![BOOKMAKERS[n - 1].to_string()],
        };
        let _ = self.state.update_filter_criteria(FilterUpdate {
            bookmakers: Some(bookmakers),
            ..FilterUpdate::default()
        });
    }

    fn nudge_odds_min(&mut self, step: f64) {
        let current = self.state.criteria().odds_min.unwrap_or(1.0);
        let next = round1((current + step).clamp(1.0, 5.0));
        let _ = self.state.update_filter_criteria(FilterUpdate {
            odds_min: Some(Some(next)),
            ..FilterUpdate::default()
        });
    }

    fn nudge_odds_max(&mut self, step: f64) {
        let current = self.state.criteria().odds_max.unwrap_or(10.0);
        let next = round1((current + step).clamp(1.0, 10.0));
        let _ = self.state.update_filter_criteria(FilterUpdate {
            odds_max: Some(Some(next)),
            ..FilterUpdate::default()
        });
    }

    fn nudge_form_weight(&mut self, up: bool) {
        let form = self.state.criteria().weights.form();
        let next = if up {
            form.saturating_add(WEIGHT_STEP).min(100)
        } else {
            form.saturating_sub(WEIGHT_STEP)
        };
        let _ = self.state.update_filter_criteria(FilterUpdate {
            form_weight: Some(next),
            ..FilterUpdate::default()
        });
    }
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    logging::init(&config.logging)?;

    let fixtures = feed_file::fixture_universe(&config, Utc::now())?;

    let mut state = AppState::from_config(&config);
    apply_delta(&mut state, Delta::SetFixtures(fixtures));
    let mut app = App::new(state);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_fixture_list(frame, body[0], &app.state);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body[1]);
    let detail = Paragraph::new(detail_text(&app.state))
        .block(Block::default().title("Fixture").borders(Borders::ALL));
    frame.render_widget(detail, side[0]);
    let slip = Paragraph::new(slip_text(app))
        .block(Block::default().title("Bet Slip").borders(Borders::ALL));
    frame.render_widget(slip, side[1]);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "j/k Move | 1/2/3 H/D/A | o/u O/U | y/n BTTS | x Remove | g Book | l League | m Bookie | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let criteria = app.state.criteria();
    let odds = match (criteria.odds_min, criteria.odds_max) {
        (Some(min), Some(max)) => format!("{min:.2}-{max:.2}"),
        _ => "any".to_string(),
    };
    let leagues = if criteria.leagues.is_empty() {
        "All leagues".to_string()
    } else {
        criteria.leagues.join(", ")
    };
    let bookmakers = if criteria.bookmakers.is_empty() {
        "All bookmakers".to_string()
    } else {
        criteria.bookmakers.join(", ")
    };
    let line1 = format!(
        " BETSCORE | {} of {} fixtures",
        app.state.filtered_fixtures().len(),
        app.state.fixtures().len()
    );
    let line2 = format!(
        " Odds {odds} | {leagues} | {bookmakers} | Form {}% / H2H {}%",
        criteria.weights.form(),
        criteria.weights.h2h()
    );
    format!("{line1}\n{line2}")
}

fn render_fixture_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Fixtures").borders(Borders::ALL);
    let list_area = block.inner(area);
    frame.render_widget(block, area);

    let fixtures = state.filtered_fixtures();
    if fixtures.is_empty() {
        let empty = Paragraph::new("No matches found. Try adjusting your filters.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    const ROW_HEIGHT: u16 = 2;
    if list_area.height < ROW_HEIGHT {
        return;
    }
    let visible = (list_area.height / ROW_HEIGHT) as usize;
    let (start, end) = visible_range(state.selected, fixtures.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + (i as u16) * ROW_HEIGHT,
            width: list_area.width,
            height: ROW_HEIGHT,
        };
        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(24), Constraint::Length(16)])
            .split(row_area);

        let m = &fixtures[idx];
        let marker = if state.is_selected(&m.id) { "*" } else { " " };
        let text = format!(
            "{marker} {} {}\n  {} | {}",
            m.kickoff.format("%b %d %H:%M"),
            m.label(),
            m.league,
            confidence_label(m.prediction.confidence)
        );
        frame.render_widget(Paragraph::new(text).style(row_style), cols[0]);
        frame.render_widget(win_bar_chart(&m.prediction, selected), cols[1]);
    }
}

fn win_bar_chart(prediction: &Prediction, selected: bool) -> BarChart<'static> {
    let base_bg = if selected { Some(Color::DarkGray) } else { None };

    let mut home_style = Style::default().fg(Color::Green);
    let mut draw_style = Style::default().fg(Color::Yellow);
    let mut away_style = Style::default().fg(Color::Red);
    if let Some(bg) = base_bg {
        home_style = home_style.bg(bg);
        draw_style = draw_style.bg(bg);
        away_style = away_style.bg(bg);
    }

    let bar = |value: f64, style: Style| {
        Bar::default()
            .value(value.round() as u64)
            .text_value(String::new())
            .style(style)
    };

    BarChart::default()
        .data(BarGroup::default().bars(&[
            bar(prediction.home_win, home_style),
            bar(prediction.draw, draw_style),
            bar(prediction.away_win, away_style),
        ]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(100)
}

fn detail_text(state: &AppState) -> String {
    let Some(m) = state.selected_fixture() else {
        return "No fixture selected".to_string();
    };
    let p = &m.prediction;
    let b = &p.breakdown;
    let favourite = p.favourite().map(Outcome::label).unwrap_or("none");
    let mut lines = vec![
        format!("{} vs {}", m.home_team.name, m.away_team.name),
        format!("{} | {}", m.league, m.kickoff.format("%Y-%m-%d %H:%M UTC")),
        format!(
            "Form: {} ({}) vs {} ({})",
            m.home_form.form_string(),
            m.home_form.games_played,
            m.away_form.form_string(),
            m.away_form.games_played
        ),
        format!(
            "H2H: {}-{}-{} of {} [{}]",
            m.h2h.home_wins,
            m.h2h.draws,
            m.h2h.away_wins,
            m.h2h.total_meetings,
            m.h2h.results_string()
        ),
        String::new(),
        format!(
            "Prediction H {:.1}% D {:.1}% A {:.1}% | {} | fav {favourite}",
            p.home_win,
            p.draw,
            p.away_win,
            confidence_label(p.confidence)
        ),
        format!(
            "  Form {:.1} vs {:.1} (w {}%)",
            b.form.home,
            b.form.away,
            b.weights.form()
        ),
        format!(
            "  H2H {:.1} vs {:.1} (w {}%)",
            b.h2h.home,
            b.h2h.away,
            b.weights.h2h()
        ),
        String::new(),
    ];
    for (market, outcomes) in [
        (Market::H2h, [Outcome::Home, Outcome::Draw, Outcome::Away].as_slice()),
        (Market::OverUnder25, [Outcome::Over, Outcome::Under].as_slice()),
        (Market::Btts, [Outcome::Yes, Outcome::No].as_slice()),
    ] {
        if !m.odds.offers(market) {
            continue;
        }
        let prices = outcomes
            .iter()
            .filter_map(|o| m.odds.price(*o).map(|price| format!("{} {price:.2}", o.label())))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(format!("{}: {prices}", market_label(market)));
    }
    lines.push(format!("Bookmakers: {}", m.bookmakers.join(", ")));
    lines.join("\n")
}

fn slip_text(app: &App) -> String {
    let state = &app.state;
    if let Some(code) = state.booking_code() {
        let mut lines = vec![
            format!("Booking code: {}", code.code),
            format!("Bookmaker: {}", code.bookmaker),
            format!(
                "Total odds: {} ({} selections)",
                code.total_odds_display(),
                code.selections.len()
            ),
            String::new(),
        ];
        lines.extend(code.selections.iter().map(selection_line));
        lines.push(String::new());
        lines.push("X Clear code | G Regenerate | N New slip".to_string());
        return lines.join("\n");
    }

    let selections = state.selections();
    if selections.is_empty() {
        return "No selections yet\nSelect outcomes from the list to build a slip".to_string();
    }
    let mut lines = selections.iter().map(selection_line).collect::<Vec<_>>();
    lines.push(String::new());
    if let Some(total) = state.total_odds() {
        lines.push(format!("Total odds: {total:.2} ({} selections)", selections.len()));
    }
    lines.push(format!(
        "Book with: {} (b to change)",
        BOOKMAKERS[app.booking_bookmaker]
    ));
    lines.join("\n")
}

fn selection_line(s: &BettingSelection) -> String {
    format!(
        "{} | {} {} @ {:.2}",
        s.fixture.label(),
        market_label(s.market),
        s.outcome.label(),
        s.odds
    )
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "BetScore - Help",
        "",
        "Fixtures:",
        "  j/k or ↑/↓   Move",
        "  1 / 2 / 3    Home / Draw / Away",
        "  o / u        Over / Under 2.5",
        "  y / n        BTTS yes / no",
        "  x            Remove fixture from slip",
        "  c            Clear slip",
        "",
        "Filters:",
        "  l / m        Cycle league / bookmaker",
        "  [ / ]        Odds min down / up",
        "  { / }        Odds max down / up",
        "  - / +        Form weight down / up",
        "",
        "Booking:",
        "  b            Change bookmaker",
        "  g / G        Generate / regenerate code",
        "  X / N        Clear code / new slip",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
