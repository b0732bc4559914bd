use anyhow::{Context, bail};
use chrono::Utc;

use betscore::config::AppConfig;
use betscore::state::{AppState, Confidence, Delta, FilterUpdate, Match, apply_delta};
use betscore::{feed_file, logging};

#[derive(Debug, Default)]
struct Args {
    leagues: Vec<String>,
    bookmakers: Vec<String>,
    book_with: Option<String>,
    picks: usize,
    json: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        picks: 3,
        ..Args::default()
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--league" => args.leagues.push(it.next().context("--league needs a value")?),
            "--bookmaker" => args
                .bookmakers
                .push(it.next().context("--bookmaker needs a value")?),
            "--book" => args.book_with = Some(it.next().context("--book needs a bookmaker")?),
            "--picks" => {
                args.picks = it
                    .next()
                    .context("--picks needs a number")?
                    .parse()
                    .context("--picks must be a number")?;
            }
            "--json" => args.json = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let mut config = AppConfig::load();
    // Headless runs log to stderr unless a file is asked for explicitly.
    if std::env::var("BETSCORE_LOG_FILE").is_err() {
        config.logging.file = None;
    }
    logging::init(&config.logging)?;

    let mut state = AppState::from_config(&config);
    apply_delta(
        &mut state,
        Delta::SetFixtures(feed_file::fixture_universe(&config, Utc::now())?),
    );
    state.update_filter_criteria(FilterUpdate {
        leagues: Some(args.leagues.clone()),
        bookmakers: Some(args.bookmakers.clone()),
        ..FilterUpdate::default()
    })?;

    let shortlist = state.filtered_fixtures().to_vec();
    if !args.json {
        println!(
            "{} of {} fixtures pass the filters",
            shortlist.len(),
            state.fixtures().len()
        );
        for m in &shortlist {
            print_fixture(m);
        }
    }

    let Some(bookmaker) = args.book_with.as_deref() else {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&shortlist)?);
        }
        return Ok(());
    };

    for m in ranked_favourites(&shortlist).into_iter().take(args.picks) {
        let Some(outcome) = m.prediction.favourite() else {
            continue;
        };
        let Some(odds) = m.odds.price(outcome) else {
            continue;
        };
        state.select_outcome(&m.id, m, outcome.market(), outcome, odds)?;
    }

    let code = state.generate_booking_code(bookmaker)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(code)?);
    } else {
        println!();
        println!("Booking code: {}", code.code);
        println!("Bookmaker:    {}", code.bookmaker);
        println!("Total odds:   {}", code.total_odds_display());
        for s in &code.selections {
            println!("  {} {} @ {:.2}", s.fixture.label(), s.outcome.label(), s.odds);
        }
    }
    Ok(())
}

// Highest confidence first, then the strongest favourite.
fn ranked_favourites(fixtures: &[Match]) -> Vec<&Match> {
    let mut ranked = fixtures
        .iter()
        .filter(|m| m.prediction.favourite().is_some())
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| {
        confidence_rank(b.prediction.confidence)
            .cmp(&confidence_rank(a.prediction.confidence))
            .then(top_probability(b).total_cmp(&top_probability(a)))
    });
    ranked
}

fn confidence_rank(confidence: Confidence) -> u8 {
    match confidence {
        Confidence::Low => 0,
        Confidence::Medium => 1,
        Confidence::High => 2,
    }
}

fn top_probability(m: &Match) -> f64 {
    let p = &m.prediction;
    p.home_win.max(p.draw).max(p.away_win)
}

fn print_fixture(m: &Match) {
    let p = &m.prediction;
    println!(
        "{:<10} {:<16} {:<18} H {:>4.1}% D {:>4.1}% A {:>4.1}%  {:?}",
        m.id,
        m.label(),
        m.league,
        p.home_win,
        p.draw,
        p.away_win,
        p.confidence
    );
}
