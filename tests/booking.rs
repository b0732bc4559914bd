mod common;

use chrono::{TimeZone, Utc};

use betscore::booking;
use betscore::error::EngineError;
use betscore::state::{AppState, Delta, Market, Outcome, apply_delta};

use common::simple_fixture;

fn noon() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn state_with_slip(prices: &[f64]) -> AppState {
    let mut state = AppState::new();
    let fixtures = (1..=prices.len())
        .map(|i| simple_fixture(&format!("m{i}")))
        .collect::<Vec<_>>();
    apply_delta(&mut state, Delta::SetFixtures(fixtures.clone()));
    for (m, price) in fixtures.iter().zip(prices) {
        state
            .select_outcome(&m.id, m, Market::H2h, Outcome::Home, *price)
            .unwrap();
    }
    state
}

#[test]
fn empty_slip_cannot_be_booked() {
    let mut state = AppState::new();
    assert_eq!(
        state.generate_booking_code_at("Bet365", noon()).unwrap_err(),
        EngineError::EmptySelection
    );
    assert!(state.booking_code().is_none());
}

#[test]
fn code_format_and_snapshot() {
    let mut state = state_with_slip(&[1.8, 2.1, 1.95]);
    let code = state.generate_booking_code_at("Bet365", noon()).unwrap().clone();

    assert_eq!(code.code, "BET-BET-MM7P6YO0");
    assert_eq!(code.bookmaker, "Bet365");
    assert_eq!(code.created_at, noon());
    assert_eq!(code.total_odds_display(), "7.37");
    assert!((code.total_odds - 7.371).abs() < 1e-9);
    assert_eq!(code.selections, state.selections());

    // Booking does not empty the slip.
    assert_eq!(state.selections().len(), 3);
}

#[test]
fn bookmaker_prefix_is_uppercased() {
    let mut state = state_with_slip(&[2.0]);
    let code = state.generate_booking_code_at("1xBet", noon()).unwrap();
    assert!(code.code.starts_with("BET-1XB-"), "{}", code.code);
}

#[test]
fn blank_bookmaker_is_rejected() {
    let mut state = state_with_slip(&[2.0]);
    assert_eq!(
        state.generate_booking_code_at("   ", noon()).unwrap_err(),
        EngineError::EmptyBookmaker
    );
    assert!(state.booking_code().is_none());
}

#[test]
fn active_code_blocks_generation_until_replaced() {
    let mut state = state_with_slip(&[1.5, 2.0]);
    let first = state.generate_booking_code_at("Bet365", noon()).unwrap().code.clone();

    assert_eq!(
        state.generate_booking_code_at("Bet365", noon()).unwrap_err(),
        EngineError::BookingCodeActive(first.clone())
    );

    let second = state
        .regenerate_booking_code_at("Bet365", noon())
        .unwrap()
        .code
        .clone();
    assert_eq!(second, "BET-BET-MM7P6YO1");
    assert_ne!(first, second);
}

#[test]
fn later_snapshot_does_not_change_an_issued_code() {
    let mut state = state_with_slip(&[1.5, 2.0]);
    let issued = state.generate_booking_code_at("Betway", noon()).unwrap().clone();

    state.deselect_outcome("m1");
    assert_eq!(state.booking_code(), Some(&issued));
    assert_eq!(issued.selections.len(), 2);
}

#[test]
fn clearing_code_and_starting_a_new_slip() {
    let mut state = state_with_slip(&[1.5, 2.0]);
    state.generate_booking_code_at("Bet365", noon()).unwrap();

    state.clear_booking_code();
    assert!(state.booking_code().is_none());
    assert_eq!(state.selections().len(), 2);

    state.generate_booking_code_at("Bet365", noon()).unwrap();
    state.start_new_slip();
    assert!(state.booking_code().is_none());
    assert!(state.selections().is_empty());
}

#[test]
fn pure_generation_uses_the_timestamp() {
    let state = state_with_slip(&[2.0]);
    let code = booking::generate(state.selections(), " William Hill ", noon()).unwrap();
    assert_eq!(code.code, "BET-WIL-MM7P6YO0");
    assert_eq!(code.bookmaker, "William Hill");
}
