use chrono::{DateTime, Utc};

use crate::error::{EngineError, Result};
use crate::state::{BettingSelection, BookingCode};

const CODE_PREFIX: &str = "BET";
const BOOKMAKER_PREFIX_LEN: usize = 3;

/// Builds a booking code stamped with `created_at` in Unix milliseconds.
pub fn generate(
    snapshot: &[BettingSelection],
    bookmaker: &str,
    created_at: DateTime<Utc>,
) -> Result<BookingCode> {
    generate_stamped(snapshot, bookmaker, created_at.timestamp_millis(), created_at)
}

/// Same as [`generate`] with an explicit code stamp, so a caller can keep
/// stamps strictly increasing.
pub fn generate_stamped(
    snapshot: &[BettingSelection],
    bookmaker: &str,
    stamp_ms: i64,
    created_at: DateTime<Utc>,
) -> Result<BookingCode> {
    if snapshot.is_empty() {
        return Err(EngineError::EmptySelection);
    }
    let bookmaker = bookmaker.trim();
    if bookmaker.is_empty() {
        return Err(EngineError::EmptyBookmaker);
    }

    let code = format!(
        "{CODE_PREFIX}-{}-{}",
        bookmaker_prefix(bookmaker),
        to_base36(stamp_ms.max(0) as u64)
    );

    Ok(BookingCode {
        code,
        bookmaker: bookmaker.to_string(),
        selections: snapshot.to_vec(),
        total_odds: snapshot.iter().map(|s| s.odds).product(),
        created_at,
    })
}

pub fn bookmaker_prefix(bookmaker: &str) -> String {
    bookmaker
        .to_uppercase()
        .chars()
        .take(BOOKMAKER_PREFIX_LEN)
        .collect()
}

pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(13);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Hands out strictly increasing millisecond stamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeClock {
    last_ms: Option<i64>,
}

impl CodeClock {
    /// Stamp the next code would get; nothing is recorded until [`commit`].
    ///
    /// [`commit`]: CodeClock::commit
    pub fn peek(&self, now: DateTime<Utc>) -> i64 {
        let ms = now.timestamp_millis();
        match self.last_ms {
            Some(last) if ms <= last => last + 1,
            _ => ms,
        }
    }

    pub fn commit(&mut self, stamp_ms: i64) {
        self.last_ms = Some(self.last_ms.map_or(stamp_ms, |last| last.max(stamp_ms)));
    }
}
