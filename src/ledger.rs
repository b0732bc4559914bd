use crate::state::BettingSelection;

/// At most one selection per fixture, kept in first-selection order.
#[derive(Debug, Clone, Default)]
pub struct SelectionLedger {
    entries: Vec<BettingSelection>,
}

impl SelectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `selection.fixture_id`, returning the
    /// replaced selection. A replacement keeps its slot.
    pub fn select(&mut self, selection: BettingSelection) -> Option<BettingSelection> {
        match self
            .entries
            .iter_mut()
            .find(|s| s.fixture_id == selection.fixture_id)
        {
            Some(slot) => Some(std::mem::replace(slot, selection)),
            None => {
                self.entries.push(selection);
                None
            }
        }
    }

    pub fn deselect(&mut self, fixture_id: &str) -> Option<BettingSelection> {
        let idx = self.entries.iter().position(|s| s.fixture_id == fixture_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Product of all locked-in odds; 1.0 for an empty ledger.
    pub fn total_odds(&self) -> f64 {
        self.entries.iter().map(|s| s.odds).product()
    }

    pub fn get(&self, fixture_id: &str) -> Option<&BettingSelection> {
        self.entries.iter().find(|s| s.fixture_id == fixture_id)
    }

    pub fn contains(&self, fixture_id: &str) -> bool {
        self.get(fixture_id).is_some()
    }

    pub fn snapshot(&self) -> &[BettingSelection] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_feed;
    use crate::state::{Market, Outcome, PredictionWeights};
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn selection(id: &str, outcome: Outcome, odds: f64) -> BettingSelection {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut fixture = fake_feed::generate_fixtures(1, now, PredictionWeights::default(), &mut rng)
            .remove(0);
        fixture.id = id.to_string();
        BettingSelection {
            fixture_id: id.to_string(),
            fixture,
            market: Market::H2h,
            outcome,
            odds,
        }
    }

    #[test]
    fn replacement_keeps_position() {
        let mut ledger = SelectionLedger::new();
        ledger.select(selection("m1", Outcome::Home, 1.8));
        ledger.select(selection("m2", Outcome::Away, 2.1));
        let old = ledger.select(selection("m1", Outcome::Draw, 3.3));

        assert_eq!(old.map(|s| s.outcome), Some(Outcome::Home));
        let ids: Vec<_> = ledger.snapshot().iter().map(|s| s.fixture_id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
        assert_eq!(ledger.snapshot()[0].outcome, Outcome::Draw);
    }

    #[test]
    fn empty_ledger_total_is_identity() {
        assert_eq!(SelectionLedger::new().total_odds(), 1.0);
    }

    #[test]
    fn deselect_missing_is_noop() {
        let mut ledger = SelectionLedger::new();
        ledger.select(selection("m1", Outcome::Home, 1.8));
        assert!(ledger.deselect("nope").is_none());
        assert_eq!(ledger.len(), 1);
    }
}
