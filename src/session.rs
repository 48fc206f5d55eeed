use std::time::Duration;

use chrono::{DateTime, TimeZone};

use crate::{
    config::Config,
    error::Result,
    history::{RollHistory, companion::CompanionSnapshot, storage::KeyValueStore},
    roll_parser::RollRequest,
    rules::record::{RollRecord, RollRecordBuilder},
    statistics::{
        basic::{BasicStatistics, basic_statistics},
        detailed::{DetailedStatistics, detailed_statistics},
        filter::RecordFilter,
        roller::Roller,
    },
};

/// Owns everything a front end needs to roll dice: the roller, the persisted
/// history and the store shared with companion surfaces.
pub struct RollSession<H, C> {
    roller: Roller,
    history: RollHistory<H>,
    companion: C,
    reveal_delay: Duration,
}

impl<H: KeyValueStore, C: KeyValueStore> RollSession<H, C> {
    pub fn new(roller: Roller, history_store: H, companion: C, config: &Config) -> Self {
        let history = RollHistory::load(history_store, config.history_capacity);
        log::debug!("Session started with {} roll(s) in history", history.len());
        Self {
            roller,
            history,
            companion,
            reveal_delay: config.reveal_delay(),
        }
    }

    /// Resolves `request`, records it and refreshes the companion entries.
    /// Requests with an out-of-range bonus are rejected before anything is
    /// drawn.
    pub fn roll(&mut self, request: RollRequest) -> Result<RollRecord> {
        request.validate()?;
        let outcome = self.roller.roll_with_mode(request.die, request.mode);
        let record = RollRecordBuilder::new(request.die)
            .proficiency_bonus(request.bonus)
            .outcome(request.mode, outcome)
            .build();

        let mut line = String::from("🎲 ");
        record.pretty_print(&mut line).ok();
        log::info!("{}", line);

        self.history.append(record.clone())?;
        CompanionSnapshot::from_record(&record).write(&mut self.companion)?;
        Ok(record)
    }

    /// Newest-first.
    pub fn history(&self) -> &[RollRecord] {
        self.history.all()
    }

    pub fn clear_history(&mut self) -> Result<()> {
        log::info!("Clearing {} roll(s) from history", self.history.len());
        self.history.clear()
    }

    pub fn statistics<Tz: TimeZone>(
        &self,
        filter: &RecordFilter,
        now: &DateTime<Tz>,
    ) -> BasicStatistics {
        basic_statistics(filter.apply(self.history.all(), now))
    }

    /// Hours and days are bucketed in the time zone of `now`.
    pub fn detailed_statistics<Tz: TimeZone>(
        &self,
        filter: &RecordFilter,
        now: &DateTime<Tz>,
    ) -> DetailedStatistics {
        detailed_statistics(filter.apply(self.history.all(), now), &now.timezone())
    }

    pub fn companion(&self) -> CompanionSnapshot {
        CompanionSnapshot::read(&self.companion)
    }

    /// Cosmetic pause a front end may insert before showing a result. Nothing
    /// in the session waits on it.
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use serde_json::json;

    use crate::{
        Error,
        history::{HISTORY_KEY, storage::MemoryStore},
        roll_parser::parse_roll,
        rules::dice::{DieSpec, RollMode},
        statistics::filter::TimePeriod,
    };

    fn session() -> RollSession<MemoryStore, MemoryStore> {
        RollSession::new(
            Roller::test_rng(),
            MemoryStore::new(),
            MemoryStore::new(),
            &Config::default(),
        )
    }

    #[test]
    fn test_roll_records_and_updates_companion() {
        let mut session = session();
        let request = RollRequest::new(DieSpec::D20)
            .bonus(3)
            .mode(RollMode::Blessed);

        let record = session.roll(request).unwrap();
        assert!((4..=23).contains(&record.result()));
        assert!((1..=20).contains(&record.base_roll()));
        let secondary = record.secondary_result().unwrap();
        assert!(record.result() >= secondary);

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0], record);

        let companion = session.companion();
        assert_eq!(companion.last_result, record.result());
        assert_eq!(companion.last_die_label, "d20");
        assert_eq!(companion.last_roll_time, Some(record.timestamp()));
    }

    #[test]
    fn test_history_bound_through_session() {
        let mut session = session();
        for _ in 0..60 {
            session.roll(RollRequest::new(DieSpec::D6)).unwrap();
        }
        assert_eq!(session.history().len(), 50);
        assert!(session.history.store().get(HISTORY_KEY).is_some());
    }

    #[test]
    fn test_statistics_with_filter() {
        let mut session = session();
        for _ in 0..5 {
            session.roll(RollRequest::new(DieSpec::D20)).unwrap();
        }
        for _ in 0..3 {
            session.roll(RollRequest::new(DieSpec::D4)).unwrap();
        }

        let now = Utc::now();
        let all = session.statistics(&RecordFilter::new(), &now);
        assert_eq!(all.total_rolls, 8);
        assert_eq!(all.most_used_die_name, "d20");

        let d4 = RecordFilter::new().die(DieSpec::D4).period(TimePeriod::All);
        let detailed = session.detailed_statistics(&d4, &now);
        assert_eq!(detailed.basic.total_rolls, 3);
        assert_eq!(detailed.per_die.len(), 1);
        assert_eq!(detailed.per_die[0].die, DieSpec::D4);
    }

    #[test]
    fn test_roll_rejects_oversized_bonus() {
        let mut session = session();
        assert!(parse_roll("d20+2147483647").is_err());

        let request = RollRequest::new(DieSpec::D20).bonus(i32::MAX);
        assert!(matches!(session.roll(request), Err(Error::Parse { .. })));
        assert!(session.history().is_empty());
        assert_eq!(session.companion(), CompanionSnapshot::default());

        let record = session
            .roll(RollRequest::new(DieSpec::D20).bonus(1000))
            .unwrap();
        assert_eq!(record.base_roll(), record.result() - 1000);
    }

    #[test]
    fn test_impossible_persisted_record_loads_empty() {
        let mut store = MemoryStore::new();
        store
            .set(
                HISTORY_KEY,
                json!([{
                    "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                    "dieFaces": 20,
                    "result": i32::MIN,
                    "rollMode": "normal",
                    "proficiencyBonus": 1,
                    "timestamp": "2025-03-01T12:00:00Z",
                }]),
            )
            .unwrap();
        let session = RollSession::new(
            Roller::test_rng(),
            store,
            MemoryStore::new(),
            &Config::default(),
        );

        assert!(session.history().is_empty());
        let stats = session.detailed_statistics(&RecordFilter::new(), &Utc::now());
        assert_eq!(stats.basic.total_rolls, 0);
    }

    #[test]
    fn test_clear_history_keeps_companion() {
        let mut session = session();
        let record = session.roll(RollRequest::new(DieSpec::D12)).unwrap();
        session.clear_history().unwrap();

        assert!(session.history().is_empty());
        assert_eq!(session.statistics(&RecordFilter::new(), &Utc::now()).total_rolls, 0);
        assert_eq!(session.companion().last_result, record.result());
    }
}
