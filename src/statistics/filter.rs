use chrono::{DateTime, Datelike, TimeZone};

use crate::rules::{
    dice::DieSpec,
    record::{RollRecord, Timestamp},
};

/// Calendar window relative to "now", evaluated in the time zone of `now`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TimePeriod {
    Today,
    /// Same ISO week.
    Week,
    Month,
    #[default]
    All,
}

impl TimePeriod {
    pub fn contains<Tz: TimeZone>(&self, timestamp: Timestamp, now: &DateTime<Tz>) -> bool {
        let local = timestamp.with_timezone(&now.timezone());
        match self {
            TimePeriod::Today => local.date_naive() == now.date_naive(),
            TimePeriod::Week => local.iso_week() == now.iso_week(),
            TimePeriod::Month => local.year() == now.year() && local.month() == now.month(),
            TimePeriod::All => true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordFilter {
    pub period: TimePeriod,
    pub die: Option<DieSpec>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period: TimePeriod) -> Self {
        self.period = period;
        self
    }

    pub fn die(mut self, die: DieSpec) -> Self {
        self.die = Some(die);
        self
    }

    pub fn matches<Tz: TimeZone>(&self, record: &RollRecord, now: &DateTime<Tz>) -> bool {
        self.die.is_none_or(|die| record.die() == die)
            && self.period.contains(record.timestamp(), now)
    }

    /// Keeps the matching records in their original order.
    pub fn apply<'a, Tz: TimeZone>(
        &self,
        records: impl IntoIterator<Item = &'a RollRecord>,
        now: &DateTime<Tz>,
    ) -> Vec<&'a RollRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record, now))
            .collect()
    }
}
