use std::collections::BTreeMap;

use chrono::{TimeZone, Timelike};
use rustc_hash::FxHashSet;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::{
    rules::{
        dice::{DieSpec, RollMode},
        record::RollRecord,
    },
    statistics::basic::{BasicStatistics, basic_statistics},
};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub count: usize,
    pub average_base_roll: f64,
    pub success_rate: f64,
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    total: i64,
    successes: usize,
}

impl Accumulator {
    fn add(&mut self, record: &RollRecord) {
        self.count += 1;
        self.total += record.base_roll() as i64;
        if record.is_success() {
            self.successes += 1;
        }
    }

    fn finish(&self) -> Performance {
        if self.count == 0 {
            return Performance::default();
        }
        Performance {
            count: self.count,
            average_base_roll: self.total as f64 / self.count as f64,
            success_rate: self.successes as f64 / self.count as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiePerformance {
    pub die: DieSpec,
    #[serde(flatten)]
    pub performance: Performance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModePerformance {
    pub mode: RollMode,
    #[serde(flatten)]
    pub performance: Performance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedStatistics {
    #[serde(flatten)]
    pub basic: BasicStatistics,
    /// Fraction of rolls in `0.0..=1.0` whose base roll beat half the die.
    pub success_rate: f64,
    /// Population standard deviation of the base rolls.
    pub standard_deviation: f64,
    /// Base roll value -> number of rolls.
    pub distribution: BTreeMap<i32, usize>,
    /// Ordered by face count.
    pub per_die: Vec<DiePerformance>,
    /// Ordered normal, blessed, cursed; modes never used are omitted.
    pub per_mode: Vec<ModePerformance>,
    pub most_active_hour: Option<u32>,
    pub average_rolls_per_day: f64,
    pub longest_success_streak: usize,
    pub longest_failure_streak: usize,
}

impl Default for DetailedStatistics {
    fn default() -> Self {
        Self {
            basic: BasicStatistics::default(),
            success_rate: 0.0,
            standard_deviation: 0.0,
            distribution: BTreeMap::new(),
            per_die: Vec::new(),
            per_mode: Vec::new(),
            most_active_hour: None,
            average_rolls_per_day: 0.0,
            longest_success_streak: 0,
            longest_failure_streak: 0,
        }
    }
}

/// Computes every derived view over `records`. Hours and calendar days are
/// taken in `tz`; streaks replay the records oldest first.
pub fn detailed_statistics<'a, Tz: TimeZone>(
    records: impl IntoIterator<Item = &'a RollRecord>,
    tz: &Tz,
) -> DetailedStatistics {
    let records: Vec<&RollRecord> = records.into_iter().collect();
    if records.is_empty() {
        return DetailedStatistics::default();
    }

    let mut overall = Accumulator::default();
    let mut per_die: BTreeMap<DieSpec, Accumulator> = BTreeMap::new();
    let mut per_mode: BTreeMap<RollMode, Accumulator> = BTreeMap::new();
    let mut distribution = BTreeMap::new();
    let mut hours = [0usize; 24];
    let mut days = FxHashSet::default();

    for record in &records {
        overall.add(record);
        per_die.entry(record.die()).or_default().add(record);
        per_mode.entry(record.roll_mode()).or_default().add(record);
        *distribution.entry(record.base_roll()).or_insert(0) += 1;

        let local = record.timestamp().with_timezone(tz);
        hours[local.hour() as usize] += 1;
        days.insert(local.date_naive());
    }

    let (longest_success_streak, longest_failure_streak) = longest_streaks(&records);

    DetailedStatistics {
        basic: basic_statistics(records.iter().copied()),
        success_rate: overall.finish().success_rate,
        standard_deviation: records
            .iter()
            .map(|r| r.base_roll() as f64)
            .population_std_dev(),
        distribution,
        per_die: per_die
            .into_iter()
            .map(|(die, acc)| DiePerformance {
                die,
                performance: acc.finish(),
            })
            .collect(),
        per_mode: per_mode
            .into_iter()
            .map(|(mode, acc)| ModePerformance {
                mode,
                performance: acc.finish(),
            })
            .collect(),
        most_active_hour: most_active_hour(&hours),
        average_rolls_per_day: records.len() as f64 / days.len() as f64,
        longest_success_streak,
        longest_failure_streak,
    }
}

/// Earliest hour with the highest count, `None` if every count is zero.
fn most_active_hour(hours: &[usize; 24]) -> Option<u32> {
    let mut best: Option<(u32, usize)> = None;
    for (hour, &count) in hours.iter().enumerate() {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((hour as u32, count));
        }
    }
    best.map(|(hour, _)| hour)
}

/// Longest runs of consecutive successes and failures, replayed in
/// chronological order. Records with equal timestamps keep their relative
/// order from a newest-first input.
pub fn longest_streaks(records: &[&RollRecord]) -> (usize, usize) {
    let mut chronological: Vec<&RollRecord> = records.iter().rev().copied().collect();
    chronological.sort_by_key(|r| r.timestamp());

    let mut longest_success: usize = 0;
    let mut longest_failure: usize = 0;
    let mut current_success: usize = 0;
    let mut current_failure: usize = 0;

    for record in chronological {
        if record.is_success() {
            current_success += 1;
            current_failure = 0;
            longest_success = longest_success.max(current_success);
        } else {
            current_failure += 1;
            current_success = 0;
            longest_failure = longest_failure.max(current_failure);
        }
    }

    (longest_success, longest_failure)
}

impl DetailedStatistics {
    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        self.basic.pretty_print(f)?;
        writeln!(f, "Success Rate: {:.1}%", self.success_rate * 100.0)?;
        writeln!(f, "Standard Deviation: {:.2}", self.standard_deviation)?;
        writeln!(f, "Longest Success Streak: {}", self.longest_success_streak)?;
        writeln!(f, "Longest Failure Streak: {}", self.longest_failure_streak)?;
        match self.most_active_hour {
            Some(hour) => writeln!(f, "Most Active Hour: {hour:02}:00")?,
            None => writeln!(f, "Most Active Hour: N/A")?,
        }
        writeln!(f, "Rolls Per Day: {:.2}", self.average_rolls_per_day)?;
        Ok(())
    }
}
