use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::rules::{dice::DieSpec, record::RollRecord};

/// Label reported as the most used die when there are no rolls.
pub const NO_DIE_LABEL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStatistics {
    pub total_rolls: usize,
    pub criticals: usize,
    pub fumbles: usize,
    pub average_base_roll: f64,
    pub highest_base_roll: i32,
    pub lowest_base_roll: i32,
    pub most_used_die_name: String,
}

impl Default for BasicStatistics {
    fn default() -> Self {
        Self {
            total_rolls: 0,
            criticals: 0,
            fumbles: 0,
            average_base_roll: 0.0,
            highest_base_roll: 0,
            lowest_base_roll: 0,
            most_used_die_name: NO_DIE_LABEL.to_string(),
        }
    }
}

impl BasicStatistics {
    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        writeln!(f, "Total Rolls: {}", self.total_rolls)?;
        writeln!(f, "Criticals: {}", self.criticals)?;
        writeln!(f, "Fumbles: {}", self.fumbles)?;
        writeln!(f, "Average Roll: {:.2}", self.average_base_roll)?;
        writeln!(f, "Highest Roll: {}", self.highest_base_roll)?;
        writeln!(f, "Lowest Roll: {}", self.lowest_base_roll)?;
        writeln!(f, "Most Used Die: {}", self.most_used_die_name)?;
        Ok(())
    }
}

pub fn basic_statistics<'a>(records: impl IntoIterator<Item = &'a RollRecord>) -> BasicStatistics {
    let records: Vec<&RollRecord> = records.into_iter().collect();
    if records.is_empty() {
        return BasicStatistics::default();
    }

    let base_rolls: Vec<i32> = records.iter().map(|r| r.base_roll()).collect();
    let total: i64 = base_rolls.iter().map(|&b| b as i64).sum();

    BasicStatistics {
        total_rolls: records.len(),
        criticals: records.iter().filter(|r| r.is_critical()).count(),
        fumbles: records.iter().filter(|r| r.is_fumble()).count(),
        average_base_roll: total as f64 / records.len() as f64,
        highest_base_roll: base_rolls.iter().copied().max().unwrap_or(0),
        lowest_base_roll: base_rolls.iter().copied().min().unwrap_or(0),
        most_used_die_name: most_used_die(&records)
            .map(|die| die.name())
            .unwrap_or_else(|| NO_DIE_LABEL.to_string()),
    }
}

/// The die with the most rolls. Ties go to the die that appears first in
/// `records`.
pub fn most_used_die(records: &[&RollRecord]) -> Option<DieSpec> {
    // die -> (count, index of first occurrence)
    let mut counts: FxHashMap<DieSpec, (usize, usize)> = FxHashMap::default();
    for (index, record) in records.iter().enumerate() {
        counts.entry(record.die()).or_insert((0, index)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(die, _)| die)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::record::RollRecordBuilder;

    fn roll(die: DieSpec, result: i32) -> RollRecord {
        RollRecordBuilder::new(die).result(result).build()
    }

    #[test]
    fn test_empty() {
        let stats = basic_statistics(std::iter::empty());
        assert_eq!(stats.total_rolls, 0);
        assert_eq!(stats.average_base_roll, 0.0);
        assert_eq!(stats.highest_base_roll, 0);
        assert_eq!(stats.lowest_base_roll, 0);
        assert_eq!(stats.most_used_die_name, "N/A");
    }

    #[test]
    fn test_mixed_dice() {
        let records = vec![
            roll(DieSpec::D20, 20),
            roll(DieSpec::D20, 1),
            roll(DieSpec::D20, 10),
            roll(DieSpec::D6, 6),
        ];
        let stats = basic_statistics(&records);
        assert_eq!(stats.total_rolls, 4);
        assert_eq!(stats.criticals, 2);
        assert_eq!(stats.fumbles, 1);
        assert_eq!(stats.highest_base_roll, 20);
        assert_eq!(stats.lowest_base_roll, 1);
        assert_eq!(stats.average_base_roll, 9.25);
        assert_eq!(stats.most_used_die_name, "d20");
    }

    #[test]
    fn test_extremes_ignore_bonus() {
        let records = vec![
            RollRecordBuilder::new(DieSpec::D20)
                .proficiency_bonus(5)
                .result(25)
                .build(),
            RollRecordBuilder::new(DieSpec::D20)
                .proficiency_bonus(5)
                .result(8)
                .build(),
        ];
        let stats = basic_statistics(&records);
        assert_eq!(stats.highest_base_roll, 20);
        assert_eq!(stats.lowest_base_roll, 3);
        assert_eq!(stats.criticals, 1);
    }

    #[test]
    fn test_most_used_tie_goes_to_first_seen() {
        let records = vec![
            roll(DieSpec::D8, 3),
            roll(DieSpec::D12, 3),
            roll(DieSpec::D12, 4),
            roll(DieSpec::D8, 5),
        ];
        assert_eq!(basic_statistics(&records).most_used_die_name, "d8");

        let refs: Vec<&RollRecord> = records.iter().rev().collect();
        assert_eq!(most_used_die(&refs), Some(DieSpec::D8));

        let refs: Vec<&RollRecord> = records[1..].iter().collect();
        assert_eq!(most_used_die(&refs), Some(DieSpec::D12));
    }

    #[test]
    fn test_idempotent() {
        let records = vec![roll(DieSpec::D4, 2), roll(DieSpec::D10, 7)];
        assert_eq!(basic_statistics(&records), basic_statistics(&records));
    }
}
