//! Flat "last roll" entries read by companion surfaces such as widgets or a
//! watch app. Each entry is stored under its own key so readers that only care
//! about one value never have to decode the full history.

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    history::storage::{KeyValueStore, load_value, store_value},
    rules::{
        dice::DieSpec,
        record::{RollRecord, Timestamp},
    },
};

pub const LAST_RESULT_KEY: &str = "lastResult";
pub const LAST_DIE_KEY: &str = "lastDieType";
pub const LAST_ROLL_TIME_KEY: &str = "lastRollTime";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionSnapshot {
    pub last_result: i32,
    pub last_die_label: String,
    pub last_roll_time: Option<Timestamp>,
}

impl Default for CompanionSnapshot {
    fn default() -> Self {
        Self {
            last_result: 0,
            last_die_label: DieSpec::D20.name(),
            last_roll_time: None,
        }
    }
}

impl CompanionSnapshot {
    pub fn from_record(record: &RollRecord) -> Self {
        Self {
            last_result: record.result(),
            last_die_label: record.die().name(),
            last_roll_time: Some(record.timestamp()),
        }
    }

    /// Reads the snapshot, falling back to the default for each entry that is
    /// absent or malformed.
    pub fn read(store: &impl KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            last_result: load_value(store, LAST_RESULT_KEY).unwrap_or(defaults.last_result),
            last_die_label: load_value(store, LAST_DIE_KEY).unwrap_or(defaults.last_die_label),
            last_roll_time: load_value(store, LAST_ROLL_TIME_KEY).or(defaults.last_roll_time),
        }
    }

    pub fn write(&self, store: &mut impl KeyValueStore) -> Result<()> {
        store_value(store, LAST_RESULT_KEY, &self.last_result)?;
        store_value(store, LAST_DIE_KEY, &self.last_die_label)?;
        match &self.last_roll_time {
            Some(time) => store_value(store, LAST_ROLL_TIME_KEY, time)?,
            None => store.remove(LAST_ROLL_TIME_KEY)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::{history::storage::MemoryStore, rules::record::RollRecordBuilder};

    #[test]
    fn test_defaults_when_absent() {
        let store = MemoryStore::new();
        let snapshot = CompanionSnapshot::read(&store);
        assert_eq!(snapshot, CompanionSnapshot::default());
        assert_eq!(snapshot.last_die_label, "d20");
    }

    #[test]
    fn test_write_then_read() {
        let time = Utc.with_ymd_and_hms(2025, 6, 2, 18, 30, 0).unwrap();
        let record = RollRecordBuilder::new(DieSpec::D8)
            .proficiency_bonus(2)
            .result(9)
            .timestamp(time)
            .build();

        let mut store = MemoryStore::new();
        CompanionSnapshot::from_record(&record).write(&mut store).unwrap();

        assert_eq!(store.get(LAST_RESULT_KEY), Some(json!(9)));
        assert_eq!(store.get(LAST_DIE_KEY), Some(json!("d8")));

        let snapshot = CompanionSnapshot::read(&store);
        assert_eq!(snapshot.last_result, 9);
        assert_eq!(snapshot.last_die_label, "d8");
        assert_eq!(snapshot.last_roll_time, Some(time));
    }

    #[test]
    fn test_malformed_entry_falls_back_individually() {
        let mut store = MemoryStore::new();
        store.set(LAST_RESULT_KEY, json!("seventeen")).unwrap();
        store.set(LAST_DIE_KEY, json!("d6")).unwrap();

        let snapshot = CompanionSnapshot::read(&store);
        assert_eq!(snapshot.last_result, 0);
        assert_eq!(snapshot.last_die_label, "d6");
        assert!(snapshot.last_roll_time.is_none());
    }
}
