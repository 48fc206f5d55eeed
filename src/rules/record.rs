use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rules::dice::{DieSpec, RollMode, RollOutcome};

pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Largest flat bonus, in either direction, a roll may carry.
pub const MAX_BONUS: i32 = 1000;

pub fn bonus_in_range(bonus: i32) -> bool {
    (-MAX_BONUS..=MAX_BONUS).contains(&bonus)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
    Into,
)]
#[serde(transparent)]
pub struct RollId(Uuid);

impl RollId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RollId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single resolved roll. Records are immutable once built.
///
/// `result` is the displayed total, i.e. the kept draw plus the proficiency
/// bonus. Critical and fumble checks always look at the base roll.
///
/// Deserialization rejects records whose totals could not have come from the
/// die, so a tampered history blob is discarded as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredRollRecord")]
pub struct RollRecord {
    id: RollId,
    #[serde(rename = "dieFaces")]
    die: DieSpec,
    result: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_result: Option<i32>,
    roll_mode: RollMode,
    #[serde(default)]
    proficiency_bonus: i32,
    timestamp: Timestamp,
}

impl RollRecord {
    pub fn id(&self) -> RollId {
        self.id
    }

    pub fn die(&self) -> DieSpec {
        self.die
    }

    pub fn result(&self) -> i32 {
        self.result
    }

    pub fn secondary_result(&self) -> Option<i32> {
        self.secondary_result
    }

    pub fn roll_mode(&self) -> RollMode {
        self.roll_mode
    }

    pub fn proficiency_bonus(&self) -> i32 {
        self.proficiency_bonus
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The die outcome before the flat bonus was added.
    pub fn base_roll(&self) -> i32 {
        self.result.saturating_sub(self.proficiency_bonus)
    }

    pub fn is_critical(&self) -> bool {
        self.base_roll() == self.die.sides() as i32
    }

    pub fn is_fumble(&self) -> bool {
        self.base_roll() == 1
    }

    /// A success is a base roll strictly above half the face count.
    pub fn is_success(&self) -> bool {
        2 * i64::from(self.base_roll()) > i64::from(self.die.sides())
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "{}", self.die)?;
        if self.proficiency_bonus > 0 {
            write!(f, "+{}", self.proficiency_bonus)?;
        } else if self.proficiency_bonus < 0 {
            write!(f, "{}", self.proficiency_bonus)?;
        }
        if self.roll_mode.is_dual() {
            write!(f, " ({})", self.roll_mode.label())?;
        }
        write!(f, ": {}", self.result)?;
        if let Some(secondary) = self.secondary_result {
            write!(f, " [other: {}]", secondary)?;
        }
        if self.is_critical() {
            write!(f, " (Critical)")?;
        } else if self.is_fumble() {
            write!(f, " (Fumble)")?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRollRecord {
    id: RollId,
    #[serde(rename = "dieFaces")]
    die: DieSpec,
    result: i32,
    #[serde(default)]
    secondary_result: Option<i32>,
    roll_mode: RollMode,
    #[serde(default)]
    proficiency_bonus: i32,
    timestamp: Timestamp,
}

impl TryFrom<StoredRollRecord> for RollRecord {
    type Error = String;

    fn try_from(stored: StoredRollRecord) -> Result<Self, Self::Error> {
        let bonus = stored.proficiency_bonus;
        if !bonus_in_range(bonus) {
            return Err(format!("proficiency bonus {bonus} is outside -{MAX_BONUS}..={MAX_BONUS}"));
        }
        let faces = stored.die.sides() as i32;
        let check = |total: i32| match total.checked_sub(bonus) {
            Some(base) if (1..=faces).contains(&base) => Ok(()),
            _ => Err(format!("{total} with bonus {bonus} is not a possible {} roll", stored.die)),
        };
        check(stored.result)?;
        if let Some(secondary) = stored.secondary_result {
            check(secondary)?;
        }

        Ok(RollRecord {
            id: stored.id,
            die: stored.die,
            result: stored.result,
            secondary_result: stored.secondary_result,
            roll_mode: stored.roll_mode,
            proficiency_bonus: bonus,
            timestamp: stored.timestamp,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RollRecordBuilder {
    record: RollRecord,
}

impl RollRecordBuilder {
    pub fn new(die: DieSpec) -> Self {
        Self {
            record: RollRecord {
                id: RollId::new(),
                die,
                result: 1,
                secondary_result: None,
                roll_mode: RollMode::Normal,
                proficiency_bonus: 0,
                timestamp: chrono::Utc::now(),
            },
        }
    }

    /// Fills `result` and `secondary_result` from raw draws, applying the
    /// bonus that is currently set on the builder. Totals saturate at the
    /// `i32` bounds.
    pub fn outcome(mut self, mode: RollMode, outcome: RollOutcome) -> Self {
        let bonus = self.record.proficiency_bonus;
        self.record.roll_mode = mode;
        self.record.result = (outcome.primary as i32).saturating_add(bonus);
        self.record.secondary_result = outcome
            .secondary
            .map(|secondary| (secondary as i32).saturating_add(bonus));
        self
    }

    pub fn result(mut self, result: i32) -> Self {
        self.record.result = result;
        self
    }

    pub fn secondary_result(mut self, secondary: i32) -> Self {
        self.record.secondary_result = Some(secondary);
        self
    }

    pub fn roll_mode(mut self, mode: RollMode) -> Self {
        self.record.roll_mode = mode;
        self
    }

    pub fn proficiency_bonus(mut self, bonus: i32) -> Self {
        self.record.proficiency_bonus = bonus;
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.record.timestamp = timestamp;
        self
    }

    pub fn build(self) -> RollRecord {
        self.record
    }
}
