use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An N-sided fair die, characterized only by its face count.
///
/// Face counts are validated on construction, so every `DieSpec` in the
/// program can be rolled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u32", into = "u32")]
#[display("d{sides}")]
pub struct DieSpec {
    sides: u32,
}

impl DieSpec {
    pub const MIN_SIDES: u32 = 2;
    pub const MAX_SIDES: u32 = 100;

    pub const D4: DieSpec = DieSpec { sides: 4 };
    pub const D6: DieSpec = DieSpec { sides: 6 };
    pub const D8: DieSpec = DieSpec { sides: 8 };
    pub const D10: DieSpec = DieSpec { sides: 10 };
    pub const D12: DieSpec = DieSpec { sides: 12 };
    pub const D20: DieSpec = DieSpec { sides: 20 };

    pub fn new(sides: u32) -> Result<Self> {
        if (Self::MIN_SIDES..=Self::MAX_SIDES).contains(&sides) {
            Ok(Self { sides })
        } else {
            Err(Error::InvalidDie {
                sides,
                min: Self::MIN_SIDES,
                max: Self::MAX_SIDES,
            })
        }
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Short label such as `"d20"`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl TryFrom<u32> for DieSpec {
    type Error = Error;

    fn try_from(sides: u32) -> Result<Self> {
        Self::new(sides)
    }
}

impl From<DieSpec> for u32 {
    fn from(die: DieSpec) -> Self {
        die.sides
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    #[default]
    Normal,
    /// Roll twice, keep the higher draw.
    Blessed,
    /// Roll twice, keep the lower draw.
    Cursed,
}

impl RollMode {
    pub fn is_dual(&self) -> bool {
        !matches!(self, RollMode::Normal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RollMode::Normal => "Normal",
            RollMode::Blessed => "Blessed",
            RollMode::Cursed => "Cursed",
        }
    }
}

/// Raw draws produced by the roll engine, before any bonus is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    pub primary: u32,
    /// The draw that was discarded by a blessed or cursed roll.
    pub secondary: Option<u32>,
}

impl RollOutcome {
    pub fn single(value: u32) -> Self {
        Self {
            primary: value,
            secondary: None,
        }
    }

    /// Resolves two draws according to `mode`. Normal mode keeps the first
    /// draw and discards the second entirely.
    pub fn resolve(mode: RollMode, first: u32, second: u32) -> Self {
        match mode {
            RollMode::Normal => Self::single(first),
            RollMode::Blessed => Self {
                primary: first.max(second),
                secondary: Some(first.min(second)),
            },
            RollMode::Cursed => Self {
                primary: first.min(second),
                secondary: Some(first.max(second)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_spec_range() {
        assert!(DieSpec::new(1).is_err());
        assert!(DieSpec::new(0).is_err());
        assert!(DieSpec::new(101).is_err());
        assert_eq!(DieSpec::new(2).unwrap().sides(), 2);
        assert_eq!(DieSpec::new(100).unwrap().sides(), 100);
    }

    #[test]
    fn test_die_spec_name() {
        assert_eq!(DieSpec::D20.name(), "d20");
        assert_eq!(DieSpec::new(37).unwrap().name(), "d37");
    }

    #[test]
    fn test_die_spec_deserialize_validates() {
        let die: DieSpec = serde_json::from_str("8").unwrap();
        assert_eq!(die, DieSpec::D8);
        assert!(serde_json::from_str::<DieSpec>("1").is_err());
        assert_eq!(serde_json::to_string(&DieSpec::D6).unwrap(), "6");
    }

    #[test]
    fn test_resolve_modes() {
        assert_eq!(RollOutcome::resolve(RollMode::Normal, 7, 15), RollOutcome::single(7));

        let blessed = RollOutcome::resolve(RollMode::Blessed, 7, 15);
        assert_eq!(blessed.primary, 15);
        assert_eq!(blessed.secondary, Some(7));

        let cursed = RollOutcome::resolve(RollMode::Cursed, 7, 15);
        assert_eq!(cursed.primary, 7);
        assert_eq!(cursed.secondary, Some(15));

        let tie = RollOutcome::resolve(RollMode::Blessed, 9, 9);
        assert_eq!(tie.primary, 9);
        assert_eq!(tie.secondary, Some(9));
    }

    #[test]
    fn test_roll_mode_serde() {
        assert_eq!(serde_json::to_string(&RollMode::Blessed).unwrap(), "\"blessed\"");
        let mode: RollMode = serde_json::from_str("\"cursed\"").unwrap();
        assert_eq!(mode, RollMode::Cursed);
    }
}
