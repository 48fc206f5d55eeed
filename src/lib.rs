pub mod config;
pub mod error;
pub mod history;
pub mod roll_parser;
pub mod rules;
pub mod session;
pub mod statistics;
pub mod utils;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::{
        config::Config,
        error::{Error, Result},
        history::{
            RollHistory, RollLog,
            companion::CompanionSnapshot,
            storage::{JsonFileStore, KeyValueStore, MemoryStore},
        },
        roll_parser::{RollRequest, parse_die, parse_roll},
        rules::{
            dice::{DieSpec, RollMode, RollOutcome},
            record::{RollId, RollRecord, RollRecordBuilder, Timestamp},
        },
        session::RollSession,
        statistics::{
            basic::{BasicStatistics, basic_statistics},
            detailed::{DetailedStatistics, detailed_statistics},
            filter::{RecordFilter, TimePeriod},
            roller::Roller,
        },
    };
}
