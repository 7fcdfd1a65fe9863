//! Daily and all-time high scores
//!
//! Persisted through a `KeyValueStore` under three string keys. The daily
//! best resets whenever the stored play date is not today.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, parse_score};

pub const ALL_TIME_KEY: &str = "motorcycleAllTimeHighScore";
pub const DAILY_KEY: &str = "motorcycleDailyHighScore";
pub const LAST_PLAY_DATE_KEY: &str = "motorcycleLastPlayDate";

/// Which records a finished run beat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewRecords {
    pub daily: bool,
    pub all_time: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    pub all_time: u64,
    pub daily: u64,
    /// Date the daily best belongs to
    pub last_played: String,
}

impl HighScores {
    /// Load from the store; a stale play date resets the daily best
    pub fn load(store: &mut dyn KeyValueStore, today: &str) -> Self {
        let all_time = parse_score(store.get(ALL_TIME_KEY).as_deref());
        let last_played = store.get(LAST_PLAY_DATE_KEY);

        let daily = if last_played.as_deref() == Some(today) {
            parse_score(store.get(DAILY_KEY).as_deref())
        } else {
            log::info!("New play day {}, daily best reset", today);
            if let Err(e) = Self::write_daily(store, today, 0) {
                log::warn!("Could not reset daily high score: {}", e);
            }
            0
        };

        log::info!("High scores loaded: today {}, ever {}", daily, all_time);
        Self {
            all_time,
            daily,
            last_played: today.to_string(),
        }
    }

    fn write_daily(store: &mut dyn KeyValueStore, today: &str, daily: u64) -> Result<(), StorageError> {
        store.set(LAST_PLAY_DATE_KEY, today)?;
        store.set(DAILY_KEY, &daily.to_string())
    }

    /// Fold a finished run's score in, persisting any record it beat
    pub fn record(&mut self, score: u64, store: &mut dyn KeyValueStore) -> NewRecords {
        let mut records = NewRecords::default();

        if score > self.daily {
            self.daily = score;
            records.daily = true;
            if let Err(e) = Self::write_daily(store, &self.last_played, score) {
                log::warn!("Could not save daily high score: {}", e);
            }
        }

        if score > self.all_time {
            self.all_time = score;
            records.all_time = true;
            if let Err(e) = store.set(ALL_TIME_KEY, &score.to_string()) {
                log::warn!("Could not save all-time high score: {}", e);
            }
        }

        if records.all_time {
            log::info!("New all-time high score: {}", score);
        } else if records.daily {
            log::info!("New daily high score: {}", score);
        }
        records
    }
}
