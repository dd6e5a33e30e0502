//! Game clock: maps elapsed wall-clock time onto an in-game day
//!
//! The displayed time of day wraps at midnight. Elapsed-time bookkeeping
//! reads [`GameClock::elapsed_game_seconds`] instead, which never wraps.

use serde::{Deserialize, Serialize};

/// Length of one in-game day in game seconds
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reference conversion: one wall hour is one full game day
pub const DEFAULT_RATE: f64 = 24.0;

/// Night is `[20:00, 06:00)`, wrapping past midnight
pub fn is_night(seconds_of_day: f64) -> bool {
    is_night_between(seconds_of_day, 20, 6)
}

/// Night test with configurable boundaries (start inclusive, end exclusive)
pub fn is_night_between(seconds_of_day: f64, start_hour: u32, end_hour: u32) -> bool {
    let hour = hour_of(seconds_of_day);
    if start_hour > end_hour {
        hour >= start_hour || hour < end_hour
    } else {
        hour >= start_hour && hour < end_hour
    }
}

fn hour_of(seconds_of_day: f64) -> u32 {
    ((seconds_of_day.rem_euclid(SECONDS_PER_DAY) / 3600.0) as u32) % 24
}

/// Format game seconds as `HH:MM`
pub fn format_game_time(seconds_of_day: f64) -> String {
    let s = seconds_of_day.rem_euclid(SECONDS_PER_DAY);
    let hours = hour_of(s);
    let minutes = ((s % 3600.0) / 60.0) as u32;
    format!("{:02}:{:02}", hours, minutes)
}

/// Accelerated time-of-day clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    seconds_of_day: f64,
    elapsed_game_seconds: f64,
    rate: f64,
    night_start_hour: u32,
    night_end_hour: u32,
}

impl GameClock {
    pub fn new(rate: f64) -> Self {
        Self {
            seconds_of_day: 0.0,
            elapsed_game_seconds: 0.0,
            rate,
            night_start_hour: 20,
            night_end_hour: 6,
        }
    }

    pub fn with_night_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.night_start_hour = start_hour;
        self.night_end_hour = end_hour;
        self
    }

    /// Start the clock at a given time of day
    pub fn starting_at(mut self, seconds_of_day: f64) -> Self {
        self.seconds_of_day = seconds_of_day.rem_euclid(SECONDS_PER_DAY);
        self
    }

    /// Fold a wall-clock delta into the time of day and return the new value
    pub fn advance(&mut self, wall_delta_seconds: f64) -> f64 {
        let delta = (wall_delta_seconds * self.rate).max(0.0);
        self.elapsed_game_seconds += delta;
        self.seconds_of_day = (self.seconds_of_day + delta).rem_euclid(SECONDS_PER_DAY);
        self.seconds_of_day
    }

    pub fn seconds_of_day(&self) -> f64 {
        self.seconds_of_day
    }

    /// Game seconds since the clock started, across any number of days
    pub fn elapsed_game_seconds(&self) -> f64 {
        self.elapsed_game_seconds
    }

    pub fn is_night(&self) -> bool {
        is_night_between(
            self.seconds_of_day,
            self.night_start_hour,
            self.night_end_hour,
        )
    }

    pub fn formatted(&self) -> String {
        format_game_time(self.seconds_of_day)
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(DEFAULT_RATE)
    }
}
