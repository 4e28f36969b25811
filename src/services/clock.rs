// src/services/clock.rs
use chrono::{Datelike, Utc};
use chrono_tz::Asia::Bangkok;

pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Wall clock in Bangkok time, matching the calendar the Thai sources publish by.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        Utc::now().with_timezone(&Bangkok).year()
    }
}

/// Always reports the same year.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}
