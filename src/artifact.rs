use chrono::{Local, NaiveDateTime, Utc};
use serde::Deserialize;

/// Wall clock used to stamp output names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clock {
    /// Local time of the machine running the pipeline.
    #[default]
    Local,
    Utc,
}

impl Clock {
    pub fn now(self) -> NaiveDateTime {
        match self {
            Clock::Local => Local::now().naive_local(),
            Clock::Utc => Utc::now().naive_utc(),
        }
    }
}

/// `processed_<YYYYMMDD_HHMMSS>.csv`. Two calls within the same second yield
/// the same name.
pub fn artifact_name(at: NaiveDateTime) -> String {
    format!("processed_{}.csv", at.format("%Y%m%d_%H%M%S"))
}
