use super::PeriodId;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recurring time slot. `name` (not `id`) carries policy meaning: the
/// course-period restriction table keys on names like "R1"/"G1", not ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub day_of_week: u8,
}

impl Period {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Period {
            id: PeriodId(id.into()),
            name: name.into(),
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            day_of_week: 0,
        }
    }

    pub fn day_name(&self) -> &'static str {
        const DAYS: [&str; 7] = [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ];
        DAYS[(self.day_of_week as usize).min(6)]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}-{}",
            self.name,
            self.day_name(),
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_period_is_8_to_9_day_0() {
        let p = Period::new("p1", "R1");
        assert_eq!(p.start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(p.day_name(), "Monday");
    }
}
