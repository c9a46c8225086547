use std::fmt;

use crate::workout::{Workout, WorkoutKind, WorkoutType};

/// One `icon value unit` row of a list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.icon, self.value, self.unit)
    }
}

/// Display-ready form of a workout for the sidebar list.
///
/// Distance, duration, cadence and elevation are printed as stored; pace and
/// speed are rounded to one decimal here and nowhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub workout_type: WorkoutType,
    pub title: String,
    pub details: Vec<Detail>,
}

impl From<&Workout> for ListEntry {
    fn from(w: &Workout) -> Self {
        let workout_type = w.workout_type();
        let mut details = vec![
            Detail::new(workout_type.icon(), w.distance().to_string(), "km"),
            Detail::new("⏱", w.duration().to_string(), "min"),
        ];

        match *w.kind() {
            WorkoutKind::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{:.1}", pace), "min/km"));
                details.push(Detail::new("🦶🏼", cadence.to_string(), "spm"));
            }
            WorkoutKind::Cycling {
                elevation_gain,
                speed,
            } => {
                details.push(Detail::new("⚡️", format!("{:.1}", speed), "km/h"));
                details.push(Detail::new("⛰", elevation_gain.to_string(), "m"));
            }
        }

        Self {
            id: w.id().to_string(),
            workout_type,
            title: w.description().to_string(),
            details,
        }
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for detail in &self.details {
            write!(f, "  {}", detail)?;
        }
        Ok(())
    }
}
