use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::geo::Coords;

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkoutType {
    #[default]
    #[serde(alias = "running")]
    Running,
    #[serde(alias = "cycling")]
    Cycling,
}

impl WorkoutType {
    pub fn name(self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutType::Running => "🏃‍♂️",
            WorkoutType::Cycling => "🚴",
        }
    }

    /// Lowercase style class, `running` or `cycling`.
    pub fn css_class(self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            WorkoutType::Running => WorkoutType::Cycling,
            WorkoutType::Cycling => WorkoutType::Running,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variant payload. Serialised inline next to the common fields with a
/// `type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkoutKind {
    #[serde(alias = "running")]
    Running {
        /// Steps per minute.
        cadence: f64,
        /// Minutes per kilometre.
        #[serde(deserialize_with = "rate_or_infinite")]
        pace: f64,
    },
    #[serde(alias = "cycling")]
    Cycling {
        /// Metres; negative values record a net descent.
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// Kilometres per hour.
        #[serde(deserialize_with = "rate_or_infinite")]
        speed: f64,
    },
}

/// A rate divided by a zero distance or duration is written out as `null`.
fn rate_or_infinite<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl WorkoutKind {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: String,
    date: DateTime<Utc>,
    distance: f64,
    duration: f64,
    coordinates: Coords,
    #[serde(alias = "Description")]
    description: String,
    #[serde(flatten)]
    kind: WorkoutKind,
}

impl Workout {
    pub fn running(distance: f64, duration: f64, coordinates: Coords, cadence: f64) -> Self {
        Self::running_at(Utc::now(), distance, duration, coordinates, cadence)
    }

    pub fn cycling(distance: f64, duration: f64, coordinates: Coords, elevation_gain: f64) -> Self {
        Self::cycling_at(Utc::now(), distance, duration, coordinates, elevation_gain)
    }

    pub fn running_at(
        date: DateTime<Utc>,
        distance: f64,
        duration: f64,
        coordinates: Coords,
        cadence: f64,
    ) -> Self {
        let pace = duration / distance;
        Self::build(
            date,
            distance,
            duration,
            coordinates,
            WorkoutKind::Running { cadence, pace },
        )
    }

    pub fn cycling_at(
        date: DateTime<Utc>,
        distance: f64,
        duration: f64,
        coordinates: Coords,
        elevation_gain: f64,
    ) -> Self {
        let speed = distance / duration;
        Self::build(
            date,
            distance,
            duration,
            coordinates,
            WorkoutKind::Cycling {
                elevation_gain,
                speed,
            },
        )
    }

    fn build(
        date: DateTime<Utc>,
        distance: f64,
        duration: f64,
        coordinates: Coords,
        kind: WorkoutKind,
    ) -> Self {
        Self {
            id: workout_id(date),
            description: describe(kind.workout_type(), date),
            date,
            distance,
            duration,
            coordinates,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn coordinates(&self) -> Coords {
        self.coordinates
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    /// Pace for running workouts, speed for cycling ones.
    pub fn rate(&self) -> f64 {
        match self.kind {
            WorkoutKind::Running { pace, .. } => pace,
            WorkoutKind::Cycling { speed, .. } => speed,
        }
    }

    /// Text bound to the workout's map marker.
    pub fn popup_content(&self) -> String {
        format!("{} {}", self.workout_type().icon(), self.description)
    }
}

/// `"<Variant> on <Month> <day>"`, using the local calendar date of `date`.
pub fn describe(kind: WorkoutType, date: DateTime<Utc>) -> String {
    let local = date.with_timezone(&Local);
    format!(
        "{} on {} {}",
        kind.name(),
        MONTHS[local.month0() as usize],
        local.day()
    )
}

/// Last eight digits of the millisecond timestamp. Two workouts created in the
/// same millisecond share an id.
pub fn workout_id(date: DateTime<Utc>) -> String {
    let millis = date.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(ID_LEN);
    millis[start..].to_string()
}
