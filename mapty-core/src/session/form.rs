//! Workout form state, input validation and submission.

use log::{debug, info, warn};

use crate::errors::InputError;
use crate::geo::Coords;
use crate::map::MapWidget;
use crate::session::{SessionController, SessionEvent, SessionView};
use crate::store::KeyValueStore;
use crate::workout::{Workout, WorkoutType};

pub const INVALID_INPUT_ALERT: &str = "Sorry, input data is unacceptable";
pub const SAVE_FAILED_ALERT: &str = "Sorry, the workout could not be saved";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Type,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Type => "Type",
            FormField::Distance => "Distance",
            FormField::Duration => "Duration",
            FormField::Cadence => "Cadence",
            FormField::Elevation => "Elev Gain",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Type => "",
            FormField::Distance => "km",
            FormField::Duration => "min",
            FormField::Cadence => "step/min",
            FormField::Elevation => "meters",
        }
    }
}

/// CSS-style display of the form container. Hiding sets it to `None` for a
/// short while so the panel does not slide back into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDisplay {
    #[default]
    Grid,
    None,
}

/// Raw text of the form fields, as typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormValues {
    pub workout_type: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// Form values that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutInput {
    Running {
        distance: f64,
        duration: f64,
        cadence: f64,
    },
    Cycling {
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    },
}

impl WorkoutInput {
    pub fn into_workout(self, at: Coords) -> Workout {
        match self {
            WorkoutInput::Running {
                distance,
                duration,
                cadence,
            } => Workout::running(distance, duration, at, cadence),
            WorkoutInput::Cycling {
                distance,
                duration,
                elevation_gain,
            } => Workout::cycling(distance, duration, at, elevation_gain),
        }
    }
}

/// Text to number the way a form input coerces: whitespace is ignored and
/// anything that is not a number, empty text included, becomes NaN.
pub fn coerce(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

fn finite(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InputError> {
    if value < 0.0 {
        Err(InputError::Negative { field })
    } else {
        Ok(())
    }
}

// Distance and duration divide each other, so zero is rejected too.
fn positive(field: &'static str, value: f64) -> Result<(), InputError> {
    non_negative(field, value)?;
    if value == 0.0 {
        return Err(InputError::Zero { field });
    }
    Ok(())
}

impl FormValues {
    pub fn validate(&self) -> Result<WorkoutInput, InputError> {
        let distance = finite("distance", coerce(&self.distance))?;
        let duration = finite("duration", coerce(&self.duration))?;

        match self.workout_type {
            WorkoutType::Running => {
                let cadence = finite("cadence", coerce(&self.cadence))?;
                positive("distance", distance)?;
                positive("duration", duration)?;
                non_negative("cadence", cadence)?;
                Ok(WorkoutInput::Running {
                    distance,
                    duration,
                    cadence,
                })
            }
            WorkoutType::Cycling => {
                // Elevation may be negative: a net descent is a real ride.
                let elevation_gain = finite("elevation gain", coerce(&self.elevation))?;
                positive("distance", distance)?;
                positive("duration", duration)?;
                Ok(WorkoutInput::Cycling {
                    distance,
                    duration,
                    elevation_gain,
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutForm {
    workout_type: WorkoutType,
    distance: String,
    duration: String,
    cadence: String,
    elevation: String,
    focused: FormField,
    hidden: bool,
    display: FormDisplay,
}

impl Default for WorkoutForm {
    fn default() -> Self {
        Self {
            workout_type: WorkoutType::Running,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
            focused: FormField::Type,
            hidden: true,
            display: FormDisplay::Grid,
        }
    }
}

impl WorkoutForm {
    pub fn workout_type(&self) -> WorkoutType {
        self.workout_type
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn display(&self) -> FormDisplay {
        self.display
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden && self.display == FormDisplay::Grid
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    /// Fields in display order. Only one of cadence and elevation is shown,
    /// depending on the selected type.
    pub fn visible_fields(&self) -> [FormField; 4] {
        let metric = match self.workout_type {
            WorkoutType::Running => FormField::Cadence,
            WorkoutType::Cycling => FormField::Elevation,
        };
        [
            FormField::Type,
            FormField::Distance,
            FormField::Duration,
            metric,
        ]
    }

    pub fn focus(&mut self, field: FormField) {
        if self.visible_fields().contains(&field) {
            self.focused = field;
        }
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(3);
    }

    fn step_focus(&mut self, by: usize) {
        let fields = self.visible_fields();
        let current = fields
            .iter()
            .position(|f| *f == self.focused)
            .unwrap_or_default();
        self.focused = fields[(current + by) % fields.len()];
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Type => self.workout_type.name(),
            FormField::Distance => &self.distance,
            FormField::Duration => &self.duration,
            FormField::Cadence => &self.cadence,
            FormField::Elevation => &self.elevation,
        }
    }

    /// Editable text of a numeric field. The type selector has none.
    pub fn value_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Type => None,
            FormField::Distance => Some(&mut self.distance),
            FormField::Duration => Some(&mut self.duration),
            FormField::Cadence => Some(&mut self.cadence),
            FormField::Elevation => Some(&mut self.elevation),
        }
    }

    pub fn select_type(&mut self, workout_type: WorkoutType) {
        self.workout_type = workout_type;
        if !self.visible_fields().contains(&self.focused) {
            self.focused = self.visible_fields()[3];
        }
    }

    pub fn values(&self) -> FormValues {
        FormValues {
            workout_type: self.workout_type,
            distance: self.distance.clone(),
            duration: self.duration.clone(),
            cadence: self.cadence.clone(),
            elevation: self.elevation.clone(),
        }
    }

    pub(crate) fn show(&mut self) {
        self.hidden = false;
        self.focused = FormField::Distance;
    }

    pub(crate) fn hide(&mut self) {
        self.clear_inputs();
        self.hidden = true;
        self.display = FormDisplay::None;
    }

    pub(crate) fn restore_display(&mut self) {
        self.display = FormDisplay::Grid;
    }

    fn clear_inputs(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }
}

impl<M: MapWidget, S: KeyValueStore, V: SessionView> SessionController<M, S, V> {
    /// Opens the form for a click at `at`. Ignored until the map is ready.
    pub fn show_form(&mut self, at: Coords) {
        if !self.map_ready {
            debug!("map click at {} ignored: map not ready", at);
            return;
        }
        self.pending_click = Some(at);
        self.form.show();
    }

    /// Hides the form and schedules its display to come back after the
    /// configured delay. Must run inside a tokio runtime.
    pub fn hide_form(&mut self) {
        self.form.hide();

        let events = self.events.clone();
        let delay = self.config.form_restore_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::RestoreFormDisplay);
        });
    }

    /// Validates `values` and records a workout at the pending click.
    ///
    /// Either the workout is stored, drawn on the map, listed and the form
    /// closed, or nothing changes and the user gets an alert. Returns the new
    /// workout.
    pub fn submit_workout(&mut self, values: FormValues) -> Option<&Workout> {
        let Some(at) = self.pending_click else {
            debug!("submit ignored: no map click pending");
            return None;
        };

        let input = match values.validate() {
            Ok(input) => input,
            Err(e) => {
                warn!("rejected {} workout: {}", values.workout_type, e);
                self.view.alert(&format!("{INVALID_INPUT_ALERT}: {e}"));
                return None;
            }
        };

        let workout = input.into_workout(at);
        self.workouts.push(workout.clone());
        if let Err(e) = self.persist() {
            self.workouts.pop();
            log::error!("failed to persist workout {}: {}", workout.id(), e);
            self.view.alert(&format!("{SAVE_FAILED_ALERT}: {e}"));
            return None;
        }

        self.render_marker(&workout);
        self.render_workout(&workout);
        self.pending_click = None;
        self.hide_form();

        info!(
            "recorded workout {} ({}) at {}",
            workout.id(),
            workout.description(),
            at
        );
        self.workouts.last()
    }
}
