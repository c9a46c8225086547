use log::{debug, info, warn};
use serde_json::Value;

use crate::errors::StoreError;
use crate::map::MapWidget;
use crate::session::form::WorkoutForm;
use crate::session::{SessionController, SessionView};
use crate::store::KeyValueStore;
use crate::workout::Workout;

/// Store key holding the JSON array of workouts.
pub const WORKOUTS_KEY: &str = "workouts";

pub fn encode_workouts(workouts: &[Workout]) -> Result<String, serde_json::Error> {
    serde_json::to_string(workouts)
}

/// Decodes a stored collection. A document that is not a JSON array (or is
/// `null`) yields `None`; array elements that do not decode are dropped.
pub fn decode_workouts(raw: &str) -> Option<Vec<Workout>> {
    let values = match serde_json::from_str::<Option<Vec<Value>>>(raw) {
        Ok(Some(values)) => values,
        Ok(None) => return None,
        Err(e) => {
            warn!("ignoring malformed workout collection: {}", e);
            return None;
        }
    };

    let workouts = values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<Workout>(value) {
            Ok(workout) => Some(workout),
            Err(e) => {
                warn!("skipping stored workout #{}: {}", idx, e);
                None
            }
        })
        .collect();
    Some(workouts)
}

impl<M: MapWidget, S: KeyValueStore, V: SessionView> SessionController<M, S, V> {
    /// Writes the whole collection under [`WORKOUTS_KEY`].
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let raw = encode_workouts(&self.workouts)?;
        self.store.set(WORKOUTS_KEY, &raw)?;
        debug!("persisted {} workout(s)", self.workouts.len());
        Ok(())
    }

    /// Replaces the collection with the stored one and lists every entry.
    /// Missing or unreadable data counts as no data.
    pub fn restore(&mut self) {
        let raw = match self.store.get(WORKOUTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("could not read stored workouts: {}", e);
                return;
            }
        };

        let Some(workouts) = decode_workouts(&raw) else {
            return;
        };

        info!("restored {} workout(s)", workouts.len());
        for workout in &workouts {
            self.render_workout(workout);
        }
        self.workouts = workouts;
    }

    /// Drops the stored copy and starts the session over.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(WORKOUTS_KEY) {
            warn!("could not clear stored workouts: {}", e);
        }

        self.map.remove_map();
        self.map_ready = false;
        self.pending_click = None;
        self.workouts.clear();
        self.form = WorkoutForm::default();
        self.view.clear_workouts();
        info!("session reset");

        self.start();
    }
}
