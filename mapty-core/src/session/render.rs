//! Pushing workouts out to the map and the list.

use log::debug;

use crate::map::{MapWidget, Popup, PopupOptions};
use crate::session::SessionController;
use crate::store::KeyValueStore;
use crate::workout::{ListEntry, Workout};

/// The host's list panel and alert surface.
pub trait SessionView {
    /// Non-blocking, user-facing message.
    fn alert(&mut self, message: &str);

    fn render_workout(&mut self, entry: &ListEntry);

    fn clear_workouts(&mut self);
}

impl<M: MapWidget, S: KeyValueStore, V: SessionView> SessionController<M, S, V> {
    pub(crate) fn render_marker(&mut self, workout: &Workout) {
        let marker = self.map.add_marker(workout.coordinates());
        self.map.bind_popup_content(
            marker,
            Popup {
                content: workout.popup_content(),
                options: PopupOptions::for_workout(workout.workout_type()),
                open: true,
            },
        );
        debug!("placed marker {:?} for workout {}", marker, workout.id());
    }

    pub(crate) fn render_workout(&mut self, workout: &Workout) {
        self.view.render_workout(&ListEntry::from(workout));
    }

    pub(crate) fn render_all_markers(&mut self) {
        let workouts = std::mem::take(&mut self.workouts);
        for workout in &workouts {
            self.render_marker(workout);
        }
        self.workouts = workouts;
    }
}
