//! Session controller binding the map, the workout form, the list view and
//! the persisted collection.
//!
//! The controller is a plain struct driven by [`SessionEvent`]s. Hosts supply
//! a [`crate::map::MapWidget`], a [`SessionView`], a
//! [`crate::store::KeyValueStore`] and a [`crate::geolocation::Geolocator`],
//! then pump the event queue.

mod events;
mod form;
mod location;
mod render;
mod session;
mod storage;

#[cfg(test)]
mod tests;

pub use events::{EventReceiver, EventSender, SessionEvent, channel};
pub use form::{
    FormDisplay, FormField, FormValues, INVALID_INPUT_ALERT, SAVE_FAILED_ALERT, WorkoutForm,
    WorkoutInput, coerce,
};
pub use location::POSITION_ALERT;
pub use render::SessionView;
pub use session::{SessionConfig, SessionController};
pub use storage::{WORKOUTS_KEY, decode_workouts, encode_workouts};
