use tokio::sync::mpsc;

use crate::errors::GeolocationError;
use crate::geo::Coords;
use crate::workout::WorkoutType;

/// Everything that can happen to a session. Hosts feed these to
/// [`crate::session::SessionController::handle`] one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The geolocation request finished.
    PositionResolved(Result<Coords, GeolocationError>),
    MapClicked(Coords),
    TypeSelected(WorkoutType),
    /// Submit whatever the form currently holds.
    SubmitForm,
    /// A list entry was clicked.
    WorkoutSelected(String),
    /// The hide debounce elapsed.
    RestoreFormDisplay,
    Reset,
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
