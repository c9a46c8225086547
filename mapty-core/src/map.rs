//! Boundary to the interactive map the host renders.
//!
//! The controller never looks inside the widget; it only asks it to show a
//! view, drop markers and report clicks back through the session event queue.

use std::time::Duration;

use crate::geo::Coords;
use crate::session::EventSender;
use crate::workout::WorkoutType;

/// Handle for a marker placed by [`MapWidget::add_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub animate: bool,
    pub pan_duration: Duration,
}

impl ViewOptions {
    pub fn animated() -> Self {
        Self {
            animate: true,
            pan_duration: Duration::from_secs(1),
        }
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            animate: false,
            pan_duration: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupOptions {
    pub max_width: u16,
    pub min_width: u16,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupOptions {
    pub fn for_workout(workout_type: WorkoutType) -> Self {
        Self {
            max_width: 200,
            min_width: 75,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{}-popup", workout_type.css_class()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub content: String,
    pub options: PopupOptions,
    /// Open the popup as soon as it is bound.
    pub open: bool,
}

pub trait MapWidget {
    /// Build the map centred on `center`. Called once per session start.
    fn create_map(&mut self, center: Coords, zoom: u8);

    fn set_view(&mut self, center: Coords, zoom: u8, options: ViewOptions);

    fn add_marker(&mut self, at: Coords) -> MarkerId;

    fn bind_popup_content(&mut self, marker: MarkerId, popup: Popup);

    /// Register the click listener. The widget reports every click on the map
    /// as [`crate::session::SessionEvent::MapClicked`] through `events`.
    fn on_click(&mut self, events: EventSender);

    /// Tear the map down before a reload. Markers and the click listener go
    /// with it.
    fn remove_map(&mut self) {}
}
