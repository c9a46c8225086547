use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::geo::Coords;
use crate::geolocation::Geolocator;
use crate::map::MapWidget;
use crate::session::form::WorkoutForm;
use crate::session::{EventSender, SessionEvent, SessionView};
use crate::store::KeyValueStore;
use crate::workout::Workout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub zoom_level: u8,
    /// How long the form stays `display: none` after being hidden.
    pub form_restore_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            zoom_level: 14,
            form_restore_delay: Duration::from_secs(1),
        }
    }
}

/// Owns the workout collection and binds it to a map, a list view and a
/// store.
///
/// Single consumer: every state change goes through `&mut self`, usually via
/// [`SessionController::handle`]. Background work (geolocation, the form
/// debounce) reports back through the event channel given to [`Self::new`].
pub struct SessionController<M, S, V> {
    pub(crate) map: M,
    pub(crate) map_ready: bool,
    pub(crate) pending_click: Option<Coords>,
    pub(crate) workouts: Vec<Workout>,
    pub(crate) form: WorkoutForm,
    pub(crate) store: S,
    pub(crate) view: V,
    pub(crate) geolocator: Arc<dyn Geolocator>,
    pub(crate) events: EventSender,
    pub(crate) config: SessionConfig,
}

impl<M: MapWidget, S: KeyValueStore, V: SessionView> SessionController<M, S, V> {
    pub fn new(
        map: M,
        store: S,
        view: V,
        geolocator: Arc<dyn Geolocator>,
        events: EventSender,
        config: SessionConfig,
    ) -> Self {
        Self {
            map,
            map_ready: false,
            pending_click: None,
            workouts: Vec::new(),
            form: WorkoutForm::default(),
            store,
            view,
            geolocator,
            events,
            config,
        }
    }

    /// Asks for the position and loads the persisted workouts. The list is
    /// filled right away; markers follow once the map exists.
    pub fn start(&mut self) {
        self.request_location();
        self.restore();
    }

    pub fn handle(&mut self, event: SessionEvent) {
        debug!("session event: {:?}", event);
        match event {
            SessionEvent::PositionResolved(Ok(at)) => self.load_map(at),
            SessionEvent::PositionResolved(Err(e)) => self.position_failed(e),
            SessionEvent::MapClicked(at) => self.show_form(at),
            SessionEvent::TypeSelected(workout_type) => self.form.select_type(workout_type),
            SessionEvent::SubmitForm => {
                if self.form.is_hidden() {
                    debug!("submit ignored: form hidden");
                    return;
                }
                let values = self.form.values();
                self.submit_workout(values);
            }
            SessionEvent::WorkoutSelected(id) => self.recenter_on(&id),
            SessionEvent::RestoreFormDisplay => self.form.restore_display(),
            SessionEvent::Reset => self.reset(),
        }
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find_workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    pub fn pending_click(&self) -> Option<Coords> {
        self.pending_click
    }

    pub fn form(&self) -> &WorkoutForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut WorkoutForm {
        &mut self.form
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A sender into this session's event queue, for hosts that produce
    /// events of their own.
    pub fn events(&self) -> EventSender {
        self.events.clone()
    }
}
