use log::{debug, info, warn};
use std::sync::Arc;

use crate::errors::GeolocationError;
use crate::geo::Coords;
use crate::map::{MapWidget, ViewOptions};
use crate::session::{SessionController, SessionEvent, SessionView};
use crate::store::KeyValueStore;

pub const POSITION_ALERT: &str = "Sorry, we can't get your position";

impl<M: MapWidget, S: KeyValueStore, V: SessionView> SessionController<M, S, V> {
    /// Fires a position request. The answer arrives later as
    /// [`SessionEvent::PositionResolved`]. Must run inside a tokio runtime.
    pub fn request_location(&mut self) {
        info!("requesting current position");
        let geolocator = Arc::clone(&self.geolocator);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = geolocator.current_position().await;
            let _ = events.send(SessionEvent::PositionResolved(result));
        });
    }

    pub(crate) fn load_map(&mut self, at: Coords) {
        if self.map_ready {
            debug!("position {} ignored: map already loaded", at);
            return;
        }

        self.map.create_map(at, self.config.zoom_level);
        self.map.on_click(self.events.clone());
        self.map_ready = true;
        info!("map loaded at {}", at);

        self.render_all_markers();
    }

    pub(crate) fn position_failed(&mut self, error: GeolocationError) {
        if self.map_ready {
            debug!("position error ignored: map already loaded ({})", error);
            return;
        }
        warn!("could not get position: {}", error);
        self.view.alert(POSITION_ALERT);
    }

    /// Pans the map to the workout with `id`. Does nothing before the map is
    /// loaded or for an unknown id.
    pub fn recenter_on(&mut self, id: &str) {
        if !self.map_ready {
            debug!("recenter on {} ignored: map not ready", id);
            return;
        }

        let Some(at) = self.find_workout(id).map(|w| w.coordinates()) else {
            debug!("recenter ignored: no workout {}", id);
            return;
        };

        self.map
            .set_view(at, self.config.zoom_level, ViewOptions::animated());
    }
}
