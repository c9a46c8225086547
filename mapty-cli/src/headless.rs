//! Non-interactive commands. They drive the same session controller as the
//! terminal UI, with a map that only keeps track of what it was told.

use anyhow::{Result, bail};
use log::debug;
use std::sync::Arc;

use mapty::config::Config;
use mapty::geo::Coords;
use mapty::geolocation::FixedGeolocator;
use mapty::map::{MapWidget, MarkerId, Popup, ViewOptions};
use mapty::session::{
    EventReceiver, EventSender, FormValues, SessionController, SessionEvent, SessionView, channel,
};
use mapty::store::JsonFileStore;
use mapty::workout::ListEntry;

#[derive(Default)]
pub struct HeadlessMap {
    markers: usize,
    clicks: Option<EventSender>,
}

impl HeadlessMap {
    /// Reports a click at `at` to the registered listener, if any.
    pub fn click(&self, at: Coords) -> bool {
        match &self.clicks {
            Some(tx) => tx.send(SessionEvent::MapClicked(at)).is_ok(),
            None => false,
        }
    }
}

impl MapWidget for HeadlessMap {
    fn create_map(&mut self, center: Coords, zoom: u8) {
        debug!("headless map at {} (zoom {})", center, zoom);
    }

    fn set_view(&mut self, center: Coords, zoom: u8, _options: ViewOptions) {
        debug!("headless map moved to {} (zoom {})", center, zoom);
    }

    fn add_marker(&mut self, at: Coords) -> MarkerId {
        debug!("marker {} at {}", self.markers, at);
        self.markers += 1;
        MarkerId(self.markers - 1)
    }

    fn bind_popup_content(&mut self, marker: MarkerId, popup: Popup) {
        debug!("marker {:?}: {}", marker, popup.content);
    }

    fn on_click(&mut self, events: EventSender) {
        self.clicks = Some(events);
    }

    fn remove_map(&mut self) {
        *self = HeadlessMap::default();
    }
}

/// Alerts go to stderr. New list entries are printed once `echo` is on.
#[derive(Default)]
pub struct ConsoleView {
    pub echo: bool,
}

impl SessionView for ConsoleView {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn render_workout(&mut self, entry: &ListEntry) {
        if self.echo {
            println!("{}  {}", entry.id, entry);
        }
    }

    fn clear_workouts(&mut self) {}
}

type HeadlessSession = SessionController<HeadlessMap, JsonFileStore, ConsoleView>;

fn headless_session(config: &Config, position: Option<Coords>) -> (HeadlessSession, EventReceiver) {
    let (tx, rx) = channel();
    let session = SessionController::new(
        HeadlessMap::default(),
        JsonFileStore::new(&config.store_path),
        ConsoleView::default(),
        Arc::new(FixedGeolocator::new(position)),
        tx,
        config.session(),
    );
    (session, rx)
}

async fn wait_for_position(session: &mut HeadlessSession, rx: &mut EventReceiver) {
    while let Some(event) = rx.recv().await {
        let done = matches!(event, SessionEvent::PositionResolved(_));
        session.handle(event);
        if done {
            break;
        }
    }
}

pub async fn add(config: &Config, values: FormValues, at: Coords) -> Result<()> {
    // Without a configured home the map opens where the workout happened.
    let (mut session, mut rx) = headless_session(config, config.home.or(Some(at)));
    session.start();
    wait_for_position(&mut session, &mut rx).await;

    if !session.map().click(at) {
        bail!("map did not load, cannot place workout");
    }
    while let Ok(event) = rx.try_recv() {
        session.handle(event);
    }

    session.view_mut().echo = true;
    if session.submit_workout(values).is_none() {
        bail!("workout was not recorded");
    }
    Ok(())
}

pub fn list(config: &Config, verbose: bool) -> Result<()> {
    let (mut session, _rx) = headless_session(config, None);
    session.restore();

    if session.workouts().is_empty() {
        println!("No workouts recorded in {}", config.store_path.display());
        return Ok(());
    }

    for workout in session.workouts() {
        println!("{}  {}", workout.id(), ListEntry::from(workout));
        if verbose {
            println!(
                "\tat {} on {}",
                workout.coordinates(),
                workout.date().format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

pub fn reset(config: &Config) -> Result<()> {
    let (mut session, _rx) = headless_session(config, config.home);
    session.restore();
    let count = session.workouts().len();
    session.reset();
    println!("Removed {} workout(s)", count);
    Ok(())
}
