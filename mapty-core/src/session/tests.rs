use chrono::{Datelike, Local, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::errors::{GeolocationError, StoreError};
use crate::geo::Coords;
use crate::geolocation::FixedGeolocator;
use crate::map::{MapWidget, MarkerId, Popup, ViewOptions};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::workout::{ListEntry, MONTHS, Workout, WorkoutKind, WorkoutType};

const HOME: Coords = Coords::new(38.72, -9.14);

#[derive(Default)]
struct RecordingMap {
    created: Vec<(Coords, u8)>,
    views: Vec<(Coords, u8, ViewOptions)>,
    markers: Vec<Coords>,
    popups: Vec<(MarkerId, Popup)>,
    clicks: Option<EventSender>,
    removed: usize,
}

impl MapWidget for RecordingMap {
    fn create_map(&mut self, center: Coords, zoom: u8) {
        self.created.push((center, zoom));
    }

    fn set_view(&mut self, center: Coords, zoom: u8, options: ViewOptions) {
        self.views.push((center, zoom, options));
    }

    fn add_marker(&mut self, at: Coords) -> MarkerId {
        self.markers.push(at);
        MarkerId(self.markers.len() - 1)
    }

    fn bind_popup_content(&mut self, marker: MarkerId, popup: Popup) {
        self.popups.push((marker, popup));
    }

    fn on_click(&mut self, events: EventSender) {
        self.clicks = Some(events);
    }

    fn remove_map(&mut self) {
        self.removed += 1;
        self.markers.clear();
        self.popups.clear();
        self.clicks = None;
    }
}

#[derive(Default)]
struct RecordingView {
    alerts: Vec<String>,
    entries: Vec<ListEntry>,
    clears: usize,
}

impl SessionView for RecordingView {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn render_workout(&mut self, entry: &ListEntry) {
        self.entries.push(entry.clone());
    }

    fn clear_workouts(&mut self) {
        self.clears += 1;
        self.entries.clear();
    }
}

/// Reads fine, refuses every write.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err("disk full".into())
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

type TestSession<S> = SessionController<RecordingMap, S, RecordingView>;

fn session_with<S: KeyValueStore>(
    store: S,
    position: Option<Coords>,
) -> (TestSession<S>, EventReceiver) {
    let (tx, rx) = channel();
    let session = SessionController::new(
        RecordingMap::default(),
        store,
        RecordingView::default(),
        Arc::new(FixedGeolocator::new(position)),
        tx,
        SessionConfig::default(),
    );
    (session, rx)
}

/// Handles queued events until the position answer has been processed.
async fn settle<S: KeyValueStore>(session: &mut TestSession<S>, rx: &mut EventReceiver) {
    while let Some(event) = rx.recv().await {
        let done = matches!(event, SessionEvent::PositionResolved(_));
        session.handle(event);
        if done {
            break;
        }
    }
}

async fn started<S: KeyValueStore>(store: S) -> (TestSession<S>, EventReceiver) {
    let (mut session, mut rx) = session_with(store, Some(HOME));
    session.start();
    settle(&mut session, &mut rx).await;
    (session, rx)
}

fn running(distance: &str, duration: &str, cadence: &str) -> FormValues {
    FormValues {
        workout_type: WorkoutType::Running,
        distance: distance.into(),
        duration: duration.into(),
        cadence: cadence.into(),
        ..Default::default()
    }
}

fn cycling(distance: &str, duration: &str, elevation: &str) -> FormValues {
    FormValues {
        workout_type: WorkoutType::Cycling,
        distance: distance.into(),
        duration: duration.into(),
        elevation: elevation.into(),
        ..Default::default()
    }
}

fn stored_collection(workouts: &[Workout]) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .set(WORKOUTS_KEY, &encode_workouts(workouts).unwrap())
        .unwrap();
    store
}

fn seeded_workouts() -> Vec<Workout> {
    vec![
        Workout::running_at(
            Utc.timestamp_millis_opt(1_700_000_000_001).unwrap(),
            5.0,
            30.0,
            Coords::new(1.0, 1.0),
            150.0,
        ),
        Workout::cycling_at(
            Utc.timestamp_millis_opt(1_700_000_000_002).unwrap(),
            20.0,
            60.0,
            Coords::new(2.0, 2.0),
            300.0,
        ),
    ]
}

#[tokio::test]
async fn start_centres_map_on_position() {
    let (session, _rx) = started(MemoryStore::new()).await;

    assert!(session.is_map_ready());
    assert_eq!(session.map().created, vec![(HOME, 14)]);
    assert!(session.map().clicks.is_some());
    assert!(session.view().alerts.is_empty());
    assert!(session.form().is_hidden());
}

#[tokio::test]
async fn failed_position_alerts_and_disables_map_actions() {
    let (mut session, mut rx) = session_with(stored_collection(&seeded_workouts()), None);
    session.start();
    settle(&mut session, &mut rx).await;

    assert!(!session.is_map_ready());
    assert_eq!(session.view().alerts, vec![POSITION_ALERT.to_string()]);
    assert!(session.map().created.is_empty());
    assert_eq!(session.view().entries.len(), 2);

    session.handle(SessionEvent::MapClicked(Coords::new(10.0, 20.0)));
    assert!(session.form().is_hidden());
    assert_eq!(session.pending_click(), None);

    let id = session.workouts()[0].id().to_string();
    session.handle(SessionEvent::WorkoutSelected(id));
    assert!(session.map().views.is_empty());
    assert!(session.map().markers.is_empty());
}

#[tokio::test]
async fn running_workout_is_created_rendered_and_persisted() {
    let (mut session, _rx) = started(MemoryStore::new()).await;
    let at = Coords::new(10.0, 20.0);

    session.handle(SessionEvent::MapClicked(at));
    assert!(session.form().is_visible());
    assert_eq!(session.form().focused(), FormField::Distance);

    let workout = session
        .submit_workout(running("5", "30", "150"))
        .cloned()
        .unwrap();

    assert_eq!(
        workout.kind(),
        &WorkoutKind::Running {
            cadence: 150.0,
            pace: 6.0
        }
    );
    assert_eq!(workout.coordinates(), at);
    let local = workout.date().with_timezone(&Local);
    assert_eq!(
        workout.description(),
        format!("Running on {} {}", MONTHS[local.month0() as usize], local.day())
    );

    assert_eq!(session.workouts(), &[workout.clone()]);
    assert_eq!(session.map().markers, vec![at]);
    let (marker, popup) = &session.map().popups[0];
    assert_eq!(*marker, MarkerId(0));
    assert_eq!(popup.content, workout.popup_content());
    assert_eq!(popup.options.class_name, "running-popup");
    assert!(popup.open && !popup.options.auto_close && !popup.options.close_on_click);
    assert_eq!(session.view().entries, vec![ListEntry::from(&workout)]);

    assert!(session.form().is_hidden());
    assert_eq!(session.form().display(), FormDisplay::None);
    assert_eq!(session.pending_click(), None);

    let stored = session.store().get(WORKOUTS_KEY).unwrap().unwrap();
    assert_eq!(decode_workouts(&stored), Some(vec![workout]));
}

#[tokio::test]
async fn cycling_accepts_negative_elevation() {
    let (mut session, _rx) = started(MemoryStore::new()).await;

    session.handle(SessionEvent::MapClicked(Coords::new(0.5, 0.5)));
    let workout = session
        .submit_workout(cycling("20", "60", "-5"))
        .cloned()
        .unwrap();

    assert_eq!(workout.rate(), 20.0 / 60.0);
    assert!(session.view().alerts.is_empty());
    let entry = &session.view().entries[0];
    assert_eq!(entry.details[2].value, "0.3");
    assert_eq!(entry.details[3].value, "-5");
    assert_eq!(
        session.map().popups[0].1.options.class_name,
        "cycling-popup"
    );
}

#[tokio::test]
async fn invalid_input_changes_nothing() {
    let (mut session, _rx) = started(MemoryStore::new()).await;
    session.handle(SessionEvent::MapClicked(Coords::new(10.0, 20.0)));

    for values in [
        running("abc", "30", "150"),
        running("5", "0", "150"),
        running("0", "30", "150"),
        running("5", "30", "-1"),
        cycling("20", "", "10"),
    ] {
        assert!(session.submit_workout(values).is_none());
    }

    assert_eq!(session.view().alerts.len(), 5);
    assert!(
        session
            .view()
            .alerts
            .iter()
            .all(|a| a.starts_with(INVALID_INPUT_ALERT))
    );
    assert!(session.workouts().is_empty());
    assert!(session.map().markers.is_empty());
    assert!(session.view().entries.is_empty());
    assert_eq!(session.store().get(WORKOUTS_KEY).unwrap(), None);
    assert!(session.form().is_visible());
    assert_eq!(session.pending_click(), Some(Coords::new(10.0, 20.0)));
}

#[tokio::test]
async fn submit_without_click_is_ignored() {
    let (mut session, _rx) = started(MemoryStore::new()).await;

    assert!(session.submit_workout(running("5", "30", "150")).is_none());
    session.handle(SessionEvent::SubmitForm);

    assert!(session.workouts().is_empty());
    assert!(session.view().alerts.is_empty());
}

#[tokio::test]
async fn submit_event_reads_the_form() {
    let (mut session, _rx) = started(MemoryStore::new()).await;
    session.handle(SessionEvent::MapClicked(Coords::new(3.0, 4.0)));
    session.handle(SessionEvent::TypeSelected(WorkoutType::Cycling));

    let form = session.form_mut();
    form.value_mut(FormField::Distance).unwrap().push_str("12");
    form.value_mut(FormField::Duration).unwrap().push_str("40");
    form.value_mut(FormField::Elevation).unwrap().push_str("85");
    session.handle(SessionEvent::SubmitForm);

    assert_eq!(session.workouts().len(), 1);
    assert_eq!(
        session.workouts()[0].kind(),
        &WorkoutKind::Cycling {
            elevation_gain: 85.0,
            speed: 12.0 / 40.0
        }
    );
    assert_eq!(session.form().value(FormField::Distance), "");
}

#[tokio::test]
async fn failed_write_rolls_back() {
    let (mut session, _rx) = started(ReadOnlyStore).await;
    session.handle(SessionEvent::MapClicked(Coords::new(10.0, 20.0)));

    assert!(session.submit_workout(running("5", "30", "150")).is_none());

    assert_eq!(session.view().alerts.len(), 1);
    assert!(session.view().alerts[0].starts_with(SAVE_FAILED_ALERT));
    assert!(session.workouts().is_empty());
    assert!(session.map().markers.is_empty());
    assert!(session.view().entries.is_empty());
    assert!(session.form().is_visible());
}

#[tokio::test(start_paused = true)]
async fn form_display_returns_after_delay() {
    let (mut session, mut rx) = started(MemoryStore::new()).await;
    session.handle(SessionEvent::MapClicked(Coords::new(10.0, 20.0)));

    let hidden_at = tokio::time::Instant::now();
    session.submit_workout(running("5", "30", "150")).unwrap();
    assert_eq!(session.form().display(), FormDisplay::None);

    let event = rx.recv().await.unwrap();
    assert_eq!(event, SessionEvent::RestoreFormDisplay);
    assert!(hidden_at.elapsed() >= Duration::from_secs(1));

    session.handle(event);
    assert_eq!(session.form().display(), FormDisplay::Grid);
    assert!(session.form().is_hidden());
}

#[tokio::test]
async fn selecting_a_workout_recentres_the_map() {
    let workouts = seeded_workouts();
    let (mut session, _rx) = started(stored_collection(&workouts)).await;

    session.handle(SessionEvent::WorkoutSelected(workouts[1].id().to_string()));
    assert_eq!(
        session.map().views,
        vec![(Coords::new(2.0, 2.0), 14, ViewOptions::animated())]
    );

    session.handle(SessionEvent::WorkoutSelected("missing".into()));
    assert_eq!(session.map().views.len(), 1);
}

#[tokio::test]
async fn restore_lists_first_and_marks_once_map_loads() {
    let workouts = seeded_workouts();
    let (mut session, mut rx) = session_with(stored_collection(&workouts), Some(HOME));

    session.start();
    assert_eq!(session.workouts(), workouts.as_slice());
    assert_eq!(
        session.view().entries,
        workouts.iter().map(ListEntry::from).collect::<Vec<_>>()
    );
    assert!(session.map().markers.is_empty());

    settle(&mut session, &mut rx).await;
    assert_eq!(
        session.map().markers,
        vec![Coords::new(1.0, 1.0), Coords::new(2.0, 2.0)]
    );
}

#[tokio::test]
async fn persisted_collection_round_trips() {
    for count in 0..4 {
        let (mut session, _rx) = started(MemoryStore::new()).await;
        for i in 0..count {
            session.handle(SessionEvent::MapClicked(Coords::new(i as f64, 0.0)));
            let values = if i % 2 == 0 {
                running("4.2", "25.3", "170")
            } else {
                cycling("27", "95", "-12.5")
            };
            session.submit_workout(values).unwrap();
        }
        if count == 0 {
            session.persist().unwrap();
        }

        let (reloaded, _rx2) = started(session.store().clone()).await;
        assert_eq!(reloaded.workouts(), session.workouts());
        assert_eq!(reloaded.view().entries, session.view().entries);
        assert_eq!(reloaded.workouts().len(), count);
    }
}

#[tokio::test]
async fn malformed_storage_is_treated_as_empty() {
    for raw in ["not json", "null", "{\"workouts\":[]}", "[1, {\"id\":2}]"] {
        let mut store = MemoryStore::new();
        store.set(WORKOUTS_KEY, raw).unwrap();

        let (session, _rx) = started(store).await;
        assert!(session.workouts().is_empty());
        assert!(session.view().entries.is_empty());
        assert!(session.view().alerts.is_empty());
    }
}

#[tokio::test]
async fn reset_twice_matches_reset_once() {
    let (mut session, mut rx) = started(stored_collection(&seeded_workouts())).await;
    session.handle(SessionEvent::MapClicked(Coords::new(10.0, 20.0)));

    session.handle(SessionEvent::Reset);
    let once = (
        session.workouts().to_vec(),
        session.form().clone(),
        session.is_map_ready(),
        session.store().get(WORKOUTS_KEY).unwrap(),
    );
    session.reset();
    let twice = (
        session.workouts().to_vec(),
        session.form().clone(),
        session.is_map_ready(),
        session.store().get(WORKOUTS_KEY).unwrap(),
    );

    assert_eq!(once, twice);
    assert!(twice.0.is_empty());
    assert_eq!(twice.1, WorkoutForm::default());
    assert!(!twice.2);
    assert_eq!(twice.3, None);
    assert_eq!(session.pending_click(), None);
    assert_eq!(session.map().removed, 2);
    assert_eq!(session.view().clears, 2);
    assert!(session.view().entries.is_empty());

    settle(&mut session, &mut rx).await;
    assert!(session.is_map_ready());
    assert_eq!(session.map().created.len(), 2);
    assert!(session.map().markers.is_empty());
}

#[tokio::test]
async fn late_position_failure_after_map_load_is_silent() {
    let (mut session, _rx) = started(MemoryStore::new()).await;

    session.handle(SessionEvent::PositionResolved(Err(GeolocationError::Timeout)));

    assert!(session.is_map_ready());
    assert!(session.view().alerts.is_empty());
}

#[tokio::test]
async fn reset_recovers_from_an_unreadable_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workouts.json");
    std::fs::write(&path, "{ not json").unwrap();

    let (mut session, mut rx) = session_with(JsonFileStore::new(&path), Some(HOME));
    session.start();
    settle(&mut session, &mut rx).await;
    assert!(session.workouts().is_empty());

    session.reset();
    settle(&mut session, &mut rx).await;
    session.handle(SessionEvent::MapClicked(Coords::new(10.0, 20.0)));
    assert!(session.submit_workout(running("5", "30", "150")).is_some());

    assert!(session.view().alerts.is_empty());
    let reopened = JsonFileStore::new(&path);
    let stored = reopened.get(WORKOUTS_KEY).unwrap().unwrap();
    assert_eq!(decode_workouts(&stored).unwrap().len(), 1);
}
