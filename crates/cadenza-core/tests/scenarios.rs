//! End-to-end editing scenarios against the public API

use std::sync::{Arc, Once};

use cadenza_core::{
    CadenzaError, Event, EventId, Pitch, Project, SequentialIdGenerator, Ticks, TrackProps,
    Velocity,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Route `tracing` output to the test harness; enable with RUST_LOG=cadenza_core=debug
fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

fn project() -> Project {
    init_logging();
    Project::default().with_id_generator(Arc::new(SequentialIdGenerator::new("test")))
}

fn ticks(value: i64) -> Ticks {
    Ticks::new(value).unwrap()
}

fn times(events: &[Event]) -> Vec<u64> {
    events.iter().map(|e| e.time().value()).collect()
}

#[test]
fn test_piano_track_lifecycle() {
    let empty = project();
    assert_eq!(empty.track_count(), 0);

    let (with_track, piano) = empty.add_track(TrackProps::named("Piano")).unwrap();
    assert_eq!(with_track.track_count(), 1);
    let track = with_track.get_track(piano.id()).unwrap();
    assert_eq!(track.name(), "Piano");
    assert_eq!(track.event_count(), 0);

    let (with_note, note) = with_track
        .add_note_event(
            piano.id(),
            ticks(480),
            Pitch::new(60).unwrap(),
            Velocity::new(100).unwrap(),
            ticks(240),
        )
        .unwrap();
    let track = with_note.get_track(piano.id()).unwrap();
    assert_eq!(track.event_count(), 1);
    assert_eq!(track.events()[0].time(), ticks(480));
    assert_eq!(with_note.events(), vec![Event::Note(note)]);

    let removed = with_note.remove_track(piano.id());
    assert_eq!(removed.track_count(), 0);
    assert!(removed.events().is_empty());

    // Earlier snapshots are untouched
    assert_eq!(empty.track_count(), 0);
    assert!(with_track.events().is_empty());
    assert_eq!(with_note.events().len(), 1);
}

#[test]
fn test_range_query_across_tracks() {
    let p = project();
    let (p, first) = p.add_track(TrackProps::named("one")).unwrap();
    let (mut p, second) = p.add_track(TrackProps::named("two")).unwrap();

    for (track, time) in [
        (first.id(), 100),
        (first.id(), 300),
        (first.id(), 500),
        (second.id(), 200),
        (second.id(), 400),
    ] {
        let velocity = Velocity::new(80).unwrap();
        p = p
            .add_note_event(track, ticks(time), Pitch::MIDDLE_C, velocity, ticks(50))
            .unwrap()
            .0;
    }

    assert_eq!(times(&p.events_in_range(150, 350).unwrap()), vec![200, 300]);
    assert_eq!(times(&p.events()), vec![100, 200, 300, 400, 500]);
    assert!(p.events_in_range(500, 500).unwrap().len() == 1);
}

#[test]
fn test_range_bounds_are_inclusive() {
    let (p, track) = project().add_track(TrackProps::default()).unwrap();
    let velocity = Velocity::new(100).unwrap();
    let (p, _) = p
        .add_note_event(track.id(), ticks(960), Pitch::MIDDLE_C, velocity, ticks(10))
        .unwrap();
    let (p, _) = p
        .add_note_event(track.id(), ticks(480), Pitch::MIDDLE_C, velocity, ticks(10))
        .unwrap();

    let stored = p.get_track(track.id()).unwrap();
    assert_eq!(times(stored.events_in_range(480, 960).unwrap()), vec![480, 960]);
    assert!(stored.events_in_range(500, 700).unwrap().is_empty());
    assert!(matches!(
        stored.events_in_range(-1, 10),
        Err(CadenzaError::InvalidArgument(_))
    ));
    assert_eq!(times(&p.events_in_range(480, 960).unwrap()), vec![480, 960]);
}

#[test]
fn test_add_events_in_any_order_stays_sorted() {
    let (mut p, track) = project().add_track(TrackProps::default()).unwrap();
    let velocity = Velocity::new(64).unwrap();
    for time in [700, 20, 350, 20, 999, 0, 350, 1] {
        let before = p.events();
        let next = p
            .add_note_event(track.id(), ticks(time), Pitch::MIDDLE_C, velocity, ticks(1))
            .unwrap()
            .0;
        assert_eq!(p.events(), before);
        p = next;
        let t = times(&p.events());
        assert!(t.windows(2).all(|w| w[0] <= w[1]));
    }
    assert_eq!(p.events().len(), 8);
}

#[test]
fn test_error_asymmetry() {
    let (p, track) = project().add_track(TrackProps::default()).unwrap();
    let ghost_track = cadenza_core::TrackId::new("ghost").unwrap();
    let ghost_event = EventId::new("ghost").unwrap();

    assert_eq!(p.remove_track(&ghost_track), p);
    assert_eq!(p.remove_event(track.id(), &ghost_event).unwrap(), p);
    assert!(matches!(
        p.remove_event(&ghost_track, &ghost_event),
        Err(CadenzaError::InvalidArgument(_))
    ));
}

#[test]
fn test_snapshots_shared_across_threads() {
    let (p, track) = project().add_track(TrackProps::named("shared")).unwrap();
    let (p, _) = p
        .add_note_event(
            track.id(),
            ticks(10),
            Pitch::MIDDLE_C,
            Velocity::new(1).unwrap(),
            ticks(10),
        )
        .unwrap();
    let snapshot = Arc::new(p);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let snapshot = Arc::clone(&snapshot);
            std::thread::spawn(move || snapshot.events_in_range(0, 100).unwrap().len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
