//! Track representation
//!
//! A [`Track`] is an immutable, time-sorted list of events for one
//! instrument. The read side is public; the copy-on-write update side is
//! crate-private so that only [`Project`](crate::Project) can produce
//! modified tracks.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CadenzaError, Result};
use crate::event::Event;
use crate::id::{EventId, IdGenerator, TrackId};
use crate::values::{Pan, Ticks, Volume};

/// User-settable track properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackProps {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub volume: Volume,
    #[serde(default)]
    pub pan: Pan,
}

impl TrackProps {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_pan(mut self, pan: Pan) -> Self {
        self.pan = pan;
        self
    }
}

/// A track in the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackRecord", into = "TrackRecord")]
pub struct Track {
    id: TrackId,
    props: TrackProps,
    /// Sorted by time; equal times keep insertion order
    events: Arc<[Event]>,
}

impl Track {
    /// New empty track with a generated id
    pub fn create(props: TrackProps, ids: &dyn IdGenerator) -> Result<Self> {
        Ok(Self {
            id: TrackId::generate(ids)?,
            props,
            events: Arc::from(Vec::<Event>::new()),
        })
    }

    /// Rebuild a track from stored parts. Events are stably sorted by time.
    pub fn from_parts(id: TrackId, props: TrackProps, mut events: Vec<Event>) -> Result<Self> {
        {
            let mut seen = HashSet::with_capacity(events.len());
            for event in &events {
                if !seen.insert(event.id()) {
                    return Err(CadenzaError::invalid(format!(
                        "duplicate event id {} in track {}",
                        event.id(),
                        id
                    )));
                }
            }
        }
        events.sort_by_key(|e| e.time());
        Ok(Self {
            id,
            props,
            events: Arc::from(events),
        })
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn volume(&self) -> Volume {
        self.props.volume
    }

    pub fn pan(&self) -> Pan {
        self.props.pan
    }

    pub fn props(&self) -> &TrackProps {
        &self.props
    }

    /// All events in ascending time order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get_event(&self, event_id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id() == event_id)
    }

    /// Events with `start <= time <= end`, in ascending time order
    pub fn events_in_range(&self, start: i64, end: i64) -> Result<&[Event]> {
        let (start, end) = check_range(start, end)?;
        let lo = self.events.partition_point(|e| e.time().value() < start);
        let hi = self.events.partition_point(|e| e.time().value() <= end);
        Ok(&self.events[lo..hi])
    }

    /// Latest end tick of any event (0 when empty)
    pub fn end_time(&self) -> Ticks {
        self.events
            .iter()
            .map(Event::end_time)
            .max()
            .unwrap_or(Ticks::ZERO)
    }

    /// Copy of this track with `event` added after any events at the same time
    pub(crate) fn add_event(&self, event: Event) -> Result<Self> {
        if self.get_event(event.id()).is_some() {
            return Err(CadenzaError::invalid(format!(
                "event {} already exists in track {}",
                event.id(),
                self.id
            )));
        }
        let at = self.events.partition_point(|e| e.time() <= event.time());
        let mut events = Vec::with_capacity(self.events.len() + 1);
        events.extend_from_slice(&self.events[..at]);
        events.push(event);
        events.extend_from_slice(&self.events[at..]);
        Ok(Self {
            id: self.id.clone(),
            props: self.props.clone(),
            events: Arc::from(events),
        })
    }

    /// Copy of this track without the matching event. Absent ids are a no-op.
    pub(crate) fn remove_event(&self, event_id: &EventId) -> Self {
        let events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.id() != event_id)
            .cloned()
            .collect();
        Self {
            id: self.id.clone(),
            props: self.props.clone(),
            events: Arc::from(events),
        }
    }

    /// Copy of this track with new properties and the same events
    pub(crate) fn with_props(&self, props: TrackProps) -> Self {
        Self {
            id: self.id.clone(),
            props,
            events: Arc::clone(&self.events),
        }
    }
}

/// Validate an inclusive tick range coming from a caller
pub(crate) fn check_range(start: i64, end: i64) -> Result<(u64, u64)> {
    if start < 0 {
        return Err(CadenzaError::invalid(format!(
            "range start must be non-negative, got {start}"
        )));
    }
    if end < start {
        return Err(CadenzaError::invalid(format!(
            "range end {end} is before start {start}"
        )));
    }
    Ok((start as u64, end as u64))
}

#[derive(Serialize, Deserialize)]
struct TrackRecord {
    id: TrackId,
    #[serde(flatten)]
    props: TrackProps,
    events: Vec<Event>,
}

impl TryFrom<TrackRecord> for Track {
    type Error = CadenzaError;

    fn try_from(record: TrackRecord) -> Result<Self> {
        Self::from_parts(record.id, record.props, record.events)
    }
}

impl From<Track> for TrackRecord {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            props: track.props,
            events: track.events.to_vec(),
        }
    }
}
