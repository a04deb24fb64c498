//! Project: the aggregate root owning every track
//!
//! A [`Project`] is an immutable snapshot. Every operation that looks like a
//! mutation returns a new project; the receiver stays valid and unchanged.
//! Tracks are held behind `Arc`, so a new snapshot reuses every track it did
//! not touch and replaces only the one that changed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CadenzaError, Result};
use crate::event::{Event, Note};
use crate::id::{EventId, IdGenerator, TrackId, UuidGenerator};
use crate::settings::ProjectSettings;
use crate::track::{Track, TrackProps, check_range};
use crate::values::{Pan, Pitch, Seconds, Ticks, Velocity, Volume};

/// The whole composition
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "ProjectRecord", into = "ProjectRecord")]
pub struct Project {
    settings: ProjectSettings,
    /// Insertion order
    tracks: Vec<Arc<Track>>,
    /// Track id -> position in `tracks`
    index: Arc<HashMap<TrackId, usize>>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            settings: ProjectSettings::default(),
            tracks: Vec::new(),
            index: Arc::default(),
            ids: Arc::new(UuidGenerator),
        }
    }
}

impl Project {
    /// Build a project from existing tracks. Track ids must be distinct.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        let tracks: Vec<Arc<Track>> = tracks.into_iter().map(Arc::new).collect();
        let index = build_index(&tracks)?;
        Ok(Self {
            tracks,
            index: Arc::new(index),
            ..Default::default()
        })
    }

    /// Use `ids` for every track and event id this project (and the
    /// snapshots derived from it) generates
    pub fn with_id_generator(self, ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids, ..self }
    }

    pub fn with_settings(&self, settings: ProjectSettings) -> Self {
        tracing::debug!(
            "Project settings changed: {} BPM, {}",
            settings.tempo.bpm(),
            settings.time_signature
        );
        Self {
            settings,
            ..self.clone()
        }
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Add an empty track. Returns the new project and the created track.
    pub fn add_track(&self, props: TrackProps) -> Result<(Self, Track)> {
        let track = Track::create(props, self.ids.as_ref())?;
        if self.index.contains_key(track.id()) {
            tracing::debug!("Rejected add_track: generated id {} already in use", track.id());
            return Err(CadenzaError::invalid(format!(
                "track id {} already exists",
                track.id()
            )));
        }

        let mut tracks = self.tracks.clone();
        let mut index = (*self.index).clone();
        index.insert(track.id().clone(), tracks.len());
        tracks.push(Arc::new(track.clone()));

        tracing::debug!("Added track {} ({:?})", track.id(), track.name());
        Ok((self.rebuilt(tracks, Arc::new(index)), track))
    }

    /// Drop a track and its events. Unknown ids leave the project as it is.
    pub fn remove_track(&self, track_id: &TrackId) -> Self {
        if !self.index.contains_key(track_id) {
            return self.clone();
        }

        let tracks: Vec<Arc<Track>> = self
            .tracks
            .iter()
            .filter(|t| t.id() != track_id)
            .cloned()
            .collect();
        let index: HashMap<TrackId, usize> = tracks
            .iter()
            .enumerate()
            .map(|(pos, t)| (t.id().clone(), pos))
            .collect();

        tracing::debug!("Removed track {}", track_id);
        self.rebuilt(tracks, Arc::new(index))
    }

    /// Create a note with a generated id and put it on `track_id`
    pub fn add_note_event(
        &self,
        track_id: &TrackId,
        time: Ticks,
        pitch: Pitch,
        velocity: Velocity,
        duration: Ticks,
    ) -> Result<(Self, Note)> {
        self.position(track_id)?;
        let note = Note::create(self.ids.as_ref(), time, pitch, velocity, duration)?;
        let project = self.add_event(track_id, note.clone().into())?;
        Ok((project, note))
    }

    /// Put an already-built event on `track_id`
    pub fn add_event(&self, track_id: &TrackId, event: Event) -> Result<Self> {
        let pos = self.position(track_id)?;
        let event_id = event.id().clone();
        let track = self.tracks[pos].add_event(event)?;
        tracing::debug!("Added event {} to track {}", event_id, track_id);
        Ok(self.with_track_at(pos, track))
    }

    /// Remove an event from `track_id`. The track must exist; the event need not.
    pub fn remove_event(&self, track_id: &TrackId, event_id: &EventId) -> Result<Self> {
        let pos = self.position(track_id)?;
        let current = &self.tracks[pos];
        if current.get_event(event_id).is_none() {
            tracing::debug!("Event {} not on track {}, nothing removed", event_id, track_id);
            return Ok(self.clone());
        }
        let track = current.remove_event(event_id);
        tracing::debug!("Removed event {} from track {}", event_id, track_id);
        Ok(self.with_track_at(pos, track))
    }

    pub fn rename_track(&self, track_id: &TrackId, name: impl Into<String>) -> Result<Self> {
        let pos = self.position(track_id)?;
        let current = &self.tracks[pos];
        let props = TrackProps {
            name: name.into(),
            ..current.props().clone()
        };
        tracing::debug!("Renamed track {} to {:?}", track_id, props.name);
        Ok(self.with_track_at(pos, current.with_props(props)))
    }

    pub fn set_track_mix(&self, track_id: &TrackId, volume: Volume, pan: Pan) -> Result<Self> {
        let pos = self.position(track_id)?;
        let current = &self.tracks[pos];
        let props = current.props().clone().with_volume(volume).with_pan(pan);
        tracing::debug!(
            "Track {} mix set to volume {} pan {}",
            track_id,
            volume.value(),
            pan.value()
        );
        Ok(self.with_track_at(pos, current.with_props(props)))
    }

    pub fn get_track(&self, track_id: &TrackId) -> Option<&Track> {
        self.index.get(track_id).map(|&pos| self.tracks[pos].as_ref())
    }

    /// Tracks in insertion order
    pub fn tracks(&self) -> impl ExactSizeIterator<Item = &Track> + '_ {
        self.tracks.iter().map(|t| t.as_ref())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Events from every track with `start <= time <= end`, sorted by time.
    /// Ties keep track order, then each track's own order.
    pub fn events_in_range(&self, start: i64, end: i64) -> Result<Vec<Event>> {
        check_range(start, end)?;
        let mut events = Vec::new();
        for track in &self.tracks {
            events.extend_from_slice(track.events_in_range(start, end)?);
        }
        events.sort_by_key(|e| e.time());
        tracing::trace!("events_in_range({}, {}) -> {} events", start, end, events.len());
        Ok(events)
    }

    /// Every event of every track, sorted by time with the same tie rule
    pub fn events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .tracks
            .iter()
            .flat_map(|t| t.events().iter().cloned())
            .collect();
        events.sort_by_key(|e| e.time());
        events
    }

    /// End tick of the last event in the project
    pub fn duration_ticks(&self) -> Ticks {
        self.tracks
            .iter()
            .map(|t| t.end_time())
            .max()
            .unwrap_or(Ticks::ZERO)
    }

    pub fn ticks_to_seconds(&self, ticks: Ticks) -> Result<Seconds> {
        self.settings.ticks_to_seconds(ticks)
    }

    pub fn seconds_to_ticks(&self, seconds: Seconds) -> Result<Ticks> {
        self.settings.seconds_to_ticks(seconds)
    }

    fn position(&self, track_id: &TrackId) -> Result<usize> {
        match self.index.get(track_id) {
            Some(&pos) => Ok(pos),
            None => {
                tracing::debug!("Unknown track id {}", track_id);
                Err(CadenzaError::invalid(format!("track not found: {track_id}")))
            }
        }
    }

    /// New snapshot with the track at `pos` replaced; all others are shared
    fn with_track_at(&self, pos: usize, track: Track) -> Self {
        let mut tracks = self.tracks.clone();
        tracks[pos] = Arc::new(track);
        self.rebuilt(tracks, Arc::clone(&self.index))
    }

    fn rebuilt(&self, tracks: Vec<Arc<Track>>, index: Arc<HashMap<TrackId, usize>>) -> Self {
        Self {
            settings: self.settings,
            tracks,
            index,
            ids: Arc::clone(&self.ids),
        }
    }
}

fn build_index(tracks: &[Arc<Track>]) -> Result<HashMap<TrackId, usize>> {
    let mut index = HashMap::with_capacity(tracks.len());
    for (pos, track) in tracks.iter().enumerate() {
        if index.insert(track.id().clone(), pos).is_some() {
            return Err(CadenzaError::invalid(format!(
                "duplicate track id {}",
                track.id()
            )));
        }
    }
    Ok(index)
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings && self.tracks == other.tracks
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("settings", &self.settings)
            .field("tracks", &self.tracks)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
struct ProjectRecord {
    #[serde(default)]
    settings: ProjectSettings,
    tracks: Vec<Track>,
}

impl TryFrom<ProjectRecord> for Project {
    type Error = CadenzaError;

    fn try_from(record: ProjectRecord) -> Result<Self> {
        let project = Self::new(record.tracks)?;
        Ok(Self {
            settings: record.settings,
            ..project
        })
    }
}

impl From<Project> for ProjectRecord {
    fn from(project: Project) -> Self {
        Self {
            settings: project.settings,
            tracks: project.tracks.iter().map(|t| Track::clone(t)).collect(),
        }
    }
}
