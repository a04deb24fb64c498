//! Time-stamped events that live on a track

use serde::{Deserialize, Serialize};

use crate::error::{CadenzaError, Result};
use crate::id::{EventId, IdGenerator};
use crate::values::{Pitch, Ticks, Velocity};

/// A single note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NoteRecord")]
pub struct Note {
    id: EventId,
    /// Start position in ticks
    time: Ticks,
    pitch: Pitch,
    velocity: Velocity,
    /// Always greater than zero
    duration: Ticks,
}

impl Note {
    /// Build a note with an explicit id, e.g. when reloading a document
    pub fn new(
        id: EventId,
        time: Ticks,
        pitch: Pitch,
        velocity: Velocity,
        duration: Ticks,
    ) -> Result<Self> {
        if duration.value() == 0 {
            return Err(CadenzaError::invalid("note duration must be positive"));
        }
        Ok(Self {
            id,
            time,
            pitch,
            velocity,
            duration,
        })
    }

    /// Build a note with a freshly generated id
    pub fn create(
        ids: &dyn IdGenerator,
        time: Ticks,
        pitch: Pitch,
        velocity: Velocity,
        duration: Ticks,
    ) -> Result<Self> {
        Self::new(EventId::generate(ids)?, time, pitch, velocity, duration)
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn time(&self) -> Ticks {
        self.time
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    /// End tick (start + duration)
    pub fn end_time(&self) -> Ticks {
        self.time.saturating_add(self.duration)
    }
}

#[derive(Deserialize)]
struct NoteRecord {
    id: EventId,
    time: Ticks,
    pitch: Pitch,
    velocity: Velocity,
    duration: Ticks,
}

impl TryFrom<NoteRecord> for Note {
    type Error = CadenzaError;

    fn try_from(record: NoteRecord) -> Result<Self> {
        Self::new(
            record.id,
            record.time,
            record.pitch,
            record.velocity,
            record.duration,
        )
    }
}

/// Anything that can be placed on a track. New kinds of event are new variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Note(Note),
}

impl Event {
    pub fn id(&self) -> &EventId {
        match self {
            Self::Note(note) => note.id(),
        }
    }

    pub fn time(&self) -> Ticks {
        match self {
            Self::Note(note) => note.time(),
        }
    }

    /// Tick at which the event stops sounding
    pub fn end_time(&self) -> Ticks {
        match self {
            Self::Note(note) => note.end_time(),
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Self::Note(note) => Some(note),
        }
    }
}

impl From<Note> for Event {
    fn from(note: Note) -> Self {
        Self::Note(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;

    fn ticks(value: i64) -> Ticks {
        Ticks::new(value).unwrap()
    }

    #[test]
    fn test_note_requires_positive_duration() {
        let id = EventId::new("n1").unwrap();
        let velocity = Velocity::new(100).unwrap();
        let err = Note::new(id, ticks(0), Pitch::MIDDLE_C, velocity, ticks(0)).unwrap_err();
        assert_eq!(err, CadenzaError::invalid("note duration must be positive"));
    }

    #[test]
    fn test_create_uses_generator() {
        let ids = SequentialIdGenerator::new("evt");
        let velocity = Velocity::new(90).unwrap();
        let note = Note::create(&ids, ticks(480), Pitch::MIDDLE_C, velocity, ticks(240)).unwrap();
        assert_eq!(note.id().as_str(), "evt-1");
        assert_eq!(note.end_time(), ticks(720));

        let event = Event::from(note.clone());
        assert_eq!(event.id(), note.id());
        assert_eq!(event.time(), ticks(480));
        assert_eq!(event.as_note(), Some(&note));
    }

    #[test]
    fn test_deserialize_rejects_zero_duration() {
        let json = r#"{"kind":"note","id":"a","time":0,"pitch":60,"velocity":100,"duration":0}"#;
        assert!(serde_json::from_str::<Event>(json).is_err());

        let json = r#"{"kind":"note","id":"a","time":10,"pitch":60,"velocity":100,"duration":5}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.time(), ticks(10));
    }
}
