//! cadenza-core: Persistent, immutable composition model
//!
//! A [`Project`] owns [`Track`]s, each holding time-sorted [`Event`]s. Every
//! update returns a new snapshot and leaves the old one untouched, so undo
//! history, comparisons and concurrent readers need no locking.

mod error;
mod event;
mod id;
mod project;
mod settings;
mod track;
pub mod values;

pub use error::{CadenzaError, Result};
pub use event::{Event, Note};
pub use id::{EventId, IdGenerator, SequentialIdGenerator, TrackId, UuidGenerator};
pub use project::Project;
pub use settings::ProjectSettings;
pub use track::{Track, TrackProps};
pub use values::{Pan, Pitch, Seconds, Tempo, Ticks, TimeSignature, Velocity, Volume};
