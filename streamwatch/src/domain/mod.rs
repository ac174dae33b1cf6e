//! Domain model of the presence engine.
//!
//! Records are explicit tagged structs validated at the storage boundary,
//! so a malformed document surfaces as a typed error instead of a missing
//! key at use time.

pub mod planned;
pub mod tracked;

pub use planned::{PlannedStatus, PlannedStream};
pub use tracked::{ChannelKind, EventRef, MessageRef, PresentationMode, TrackedStreamer};
