//! Sayback session layer
//!
//! Owns everything around a single practice attempt that is not
//! scoring math or adapter I/O:
//!
//! - the attempt state machine (`Idle -> Recording -> Transcribing ->
//!   Scored`, with `Errored` off the two active states)
//! - the value shapes handed across the persistence and feedback
//!   boundaries ([`AttemptRecord`], [`SessionEvent`])
//! - the sentence catalog the prompts come from
//!
//! The state machine is a plain value: the daemon holds the current
//! attempt as an explicit context object and feeds it events. There is
//! no ambient global state anywhere in this crate.

pub mod attempt;
pub mod events;
pub mod library;
pub mod record;

pub use attempt::{Attempt, AttemptState, Transition};
pub use events::SessionEvent;
pub use library::{Sentence, SentenceLibrary};
pub use record::{AttemptRecord, HistoryStore, MemoryHistory, UserStats};
