//! Shared types. Use date types (chrono) for timestamps, not raw strings.

pub mod event;

pub use event::{EventProperties, RawEvent};
