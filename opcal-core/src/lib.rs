//! Core engine for the opcal operational calendar.
//!
//! This crate merges two remote event sources (timed appointments and
//! read-only all-day activations) into one unified agenda model, expands
//! recurring appointment series client-side, coordinates optimistic
//! mutations against the remote system of record, and schedules local
//! reminders ahead of upcoming appointments.

pub mod agenda;
pub mod constants;
pub mod coordinator;
pub mod entry;
pub mod error;
pub mod normalize;
pub mod notify;
pub mod range;
pub mod record;
pub mod recurrence;
pub mod reminder;
pub mod remote;
pub mod settings;
pub mod time;
pub mod transport;

pub use entry::{Entry, EntryKind, EntryTime};
pub use error::{OpcalError, OpcalResult};
