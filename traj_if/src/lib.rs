//! # Trajectory tools interface crate.
//!
//! Provides the interfaces shared between the trajectory tools and anything driving them, i.e.
//! the input events accepted by the trajectory editor.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Editor input events and their parsers
pub mod event;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use event::{EditEvent, EventParseError};
