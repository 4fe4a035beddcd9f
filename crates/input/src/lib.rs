//! Input: pointer, resize and overlay events mapped to actions.
//!
//! # Invariants
//! - The wall consumes actions, never raw window events.
//! - Pointer positions are physical pixels relative to the surface's
//!   top-left corner.

pub mod action;

pub use action::Action;
