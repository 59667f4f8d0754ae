//! Core module: UI-agnostic session state and the operations that drive it.
//!
//! This module contains:
//! - `session`: Session store and its transitions
//! - `ui`: Error display, loading indicator and navigation collaborators
//! - `gateway`: Network operations feeding both stores
//! - `interrupt`: Ctrl+C handling for cancelling in-flight requests

pub mod gateway;
pub mod interrupt;
pub mod session;
pub mod ui;
