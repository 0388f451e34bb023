//! Application state management
//!
//! Shared handle passed to every request handler.

pub mod app_state;

pub use app_state::AppState;
