//! Caller-side state around the pure core: the current tree, debounced
//! autosave, and access to saved history.

pub mod autosave;
pub mod manager;

pub use autosave::{SaveDebouncer, DEFAULT_QUIET_MS};
pub use manager::{BudgetSession, OpenReport, SessionSettings};
