//! budtree-core
//!
//! Derived computations and structural edits over budget trees, plus the
//! persistence gateway contract. Depends on budtree-domain. No CLI, no timers,
//! no terminal I/O, no direct file access.

pub mod breakdown;
pub mod error;
pub mod export;
pub mod history;
pub mod storage;
pub mod time;
pub mod total;
pub mod tree;

pub use breakdown::*;
pub use error::CoreError;
pub use history::*;
pub use storage::{snapshot_warnings, BudgetStorage, MemoryStorage};
pub use time::{Clock, ManualClock, SystemClock};
pub use total::*;
pub use tree::*;
