//! budtree-domain
//!
//! Pure domain models for the budget tree (nodes, breakdown segments, history
//! entries). No I/O, no CLI, no storage. Only data types and their invariants.

pub mod amount;
pub mod common;
pub mod history;
pub mod node;
pub mod segment;

pub use common::*;
pub use history::*;
pub use node::*;
pub use segment::*;
