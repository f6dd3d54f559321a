#![doc(test(attr(deny(warnings))))]

//! Budget Tree keeps a hierarchical budget: categories nest inside
//! categories, leaves carry amounts and every other total is derived.
//! This crate hosts the editing session and the command-line front end on
//! top of the `budtree-*` crates.

pub mod cli;
pub mod errors;
pub mod session;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Tree tracing initialized.");
    });
}
