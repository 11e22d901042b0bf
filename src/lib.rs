#![doc(test(attr(deny(warnings))))]

//! Ledger Core implements the recurring-transaction and derived-balance engine
//! behind a personal-finance ledger: bounded series materialization, scoped
//! series edits and deletes, savings-goal synchronization, and cached monthly
//! balance snapshots chained across months.

pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod time;
pub mod utils;

pub use errors::CoreError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
