#![doc(test(attr(deny(warnings))))]

//! Desire Core tracks recurring "desires" (planned expenses), normalizes them
//! to a monthly cost, aggregates totals against an optional budget goal and
//! persists them as JSON with rolling backups.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod desire;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Desire Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
