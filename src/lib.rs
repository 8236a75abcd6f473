#![doc(test(attr(deny(warnings))))]

//! Parcel Ledger tracks one month of deliveries, ad spend, and profit per day,
//! and carries a running parcel deficit that says how far deliveries lag behind
//! the daily objective implied by advertising spend.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Parcel ledger tracing initialized.");
    });
}
