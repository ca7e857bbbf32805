#![doc(test(attr(deny(warnings))))]

//! Cofrinho tracks installment purchases: parcel schedules, paid state, and remaining
//! balances per owner, with the cards they are charged to.

pub mod cli;
pub mod session;
pub mod utils;

pub use session::PlanSession;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Cofrinho tracing initialized.");
    });
}
