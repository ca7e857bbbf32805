//! cofrinho-core
//!
//! Installment engine and wallet services.
//! Depends on cofrinho-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod card_service;
pub mod engine;
pub mod error;
pub mod format;
pub mod plan_service;
pub mod repository;
pub mod schedule_service;
pub mod summary_service;
pub mod time;

pub use card_service::*;
pub use engine::*;
pub use error::CoreError;
pub use plan_service::*;
pub use repository::{
    wallet_ops, CardRepository, InMemoryRepository, PlanFields, PlanRepository, WalletRepository,
};
pub use schedule_service::*;
pub use summary_service::*;

#[cfg(test)]
mod tests;
