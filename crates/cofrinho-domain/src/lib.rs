//! cofrinho-domain
//!
//! Pure domain models (InstallmentPlan, CreditCard, Wallet, etc.).
//! No I/O, no CLI, no storage. Only data types, core enums, and calendar/money math.

pub mod calendar;
pub mod card;
pub mod category;
pub mod common;
pub mod money;
pub mod plan;
pub mod wallet;

pub use card::*;
pub use category::*;
pub use common::*;
pub use plan::*;
pub use wallet::*;

pub use rust_decimal::Decimal;
