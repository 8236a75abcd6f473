//! Services and session orchestration layered over the ledger domain.

pub mod ledger_manager;
pub mod services;
