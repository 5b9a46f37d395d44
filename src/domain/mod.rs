//! Domain layer: the ledger's data model and the ports its adapters implement.

pub mod calendar;
pub mod event;
pub mod money;
pub mod ports;
pub mod profile;
pub mod session;
