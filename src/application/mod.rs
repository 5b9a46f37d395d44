//! Application layer containing the conversation logic.
//!
//! This module defines the `ConversationEngine`, the per-user state machine that
//! turns inbound events into ledger mutations and replies. Concurrency is handled
//! with one lock per user session plus the store's own write lock.

pub mod engine;
pub mod reply;
