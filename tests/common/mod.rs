#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use ledgerbot::application::engine::ConversationEngine;
use ledgerbot::domain::ports::{LedgerStore, LedgerStoreBox};
use ledgerbot::domain::profile::Profile;
use ledgerbot::error::Result;
use ledgerbot::infrastructure::clock::FixedClock;
use ledgerbot::infrastructure::in_memory::InMemoryLedgerStore;
use ledgerbot::interfaces::channel::{ChannelEvent, ReplyDirective};
use ledgerbot::interfaces::router::DispatchRouter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// An in-memory store whose writes can be made to fail on demand.
#[derive(Clone, Default)]
pub struct FailingStore {
    inner: InMemoryLedgerStore,
    failing: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for FailingStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        self.inner.get(user_id).await
    }

    async fn upsert(&self, user_id: &str, profile: Profile) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.upsert(user_id, profile).await
    }

    async fn get_all(&self) -> Result<Vec<(String, Profile)>> {
        self.inner.get_all().await
    }
}

pub fn router_with(store: LedgerStoreBox, clock: FixedClock) -> DispatchRouter {
    DispatchRouter::new(ConversationEngine::with_clock(store, Arc::new(clock)))
}

/// A router over a fresh in-memory store, with the clock at 2025-06-15.
pub fn router() -> DispatchRouter {
    router_with(
        Box::new(InMemoryLedgerStore::new()),
        FixedClock::new(at(2025, 6, 15)),
    )
}

pub async fn send(router: &DispatchRouter, user: &str, text: &str) -> Option<ReplyDirective> {
    router.dispatch(ChannelEvent::message(user, text)).await
}

pub async fn press(router: &DispatchRouter, user: &str, code: &str) -> Option<ReplyDirective> {
    router.dispatch(ChannelEvent::callback(user, code)).await
}

pub async fn onboard(router: &DispatchRouter, user: &str, name: &str, birthday: &str) {
    send(router, user, "/start").await;
    send(router, user, name).await;
    send(router, user, birthday).await;
}

pub async fn add_expense(router: &DispatchRouter, user: &str, name: &str, amount: &str) {
    press(router, user, "add_expense").await;
    send(router, user, name).await;
    send(router, user, amount).await;
}

pub async fn add_income(router: &DispatchRouter, user: &str, amount: &str) {
    press(router, user, "add_income").await;
    send(router, user, amount).await;
}
