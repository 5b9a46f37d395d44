use crate::domain::ports::LedgerStore;
use crate::domain::profile::Profile;
use crate::domain::session::Session;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// A thread-safe in-memory ledger store.
///
/// Uses `Arc<RwLock<HashMap<String, Profile>>>` to allow shared concurrent access.
/// Ideal for testing or runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(user_id).cloned())
    }

    async fn upsert(&self, user_id: &str, profile: Profile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(user_id.to_string(), profile);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<(String, Profile)>> {
        let profiles = self.profiles.read().await;
        let mut all: Vec<_> = profiles
            .iter()
            .map(|(id, p)| (id.clone(), p.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }
}

/// Conversation sessions, one per user, held only in process memory.
///
/// Each session sits behind its own lock. Holding a user's guard for the
/// length of a transition serializes that user's events without blocking
/// anyone else.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the user's session, creating an idle one on first use.
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(user_id.to_string()).or_default())
        };
        slot.lock_owned().await
    }

    /// Unlocks the user's session and drops it from the map if it is idle and
    /// no other event is holding or waiting for it.
    pub async fn release(&self, user_id: &str, guard: OwnedMutexGuard<Session>) {
        let idle = *guard == Session::default();
        drop(guard);
        if !idle {
            return;
        }

        // New handles to a slot are only cloned under the map lock, so a count
        // of one here means nobody else can reach it.
        let mut sessions = self.sessions.lock().await;
        let unused = sessions.get(user_id).is_some_and(|slot| {
            Arc::strong_count(slot) == 1
                && slot
                    .try_lock()
                    .is_ok_and(|session| *session == Session::default())
        });
        if unused {
            sessions.remove(user_id);
        }
    }

    /// A copy of the user's current session, or a fresh one.
    pub async fn snapshot(&self, user_id: &str) -> Session {
        let guard = self.lock(user_id).await;
        let session = guard.clone();
        self.release(user_id, guard).await;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::Birthday;
    use crate::domain::money::Amount;
    use crate::domain::session::ConversationState;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn profile(name: &str) -> Profile {
        let created = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Profile::new(name.to_string(), Birthday::parse("01-01-90").unwrap(), created)
    }

    #[tokio::test]
    async fn test_in_memory_ledger_store() {
        let store = InMemoryLedgerStore::new();
        let mut p = profile("Alex");
        p.record_income(Amount::new(dec!(100.0)).unwrap(), p.created_at)
            .unwrap();

        store.upsert("1", p.clone()).await.unwrap();
        let retrieved = store.get("1").await.unwrap().unwrap();
        assert_eq!(retrieved, p);

        assert!(store.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_ledger_store_get_all_sorted() {
        let store = InMemoryLedgerStore::new();
        store.upsert("b", profile("Bo")).await.unwrap();
        store.upsert("a", profile("Al")).await.unwrap();

        let all = store.get_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_session_created_lazily() {
        let sessions = InMemorySessionStore::new();
        assert_eq!(sessions.snapshot("42").await, Session::default());

        sessions.lock("42").await.state = ConversationState::AwaitingName;
        assert_eq!(
            sessions.snapshot("42").await.state,
            ConversationState::AwaitingName
        );
        assert_eq!(sessions.snapshot("43").await.state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_dropped_on_release() {
        let sessions = InMemorySessionStore::new();

        let mut guard = sessions.lock("1").await;
        guard.state = ConversationState::AwaitingName;
        sessions.release("1", guard).await;
        assert_eq!(sessions.sessions.lock().await.len(), 1);

        let mut guard = sessions.lock("1").await;
        guard.reset();
        sessions.release("1", guard).await;
        assert!(sessions.sessions.lock().await.is_empty());

        assert_eq!(sessions.snapshot("2").await, Session::default());
        assert!(sessions.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_release_keeps_session_another_event_is_waiting_for() {
        let sessions = InMemorySessionStore::new();
        let guard = sessions.lock("1").await;

        let waiter = {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                let mut guard = sessions.lock("1").await;
                guard.state = ConversationState::AwaitingIncomeAmount;
                sessions.release("1", guard).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        sessions.release("1", guard).await;
        waiter.await.unwrap();
        assert_eq!(
            sessions.snapshot("1").await.state,
            ConversationState::AwaitingIncomeAmount
        );
    }

    #[tokio::test]
    async fn test_session_lock_is_per_user() {
        let sessions = InMemorySessionStore::new();
        let held = sessions.lock("1").await;

        // Another user is not blocked by user 1's guard.
        let other = tokio::time::timeout(Duration::from_millis(100), sessions.lock("2")).await;
        assert!(other.is_ok());

        // The same user is.
        let same = tokio::time::timeout(Duration::from_millis(50), sessions.lock("1")).await;
        assert!(same.is_err());
        drop(held);
    }
}
