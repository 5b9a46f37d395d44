use super::profile::Profile;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Durable mapping from user id to [`Profile`].
///
/// Implementations serialize every write through one critical section: the
/// full current store state is loaded, the user's entry replaced, and the
/// full state persisted before the lock is released. A failed write leaves
/// the previous complete state in place.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>>;
    async fn upsert(&self, user_id: &str, profile: Profile) -> Result<()>;
    /// Every stored profile, ordered by user id.
    async fn get_all(&self) -> Result<Vec<(String, Profile)>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;

/// Source of "now" for timestamps and derived views.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
