use crate::domain::ports::LedgerStore;
use crate::domain::profile::Profile;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing profiles, keyed by user id.
pub const CF_PROFILES: &str = "profiles";

/// A persistent ledger store implementation using RocksDB.
///
/// Each profile is one JSON value under its user id. A single put replaces the
/// whole entry atomically; the write lock keeps upserts in one critical section
/// like the other backends.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "profiles" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_profiles = ColumnFamilyDescriptor::new(CF_PROFILES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_profiles])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn profiles_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PROFILES).ok_or_else(|| {
            LedgerError::InternalError(Box::new(std::io::Error::other(
                "Profiles column family not found",
            )))
        })
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let cf = self.profiles_cf()?;
        match self.db.get_cf(cf, user_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, user_id: &str, profile: Profile) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let cf = self.profiles_cf()?;
        let value = serde_json::to_vec(&profile)?;
        self.db.put_cf(cf, user_id.as_bytes(), value)?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<(String, Profile)>> {
        let cf = self.profiles_cf()?;
        let mut profiles = Vec::new();

        // Keys iterate in byte order, which is user id order.
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (key, value) = item?;
            let user_id = String::from_utf8(key.to_vec()).map_err(|e| {
                LedgerError::InternalError(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Non UTF-8 user id: {}", e),
                )))
            })?;
            profiles.push((user_id, serde_json::from_slice(&value)?));
        }

        Ok(profiles)
    }
}
