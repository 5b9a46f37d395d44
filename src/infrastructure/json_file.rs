use crate::domain::ports::LedgerStore;
use crate::domain::profile::Profile;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

type ProfileMap = BTreeMap<String, Profile>;

/// A ledger store kept as one pretty-printed JSON object keyed by user id.
///
/// The whole file is read before and written after every upsert, under a
/// single store-wide lock. Writes go to a sibling `.tmp` file that is then
/// renamed over the previous one, so readers only ever see a complete file.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. The file is created on the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Result<ProfileMap> {
        let path = self.path.clone();
        let profiles = tokio::task::spawn_blocking(move || read_profiles(&path))
            .await
            .map_err(|e| LedgerError::InternalError(Box::new(e)))??;

        for (user_id, profile) in &profiles {
            if !profile.is_consistent() {
                tracing::warn!(%user_id, "stored balance does not match recorded entries");
            }
        }
        Ok(profiles)
    }

    async fn save(&self, profiles: ProfileMap) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_profiles(&path, &profiles))
            .await
            .map_err(|e| LedgerError::InternalError(Box::new(e)))?
    }
}

#[async_trait]
impl LedgerStore for JsonFileStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let _guard = self.lock.lock().await;
        let mut profiles = self.load().await?;
        Ok(profiles.remove(user_id))
    }

    async fn upsert(&self, user_id: &str, profile: Profile) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut profiles = self.load().await?;
        profiles.insert(user_id.to_string(), profile);
        self.save(profiles).await?;
        tracing::debug!(%user_id, path = %self.path.display(), "ledger saved");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<(String, Profile)>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().collect())
    }
}

fn read_profiles(path: &Path) -> Result<ProfileMap> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(ProfileMap::new()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ProfileMap::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_profiles(path: &Path, profiles: &ProfileMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(profiles)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::Birthday;
    use crate::domain::money::Amount;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn profile(name: &str) -> Profile {
        let created = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Profile::new(name.to_string(), Birthday::parse("01-01-90").unwrap(), created)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("user_data.json"));

        assert!(store.get("1").await.unwrap().is_none());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("user_data.json");

        let mut p = profile("Alex");
        p.record_expense(
            "Coffee".to_string(),
            Amount::new(dec!(150)).unwrap(),
            p.created_at,
        )
        .unwrap();
        JsonFileStore::open(&path).upsert("1", p.clone()).await.unwrap();
        JsonFileStore::open(&path).upsert("2", profile("Sam")).await.unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("1").await.unwrap(), Some(p));
        assert_eq!(reopened.get_all().await.unwrap().len(), 2);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_on_disk_layout_keyed_by_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_data.json");
        let store = JsonFileStore::open(&path);
        store.upsert("12345", profile("Alex")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &raw["12345"];
        assert_eq!(entry["name"], "Alex");
        assert_eq!(entry["birthday"], "01-01-90");
        assert_eq!(entry["created_at"], "2025-01-01 10:00:00");
        assert!(entry["expenses"].as_array().unwrap().is_empty());
        assert!(entry["incomes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amounts_survive_reopen_exactly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_data.json");

        let mut p = profile("Alex");
        let precise = Amount::parse("123456789.123456789123").unwrap();
        p.record_income(precise, p.created_at).unwrap();
        p.record_income(Amount::parse("0.1").unwrap(), p.created_at)
            .unwrap();
        p.record_expense("Tea".to_string(), Amount::parse("0.2").unwrap(), p.created_at)
            .unwrap();
        JsonFileStore::open(&path).upsert("1", p.clone()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("123456789.123456789123"));

        let reloaded = JsonFileStore::open(&path).get("1").await.unwrap().unwrap();
        assert_eq!(reloaded, p);
        assert_eq!(reloaded.balance().0, dec!(123456789.023456789123));
        assert!(reloaded.is_consistent());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_not_an_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        let err = store.upsert("1", profile("Alex")).await.unwrap_err();
        assert!(err.is_persistence());

        // The unreadable file was not overwritten.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_concurrent_upserts_do_not_lose_users() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("user_data.json"));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert(&i.to_string(), profile(&format!("user{i}")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_all().await.unwrap().len(), 20);
    }
}
