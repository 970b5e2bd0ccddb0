use super::{SettingsChanges, SettingsError, SettingsStore, SettingsValues, ValueChange};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// 進程內設置存儲
pub struct MemorySettingsStore {
    values: Mutex<SettingsValues>,
    tx: broadcast::Sender<SettingsChanges>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::with_values(SettingsValues::new())
    }

    pub fn with_values(values: SettingsValues) -> Self {
        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: Mutex::new(values),
            tx,
        }
    }

    /// 合併新值，返回變更集合與合併後的快照
    async fn merge(&self, incoming: SettingsValues) -> (SettingsChanges, SettingsValues) {
        let mut values = self.values.lock().await;
        let mut changes = SettingsChanges::new();

        for (key, new_value) in incoming {
            let old_value = values.get(&key).cloned();
            if old_value.as_ref() == Some(&new_value) {
                continue;
            }
            values.insert(key.clone(), new_value.clone());
            changes.insert(key, ValueChange { new_value, old_value });
        }

        (changes, values.clone())
    }

    fn notify(&self, changes: SettingsChanges) {
        if changes.is_empty() {
            return;
        }
        // 沒有訂閱者時發送失敗是正常情況
        let _ = self.tx.send(changes);
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, keys: &[&str]) -> Result<SettingsValues, SettingsError> {
        let values = self.values.lock().await;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, values: SettingsValues) -> Result<(), SettingsError> {
        let (changes, _) = self.merge(values).await;
        self.notify(changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChanges> {
        self.tx.subscribe()
    }
}

/// TOML 文件設置存儲，每次 `set` 後整體寫回
pub struct FileSettingsStore {
    path: PathBuf,
    inner: MemorySettingsStore,
}

impl FileSettingsStore {
    /// 打開設置文件，文件不存在時視為空存儲
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| SettingsError::Io(e.to_string()))?;
            toml::from_str::<SettingsValues>(&content).map_err(|e| SettingsError::Format(e.to_string()))?
        } else {
            SettingsValues::new()
        };

        log::debug!("[Settings] 打開設置文件 {:?}（{} 個鍵）", path, values.len());

        Ok(Self {
            path,
            inner: MemorySettingsStore::with_values(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, snapshot: &SettingsValues) -> Result<(), SettingsError> {
        let content = toml::to_string(snapshot).map_err(|e| SettingsError::Format(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SettingsError::Io(e.to_string()))?;
            }
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| SettingsError::Io(e.to_string()))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self, keys: &[&str]) -> Result<SettingsValues, SettingsError> {
        self.inner.get(keys).await
    }

    async fn set(&self, values: SettingsValues) -> Result<(), SettingsError> {
        let (changes, snapshot) = self.inner.merge(values).await;
        if changes.is_empty() {
            return Ok(());
        }
        self.persist(&snapshot).await?;
        self.inner.notify(changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChanges> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{load_settings, save_settings, Settings, KEY_ENABLED, KEY_TARGET_LANG};
    use serde_json::json;

    fn values(pairs: &[(&str, serde_json::Value)]) -> SettingsValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[tokio::test]
    async fn test_set_broadcasts_only_changed_keys() {
        let store = MemorySettingsStore::with_values(values(&[(KEY_ENABLED, json!(true))]));
        let mut rx = store.subscribe();

        store
            .set(values(&[(KEY_ENABLED, json!(true)), (KEY_TARGET_LANG, json!("ja"))]))
            .await
            .unwrap();

        let changes = rx.recv().await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[KEY_TARGET_LANG].new_value, json!("ja"));
        assert_eq!(changes[KEY_TARGET_LANG].old_value, None);
    }

    #[tokio::test]
    async fn test_unchanged_set_is_silent() {
        let store = MemorySettingsStore::with_values(values(&[(KEY_ENABLED, json!(true))]));
        let mut rx = store.subscribe();

        store.set(values(&[(KEY_ENABLED, json!(true))])).await.unwrap();

        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_get_skips_missing_keys() {
        let store = MemorySettingsStore::new();
        let got = store.get(&[KEY_ENABLED]).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_round_trips_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let store = FileSettingsStore::open(&path).unwrap();
        let settings = Settings {
            target_lang: "ko".to_string(),
            dict_show_phonetic: false,
            ..Settings::default()
        };
        save_settings(&store, &settings).await.unwrap();
        assert!(path.exists());

        let reopened = FileSettingsStore::open(&path).unwrap();
        let loaded = load_settings(&reopened).await.unwrap();
        assert_eq!(loaded, settings);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("dictTriggerMode = \"hover\""));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "enabled = = true").unwrap();

        assert!(matches!(FileSettingsStore::open(&path), Err(SettingsError::Format(_))));
    }
}
