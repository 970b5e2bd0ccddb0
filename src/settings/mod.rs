/**
 * 設置模塊
 * 本地鏡像的用戶設置，以及外部設置存儲的接口
 *
 * 存儲以 camelCase 鍵名保存 JSON 值，
 * `Settings` 負責默認值與強制的懸停觸發模式
 */
mod store;

pub use store::{FileSettingsStore, MemorySettingsStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_TARGET_LANG: &str = "targetLang";
pub const KEY_DICT_ENABLED: &str = "dictEnabled";
pub const KEY_DICT_TRIGGER_MODE: &str = "dictTriggerMode";
pub const KEY_DICT_SHOW_PHONETIC: &str = "dictShowPhonetic";

/// 初始化時讀取的全部鍵
pub const ALL_KEYS: [&str; 5] = [
    KEY_ENABLED,
    KEY_TARGET_LANG,
    KEY_DICT_ENABLED,
    KEY_DICT_TRIGGER_MODE,
    KEY_DICT_SHOW_PHONETIC,
];

pub const DEFAULT_TARGET_LANG: &str = "zh-CN";

/// 鍵值快照
pub type SettingsValues = BTreeMap<String, Value>;

/// 單個鍵的變更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub new_value: Value,
    pub old_value: Option<Value>,
}

/// 一次 `set` 產生的變更集合（只包含實際改變的鍵）
pub type SettingsChanges = BTreeMap<String, ValueChange>;

/// 查詞觸發方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    Hover,
    Selection,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Hover => "hover",
            TriggerMode::Selection => "selection",
        }
    }
}

/// 用戶設置
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    pub target_lang: String,
    pub dict_enabled: bool,
    /// 固定為懸停模式，存儲中的其他值在加載與保存時都會被覆蓋
    pub dict_trigger_mode: TriggerMode,
    pub dict_show_phonetic: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            dict_enabled: true,
            dict_trigger_mode: TriggerMode::Hover,
            dict_show_phonetic: true,
        }
    }
}

impl Settings {
    /// 從存儲快照構建設置，缺失或類型不符的鍵使用默認值
    pub fn from_values(values: &SettingsValues) -> Self {
        let defaults = Self::default();
        Self {
            enabled: bool_or(values.get(KEY_ENABLED), defaults.enabled),
            target_lang: values
                .get(KEY_TARGET_LANG)
                .and_then(Value::as_str)
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.target_lang),
            dict_enabled: bool_or(values.get(KEY_DICT_ENABLED), defaults.dict_enabled),
            dict_trigger_mode: TriggerMode::Hover,
            dict_show_phonetic: bool_or(values.get(KEY_DICT_SHOW_PHONETIC), defaults.dict_show_phonetic),
        }
    }

    /// 轉為存儲快照（觸發模式固定寫入 hover）
    pub fn to_values(&self) -> SettingsValues {
        let mut values = SettingsValues::new();
        values.insert(KEY_ENABLED.to_string(), Value::Bool(self.enabled));
        values.insert(KEY_TARGET_LANG.to_string(), Value::String(self.target_lang.clone()));
        values.insert(KEY_DICT_ENABLED.to_string(), Value::Bool(self.dict_enabled));
        values.insert(
            KEY_DICT_TRIGGER_MODE.to_string(),
            Value::String(TriggerMode::Hover.as_str().to_string()),
        );
        values.insert(KEY_DICT_SHOW_PHONETIC.to_string(), Value::Bool(self.dict_show_phonetic));
        values
    }
}

/// 只接受明確的布爾值，其餘情況使用默認值
fn bool_or(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        _ => default,
    }
}

#[derive(Debug, Clone)]
pub enum SettingsError {
    Io(String),
    Format(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(msg) => write!(f, "設置讀寫失敗: {}", msg),
            SettingsError::Format(msg) => write!(f, "設置格式錯誤: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// 外部設置存儲
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// 讀取指定的鍵，不存在的鍵不會出現在結果中
    async fn get(&self, keys: &[&str]) -> Result<SettingsValues, SettingsError>;

    /// 合併寫入，並廣播實際發生變化的鍵
    async fn set(&self, values: SettingsValues) -> Result<(), SettingsError>;

    /// 訂閱變更通知
    fn subscribe(&self) -> broadcast::Receiver<SettingsChanges>;
}

/// 保存設置（觸發模式強制為 hover）
pub async fn save_settings(store: &dyn SettingsStore, settings: &Settings) -> Result<(), SettingsError> {
    store.set(settings.to_values()).await
}

/// 讀取設置並套用默認值
pub async fn load_settings(store: &dyn SettingsStore) -> Result<Settings, SettingsError> {
    let values = store.get(&ALL_KEYS).await?;
    Ok(Settings::from_values(&values))
}
