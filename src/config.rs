/**
 * 配置模塊
 * 遠程端點、請求超時與各類計時常數
 *
 * 所有欄位都有默認值，`config.toml` 只需覆蓋想修改的部分
 */
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Google 翻譯非官方網頁接口
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
/// Free Dictionary API（英文詞條）
pub const DEFAULT_DICTIONARY_ENDPOINT: &str = "https://api.dictionaryapi.dev/api/v2/entries/en/";
/// 模擬瀏覽器的 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 應用配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub translate_endpoint: String,
    pub dictionary_endpoint: String,
    /// HTTP 請求超時（秒）
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub timing: TimingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            dictionary_endpoint: DEFAULT_DICTIONARY_ENDPOINT.to_string(),
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timing: TimingConfig::default(),
        }
    }
}

/// 計時配置（毫秒）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// 字幕容器輪詢間隔
    pub caption_poll_ms: u64,
    /// 播放器元素輪詢間隔
    pub player_poll_ms: u64,
    /// 懸停防抖靜默期
    pub hover_debounce_ms: u64,
    /// 選取文字後等待瀏覽器完成選取的時間
    pub selection_settle_ms: u64,
    /// 單頁應用導航後重新啟動的延遲
    pub navigation_restart_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            caption_poll_ms: 1000,
            player_poll_ms: 500,
            hover_debounce_ms: 250,
            selection_settle_ms: 10,
            navigation_restart_ms: 1000,
        }
    }
}

impl TimingConfig {
    pub fn caption_poll(&self) -> Duration {
        Duration::from_millis(self.caption_poll_ms)
    }

    pub fn player_poll(&self) -> Duration {
        Duration::from_millis(self.player_poll_ms)
    }

    pub fn hover_debounce(&self) -> Duration {
        Duration::from_millis(self.hover_debounce_ms)
    }

    pub fn selection_settle(&self) -> Duration {
        Duration::from_millis(self.selection_settle_ms)
    }

    pub fn navigation_restart(&self) -> Duration {
        Duration::from_millis(self.navigation_restart_ms)
    }
}

impl AppConfig {
    /// 從 TOML 文件加載配置
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("讀取配置文件失敗: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("解析配置文件失敗: {}", path.display()))
    }

    /// 文件不存在時使用默認配置
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("[Config] 配置文件不存在，使用默認值: {}", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
