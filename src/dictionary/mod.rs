/**
 * 詞典模塊
 * 單詞查詢結果的數據結構、規範化、緩存查詢，以及懸停查詞管線
 */
pub mod cache;
pub mod free_dictionary;
pub mod pipeline;

pub use cache::{DictionaryCache, DictionaryCacheKey};
pub use free_dictionary::FreeDictionarySource;
pub use pipeline::DictionaryPipeline;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 少於此長度的單詞不查詢、不緩存
pub const MIN_WORD_LEN: usize = 2;
/// 每個詞性保留的釋義數
pub const MAX_DEFINITIONS_PER_MEANING: usize = 3;
/// 每條釋義保留的同義詞數
pub const MAX_SYNONYMS: usize = 3;

/// 查詞結果；`found = false` 與正常結果一樣會被緩存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryLookupResult {
    pub found: bool,
    pub word: String,
    pub phonetic: Option<String>,
    pub pronunciation_audio_url: Option<String>,
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub definition: String,
    pub example: Option<String>,
    pub synonyms: Vec<String>,
}

impl DictionaryLookupResult {
    pub fn not_found(word: &str) -> Self {
        Self {
            found: false,
            word: word.to_string(),
            phonetic: None,
            pronunciation_audio_url: None,
            meanings: Vec::new(),
        }
    }
}

/// 去除首尾空白並轉小寫；太短的單詞返回 None
pub fn normalize_word(word: &str) -> Option<String> {
    let clean = word.trim().to_lowercase();
    if clean.chars().count() < MIN_WORD_LEN {
        return None;
    }
    Some(clean)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryError {
    Network(String),
    /// 404 以外的非 2xx 狀態
    Http(u16),
    Malformed(String),
}

impl std::fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictionaryError::Network(msg) => write!(f, "詞典請求失敗: {}", msg),
            DictionaryError::Http(status) => write!(f, "詞典 API 錯誤: {}", status),
            DictionaryError::Malformed(msg) => write!(f, "詞典響應無法讀取: {}", msg),
        }
    }
}

impl std::error::Error for DictionaryError {}

/// 遠程詞典服務
#[async_trait]
pub trait DictionarySource: Send + Sync {
    /// 緩存鍵中的服務標識
    fn id(&self) -> &str;

    fn source_lang(&self) -> &str {
        "en"
    }

    /// 查詢已規範化的單詞；「未收錄」以 `found = false` 返回，不是錯誤
    async fn fetch(&self, word: &str) -> Result<DictionaryLookupResult, DictionaryError>;
}

/// 帶緩存的詞典查詢
pub struct DictionaryProvider {
    source: Arc<dyn DictionarySource>,
    cache: Mutex<DictionaryCache>,
}

impl DictionaryProvider {
    pub fn new(source: Arc<dyn DictionarySource>) -> Self {
        Self {
            source,
            cache: Mutex::new(DictionaryCache::new()),
        }
    }

    /// 規範化後查緩存，未命中時請求遠程服務
    ///
    /// 單詞太短返回 `Ok(None)`；硬性失敗返回錯誤且不緩存
    pub async fn lookup(&self, word: &str) -> Result<Option<DictionaryLookupResult>, DictionaryError> {
        let Some(clean) = normalize_word(word) else {
            return Ok(None);
        };

        let key = DictionaryCacheKey::new(&clean, self.source.source_lang(), self.source.id());
        if let Some(cached) = self.cache.lock().await.get(&key) {
            log::debug!("[Dict] 緩存命中: {}", key);
            return Ok(Some(cached));
        }

        let result = self.source.fetch(&clean).await?;
        self.cache.lock().await.insert(key, result.clone());
        Ok(Some(result))
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl DictionarySource for CountingSource {
        fn id(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, word: &str) -> Result<DictionaryLookupResult, DictionaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DictionaryError::Http(500));
            }
            if word == "zzyzx" {
                return Ok(DictionaryLookupResult::not_found(word));
            }
            Ok(DictionaryLookupResult {
                found: true,
                word: word.to_string(),
                phonetic: None,
                pronunciation_audio_url: None,
                meanings: Vec::new(),
            })
        }
    }

    fn provider(fail: bool) -> (Arc<CountingSource>, DictionaryProvider) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail,
        });
        (source.clone(), DictionaryProvider::new(source))
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  Run "), Some("run".to_string()));
        assert_eq!(normalize_word(" a "), None);
        assert_eq!(normalize_word(""), None);
    }

    #[tokio::test]
    async fn test_case_and_whitespace_share_cache_entry() {
        let (source, provider) = provider(false);

        for word in ["Run", " run ", "run"] {
            let result = provider.lookup(word).await.unwrap().unwrap();
            assert_eq!(result.word, "run");
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cached_entries().await, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached() {
        let (source, provider) = provider(false);

        let first = provider.lookup("zzyzx").await.unwrap().unwrap();
        let second = provider.lookup("ZZYZX").await.unwrap().unwrap();

        assert!(!first.found);
        assert!(!second.found);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_word_never_fetched() {
        let (source, provider) = provider(false);
        assert_eq!(provider.lookup("a").await.unwrap(), None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.cached_entries().await, 0);
    }

    #[tokio::test]
    async fn test_hard_failure_not_cached() {
        let (source, provider) = provider(true);

        assert_eq!(provider.lookup("run").await, Err(DictionaryError::Http(500)));
        assert!(provider.lookup("run").await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cached_entries().await, 0);
    }
}
