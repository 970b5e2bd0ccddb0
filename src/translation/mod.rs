/**
 * 翻譯模塊
 * 字幕文本的遠程翻譯、會話內緩存，以及驅動譯文層的管線
 */
pub mod cache;
pub mod google;
pub mod pipeline;

pub use cache::TranslationCache;
pub use google::GoogleTranslateProvider;
pub use pipeline::TranslationPipeline;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 請求未能完成（連接、超時、讀取響應失敗）
    Network(String),
    /// 服務器返回非 2xx 狀態
    Http(u16),
    /// 響應結構不符合預期
    Malformed(String),
    InvalidLanguage,
}

impl std::fmt::Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationError::Network(msg) => write!(f, "遠程翻譯請求失敗: {}", msg),
            TranslationError::Http(status) => write!(f, "遠程翻譯 HTTP 錯誤: {}", status),
            TranslationError::Malformed(msg) => write!(f, "翻譯響應格式不正確: {}", msg),
            TranslationError::InvalidLanguage => write!(f, "無效的語言代碼"),
        }
    }
}

impl std::error::Error for TranslationError {}

/// 翻譯服務（源語言自動檢測）
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError>;
}
