/**
 * Google 翻譯模塊
 * 使用非官方網頁接口（translate_a/single，client=gtx），無需 API 密鑰
 *
 * ⚠️ 此接口可能違反 Google 的服務條款，端點可以在 config.toml 中替換
 */
use super::{TranslationError, TranslationProvider};
use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub struct GoogleTranslateProvider {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateProvider {
    pub fn new(config: &AppConfig) -> Result<Self, TranslationError> {
        // 模擬瀏覽器
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TranslationError::Network(format!("創建 HTTP 客戶端失敗: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.translate_endpoint.clone(),
        })
    }

    fn request_url(&self, text: &str, target_lang: &str) -> String {
        format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.endpoint,
            urlencoding::encode(google_lang_code(target_lang)),
            urlencoding::encode(text)
        )
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        if target_lang.trim().is_empty() {
            return Err(TranslationError::InvalidLanguage);
        }

        let response = self
            .client
            .get(self.request_url(text, target_lang))
            .send()
            .await
            .map_err(|e| TranslationError::Network(format!("請求失敗: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranslationError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::Network(format!("讀取響應失敗: {}", e)))?;

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            TranslationError::Malformed(format!(
                "解析 JSON 失敗: {}。響應前 200 字符: {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })?;

        parse_translation(&json)
    }
}

/// 轉換語言代碼：zh -> zh-CN
pub fn google_lang_code(lang: &str) -> &str {
    match lang {
        "zh" => "zh-CN",
        _ => lang,
    }
}

/// 提取譯文
///
/// 返回格式類似 `[[["譯文片段", "原文片段", ...], ...], ...]`，
/// 第一層數組中每個條目的第一個元素按順序拼接成完整譯文
pub fn parse_translation(json: &Value) -> Result<String, TranslationError> {
    let segments = json
        .as_array()
        .and_then(|array| array.first())
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Malformed("缺少第一層數組".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.as_array()?.first()?.as_str())
        .collect();

    if translated.is_empty() {
        return Err(TranslationError::Malformed("譯文為空".to_string()));
    }
    Ok(translated)
}
