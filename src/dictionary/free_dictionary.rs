/**
 * Free Dictionary API
 * GET {endpoint}{word}，200 返回詞條數組，404 表示未收錄
 */
use super::{
    Definition, DictionaryError, DictionaryLookupResult, DictionarySource, Meaning, MAX_DEFINITIONS_PER_MEANING,
    MAX_SYNONYMS,
};
use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const PROVIDER_ID: &str = "free-dictionary";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiEntry {
    word: Option<String>,
    phonetic: Option<String>,
    phonetics: Vec<ApiPhonetic>,
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiPhonetic {
    text: Option<String>,
    audio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiMeaning {
    part_of_speech: Option<String>,
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiDefinition {
    definition: Option<String>,
    example: Option<String>,
    synonyms: Vec<String>,
}

pub struct FreeDictionarySource {
    client: Client,
    endpoint: String,
}

impl FreeDictionarySource {
    pub fn new(config: &AppConfig) -> Result<Self, DictionaryError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DictionaryError::Network(format!("創建 HTTP 客戶端失敗: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.dictionary_endpoint.clone(),
        })
    }
}

#[async_trait]
impl DictionarySource for FreeDictionarySource {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch(&self, word: &str) -> Result<DictionaryLookupResult, DictionaryError> {
        let url = format!("{}{}", self.endpoint, urlencoding::encode(word));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DictionaryError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(DictionaryLookupResult::not_found(word));
        }
        if !status.is_success() {
            return Err(DictionaryError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DictionaryError::Malformed(e.to_string()))?;

        Ok(adapt_response(&body, word))
    }
}

/// 把 API 響應轉為查詞結果；空響應或格式錯誤視為未收錄
pub fn adapt_response(body: &str, word: &str) -> DictionaryLookupResult {
    let entries: Vec<ApiEntry> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("[Dict] 響應無法解析，視為未收錄: {}", e);
            return DictionaryLookupResult::not_found(word);
        }
    };

    // 只取第一個詞條
    let Some(entry) = entries.into_iter().next() else {
        return DictionaryLookupResult::not_found(word);
    };

    let phonetic = non_empty(entry.phonetic)
        .or_else(|| entry.phonetics.iter().find_map(|p| non_empty(p.text.clone())));
    let pronunciation_audio_url = entry.phonetics.iter().find_map(|p| non_empty(p.audio.clone()));

    let meanings = entry
        .meanings
        .into_iter()
        .map(|meaning| Meaning {
            part_of_speech: meaning.part_of_speech.unwrap_or_default(),
            definitions: meaning
                .definitions
                .into_iter()
                .take(MAX_DEFINITIONS_PER_MEANING)
                .map(|d| Definition {
                    definition: d.definition.unwrap_or_default(),
                    example: non_empty(d.example),
                    synonyms: d.synonyms.into_iter().take(MAX_SYNONYMS).collect(),
                })
                .collect(),
        })
        .collect();

    DictionaryLookupResult {
        found: true,
        word: non_empty(entry.word).unwrap_or_else(|| word.to_string()),
        phonetic,
        pronunciation_audio_url,
        meanings,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
