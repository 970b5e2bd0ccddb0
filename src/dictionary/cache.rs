use super::DictionaryLookupResult;
use std::collections::HashMap;

/// (規範化單詞, 源語言, 服務標識)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DictionaryCacheKey {
    pub word: String,
    pub lang: String,
    pub provider: String,
}

impl DictionaryCacheKey {
    pub fn new(word: &str, lang: &str, provider: &str) -> Self {
        Self {
            word: word.to_string(),
            lang: lang.to_string(),
            provider: provider.to_string(),
        }
    }
}

impl std::fmt::Display for DictionaryCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.word, self.lang, self.provider)
    }
}

/// 會話內不淘汰
#[derive(Debug, Default)]
pub struct DictionaryCache {
    entries: HashMap<DictionaryCacheKey, DictionaryLookupResult>,
}

impl DictionaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DictionaryCacheKey) -> Option<DictionaryLookupResult> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: DictionaryCacheKey, result: DictionaryLookupResult) {
        self.entries.insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
