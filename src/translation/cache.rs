use std::collections::HashMap;

/// 原文 → 譯文
///
/// 鍵只包含原文，所以切換目標語言時必須整體清空
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, text: &str) -> Option<String> {
        match self.entries.get(text) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, text: String, translated: String) {
        self.entries.insert(text, translated);
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("[TranslationCache] 清空 {} 條緩存", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (命中, 未命中)
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
