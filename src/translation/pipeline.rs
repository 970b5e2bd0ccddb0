/**
 * 翻譯管線
 * 字幕變化 → 緩存 / 遠程翻譯 → 譯文層
 *
 * 請求可能亂序完成：每次字幕變化分配一個遞增的世代號，
 * 提交渲染前比較世代號，過期的結果只寫入緩存，不覆蓋畫面
 */
use super::{TranslationCache, TranslationProvider};
use crate::subtitle::overlay::TranslatedOverlay;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

pub struct TranslationPipeline {
    provider: Arc<dyn TranslationProvider>,
    overlay: Arc<TranslatedOverlay>,
    cache: Mutex<TranslationCache>,
    target_lang: RwLock<String>,
    generation: AtomicU64,
}

impl TranslationPipeline {
    pub fn new(provider: Arc<dyn TranslationProvider>, overlay: Arc<TranslatedOverlay>, target_lang: &str) -> Self {
        Self {
            provider,
            overlay,
            cache: Mutex::new(TranslationCache::new()),
            target_lang: RwLock::new(target_lang.to_string()),
            generation: AtomicU64::new(0),
        }
    }

    /// 字幕變化回調：同步登記世代號，再在後台完成翻譯
    ///
    /// 世代號在 spawn 之前分配，保證與字幕變化的發起順序一致
    pub fn on_caption_change(self: &Arc<Self>, text: String) -> JoinHandle<()> {
        let generation = self.next_generation();
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.apply(text, generation).await })
    }

    /// 直接翻譯並渲染（等待完成）
    pub async fn translate_caption(&self, text: String) {
        let generation = self.next_generation();
        self.apply(text, generation).await;
    }

    /// 切換目標語言：清空緩存，並使進行中的請求失效
    pub async fn set_target_lang(&self, lang: &str) {
        let mut target = self.target_lang.write().await;
        if *target == lang {
            return;
        }
        log::info!("[Translation] 目標語言 {} -> {}", target, lang);
        *target = lang.to_string();
        self.cache.lock().await.clear();
        self.next_generation();
    }

    /// 使所有進行中的請求失效（停止時調用）
    pub fn invalidate(&self) {
        self.next_generation();
    }

    pub async fn target_lang(&self) -> String {
        self.target_lang.read().await.clone()
    }

    /// (條目數, 命中, 未命中)
    pub async fn cache_stats(&self) -> (usize, usize, usize) {
        let cache = self.cache.lock().await;
        let (hits, misses) = cache.stats();
        (cache.len(), hits, misses)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn apply(&self, text: String, generation: u64) {
        if text.is_empty() {
            if self.is_current(generation) {
                self.overlay.render("");
            }
            return;
        }

        let lang = self.target_lang().await;

        let cached = self.cache.lock().await.get(&text);
        if let Some(translated) = cached {
            log::debug!("[Translation] 緩存命中: {}", text);
            if self.is_current(generation) {
                self.overlay.render(&translated);
            }
            return;
        }

        match self.provider.translate(&text, &lang).await {
            Ok(translated) => {
                // 請求期間語言已切換時，結果屬於舊語言，不能進入新緩存
                if *self.target_lang.read().await == lang {
                    self.cache.lock().await.insert(text.clone(), translated.clone());
                }

                if self.is_current(generation) {
                    self.overlay.render(&translated);
                } else {
                    log::debug!("[Translation] 丟棄過期結果: {}", text);
                }
            }
            Err(e) => {
                // 保留畫面上原有的譯文，下一次字幕變化自然會重試
                log::error!("[Translation] 翻譯失敗: {}", e);
            }
        }
    }
}
