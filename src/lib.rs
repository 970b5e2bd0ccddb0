// 配置模塊
pub mod config;
// 詞典模塊
pub mod dictionary;
// 宿主頁面接口
pub mod host;
// 統一路徑管理模塊
pub mod paths;
// 取詞與防抖
pub mod pointer;
// 設置模塊
pub mod settings;
// 字幕觀察與譯文層
pub mod subtitle;
// 詞典提示框
pub mod tooltip;
// 翻譯模塊
pub mod translation;

use anyhow::Context;
use config::AppConfig;
use dictionary::{DictionaryPipeline, DictionaryProvider, DictionarySource, FreeDictionarySource};
use host::{CaptionHost, EventDisposition, HostPage, PointerEvent};
use settings::{
    load_settings, FileSettingsStore, Settings, SettingsChanges, SettingsError, SettingsStore, TriggerMode,
    KEY_DICT_ENABLED, KEY_DICT_SHOW_PHONETIC, KEY_DICT_TRIGGER_MODE, KEY_ENABLED, KEY_TARGET_LANG,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use subtitle::{SubtitleWatcher, TranslatedOverlay};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tooltip::TooltipAction;
use translation::{GoogleTranslateProvider, TranslationPipeline, TranslationProvider};

#[derive(Default)]
struct RuntimeState {
    running: bool,
    watcher: Option<JoinHandle<()>>,
    settings_listener: Option<JoinHandle<()>>,
    restart: Option<JoinHandle<()>>,
    last_url: Option<String>,
}

/// 字幕翻譯器：加載設置、啟停兩條管線、響應設置變更與頁面導航
pub struct SubtitleTranslator {
    config: AppConfig,
    caption_host: Arc<dyn CaptionHost>,
    store: Arc<dyn SettingsStore>,
    settings: RwLock<Settings>,
    overlay: Arc<TranslatedOverlay>,
    translation: Arc<TranslationPipeline>,
    dictionary: Arc<DictionaryPipeline>,
    runtime: Mutex<RuntimeState>,
}

impl SubtitleTranslator {
    pub fn new<H>(
        host: Arc<H>,
        store: Arc<dyn SettingsStore>,
        translator: Arc<dyn TranslationProvider>,
        dictionary_source: Arc<dyn DictionarySource>,
        config: AppConfig,
    ) -> Arc<Self>
    where
        H: HostPage + 'static,
    {
        let settings = Settings::default();
        let overlay = Arc::new(TranslatedOverlay::new(host.clone()));
        let translation = Arc::new(TranslationPipeline::new(translator, overlay.clone(), &settings.target_lang));
        let dictionary = Arc::new(DictionaryPipeline::new(
            Arc::new(DictionaryProvider::new(dictionary_source)),
            host.clone(),
            host.clone(),
            &config.timing,
        ));

        Arc::new(Self {
            config,
            caption_host: host,
            store,
            settings: RwLock::new(settings),
            overlay,
            translation,
            dictionary,
            runtime: Mutex::new(RuntimeState::default()),
        })
    }

    /// 使用 Google 翻譯與 Free Dictionary API
    pub fn with_default_services<H>(host: Arc<H>, store: Arc<dyn SettingsStore>, config: AppConfig) -> anyhow::Result<Arc<Self>>
    where
        H: HostPage + 'static,
    {
        let translator = GoogleTranslateProvider::new(&config)?;
        let dictionary = FreeDictionarySource::new(&config)?;
        Ok(Self::new(host, store, Arc::new(translator), Arc::new(dictionary), config))
    }

    /// 從應用目錄讀取 `config.toml`，並以 `settings.toml` 作為設置存儲
    pub fn open_default<H>(host: Arc<H>) -> anyhow::Result<Arc<Self>>
    where
        H: HostPage + 'static,
    {
        paths::init_app_dirs().map_err(anyhow::Error::msg)?;
        let config_path = paths::get_config_path().map_err(anyhow::Error::msg)?;
        let config = AppConfig::load_or_default(&config_path)?;

        let settings_path = paths::get_settings_path().map_err(anyhow::Error::msg)?;
        let store = FileSettingsStore::open(&settings_path)
            .with_context(|| format!("打開設置文件失敗: {}", settings_path.display()))?;

        Self::with_default_services(host, Arc::new(store), config)
    }

    /// 讀取設置、訂閱變更，啟用時開始工作
    pub async fn init(self: &Arc<Self>) -> Result<(), SettingsError> {
        log::info!("[YT Translator] 初始化...");

        let loaded = load_settings(self.store.as_ref()).await?;
        self.apply_settings(loaded).await;

        let listener = self.spawn_settings_listener(self.store.subscribe());
        if let Some(previous) = self.runtime().settings_listener.replace(listener) {
            previous.abort();
        }

        if self.settings().await.enabled {
            self.start();
        }
        Ok(())
    }

    async fn apply_settings(&self, settings: Settings) {
        self.translation.set_target_lang(&settings.target_lang).await;
        self.dictionary.set_dict_enabled(settings.dict_enabled);
        self.dictionary.set_show_phonetic(settings.dict_show_phonetic);
        self.dictionary.set_trigger_mode(TriggerMode::Hover);
        *self.settings.write().await = settings;
    }

    fn spawn_settings_listener(self: &Arc<Self>, mut rx: broadcast::Receiver<SettingsChanges>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let received = rx.recv().await;
                let Some(translator) = weak.upgrade() else {
                    return;
                };
                match received {
                    Ok(changes) => translator.apply_changes(&changes).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("[YT Translator] 錯過 {} 次設置變更，重新讀取", skipped);
                        translator.reload_settings().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        })
    }

    async fn reload_settings(self: &Arc<Self>) {
        match load_settings(self.store.as_ref()).await {
            Ok(loaded) => {
                let was_enabled = self.settings().await.enabled;
                let enabled = loaded.enabled;
                self.apply_settings(loaded).await;
                if enabled != was_enabled {
                    self.set_running(enabled);
                }
            }
            Err(e) => log::error!("[YT Translator] 重新讀取設置失敗: {}", e),
        }
    }

    /// 處理一次設置變更
    pub async fn apply_changes(self: &Arc<Self>, changes: &SettingsChanges) {
        let mut needs_restart = None;
        let mut settings = self.settings.write().await;

        // 與加載時相同：非布爾的 enabled、空的 targetLang 都忽略
        if let Some(enabled) = changes.get(KEY_ENABLED).and_then(|c| c.new_value.as_bool()) {
            settings.enabled = enabled;
            needs_restart = Some(enabled);
        }
        if let Some(lang) = changes
            .get(KEY_TARGET_LANG)
            .and_then(|c| c.new_value.as_str())
            .filter(|lang| !lang.is_empty())
        {
            settings.target_lang = lang.to_string();
            self.translation.set_target_lang(lang).await;
        }
        if let Some(enabled) = changes.get(KEY_DICT_ENABLED).and_then(|c| c.new_value.as_bool()) {
            settings.dict_enabled = enabled;
            self.dictionary.set_dict_enabled(enabled);
        }
        if changes.contains_key(KEY_DICT_TRIGGER_MODE) {
            log::debug!("[YT Translator] 忽略觸發模式變更，固定為 hover");
        }
        if let Some(show) = changes.get(KEY_DICT_SHOW_PHONETIC).and_then(|c| c.new_value.as_bool()) {
            settings.dict_show_phonetic = show;
            self.dictionary.set_show_phonetic(show);
        }
        drop(settings);

        if let Some(enabled) = needs_restart {
            self.set_running(enabled);
        }
    }

    fn set_running(self: &Arc<Self>, enabled: bool) {
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }

    /// 插入譯文層、開始觀察字幕、接收查詞事件；已在運行時不做任何事
    pub fn start(self: &Arc<Self>) {
        let mut runtime = self.runtime();
        if runtime.running {
            return;
        }
        log::info!("[YT Translator] 開始翻譯...");
        runtime.running = true;

        self.overlay.attach(self.config.timing.player_poll());

        let translation = self.translation.clone();
        let watcher = SubtitleWatcher::new(self.caption_host.clone(), self.config.timing.caption_poll());
        runtime.watcher = Some(watcher.spawn(move |text| {
            translation.on_caption_change(text);
        }));

        self.dictionary.start();
    }

    /// 斷開觀察、移除譯文層、清除防抖計時器並隱藏提示框
    pub fn stop(&self) {
        let mut runtime = self.runtime();
        if let Some(restart) = runtime.restart.take() {
            restart.abort();
        }
        if !runtime.running {
            return;
        }
        log::info!("[YT Translator] 停止翻譯...");
        runtime.running = false;

        if let Some(watcher) = runtime.watcher.take() {
            watcher.abort();
        }
        self.translation.invalidate();
        self.overlay.detach();
        self.dictionary.stop();
    }

    /// 單頁應用導航：進入新的 /watch 頁面後延遲重啟
    pub fn on_navigation(self: &Arc<Self>, url: &str) {
        let mut runtime = self.runtime();
        if runtime.last_url.as_deref() == Some(url) {
            return;
        }
        runtime.last_url = Some(url.to_string());

        if !url.contains("/watch") {
            return;
        }

        let weak = Arc::downgrade(self);
        let delay = self.config.timing.navigation_restart();
        let restart = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(translator) = weak.upgrade() else {
                return;
            };
            if translator.settings().await.enabled {
                log::info!("[YT Translator] 頁面導航，重新啟動");
                translator.restart();
            }
        });
        if let Some(previous) = runtime.restart.replace(restart) {
            previous.abort();
        }
    }

    fn restart(self: &Arc<Self>) {
        {
            let mut runtime = self.runtime();
            runtime.restart = None;
            if let Some(watcher) = runtime.watcher.take() {
                watcher.abort();
            }
            runtime.running = false;
        }
        self.translation.invalidate();
        self.overlay.detach();
        self.dictionary.stop();
        self.start();
    }

    pub fn on_hover(&self, event: PointerEvent) -> EventDisposition {
        self.dictionary.on_hover(event)
    }

    pub fn on_pointer_up(&self, event: PointerEvent) -> EventDisposition {
        self.dictionary.on_pointer_up(event)
    }

    pub fn on_pointer_down(&self, event: PointerEvent) -> EventDisposition {
        self.dictionary.on_pointer_down(event)
    }

    pub fn on_scroll_gesture(&self, event: PointerEvent) -> EventDisposition {
        self.dictionary.on_scroll_gesture(event)
    }

    pub fn on_tooltip_action(&self, action: TooltipAction) -> EventDisposition {
        self.dictionary.on_tooltip_action(action)
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        self.runtime().running
    }

    pub fn translation(&self) -> &Arc<TranslationPipeline> {
        &self.translation
    }

    pub fn dictionary(&self) -> &Arc<DictionaryPipeline> {
        &self.dictionary
    }

    pub fn overlay(&self) -> &Arc<TranslatedOverlay> {
        &self.overlay
    }

    fn runtime(&self) -> MutexGuard<'_, RuntimeState> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SubtitleTranslator {
    fn drop(&mut self) {
        let runtime = self.runtime.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in [runtime.watcher.take(), runtime.settings_listener.take(), runtime.restart.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}
