//! 測試用的內存宿主頁面與假服務
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use subtitle_translator_lib::dictionary::{
    Definition, DictionaryError, DictionaryLookupResult, DictionarySource, Meaning,
};
use subtitle_translator_lib::host::{
    CaptionHost, CaptionSegment, CaretHit, ContainerId, HostError, MutationBatch, OverlayHost, Placement, Size,
    TextHitTest, TooltipHost, Viewport,
};
use subtitle_translator_lib::translation::{TranslationError, TranslationProvider};
use tokio::sync::{mpsc, oneshot};

pub struct FakeState {
    pub container: Option<ContainerId>,
    pub observers: Vec<mpsc::UnboundedSender<MutationBatch>>,
    pub segments: Vec<CaptionSegment>,
    pub player: bool,
    pub overlay_attached: bool,
    pub overlay_attach_count: usize,
    pub overlay_html: String,
    pub caret_text: Option<String>,
    pub selection: String,
    pub viewport: Viewport,
    pub natural_size: Size,
    pub tooltip_html: Option<String>,
    pub placement: Option<Placement>,
    pub layouts: usize,
    pub audio_played: Vec<String>,
    pub audio_fails: bool,
}

pub struct FakeHost {
    pub state: Mutex<FakeState>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                container: None,
                observers: Vec::new(),
                segments: Vec::new(),
                player: true,
                overlay_attached: false,
                overlay_attach_count: 0,
                overlay_html: String::new(),
                caret_text: None,
                selection: String::new(),
                viewport: Viewport {
                    width: 800.0,
                    height: 400.0,
                    scroll_x: 0.0,
                    scroll_y: 0.0,
                },
                natural_size: Size {
                    width: 300.0,
                    height: 200.0,
                },
                tooltip_html: None,
                placement: None,
                layouts: 0,
                audio_played: Vec::new(),
                audio_fails: false,
            }),
        })
    }

    pub fn with_container(id: ContainerId) -> Arc<Self> {
        let host = Self::new();
        host.create_container(id);
        host
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn create_container(&self, id: ContainerId) {
        self.state().container = Some(id);
    }

    /// 銷毀容器：關閉所有觀察通道
    pub fn remove_container(&self) {
        let mut state = self.state();
        state.container = None;
        state.observers.clear();
        state.segments.clear();
    }

    /// 替換宿主字幕並發出一批變動
    pub fn set_captions(&self, texts: &[&str]) {
        let mut state = self.state();
        let overlay: Vec<CaptionSegment> = state.segments.iter().filter(|s| s.in_overlay).cloned().collect();
        state.segments = texts.iter().map(|t| CaptionSegment::host(*t)).chain(overlay).collect();
        state.observers.retain(|tx| tx.send(MutationBatch { records: 1 }).is_ok());
    }

    pub fn mutate_without_change(&self) {
        self.state().observers.retain(|tx| tx.send(MutationBatch { records: 1 }).is_ok());
    }

    /// 仍在接收的觀察者數量
    pub fn observer_count(&self) -> usize {
        self.state().observers.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// 從譯文層標記中取出文本
    pub fn overlay_text(&self) -> String {
        let html = self.state().overlay_html.clone();
        let Some(start) = html.find("user-select: text;\">") else {
            return String::new();
        };
        let rest = &html[start + "user-select: text;\">".len()..];
        rest.split("</span>").next().unwrap_or_default().to_string()
    }

    pub fn tooltip_html(&self) -> Option<String> {
        self.state().tooltip_html.clone()
    }

    pub fn set_caret_text(&self, text: &str) {
        self.state().caret_text = Some(text.to_string());
    }
}

impl CaptionHost for FakeHost {
    fn find_caption_container(&self) -> Option<ContainerId> {
        self.state().container
    }

    fn observe(&self, container: ContainerId) -> Option<mpsc::UnboundedReceiver<MutationBatch>> {
        let mut state = self.state();
        if state.container != Some(container) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        state.observers.push(tx);
        Some(rx)
    }

    fn caption_segments(&self) -> Vec<CaptionSegment> {
        self.state().segments.clone()
    }
}

impl OverlayHost for FakeHost {
    fn player_available(&self) -> bool {
        self.state().player
    }

    fn attach_overlay(&self) {
        let mut state = self.state();
        state.overlay_attached = true;
        state.overlay_attach_count += 1;
    }

    fn set_overlay_html(&self, html: &str) {
        self.state().overlay_html = html.to_string();
    }

    fn detach_overlay(&self) {
        let mut state = self.state();
        state.overlay_attached = false;
        state.overlay_html.clear();
    }
}

impl TextHitTest for FakeHost {
    /// x 坐標直接作為字符索引
    fn caret_from_point(&self, x: f64, _y: f64) -> Option<CaretHit> {
        let text = self.state().caret_text.clone()?;
        Some(CaretHit {
            text,
            offset: x as usize,
        })
    }

    fn selection_text(&self) -> String {
        self.state().selection.clone()
    }
}

impl TooltipHost for FakeHost {
    fn viewport(&self) -> Viewport {
        self.state().viewport
    }

    fn layout_tooltip(&self, html: &str) -> Size {
        let mut state = self.state();
        state.tooltip_html = Some(html.to_string());
        state.placement = None;
        state.layouts += 1;
        state.natural_size
    }

    fn position_tooltip(&self, placement: &Placement) {
        self.state().placement = Some(*placement);
    }

    fn hide_tooltip(&self) {
        let mut state = self.state();
        state.tooltip_html = None;
        state.placement = None;
    }

    fn play_audio(&self, url: &str) -> Result<(), HostError> {
        let mut state = self.state();
        if state.audio_fails {
            return Err(HostError::Audio("NotAllowedError".to_string()));
        }
        state.audio_played.push(url.to_string());
        Ok(())
    }
}

/// 返回 "{lang}:{text}" 並記錄每次調用
#[derive(Default)]
pub struct RecordingTranslator {
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(t, _)| t == text).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TranslationProvider for RecordingTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        self.calls.lock().unwrap().push((text.to_string(), target_lang.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(TranslationError::Network("connection reset".to_string()));
        }
        Ok(format!("{}:{}", target_lang, text))
    }
}

/// 每個原文的響應由測試手動放行，用於模擬亂序完成
#[derive(Default)]
pub struct GatedTranslator {
    gates: Mutex<HashMap<String, oneshot::Receiver<String>>>,
}

impl GatedTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate(&self, text: &str) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }
}

#[async_trait]
impl TranslationProvider for GatedTranslator {
    async fn translate(&self, text: &str, _target_lang: &str) -> Result<String, TranslationError> {
        let gate = self.gates.lock().unwrap().remove(text);
        match gate {
            Some(rx) => rx.await.map_err(|_| TranslationError::Network("gate dropped".to_string())),
            None => Err(TranslationError::Network("no gate".to_string())),
        }
    }
}

pub fn entry(word: &str, meanings: &[(&str, usize)]) -> DictionaryLookupResult {
    DictionaryLookupResult {
        found: true,
        word: word.to_string(),
        phonetic: Some(format!("/{}/", word)),
        pronunciation_audio_url: Some(format!("https://audio.example/{}.mp3", word)),
        meanings: meanings
            .iter()
            .map(|(pos, n)| Meaning {
                part_of_speech: pos.to_string(),
                definitions: (0..*n)
                    .map(|i| Definition {
                        definition: format!("{} sense {}", pos, i + 1),
                        example: None,
                        synonyms: Vec::new(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// 固定詞條的詞典；未登記的單詞返回未收錄
#[derive(Default)]
pub struct StaticDictionary {
    pub entries: Mutex<HashMap<String, DictionaryLookupResult>>,
    pub calls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl StaticDictionary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, result: DictionaryLookupResult) {
        self.entries.lock().unwrap().insert(result.word.clone(), result);
    }

    pub fn gate(&self, word: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(word.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DictionarySource for StaticDictionary {
    fn id(&self) -> &str {
        "static"
    }

    async fn fetch(&self, word: &str) -> Result<DictionaryLookupResult, DictionaryError> {
        self.calls.lock().unwrap().push(word.to_string());

        let gate = self.gates.lock().unwrap().remove(word);
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(DictionaryError::Http(503));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(word)
            .cloned()
            .unwrap_or_else(|| DictionaryLookupResult::not_found(word)))
    }
}
