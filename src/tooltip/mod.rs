/**
 * 詞典提示框
 * 加載中 / 顯示 / 隱藏 的狀態機、分頁，以及兩步定位（先測量自然尺寸，再計算位置）
 */
pub mod markup;
pub mod placer;

use crate::dictionary::DictionaryLookupResult;
use crate::host::{Placement, TooltipHost};
use std::sync::Arc;

/// 每頁顯示的條目數（詞性標記與釋義都算一條）
pub const ITEMS_PER_PAGE: usize = 3;

/// 分頁條目：詞性標記與釋義交錯展開成一個序列
#[derive(Debug, Clone, PartialEq)]
pub enum PagedItem {
    PartOfSpeech(String),
    Definition { text: String, example: Option<String> },
    NotFound,
}

/// 展開查詞結果
pub fn flatten_items(result: &DictionaryLookupResult) -> Vec<PagedItem> {
    if !result.found {
        return vec![PagedItem::NotFound];
    }

    let mut items = Vec::new();
    for meaning in &result.meanings {
        items.push(PagedItem::PartOfSpeech(meaning.part_of_speech.clone()));
        for definition in &meaning.definitions {
            items.push(PagedItem::Definition {
                text: definition.definition.clone(),
                example: definition.example.clone(),
            });
        }
    }
    items
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipViewState {
    pub visible: bool,
    pub paged_items: Vec<PagedItem>,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
}

impl Default for TooltipViewState {
    fn default() -> Self {
        Self {
            visible: false,
            paged_items: Vec::new(),
            current_page: 0,
            items_per_page: ITEMS_PER_PAGE,
            total_pages: 0,
        }
    }
}

impl TooltipViewState {
    pub fn from_items(paged_items: Vec<PagedItem>) -> Self {
        let total_pages = paged_items.len().div_ceil(ITEMS_PER_PAGE);
        Self {
            visible: true,
            paged_items,
            current_page: 0,
            items_per_page: ITEMS_PER_PAGE,
            total_pages,
        }
    }

    /// 當前頁的條目
    pub fn page_items(&self) -> &[PagedItem] {
        let start = (self.current_page * self.items_per_page).min(self.paged_items.len());
        let end = (start + self.items_per_page).min(self.paged_items.len());
        &self.paged_items[start..end]
    }

    pub fn prev_enabled(&self) -> bool {
        self.current_page > 0
    }

    pub fn next_enabled(&self) -> bool {
        self.current_page + 1 < self.total_pages
    }

    /// 跳到指定頁（限制在有效範圍內），返回實際頁碼
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.current_page = page.min(self.total_pages.saturating_sub(1));
        self.current_page
    }

    /// 分頁欄顯示的 "當前 / 總數"，至少為 1 頁
    pub fn page_label(&self) -> String {
        format!("{} / {}", self.current_page + 1, self.total_pages.max(1))
    }
}

/// 提示框頭部
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipHeader {
    pub word: String,
    /// 已按 `dictShowPhonetic` 過濾
    pub phonetic: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    Hidden,
    Loading,
    Shown,
}

/// 提示框內的用戶操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipAction {
    Close,
    PreviousPage,
    NextPage,
    PlayAudio,
}

pub struct DictionaryTooltip {
    host: Arc<dyn TooltipHost>,
    phase: TooltipPhase,
    state: TooltipViewState,
    header: Option<TooltipHeader>,
    anchor: (f64, f64),
    placement: Option<Placement>,
}

impl DictionaryTooltip {
    pub fn new(host: Arc<dyn TooltipHost>) -> Self {
        Self {
            host,
            phase: TooltipPhase::Hidden,
            state: TooltipViewState::default(),
            header: None,
            anchor: (0.0, 0.0),
            placement: None,
        }
    }

    pub fn show_loading(&mut self, x: f64, y: f64) {
        self.phase = TooltipPhase::Loading;
        self.state = TooltipViewState {
            visible: true,
            ..TooltipViewState::default()
        };
        self.header = None;
        self.anchor = (x, y);
        self.render(&markup::loading_html());
    }

    /// 重建分頁序列，回到第一頁並重新定位
    pub fn show(&mut self, x: f64, y: f64, result: &DictionaryLookupResult, show_phonetic: bool) {
        self.header = Some(TooltipHeader {
            word: result.word.clone(),
            phonetic: result.phonetic.clone().filter(|_| show_phonetic),
            audio_url: result.pronunciation_audio_url.clone(),
        });
        self.state = TooltipViewState::from_items(flatten_items(result));
        self.phase = TooltipPhase::Shown;
        self.anchor = (x, y);
        self.render_entry();
    }

    pub fn next_page(&mut self) -> bool {
        if self.phase != TooltipPhase::Shown || !self.state.next_enabled() {
            return false;
        }
        self.state.current_page += 1;
        self.render_entry();
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.phase != TooltipPhase::Shown || !self.state.prev_enabled() {
            return false;
        }
        self.state.current_page -= 1;
        self.render_entry();
        true
    }

    pub fn go_to_page(&mut self, page: usize) -> usize {
        if self.phase != TooltipPhase::Shown {
            return self.state.current_page;
        }
        let page = self.state.go_to_page(page);
        self.render_entry();
        page
    }

    pub fn handle_action(&mut self, action: TooltipAction) {
        match action {
            TooltipAction::Close => self.hide(),
            TooltipAction::PreviousPage => {
                self.previous_page();
            }
            TooltipAction::NextPage => {
                self.next_page();
            }
            TooltipAction::PlayAudio => self.play_audio(),
        }
    }

    /// 播放失敗只記錄日誌，不向用戶顯示
    fn play_audio(&self) {
        let Some(url) = self.header.as_ref().and_then(|h| h.audio_url.as_deref()) else {
            return;
        };
        if let Err(e) = self.host.play_audio(url) {
            log::warn!("[Tooltip] {}", e);
        }
    }

    pub fn hide(&mut self) {
        if self.phase != TooltipPhase::Hidden {
            self.host.hide_tooltip();
        }
        self.phase = TooltipPhase::Hidden;
        self.state = TooltipViewState::default();
        self.header = None;
        self.placement = None;
    }

    pub fn is_visible(&self) -> bool {
        self.phase != TooltipPhase::Hidden
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    pub fn view_state(&self) -> &TooltipViewState {
        &self.state
    }

    pub fn header(&self) -> Option<&TooltipHeader> {
        self.header.as_ref()
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    fn render_entry(&mut self) {
        let Some(header) = self.header.as_ref() else {
            return;
        };
        let html = markup::entry_html(header, &self.state);
        self.render(&html);
    }

    /// 先寫入內容並測量自然尺寸，再計算受約束的位置
    fn render(&mut self, html: &str) {
        let natural = self.host.layout_tooltip(html);
        let viewport = self.host.viewport();
        let placement = placer::place(self.anchor.0, self.anchor.1, &viewport, natural);
        self.host.position_tooltip(&placement);
        self.placement = Some(placement);
    }
}
