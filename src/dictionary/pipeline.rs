/**
 * 查詞管線
 * 懸停 / 選取事件 → 防抖 → 取詞 → 緩存或遠程查詢 → 定位並顯示提示框
 *
 * 提示框是唯一的共享界面，後發起的查詢覆蓋先發起的；
 * 與翻譯管線相同，用世代號丟棄過期的結果
 */
use super::DictionaryProvider;
use crate::config::TimingConfig;
use crate::host::{EventDisposition, PointerEvent, TextHitTest, TooltipHost};
use crate::pointer::{first_selection_word, is_lookup_candidate, HoverDebouncer, PointerResolver};
use crate::settings::TriggerMode;
use crate::tooltip::{DictionaryTooltip, TooltipAction};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub struct DictionaryPipeline {
    provider: Arc<DictionaryProvider>,
    resolver: PointerResolver,
    hit_test: Arc<dyn TextHitTest>,
    tooltip: Mutex<DictionaryTooltip>,
    debouncer: HoverDebouncer,
    trigger_mode: Mutex<TriggerMode>,
    selection_settle: Duration,
    listening: AtomicBool,
    dict_enabled: AtomicBool,
    show_phonetic: AtomicBool,
    generation: AtomicU64,
}

impl DictionaryPipeline {
    pub fn new(
        provider: Arc<DictionaryProvider>,
        hit_test: Arc<dyn TextHitTest>,
        tooltip_host: Arc<dyn TooltipHost>,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            provider,
            resolver: PointerResolver::new(Arc::clone(&hit_test)),
            hit_test,
            tooltip: Mutex::new(DictionaryTooltip::new(tooltip_host)),
            debouncer: HoverDebouncer::new(timing.hover_debounce()),
            trigger_mode: Mutex::new(TriggerMode::Hover),
            selection_settle: timing.selection_settle(),
            listening: AtomicBool::new(false),
            dict_enabled: AtomicBool::new(true),
            show_phonetic: AtomicBool::new(true),
            generation: AtomicU64::new(0),
        }
    }

    /// 接收事件
    pub fn start(&self) {
        self.listening.store(true, Ordering::SeqCst);
    }

    /// 停止接收事件：清除防抖計時器、隱藏提示框，進行中的查詢結果會被丟棄
    pub fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
        self.debouncer.cancel();
        self.next_generation();
        self.tooltip().hide();
    }

    pub fn set_dict_enabled(&self, enabled: bool) {
        self.dict_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_show_phonetic(&self, show: bool) {
        self.show_phonetic.store(show, Ordering::SeqCst);
    }

    /// 懸停與選取互斥，同一事件只會走其中一種
    pub fn set_trigger_mode(&self, mode: TriggerMode) {
        *self.trigger_mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    pub fn trigger_mode(&self) -> TriggerMode {
        *self.trigger_mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn accepts(&self, mode: TriggerMode) -> bool {
        self.listening.load(Ordering::SeqCst) && self.dict_enabled.load(Ordering::SeqCst) && self.trigger_mode() == mode
    }

    pub fn on_hover(self: &Arc<Self>, event: PointerEvent) -> EventDisposition {
        if event.target.inside_tooltip {
            return EventDisposition::Stop;
        }
        if !self.accepts(TriggerMode::Hover) || !event.target.is_subtitle() {
            return EventDisposition::Propagate;
        }

        let pipeline = Arc::clone(self);
        self.debouncer.schedule(async move {
            if !pipeline.accepts(TriggerMode::Hover) {
                return;
            }
            let Some(word) = pipeline.resolver.word_at_point(event.x, event.y) else {
                return;
            };
            if is_lookup_candidate(&word) {
                pipeline.perform_lookup(&word, event.x, event.y).await;
            }
        });
        EventDisposition::Propagate
    }

    pub fn on_pointer_up(self: &Arc<Self>, event: PointerEvent) -> EventDisposition {
        if event.target.inside_tooltip {
            return EventDisposition::Stop;
        }
        if !self.accepts(TriggerMode::Selection) || !event.target.is_subtitle() {
            return EventDisposition::Propagate;
        }

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            // 等待宿主完成選取
            tokio::time::sleep(pipeline.selection_settle).await;
            if !pipeline.accepts(TriggerMode::Selection) {
                return;
            }
            let selection = pipeline.hit_test.selection_text();
            if let Some(word) = first_selection_word(&selection) {
                pipeline.perform_lookup(&word, event.x, event.y).await;
            }
        });
        EventDisposition::Propagate
    }

    /// 提示框內部事件在這裡截止；外部點擊關閉提示框
    pub fn on_pointer_down(&self, event: PointerEvent) -> EventDisposition {
        if event.target.inside_tooltip {
            return EventDisposition::Stop;
        }
        let mut tooltip = self.tooltip();
        if tooltip.is_visible() {
            tooltip.hide();
        }
        EventDisposition::Propagate
    }

    /// 滾輪 / 觸摸滑動
    pub fn on_scroll_gesture(&self, event: PointerEvent) -> EventDisposition {
        if event.target.inside_tooltip {
            EventDisposition::Stop
        } else {
            EventDisposition::Propagate
        }
    }

    pub fn on_tooltip_action(&self, action: TooltipAction) -> EventDisposition {
        self.tooltip().handle_action(action);
        EventDisposition::Stop
    }

    /// 顯示加載狀態並查詢；失敗時回到隱藏狀態。已停止時不做任何事
    pub async fn perform_lookup(&self, word: &str, x: f64, y: f64) {
        if !self.listening.load(Ordering::SeqCst) {
            log::debug!("[Dict] 已停止，忽略查詢: {}", word);
            return;
        }
        let generation = self.next_generation();
        self.tooltip().show_loading(x, y);

        let outcome = self.provider.lookup(word).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("[Dict] 丟棄過期結果: {}", word);
            return;
        }

        let mut tooltip = self.tooltip();
        match outcome {
            Ok(Some(result)) => tooltip.show(x, y, &result, self.show_phonetic.load(Ordering::SeqCst)),
            Ok(None) => tooltip.hide(),
            Err(e) => {
                log::warn!("[Dict] 查詢失敗 {}: {}", word, e);
                tooltip.hide();
            }
        }
    }

    /// 直接操作提示框（測試與宿主渲染層使用）
    pub fn tooltip(&self) -> MutexGuard<'_, DictionaryTooltip> {
        self.tooltip.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_hover_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}
