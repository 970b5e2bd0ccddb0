use crate::host::OverlayHost;
use crate::tooltip::markup::escape_html;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct OverlayState {
    attached: bool,
    /// 播放器出現前請求的最後一次渲染
    pending: Option<String>,
    poll: Option<JoinHandle<()>>,
}

/// 譯文層：播放器內唯一一個由本系統插入的元素
pub struct TranslatedOverlay {
    host: Arc<dyn OverlayHost>,
    state: Mutex<OverlayState>,
}

impl TranslatedOverlay {
    pub fn new(host: Arc<dyn OverlayHost>) -> Self {
        Self {
            host,
            state: Mutex::new(OverlayState::default()),
        }
    }

    /// 輪詢播放器，出現後插入譯文層；重複調用不會重複插入
    pub fn attach(self: &Arc<Self>, poll_interval: Duration) {
        let mut state = self.lock();
        if state.attached || state.poll.is_some() {
            return;
        }

        let overlay = Arc::clone(self);
        state.poll = Some(tokio::spawn(async move {
            loop {
                if overlay.host.player_available() {
                    overlay.finish_attach();
                    return;
                }
                tokio::time::sleep(poll_interval).await;
            }
        }));
    }

    fn finish_attach(&self) {
        let mut state = self.lock();
        self.host.attach_overlay();
        state.attached = true;
        state.poll = None;
        if let Some(html) = state.pending.take() {
            self.host.set_overlay_html(&html);
        }
        log::info!("[Overlay] 譯文層已插入播放器");
    }

    /// 渲染譯文，空文本清空譯文層
    pub fn render(&self, text: &str) {
        let html = overlay_html(text);
        let mut state = self.lock();
        if state.attached {
            self.host.set_overlay_html(&html);
        } else {
            state.pending = Some(html);
        }
    }

    pub fn detach(&self) {
        let mut state = self.lock();
        if let Some(poll) = state.poll.take() {
            poll.abort();
        }
        if state.attached {
            self.host.detach_overlay();
        }
        state.attached = false;
        state.pending = None;
    }

    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 譯文層標記，沿用宿主字幕的結構；`yt-trans-segment` 用於區分本系統的片段
pub fn overlay_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!(
        concat!(
            r#"<div class="ytp-caption-window-bottom" style="display: block;">"#,
            r#"<span class="captions-text" style="background-color: rgba(8, 8, 8, 0.75);">"#,
            r#"<span class="ytp-caption-segment yt-trans-segment" "#,
            r#"style="color: rgb(255, 255, 255); cursor: text; user-select: text;">{}</span>"#,
            r#"</span></div>"#
        ),
        escape_html(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_html_marks_own_segment() {
        let html = overlay_html("你好 <世界>");
        assert!(html.contains("yt-trans-segment"));
        assert!(html.contains("你好 &lt;世界&gt;"));
    }

    #[test]
    fn test_empty_text_clears_markup() {
        assert_eq!(overlay_html(""), "");
    }
}
