use crate::host::{CaptionHost, CaptionSegment};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// 拼接當前可見字幕：排除譯文層，以單個空格連接後去除首尾空白
pub fn current_caption_text(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .filter(|segment| !segment.in_overlay)
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// 字幕觀察器
///
/// 容器可能尚未出現，也可能在視頻切換時被宿主銷毀重建，
/// 兩種情況都回到輪詢狀態，無限期重試
pub struct SubtitleWatcher {
    host: Arc<dyn CaptionHost>,
    poll_interval: Duration,
    last_caption: Option<String>,
}

impl SubtitleWatcher {
    pub fn new(host: Arc<dyn CaptionHost>, poll_interval: Duration) -> Self {
        Self {
            host,
            poll_interval,
            last_caption: None,
        }
    }

    /// 在後台運行，直到任務被中止
    pub fn spawn<F>(self, on_change: F) -> JoinHandle<()>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        tokio::spawn(self.run(on_change))
    }

    pub async fn run<F>(mut self, on_change: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut waiting_logged = false;

        loop {
            let receiver = self
                .host
                .find_caption_container()
                .and_then(|container| self.host.observe(container));

            let Some(mut mutations) = receiver else {
                if !waiting_logged {
                    log::info!("[SubtitleWatcher] 等待字幕容器出現...");
                    waiting_logged = true;
                }
                tokio::time::sleep(self.poll_interval).await;
                continue;
            };

            log::info!("[SubtitleWatcher] 開始觀察字幕");
            waiting_logged = false;
            self.check(&on_change);

            while mutations.recv().await.is_some() {
                // 合併同一輪中已排隊的變動
                while mutations.try_recv().is_ok() {}
                self.check(&on_change);
            }

            log::info!("[SubtitleWatcher] 字幕容器已移除，重新等待");
        }
    }

    /// 重新讀取字幕，內容變化時回調並返回新文本
    pub fn check<F>(&mut self, on_change: &F) -> Option<String>
    where
        F: Fn(String),
    {
        let caption = current_caption_text(&self.host.caption_segments());
        if self.last_caption.as_deref() == Some(caption.as_str()) {
            return None;
        }

        self.last_caption = Some(caption.clone());
        on_change(caption.clone());
        Some(caption)
    }

    pub fn last_caption(&self) -> Option<&str> {
        self.last_caption.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_text_excludes_overlay_and_trims() {
        let segments = vec![
            CaptionSegment::host(" the quick"),
            CaptionSegment::overlay("敏捷的"),
            CaptionSegment::host("brown fox "),
        ];
        assert_eq!(current_caption_text(&segments), "the quick brown fox");
    }

    #[test]
    fn test_caption_text_empty_without_segments() {
        assert_eq!(current_caption_text(&[]), "");
        assert_eq!(current_caption_text(&[CaptionSegment::overlay("譯文")]), "");
    }
}
