/**
 * 字幕模塊
 * 觀察宿主字幕區域，並管理本系統插入的譯文層
 */
pub mod overlay;
pub mod watcher;

pub use overlay::TranslatedOverlay;
pub use watcher::{current_caption_text, SubtitleWatcher};
