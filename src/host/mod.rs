/**
 * 宿主頁面接口
 * 本系統不擁有宿主的 DOM，只通過以下接口讀取、觀察，
 * 並在兩個自有插入點（譯文層、詞典提示框）渲染內容
 */
use tokio::sync::mpsc;

/// 宿主容器句柄（由宿主分配，容器重建後會改變）
pub type ContainerId = u64;

/// 一批子樹變動（子節點列表或字符數據）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationBatch {
    pub records: usize,
}

/// 字幕片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionSegment {
    pub text: String,
    /// 是否屬於本系統渲染的譯文層
    pub in_overlay: bool,
}

impl CaptionSegment {
    pub fn host(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_overlay: false,
        }
    }

    pub fn overlay(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_overlay: true,
        }
    }
}

/// 字幕區域
pub trait CaptionHost: Send + Sync {
    /// 查找字幕容器，尚未出現時返回 None
    fn find_caption_container(&self) -> Option<ContainerId>;

    /// 觀察容器子樹變動；容器被銷毀時通道關閉
    fn observe(&self, container: ContainerId) -> Option<mpsc::UnboundedReceiver<MutationBatch>>;

    /// 當前所有字幕片段（包括譯文層中的片段）
    fn caption_segments(&self) -> Vec<CaptionSegment>;
}

/// 譯文層插入點
pub trait OverlayHost: Send + Sync {
    /// 播放器元素是否已存在
    fn player_available(&self) -> bool;

    /// 把譯文層插入播放器
    fn attach_overlay(&self);

    /// 替換譯文層內容，空字符串表示清空
    fn set_overlay_html(&self, html: &str);

    fn detach_overlay(&self);
}

/// 光標命中的文本位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretHit {
    /// 命中的文本節點內容
    pub text: String,
    /// 指針下方字符的索引（以字符計，不是字節）
    pub offset: usize,
}

/// 文本命中測試
pub trait TextHitTest: Send + Sync {
    /// 坐標不在文本上時返回 None
    fn caret_from_point(&self, x: f64, y: f64) -> Option<CaretHit>;

    /// 當前的文本選取
    fn selection_text(&self) -> String;
}

/// 視口狀態
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// 提示框最終位置（文檔坐標）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub max_height: f64,
}

/// 詞典提示框插入點（位於 document.body）
pub trait TooltipHost: Send + Sync {
    fn viewport(&self) -> Viewport;

    /// 寫入內容並重置位置約束（top/left 為 0，最大高度恢復默認），返回自然尺寸
    fn layout_tooltip(&self, html: &str) -> Size;

    fn position_tooltip(&self, placement: &Placement);

    fn hide_tooltip(&self);

    fn play_audio(&self, url: &str) -> Result<(), HostError>;
}

/// 完整的宿主頁面
pub trait HostPage: CaptionHost + OverlayHost + TextHitTest + TooltipHost {}

impl<T> HostPage for T where T: CaptionHost + OverlayHost + TextHitTest + TooltipHost {}

/// 事件目標的分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTarget {
    /// 宿主字幕片段內
    pub caption_segment: bool,
    /// 本系統譯文層的片段內
    pub overlay_segment: bool,
    /// 詞典提示框內
    pub inside_tooltip: bool,
}

impl EventTarget {
    pub fn caption() -> Self {
        Self {
            caption_segment: true,
            ..Self::default()
        }
    }

    pub fn overlay() -> Self {
        Self {
            overlay_segment: true,
            ..Self::default()
        }
    }

    pub fn tooltip() -> Self {
        Self {
            inside_tooltip: true,
            ..Self::default()
        }
    }

    pub fn is_subtitle(&self) -> bool {
        self.caption_segment || self.overlay_segment
    }
}

/// 指針事件（視口坐標）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub target: EventTarget,
}

/// 事件處理後是否繼續冒泡到宿主頁面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Propagate,
    Stop,
}

#[derive(Debug, Clone)]
pub enum HostError {
    Audio(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Audio(msg) => write!(f, "音頻播放失敗: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}
