/**
 * 提示框定位（純幾何）
 *
 * 輸入錨點（視口坐標）、視口與滾動偏移、提示框的自然尺寸，
 * 輸出文檔坐標下的位置與最大高度。優先放在錨點上方
 */
use crate::host::{Placement, Size, Viewport};

/// 無論空間多大，提示框高度都不超過此值（包括分頁欄）
pub const GLOBAL_MAX_HEIGHT: f64 = 280.0;

const GAP_ABOVE: f64 = 5.0;
/// 放在下方時留出更大間距，避免立即遮住光標
const GAP_BELOW: f64 = 15.0;
const RIGHT_MARGIN: f64 = 20.0;
const MIN_LEFT: f64 = 10.0;
const TOP_BUFFER: f64 = 10.0;
const BOTTOM_BUFFER: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementDecision {
    pub side: Side,
    pub placement: Placement,
}

pub fn place(anchor_x: f64, anchor_y: f64, viewport: &Viewport, natural: Size) -> Placement {
    decide(anchor_x, anchor_y, viewport, natural).placement
}

pub fn decide(anchor_x: f64, anchor_y: f64, viewport: &Viewport, natural: Size) -> PlacementDecision {
    let mut left = anchor_x;
    if left + natural.width > viewport.width {
        left = viewport.width - natural.width - RIGHT_MARGIN;
    }
    if left < MIN_LEFT {
        left = MIN_LEFT;
    }

    let space_above = (anchor_y - viewport.scroll_y) - TOP_BUFFER;
    let space_below = viewport.height - (anchor_y - viewport.scroll_y) - BOTTOM_BUFFER;
    let height = natural.height;

    let (side, top, max_height) = if height <= space_above && height <= GLOBAL_MAX_HEIGHT {
        (Side::Above, anchor_y - height - GAP_ABOVE, GLOBAL_MAX_HEIGHT)
    } else if height <= space_below && height <= GLOBAL_MAX_HEIGHT {
        (Side::Below, anchor_y + GAP_BELOW, GLOBAL_MAX_HEIGHT)
    } else if space_above >= space_below {
        // 兩邊都放不下：擠進較大的一側，內容在限定高度內滾動
        let allowed = GLOBAL_MAX_HEIGHT.min(space_above).max(0.0);
        (Side::Above, anchor_y - allowed - GAP_ABOVE, allowed)
    } else {
        let allowed = GLOBAL_MAX_HEIGHT.min(space_below).max(0.0);
        (Side::Below, anchor_y + GAP_BELOW, allowed)
    };

    PlacementDecision {
        side,
        placement: Placement {
            top: top + viewport.scroll_y,
            left: left + viewport.scroll_x,
            max_height,
        },
    }
}
