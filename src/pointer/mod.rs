/**
 * 指針模塊
 * 坐標 → 單詞的解析、選取文字的分詞，以及懸停防抖
 */
pub mod debounce;

pub use debounce::HoverDebouncer;

use crate::dictionary::MIN_WORD_LEN;
use crate::host::TextHitTest;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// 只有 ASCII 字母構成單詞
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// 純字母且長度足夠，才值得查詢
pub fn is_lookup_candidate(word: &str) -> bool {
    word.len() >= MIN_WORD_LEN && word.chars().all(is_word_char)
}

/// 取包含 `offset` 處字符的最長連續字母串
///
/// `offset` 落在非字母字符上（例如單詞之間的空格）時沒有單詞
pub fn word_at(text: &str, offset: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if offset >= chars.len() || !is_word_char(chars[offset]) {
        return None;
    }

    let mut start = offset;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }

    let mut end = offset;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    Some(chars[start..end].iter().collect())
}

fn token_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[\s\p{P}]+").expect("static regex"))
}

/// 選取文字中第一個可查詢的單詞
pub fn first_selection_word(selection: &str) -> Option<String> {
    token_separator()
        .split(selection.trim())
        .find(|token| is_lookup_candidate(token))
        .map(str::to_string)
}

/// 屏幕坐標 → 單詞
pub struct PointerResolver {
    host: Arc<dyn TextHitTest>,
}

impl PointerResolver {
    pub fn new(host: Arc<dyn TextHitTest>) -> Self {
        Self { host }
    }

    pub fn word_at_point(&self, x: f64, y: f64) -> Option<String> {
        let hit = self.host.caret_from_point(x, y)?;
        word_at(&hit.text, hit.offset)
    }
}
