use super::{PagedItem, TooltipHeader, TooltipViewState};
use std::fmt::Write;

const AUDIO_ICON: &str = concat!(
    r#"<svg viewBox="0 0 24 24"><path d="M3 9v6h4l5 5V4L7 9H3zm13.5 3c0-1.77-1.02-3.29-2.5-4.03v8.05"#,
    r#"c1.48-.73 2.5-2.25 2.5-4.02zM14 3.23v2.06c2.89.86 5 3.54 5 6.71s-2.11 5.85-5 6.71v2.06"#,
    r#"c4.01-.91 7-4.49 7-8.77s-2.99-7.86-7-8.77z"/></svg>"#
);

/// 轉義 HTML 特殊字符；詞典和翻譯內容都來自遠程服務，不能直接寫入頁面
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn loading_html() -> String {
    r#"<div class="yt-dict-loading"><div class="yt-dict-loading-spinner"></div>Loading...</div>"#.to_string()
}

fn header_html(header: &TooltipHeader) -> String {
    let mut html = String::from(r#"<div class="yt-dict-header">"#);
    let _ = write!(html, r#"<span class="yt-dict-word">{}</span>"#, escape_html(&header.word));
    if let Some(phonetic) = &header.phonetic {
        let _ = write!(html, r#"<span class="yt-dict-phonetic">[{}]</span>"#, escape_html(phonetic));
    }
    if let Some(url) = &header.audio_url {
        let _ = write!(
            html,
            r#"<div class="yt-dict-audio" data-src="{}" title="Play pronunciation">{}</div>"#,
            escape_html(url),
            AUDIO_ICON
        );
    }
    html.push_str("</div>");
    html
}

fn item_html(item: &PagedItem) -> String {
    match item {
        PagedItem::PartOfSpeech(pos) => format!(r#"<div class="yt-dict-pos">{}</div>"#, escape_html(pos)),
        PagedItem::Definition { text, example } => {
            let mut html = format!(
                r#"<div class="yt-dict-def-item"><div class="yt-dict-def">• {}</div>"#,
                escape_html(text)
            );
            if let Some(example) = example {
                let _ = write!(html, r#"<div class="yt-dict-ex">"{}"</div>"#, escape_html(example));
            }
            html.push_str("</div>");
            html
        }
        PagedItem::NotFound => r#"<div class="yt-dict-empty">Definition not found</div>"#.to_string(),
    }
}

fn disabled(enabled: bool) -> &'static str {
    if enabled {
        ""
    } else {
        " disabled"
    }
}

/// 完整詞條視圖：關閉按鈕、頭部、當前頁內容、分頁欄
pub fn entry_html(header: &TooltipHeader, state: &TooltipViewState) -> String {
    let body: String = state.page_items().iter().map(item_html).collect();

    format!(
        concat!(
            r#"<div class="yt-dict-close">×</div>"#,
            "{header}",
            r#"<div class="yt-dict-content-area" id="yt-dict-content-body">{body}</div>"#,
            r#"<div class="yt-dict-pagination">"#,
            r#"<button class="yt-dict-page-btn" id="yt-dict-prev"{prev}>&lt;</button>"#,
            r#"<span class="yt-dict-page-info" id="yt-dict-page-num">{label}</span>"#,
            r#"<button class="yt-dict-page-btn" id="yt-dict-next"{next}>&gt;</button>"#,
            r#"</div>"#
        ),
        header = header_html(header),
        body = body,
        prev = disabled(state.prev_enabled()),
        label = state.page_label(),
        next = disabled(state.next_enabled()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(phonetic: Option<&str>, audio: Option<&str>) -> TooltipHeader {
        TooltipHeader {
            word: "run".to_string(),
            phonetic: phonetic.map(str::to_string),
            audio_url: audio.map(str::to_string),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<b>"it's" & more</b>"#), "&lt;b&gt;&quot;it&#39;s&quot; &amp; more&lt;/b&gt;");
    }

    #[test]
    fn test_header_optional_parts() {
        let state = TooltipViewState::from_items(vec![PagedItem::NotFound]);

        let bare = entry_html(&header(None, None), &state);
        assert!(!bare.contains("yt-dict-phonetic"));
        assert!(!bare.contains("yt-dict-audio"));
        assert!(bare.contains("Definition not found"));

        let full = entry_html(&header(Some("/ɹʌn/"), Some("https://a.example/run.mp3")), &state);
        assert!(full.contains("[/ɹʌn/]"));
        assert!(full.contains(r#"data-src="https://a.example/run.mp3""#));
    }

    #[test]
    fn test_pagination_controls_reflect_state() {
        let items = vec![PagedItem::PartOfSpeech("verb".to_string()); 5];
        let mut state = TooltipViewState::from_items(items);

        let first = entry_html(&header(None, None), &state);
        assert!(first.contains(r#"id="yt-dict-prev" disabled"#));
        assert!(first.contains(r#"id="yt-dict-next">"#));
        assert!(first.contains("1 / 2"));

        state.go_to_page(1);
        let last = entry_html(&header(None, None), &state);
        assert!(last.contains(r#"id="yt-dict-prev">"#));
        assert!(last.contains(r#"id="yt-dict-next" disabled"#));
        assert_eq!(last.matches("yt-dict-pos").count(), 2);
    }

    #[test]
    fn test_definition_example_rendered_quoted() {
        let item = PagedItem::Definition {
            text: "to move fast".to_string(),
            example: Some("run <home>".to_string()),
        };
        let html = item_html(&item);
        assert!(html.contains("• to move fast"));
        assert!(html.contains(r#""run &lt;home&gt;""#));
    }
}
