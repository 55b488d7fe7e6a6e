//! Message entity helpers

use super::MessageEntity;

/// Spell out `text_link` entities as `label (url)`. Offsets are UTF-16 code
/// units; out-of-range and overlapping entities are clamped or skipped.
pub fn expand_text_links(text: &str, entities: &[MessageEntity]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let len = units.len();

    let mut sorted: Vec<&MessageEntity> = entities.iter().collect();
    sorted.sort_by_key(|e| e.offset);

    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    for entity in sorted {
        let start = entity.offset.min(len);
        let end = start.saturating_add(entity.length).min(len);
        if start < last {
            continue;
        }
        let Some(url) = entity.url.as_deref().filter(|_| entity.kind == "text_link") else {
            continue;
        };

        out.push_str(&String::from_utf16_lossy(&units[last..end]));
        out.push_str(" (");
        out.push_str(url);
        out.push(')');
        last = end;
    }
    out.push_str(&String::from_utf16_lossy(&units[last..]));
    out
}
