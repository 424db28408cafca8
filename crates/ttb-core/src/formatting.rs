//! Reply formatting helpers (Telegram HTML subset).

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Split a reply into chunks of at most `limit` bytes, preferring line
/// boundaries. Replies here never span HTML tags across lines, so no tag
/// bookkeeping is needed.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();

    for line in text.split('\n') {
        if line.len() > limit {
            if !chunk.is_empty() {
                out.push(std::mem::take(&mut chunk));
            }
            let mut rest = line;
            while rest.len() > limit {
                let mut cut = floor_char_boundary(rest, limit);
                if cut == 0 {
                    // limit smaller than one character; emit it whole anyway
                    cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
                }
                out.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            chunk.push_str(rest);
            continue;
        }

        let sep = usize::from(!chunk.is_empty());
        if !chunk.is_empty() && chunk.len() + sep + line.len() > limit {
            out.push(std::mem::take(&mut chunk));
        }
        if !chunk.is_empty() {
            chunk.push('\n');
        }
        chunk.push_str(line);
    }

    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
