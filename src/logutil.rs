//! Logging helpers that keep player-supplied strings on a single log line.

use std::fmt::Write;

const MAX_PREVIEW: usize = 64;

/// Quote a nickname for logging: wrap in single quotes, escape backslashes,
/// quotes and control characters, and cap very long values with an ellipsis.
pub fn quote_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 4);
    out.push('\'');
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
