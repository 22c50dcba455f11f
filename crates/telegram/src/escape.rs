//! MarkdownV2 escaping.
//!
//! See <https://core.telegram.org/bots/api#markdownv2-style>.

/// Characters that must be backslash-escaped outside of entities.
pub const RESERVED: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

/// Escape every reserved character.
pub fn escape(text: &str) -> String {
    escape_except(text, "")
}

/// Escape every reserved character except those listed in `keep`.
pub fn escape_except(text: &str, keep: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if RESERVED.contains(&c) && !keep.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape underscores that appear in runs of two or more.
///
/// A single `_` stays an italic marker; `__` would otherwise open an
/// underline entity, and blank-fill lines like `______` are literal text.
pub fn escape_underscore_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    let flush = |out: &mut String, run: usize| {
        for _ in 0..run {
            if run > 1 {
                out.push('\\');
            }
            out.push('_');
        }
    };
    for c in text.chars() {
        if c == '_' {
            run += 1;
            continue;
        }
        flush(&mut out, run);
        run = 0;
        out.push(c);
    }
    flush(&mut out, run);
    out
}

/// Escaping applied to feed text: keep `*bold*` and `_italic_`, escape
/// everything else, and neutralize underscore runs.
pub fn escape_feed_text(text: &str) -> String {
    escape_underscore_runs(&escape_except(text, "*_"))
}
