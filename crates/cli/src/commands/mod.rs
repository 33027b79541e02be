//! Command implementations. Output goes to stdout, logs to stderr.

pub mod cache;
pub mod eval;
pub mod init;
pub mod playlist;
pub mod pull;
pub mod search;

/// Cut `text` to `width` characters, marking the cut with "...".
pub(crate) fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
