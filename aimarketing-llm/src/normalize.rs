//! Reply normalization.

use std::sync::LazyLock;

use regex::Regex;

static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("newline-run pattern is valid"));

/// Collapse every run of two or more `\n` into exactly two.
///
/// Single newlines are kept as they are. Applying this twice yields the same
/// text as applying it once.
pub fn normalize_reply(text: &str) -> String {
    NEWLINE_RUN.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_long_runs() {
        assert_eq!(normalize_reply("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_reply("a\n\n\nb\n\n\n\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn keeps_single_and_double_newlines() {
        assert_eq!(normalize_reply("a\nb"), "a\nb");
        assert_eq!(normalize_reply("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn leading_and_trailing_runs() {
        assert_eq!(normalize_reply("\n\n\nDear Ana,\n\n\n"), "\n\nDear Ana,\n\n");
    }

    #[test]
    fn carriage_returns_break_runs() {
        assert_eq!(normalize_reply("a\n\r\n\nb"), "a\n\r\n\nb");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "",
            "plain",
            "\n",
            "\n\n\n",
            "Hi,\n\n\n\nThanks\n\n\n\n\n\nBob\n",
            "x\n\ny\n\n\nz",
        ];
        for s in samples {
            let once = normalize_reply(s);
            assert_eq!(normalize_reply(&once), once, "not a fixed point for {s:?}");
        }
    }

    #[test]
    fn prefix_stays_prefix_as_text_grows() {
        let full = "Hello\n\n\n\nworld\n\n\nbye";
        let mut prev = String::new();
        for end in 0..=full.len() {
            let cur = normalize_reply(&full[..end]);
            assert!(cur.starts_with(&prev), "{prev:?} is not a prefix of {cur:?}");
            prev = cur;
        }
    }
}
