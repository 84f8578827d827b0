use serde::Serialize;

/// Inline view budget for a single artifact.
pub const DEFAULT_VIEW_LIMIT_BYTES: usize = 200_000;

/// Bounded text preview of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactView {
    pub content: String,
    /// More content exists past `shown_bytes`; fetch it via download.
    pub truncated: bool,
    pub shown_bytes: usize,
    pub total_bytes: u64,
}

/// Full raw content of an artifact, with its original file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ArtifactView {
    /// Build a view from the first `limit + 1` bytes of a file.
    ///
    /// A prefix longer than `limit` is cut to at most `limit` bytes, backing off
    /// to the start of a UTF-8 sequence split by the cut. Invalid bytes are
    /// replaced rather than rejected.
    pub(crate) fn from_prefix(prefix: &[u8], limit: usize, total_bytes: u64) -> Self {
        let truncated = prefix.len() > limit;
        let shown = if truncated {
            &prefix[..complete_utf8_prefix(&prefix[..limit])]
        } else {
            prefix
        };

        Self {
            content: String::from_utf8_lossy(shown).into_owned(),
            truncated,
            shown_bytes: shown.len(),
            total_bytes,
        }
    }
}

/// Length of `bytes` without a trailing, incomplete UTF-8 sequence.
fn complete_utf8_prefix(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(3) {
        let byte = bytes[len - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let expected = match byte {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return len,
        };
        return if expected > back { len - back } else { len };
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_content_is_not_truncated() {
        let view = ArtifactView::from_prefix(b"hello", 10, 5);
        assert_eq!(view.content, "hello");
        assert!(!view.truncated);
        assert_eq!(view.shown_bytes, 5);
    }

    #[test]
    fn content_exactly_at_limit_is_not_truncated() {
        let view = ArtifactView::from_prefix(b"abcde", 5, 5);
        assert!(!view.truncated);
        assert_eq!(view.content, "abcde");
    }

    #[test]
    fn overflow_is_cut_to_the_limit() {
        let view = ArtifactView::from_prefix(b"abcdef", 5, 10_000);
        assert!(view.truncated);
        assert_eq!(view.content, "abcde");
        assert_eq!(view.total_bytes, 10_000);
    }

    #[test]
    fn cut_never_splits_a_multibyte_character() {
        // "aé€" = 61 | c3 a9 | e2 82 ac
        let bytes = "aé€x".as_bytes();
        assert_eq!(ArtifactView::from_prefix(bytes, 2, 7).content, "a");
        assert_eq!(ArtifactView::from_prefix(bytes, 3, 7).content, "aé");
        assert_eq!(ArtifactView::from_prefix(bytes, 5, 7).content, "aé");
        assert_eq!(ArtifactView::from_prefix(bytes, 6, 7).content, "aé€");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let view = ArtifactView::from_prefix(&[b'o', 0xFF, b'k'], 10, 3);
        assert_eq!(view.content, "o\u{FFFD}k");
        assert!(!view.truncated);
    }

    #[test]
    fn utf8_prefix_handles_edges() {
        assert_eq!(complete_utf8_prefix(b""), 0);
        assert_eq!(complete_utf8_prefix(&[0xE2, 0x82]), 0);
        assert_eq!(complete_utf8_prefix(&[0xE2, 0x82, 0xAC]), 3);
        assert_eq!(complete_utf8_prefix(&[0x80, 0x80, 0x80, 0x80]), 4);
    }
}
