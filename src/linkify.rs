// Auto-linking of bare URLs in message and topic fragments
//
// Chat topics and incoming messages frequently contain pasted URLs. The
// LinkRewriter wraps every bare URL in an anchor tag so downstream renderers
// can make it clickable, while leaving everything else byte-for-byte intact.

use regex::{Captures, Regex};

/// Matches, in order of preference:
/// 1. An existing anchor element (left untouched, makes rewriting idempotent)
/// 2. A quoted tag attribute (so `src="http://..."` is never re-wrapped)
/// 3. A bare URL to wrap
const LINK_PATTERN: &str = r#"(?is)(<a\b[^>]*>.*?</a>)|(\w+="[^"]*")|(https?://[^\s<>"]+)"#;

/// Trailing characters that are almost always sentence punctuation,
/// not part of the URL itself
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Rewrites bare URLs in an HTML-ish fragment into clickable anchors.
///
/// Pure transform: no state beyond the compiled pattern, and applying it
/// twice yields the same output as applying it once.
pub struct LinkRewriter {
    pattern: Regex,
}

impl LinkRewriter {
    pub fn new() -> Self {
        Self {
            // Compile-time constant; a parse failure would fail every test
            // in this module.
            pattern: Regex::new(LINK_PATTERN).expect("link pattern is valid"),
        }
    }

    /// Wrap every bare URL in `fragment` in an `<a href>` anchor.
    ///
    /// URLs already inside an anchor, and URLs appearing as quoted tag
    /// attributes, pass through unchanged.
    pub fn rewrite(&self, fragment: &str) -> String {
        self.pattern
            .replace_all(fragment, |caps: &Captures| {
                // Existing anchor or quoted attribute: emit verbatim
                if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
                    return m.as_str().to_string();
                }

                let raw = &caps[3];
                let url = raw.trim_end_matches(TRAILING_PUNCTUATION);
                let trailing = &raw[url.len()..];
                format!("<a href=\"{url}\">{url}</a>{trailing}")
            })
            .into_owned()
    }
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new()
    }
}
