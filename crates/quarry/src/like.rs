//! LIKE pattern matching.
//!
//! Patterns follow the SQL convention: `%` matches any run of characters
//! (including none) and `_` matches exactly one. They are compiled to an
//! anchored regular expression once per query.

use regex::{Regex, RegexBuilder};

use crate::config::LikeOptions;
use crate::error::Result;

/// A compiled LIKE pattern.
#[derive(Debug, Clone)]
pub struct LikePattern {
    regex: Regex,
}

impl LikePattern {
    /// Compiles a LIKE pattern.
    pub fn new(pattern: &str, options: &LikeOptions) -> Result<Self> {
        let source = translate(pattern, options.escape);
        let regex = RegexBuilder::new(&source)
            .case_insensitive(options.case_insensitive)
            .dot_matches_new_line(true)
            .build()?;
        Ok(LikePattern { regex })
    }

    /// Tests whether `text` matches the whole pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn translate(pattern: &str, escape: Option<char>) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            c if Some(c) == escape => match chars.next() {
                Some(next) => push_literal(&mut out, next),
                // A trailing escape matches itself
                None => push_literal(&mut out, c),
            },
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            c => push_literal(&mut out, c),
        }
    }
    out.push('$');
    out
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}
